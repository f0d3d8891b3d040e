use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    id: u64,
    label: String,
    value: u32,
}

#[derive(Debug)]
struct CounterCreate {
    label: String,
}

#[derive(Debug)]
struct CounterUpdate {
    label: Option<String>,
}

#[derive(Debug)]
enum CounterAction {
    Increment(u32),
    /// Bumps the value, then fails; the bump must not survive.
    IncrementThenFail(u32),
}

#[derive(Debug, thiserror::Error)]
enum CounterError {
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("refused")]
    Refused,
}

/// Records every committed and removed value.
#[derive(Default)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

#[async_trait]
impl ActorEntity for Counter {
    type Id = u64;
    type Create = CounterCreate;
    type Update = CounterUpdate;
    type Action = CounterAction;
    type View = (String, u32);
    type Context = Arc<Journal>;
    type Error = CounterError;

    fn from_create_params(id: u64, params: CounterCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            label: params.label,
            value: 0,
        })
    }

    async fn on_create(&mut self, _ctx: &Arc<Journal>) -> Result<(), Self::Error> {
        if self.label.is_empty() {
            return Err(CounterError::EmptyLabel);
        }
        Ok(())
    }

    async fn on_update(&mut self, update: CounterUpdate, _ctx: &Arc<Journal>) -> Result<(), Self::Error> {
        if let Some(label) = update.label {
            if label.is_empty() {
                return Err(CounterError::EmptyLabel);
            }
            self.label = label;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: CounterAction, _ctx: &Arc<Journal>) -> Result<(), Self::Error> {
        match action {
            CounterAction::Increment(by) => {
                self.value += by;
                Ok(())
            }
            CounterAction::IncrementThenFail(by) => {
                self.value += by;
                Err(CounterError::Refused)
            }
        }
    }

    async fn on_commit(&self, ctx: &Arc<Journal>) -> (String, u32) {
        ctx.entries
            .lock()
            .unwrap()
            .push(format!("commit {} {}", self.id, self.value));
        (self.label.clone(), self.value)
    }

    async fn on_removed(&self, ctx: &Arc<Journal>) {
        ctx.entries.lock().unwrap().push(format!("removed {}", self.id));
    }
}

struct CounterClient {
    inner: ResourceClient<Counter>,
}

#[async_trait]
impl ActorClient<Counter> for CounterClient {
    type Error = String;

    fn inner(&self) -> &ResourceClient<Counter> {
        &self.inner
    }

    fn map_error(e: FrameworkError<Counter>) -> Self::Error {
        e.to_string()
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let journal = Arc::new(Journal::default());
    let (actor, client) = ResourceActor::<Counter>::new(10);
    let handle = tokio::spawn(actor.run(journal.clone()));

    let view = client
        .create(CounterCreate {
            label: "visits".into(),
        })
        .await
        .unwrap();
    assert_eq!(view, ("visits".to_string(), 0));

    let view = client.perform_action(1, CounterAction::Increment(3)).await.unwrap();
    assert_eq!(view.1, 3);

    let view = client
        .update(
            1,
            CounterUpdate {
                label: Some("hits".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(view, ("hits".to_string(), 3));

    let stored = client.get(1).await.unwrap().unwrap();
    assert_eq!(stored.value, 3);

    client.delete(1).await.unwrap();
    assert!(client.get(1).await.unwrap().is_none());

    drop(client);
    handle.await.unwrap();

    let entries = journal.entries.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec!["commit 1 0", "commit 1 3", "commit 1 3", "removed 1"]
    );
}

#[tokio::test]
async fn test_failed_action_leaves_store_untouched() {
    let journal = Arc::new(Journal::default());
    let (actor, client) = ResourceActor::<Counter>::new(10);
    tokio::spawn(actor.run(journal.clone()));

    client
        .create(CounterCreate { label: "a".into() })
        .await
        .unwrap();
    client.perform_action(1, CounterAction::Increment(5)).await.unwrap();

    let result = client
        .perform_action(1, CounterAction::IncrementThenFail(100))
        .await;
    assert!(matches!(
        result,
        Err(FrameworkError::Entity(CounterError::Refused))
    ));

    let stored = client.get(1).await.unwrap().unwrap();
    assert_eq!(stored.value, 5);
    // No commit hook for the failed action
    assert_eq!(journal.entries.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete_or_failed_create() {
    let (actor, client) = ResourceActor::<Counter>::new(10);
    tokio::spawn(actor.run(Arc::new(Journal::default())));

    client.create(CounterCreate { label: "a".into() }).await.unwrap();
    let failed = client.create(CounterCreate { label: String::new() }).await;
    assert!(matches!(
        failed,
        Err(FrameworkError::Entity(CounterError::EmptyLabel))
    ));
    client.delete(1).await.unwrap();
    client.create(CounterCreate { label: "b".into() }).await.unwrap();

    let all = client.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 3);
}

#[tokio::test]
async fn test_missing_ids_report_not_found() {
    let (actor, client) = ResourceActor::<Counter>::new(10);
    tokio::spawn(actor.run(Arc::new(Journal::default())));

    assert!(matches!(
        client.perform_action(9, CounterAction::Increment(1)).await,
        Err(FrameworkError::NotFound(9))
    ));
    assert!(matches!(
        client.delete(9).await,
        Err(FrameworkError::NotFound(9))
    ));

    let wrapper = CounterClient { inner: client };
    assert_eq!(wrapper.delete(9).await.unwrap_err(), "Item not found: 9");
    assert!(wrapper.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_actor_is_reported() {
    let (actor, client) = ResourceActor::<Counter>::new(10);
    drop(actor);

    assert!(matches!(
        client.get(1).await,
        Err(FrameworkError::ActorClosed)
    ));
}
