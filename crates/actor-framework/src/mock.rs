//! # Mock Clients
//!
//! Utilities for testing code that talks to a [`ResourceClient`] without
//! spawning a real [`ResourceActor`](crate::ResourceActor).
//!
//! | | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **State** | None (scripted replies) | Real store |
//! | **Error Injection** | Easy (`return_err`) | Needs specific state |
//! | **Use Case** | Logic *around* the client | The actor itself, end to end |
//!
//! Two styles are available:
//!
//! - [`create_mock_client`] plus the `expect_*` helpers hand you each request
//!   as it arrives, so you can assert on its payload and answer it by hand.
//! - [`MockClient`] answers from a queue of scripted expectations.
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Product>::new();
//! mock.expect_get(ProductId(1)).return_err(FrameworkError::ActorClosed);
//!
//! let client = ProductClient::new(mock.client());
//! assert!(matches!(client.get(ProductId(1)).await, Err(CatalogError::Unavailable(_))));
//! mock.verify();
//! ```

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// A scripted reply to the next request.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError<T>>,
    },
    List {
        response: Result<Vec<T>, FrameworkError<T>>,
    },
    Create {
        response: Result<T::View, FrameworkError<T>>,
    },
    Action {
        id: T::Id,
        response: Result<T::View, FrameworkError<T>>,
    },
}

/// A mock client that answers requests from a queue of expectations.
///
/// Requests must arrive in the order the expectations were queued; a request
/// that does not match the head of the queue panics the responder task, which
/// surfaces in the test as `ActorDropped`.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let queued = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queued.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get {
                            id: expected,
                            response,
                        }),
                    ) => {
                        assert_eq!(id, expected, "get for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action {
                            id: expected,
                            response,
                        }),
                    ) => {
                        assert_eq!(id, expected, "action for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` for `id`.
    pub fn expect_get(&mut self, id: T::Id) -> Reply<T, Option<T>> {
        Reply::new(self.expectations.clone(), move |response| Expectation::Get {
            id,
            response,
        })
    }

    /// Expects a `list`.
    pub fn expect_list(&mut self) -> Reply<T, Vec<T>> {
        Reply::new(self.expectations.clone(), |response| Expectation::List {
            response,
        })
    }

    /// Expects a `create`.
    pub fn expect_create(&mut self) -> Reply<T, T::View> {
        Reply::new(self.expectations.clone(), |response| Expectation::Create {
            response,
        })
    }

    /// Expects an `action` on `id`.
    pub fn expect_action(&mut self, id: T::Id) -> Reply<T, T::View> {
        Reply::new(self.expectations.clone(), move |response| {
            Expectation::Action { id, response }
        })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;
type Build<T, R> = Box<dyn FnOnce(Result<R, FrameworkError<T>>) -> Expectation<T> + Send>;

/// Builder that queues the reply for one expected request.
pub struct Reply<T: ActorEntity, R> {
    expectations: Queue<T>,
    build: Build<T, R>,
}

impl<T: ActorEntity, R> Reply<T, R> {
    fn new(
        expectations: Queue<T>,
        build: impl FnOnce(Result<R, FrameworkError<T>>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self {
            expectations,
            build: Box::new(build),
        }
    }

    /// Answers the request successfully.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Answers the request with an error.
    pub fn return_err(self, error: FrameworkError<T>) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError<T>>) {
        let expectation = (self.build)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

/// Creates a client and the receiver its requests land on.
///
/// Use this when a test needs to look at the request payload before deciding
/// how to answer; pair it with [`expect_get`], [`expect_create`] and
/// [`expect_action`].
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Receives the next request if it is a `Create`.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::View, FrameworkError<T>>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Receives the next request if it is a `Get`.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError<T>>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Receives the next request if it is an `Action`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::View, FrameworkError<T>>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Sku {
        id: u64,
        code: String,
    }

    #[derive(Debug)]
    struct SkuCreate {
        code: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("sku error")]
    struct SkuError;

    #[async_trait]
    impl ActorEntity for Sku {
        type Id = u64;
        type Create = SkuCreate;
        type Update = ();
        type Action = ();
        type View = String;
        type Context = ();
        type Error = SkuError;

        fn from_create_params(id: u64, params: SkuCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                code: params.code,
            })
        }

        async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, _: (), _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn on_commit(&self, _: &()) -> String {
            self.code.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Sku>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(SkuCreate {
                    code: "A-1".to_string(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.code, "A-1");
        responder.send(Ok("A-1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result.unwrap(), "A-1");
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Sku>::new();
        mock.expect_create().return_ok("B-2".to_string());
        mock.expect_get(1).return_ok(Some(Sku {
            id: 1,
            code: "B-2".to_string(),
        }));
        mock.expect_list().return_err(FrameworkError::ActorClosed);

        let client = mock.client();
        let view = client
            .create(SkuCreate {
                code: "B-2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(view, "B-2");

        let fetched = client.get(1).await.unwrap();
        assert_eq!(fetched.unwrap().code, "B-2");

        assert!(matches!(client.list().await, Err(FrameworkError::ActorClosed)));

        mock.verify();
    }
}
