//! Identity lookup used to validate shoppers before ranking or purchases.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::model::UserId;

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn exists(&self, user: UserId) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<BTreeSet<UserId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    pub async fn register(&self, user: UserId) {
        self.users.write().await.insert(user);
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryDirectory {
    async fn exists(&self, user: UserId) -> bool {
        self.users.read().await.contains(&user)
    }
}
