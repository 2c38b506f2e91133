//! Identity store port, used for seller and buyer display.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    pub username: Option<String>,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn resolve(&self, user_id: &UserId) -> Result<Option<UserRecord>, DomainError>;
}
