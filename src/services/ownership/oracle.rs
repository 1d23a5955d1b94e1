use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// External authority answering "does `user_id` control `resource_id`?".
///
/// Remote by contract: callers bound each call with a timeout and treat any
/// error or timeout as "not owned" (fail-closed).
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    async fn check_ownership(&self, user_id: i64, resource_id: i64)
    -> Result<bool, OwnershipError>;
}
