/*
 * Responsibility
 * - 1 リクエスト分の認証済みコンテキスト (UserContext) の保持
 * - RequestContextStore はリクエストごとに新しく作られ、request extensions 経由で
 *   stage / handler に渡される (プロセス共有の可変領域は持たない)
 * - ClearGuard が drop 時に clear() する: 正常終了 / 拒否 / panic / cancel のいずれでも実行される
 */
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::services::auth::{Role, SessionToken};

/// Identity bound to one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: i64,
    pub role: Role,
    pub token_id: String,
    // unix seconds; lets logout revoke for the remaining lifetime only
    pub expires_at: i64,
}

impl From<SessionToken> for UserContext {
    fn from(token: SessionToken) -> Self {
        Self {
            user_id: token.user_id,
            role: token.role,
            token_id: token.token_id,
            expires_at: token.expires_at,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("an identity is already bound to this request")]
    AlreadyBound,
}

/// Per-request identity slot.
///
/// Clones share the same slot; a new store is created for every request.
#[derive(Debug, Clone, Default)]
pub struct RequestContextStore {
    slot: Arc<RwLock<Option<UserContext>>>,
}

impl RequestContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// At most one identity per request: a second bind is refused.
    pub fn bind(&self, ctx: UserContext) -> Result<(), ContextError> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(ContextError::AlreadyBound);
        }
        *slot = Some(ctx);
        Ok(())
    }

    pub fn current(&self) -> Option<UserContext> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_identity(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // Idempotent.
    pub fn clear(&self) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn clear_on_drop(&self) -> ClearGuard {
        ClearGuard {
            store: self.clone(),
        }
    }
}

/// Clears the store exactly once, when dropped.
#[must_use = "the store is cleared when the guard is dropped"]
#[derive(Debug)]
pub struct ClearGuard {
    store: RequestContextStore,
}

impl Drop for ClearGuard {
    fn drop(&mut self) {
        self.store.clear();
    }
}
