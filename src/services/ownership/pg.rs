use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::shop_repo;
use crate::services::ownership::oracle::{OwnershipError, OwnershipOracle};

/// Shop ownership backed by the `shops` table.
#[derive(Clone, Debug)]
pub struct PgShopOwnership {
    db: PgPool,
}

impl PgShopOwnership {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnershipOracle for PgShopOwnership {
    async fn check_ownership(
        &self,
        user_id: i64,
        resource_id: i64,
    ) -> Result<bool, OwnershipError> {
        Ok(shop_repo::is_owned_by(&self.db, resource_id, user_id).await?)
    }
}
