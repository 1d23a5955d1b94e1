/*
 * Responsibility
 * - shops テーブル向け SQLx 操作 (ownership 判定のみ)
 * - shop の CRUD は外部の business service の責務
 */
use sqlx::PgPool;

use crate::repos::error::RepoError;

pub async fn is_owned_by(db: &PgPool, shop_id: i64, user_id: i64) -> Result<bool, RepoError> {
    let owned: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM shops
            WHERE "shopId" = $1 AND "ownerId" = $2
        )
        "#,
    )
    .bind(shop_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(owned)
}
