use super::traits::ListingRepository;
use crate::domain::Listing;
use crate::error::AppResult;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Read-only access to the listings table maintained by the listings service.
pub struct ListingRepositoryImpl {
    pool: PgPool,
}

impl ListingRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for ListingRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            "SELECT id, owner_id, title, thumbnail_url FROM listings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let listings = sqlx::query_as::<_, Listing>(
            "SELECT id, owner_id, title, thumbnail_url FROM listings WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }
}
