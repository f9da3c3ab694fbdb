use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::catalogmodel::ServiceListing;

/// Read side of the catalog collaborator. The order engine only consumes
/// the frozen projection; listing management lives elsewhere.
#[async_trait]
pub trait CatalogExt {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceListing>, Error>;
}

#[async_trait]
impl CatalogExt for DBClient {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceListing>, Error> {
        let service = sqlx::query_as::<_, ServiceListing>(
            "SELECT * FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }
}
