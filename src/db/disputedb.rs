use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::disputemodel::{Dispute, DisputeComment, DisputeStatus};
use crate::models::ordermodel::Order;

#[async_trait]
pub trait DisputeExt {
    async fn create_dispute_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &Order,
        raised_by: Uuid,
        reason: String,
        description: String,
        attachment_urls: Option<Vec<String>>,
    ) -> Result<Dispute, Error>;

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error>;

    async fn get_active_dispute_for_order(&self, order_id: Uuid)
        -> Result<Option<Dispute>, Error>;

    /// Guarded on the active statuses: resolving an already-resolved
    /// dispute returns zero rows instead of overwriting the resolution.
    async fn resolve_dispute_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        dispute_id: Uuid,
        admin_id: Uuid,
        new_status: DisputeStatus,
        admin_resolution: Option<String>,
    ) -> Result<Option<Dispute>, Error>;

    async fn mark_dispute_in_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        dispute_id: Uuid,
    ) -> Result<Option<Dispute>, Error>;

    async fn insert_dispute_comment(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<DisputeComment, Error>;

    async fn get_dispute_comments(&self, dispute_id: Uuid)
        -> Result<Vec<DisputeComment>, Error>;

    async fn get_disputes_by_status(
        &self,
        status: DisputeStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, Error>;
}

#[async_trait]
impl DisputeExt for DBClient {
    async fn create_dispute_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &Order,
        raised_by: Uuid,
        reason: String,
        description: String,
        attachment_urls: Option<Vec<String>>,
    ) -> Result<Dispute, Error> {
        let dispute = sqlx::query_as::<_, Dispute>(
            r#"
            INSERT INTO disputes (
                order_id, client_id, freelancer_id, raised_by,
                reason, description, attachment_urls, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'open')
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.client_id)
        .bind(order.freelancer_id)
        .bind(raised_by)
        .bind(reason)
        .bind(description)
        .bind(attachment_urls)
        .fetch_one(&mut **tx)
        .await?;

        Ok(dispute)
    }

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error> {
        let dispute = sqlx::query_as::<_, Dispute>("SELECT * FROM disputes WHERE id = $1")
            .bind(dispute_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(dispute)
    }

    async fn get_active_dispute_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Dispute>, Error> {
        let dispute = sqlx::query_as::<_, Dispute>(
            r#"
            SELECT * FROM disputes
            WHERE order_id = $1 AND status IN ('open', 'in_review')
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dispute)
    }

    async fn resolve_dispute_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        dispute_id: Uuid,
        admin_id: Uuid,
        new_status: DisputeStatus,
        admin_resolution: Option<String>,
    ) -> Result<Option<Dispute>, Error> {
        let dispute = sqlx::query_as::<_, Dispute>(
            r#"
            UPDATE disputes
            SET status = $2,
                admin_resolution = $3,
                resolved_by = $4,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('open', 'in_review')
            RETURNING *
            "#,
        )
        .bind(dispute_id)
        .bind(new_status)
        .bind(admin_resolution)
        .bind(admin_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(dispute)
    }

    async fn mark_dispute_in_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        dispute_id: Uuid,
    ) -> Result<Option<Dispute>, Error> {
        let dispute = sqlx::query_as::<_, Dispute>(
            r#"
            UPDATE disputes
            SET status = 'in_review', updated_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(dispute_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(dispute)
    }

    async fn insert_dispute_comment(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<DisputeComment, Error> {
        let comment = sqlx::query_as::<_, DisputeComment>(
            r#"
            INSERT INTO dispute_comments (dispute_id, user_id, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(dispute_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_dispute_comments(
        &self,
        dispute_id: Uuid,
    ) -> Result<Vec<DisputeComment>, Error> {
        let comments = sqlx::query_as::<_, DisputeComment>(
            r#"
            SELECT * FROM dispute_comments
            WHERE dispute_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(dispute_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn get_disputes_by_status(
        &self,
        status: DisputeStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, Error> {
        let disputes = sqlx::query_as::<_, Dispute>(
            r#"
            SELECT * FROM disputes
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(disputes)
    }
}
