use async_trait::async_trait;
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::offermodel::Offer;

#[async_trait]
pub trait OfferExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_offer(
        &self,
        service_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
        conversation_id: Option<Uuid>,
        price: BigDecimal,
        currency: String,
        delivery_time_days: i32,
        revisions_included: i32,
        scope_of_work: Option<String>,
        cancellation_policy: Option<String>,
        service_title: String,
        service_description: String,
    ) -> Result<Offer, Error>;

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, Error>;

    /// Flip a pending offer to accepted. The status predicate makes this the
    /// serialization point for concurrent accepts: the loser sees zero rows.
    async fn mark_offer_accepted_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, Error>;

    /// Write the derived order pointer; same transaction as the flip so the
    /// pointer always agrees with the status.
    async fn link_offer_to_order_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
        order_id: Uuid,
    ) -> Result<Offer, Error>;

    async fn mark_offer_rejected(
        &self,
        offer_id: Uuid,
        reason: String,
    ) -> Result<Option<Offer>, Error>;

    async fn get_offers_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, Error>;

    async fn get_offers_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, Error>;
}

#[async_trait]
impl OfferExt for DBClient {
    async fn create_offer(
        &self,
        service_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
        conversation_id: Option<Uuid>,
        price: BigDecimal,
        currency: String,
        delivery_time_days: i32,
        revisions_included: i32,
        scope_of_work: Option<String>,
        cancellation_policy: Option<String>,
        service_title: String,
        service_description: String,
    ) -> Result<Offer, Error> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (
                service_id, client_id, freelancer_id, conversation_id,
                status, price, currency, delivery_time_days, revisions_included,
                scope_of_work, cancellation_policy, service_title, service_description
            )
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(client_id)
        .bind(freelancer_id)
        .bind(conversation_id)
        .bind(price)
        .bind(currency)
        .bind(delivery_time_days)
        .bind(revisions_included)
        .bind(scope_of_work)
        .bind(cancellation_policy)
        .bind(service_title)
        .bind(service_description)
        .fetch_one(&self.pool)
        .await?;

        Ok(offer)
    }

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, Error> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(offer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(offer)
    }

    async fn mark_offer_accepted_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, Error> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'accepted', accepted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending' AND order_id IS NULL
            RETURNING *
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(offer)
    }

    async fn link_offer_to_order_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
        order_id: Uuid,
    ) -> Result<Offer, Error> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET order_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(offer_id)
        .bind(order_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(offer)
    }

    async fn mark_offer_rejected(
        &self,
        offer_id: Uuid,
        reason: String,
    ) -> Result<Option<Offer>, Error> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'rejected', rejected_at = NOW(), rejection_reason = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(offer_id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    async fn get_offers_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, Error> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE client_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }

    async fn get_offers_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, Error> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE freelancer_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(freelancer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }
}
