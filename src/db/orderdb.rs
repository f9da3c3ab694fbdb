use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::offermodel::Offer;
use crate::models::ordermodel::{Contract, ContractStatus, Deliverable, Order, OrderStatus};

/// Order and contract persistence. All state-changing updates carry their
/// legal source statuses in the WHERE clause so concurrent mutations of the
/// same order serialize at the row: whichever transaction commits first
/// wins and the loser observes zero updated rows.
#[async_trait]
pub trait OrderExt {
    async fn create_order_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer: &Offer,
        order_number: &str,
        delivery_date: DateTime<Utc>,
        client_ip_address: Option<String>,
    ) -> Result<Order, Error>;

    async fn create_contract_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        offer: &Offer,
    ) -> Result<Contract, Error>;

    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, Error>;

    async fn get_contract_by_order_id(&self, order_id: Uuid) -> Result<Option<Contract>, Error>;

    async fn mark_delivered_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    /// Delivered -> revision_requested, consuming one revision. The
    /// revision ceiling is part of the predicate so the limit can never be
    /// oversubscribed by concurrent requests.
    async fn mark_revision_requested_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    async fn mark_completed_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    async fn mark_cancelled_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    async fn mark_disputed_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error>;

    /// The only write that moves an order out of disputed; used by dispute
    /// resolution to force a terminal status.
    async fn force_disputed_terminal_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, Error>;

    async fn set_contract_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        status: ContractStatus,
    ) -> Result<Option<Contract>, Error>;

    async fn insert_deliverable_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        freelancer_id: Uuid,
        message: Option<String>,
        attachment_urls: Option<Vec<String>>,
    ) -> Result<Deliverable, Error>;

    async fn get_deliverables_for_order(&self, order_id: Uuid) -> Result<Vec<Deliverable>, Error>;

    async fn get_orders_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Error>;

    async fn get_orders_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Error>;
}

#[async_trait]
impl OrderExt for DBClient {
    async fn create_order_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer: &Offer,
        order_number: &str,
        delivery_date: DateTime<Utc>,
        client_ip_address: Option<String>,
    ) -> Result<Order, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                order_number, service_id, client_id, freelancer_id, conversation_id,
                offer_id, status, price, currency, delivery_time_days,
                revisions_included, revisions_used, delivery_date, client_ip_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'in_progress', $7, $8, $9, $10, 0, $11, $12)
            RETURNING *
            "#,
        )
        .bind(order_number)
        .bind(offer.service_id)
        .bind(offer.client_id)
        .bind(offer.freelancer_id)
        .bind(offer.conversation_id)
        .bind(offer.id)
        .bind(&offer.price)
        .bind(&offer.currency)
        .bind(offer.delivery_time_days)
        .bind(offer.revisions_included)
        .bind(delivery_date)
        .bind(client_ip_address)
        .fetch_one(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn create_contract_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        offer: &Offer,
    ) -> Result<Contract, Error> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (
                order_id, service_title, service_description, scope_of_work,
                price, currency, delivery_time_days, revisions_included,
                cancellation_policy, status, client_accepted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', NOW())
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(&offer.service_title)
        .bind(&offer.service_description)
        .bind(&offer.scope_of_work)
        .bind(&offer.price)
        .bind(&offer.currency)
        .bind(offer.delivery_time_days)
        .bind(offer.revisions_included)
        .bind(&offer.cancellation_policy)
        .fetch_one(&mut **tx)
        .await?;

        Ok(contract)
    }

    async fn get_order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn get_contract_by_order_id(&self, order_id: Uuid) -> Result<Option<Contract>, Error> {
        let contract =
            sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(contract)
    }

    async fn mark_delivered_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'delivered', updated_at = NOW()
            WHERE id = $1 AND status IN ('in_progress', 'revision_requested')
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn mark_revision_requested_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'revision_requested', revisions_used = revisions_used + 1, updated_at = NOW()
            WHERE id = $1 AND status = 'delivered' AND revisions_used < revisions_included
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn mark_completed_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'completed', completed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'delivered'
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn mark_cancelled_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('completed', 'cancelled', 'disputed')
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn mark_disputed_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'disputed', updated_at = NOW()
            WHERE id = $1 AND status IN ('in_progress', 'delivered', 'revision_requested')
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn force_disputed_terminal_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2,
                completed_at = CASE WHEN $2 = 'completed'::order_status THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'disputed'
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn set_contract_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        status: ContractStatus,
    ) -> Result<Option<Contract>, Error> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = $2
            WHERE order_id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(contract)
    }

    async fn insert_deliverable_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        freelancer_id: Uuid,
        message: Option<String>,
        attachment_urls: Option<Vec<String>>,
    ) -> Result<Deliverable, Error> {
        let deliverable = sqlx::query_as::<_, Deliverable>(
            r#"
            INSERT INTO deliverables (order_id, freelancer_id, message, attachment_urls)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(freelancer_id)
        .bind(message)
        .bind(attachment_urls)
        .fetch_one(&mut **tx)
        .await?;

        Ok(deliverable)
    }

    async fn get_deliverables_for_order(&self, order_id: Uuid) -> Result<Vec<Deliverable>, Error> {
        let deliverables = sqlx::query_as::<_, Deliverable>(
            r#"
            SELECT * FROM deliverables
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(deliverables)
    }

    async fn get_orders_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Error> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
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

        Ok(orders)
    }

    async fn get_orders_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Error> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
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

        Ok(orders)
    }
}
