use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::{RatingSummary, Review};

#[async_trait]
pub trait ReviewExt {
    async fn insert_order_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
        is_client_review: bool,
    ) -> Result<Review, Error>;

    async fn insert_service_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        service_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error>;

    /// The review in one direction of an order: client -> freelancer when
    /// `is_client_review`, freelancer -> client otherwise.
    async fn get_order_review_in_direction(
        &self,
        order_id: Uuid,
        is_client_review: bool,
    ) -> Result<Option<Review>, Error>;

    async fn get_order_review_by_reviewer(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn get_service_review_by_reviewer(
        &self,
        service_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn get_reviews_for_order(&self, order_id: Uuid) -> Result<Vec<Review>, Error>;

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error>;

    async fn get_reviews_for_service(
        &self,
        service_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error>;

    /// Re-aggregate the reviewee's rating from the review set and upsert
    /// the summary row. Runs inside the transaction that inserted the
    /// review so concurrent submissions cannot lose updates.
    async fn recompute_rating_summary_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reviewee_id: Uuid,
    ) -> Result<RatingSummary, Error>;

    async fn get_rating_summary(&self, user_id: Uuid) -> Result<Option<RatingSummary>, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn insert_order_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
        is_client_review: bool,
    ) -> Result<Review, Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                order_id, reviewer_id, reviewee_id, rating, comment,
                is_order_review, is_client_review
            )
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(comment)
        .bind(is_client_review)
        .fetch_one(&mut **tx)
        .await?;

        Ok(review)
    }

    async fn insert_service_review_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        service_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                service_id, reviewer_id, reviewee_id, rating, comment,
                is_order_review, is_client_review
            )
            VALUES ($1, $2, $3, $4, $5, FALSE, FALSE)
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut **tx)
        .await?;

        Ok(review)
    }

    async fn get_order_review_in_direction(
        &self,
        order_id: Uuid,
        is_client_review: bool,
    ) -> Result<Option<Review>, Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE order_id = $1 AND is_client_review = $2
            "#,
        )
        .bind(order_id)
        .bind(is_client_review)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_order_review_by_reviewer(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE order_id = $1 AND reviewer_id = $2
            "#,
        )
        .bind(order_id)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_service_review_by_reviewer(
        &self,
        service_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE service_id = $1 AND reviewer_id = $2
            "#,
        )
        .bind(service_id)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn get_reviews_for_order(&self, order_id: Uuid) -> Result<Vec<Review>, Error> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(reviewee_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_reviews_for_service(
        &self,
        service_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE service_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(service_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn recompute_rating_summary_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reviewee_id: Uuid,
    ) -> Result<RatingSummary, Error> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            INSERT INTO rating_summaries (user_id, average_rating, review_count, updated_at)
            SELECT $1, COALESCE(AVG(rating)::float8, 0.0), COUNT(*), NOW()
            FROM reviews
            WHERE reviewee_id = $1
            ON CONFLICT (user_id) DO UPDATE
                SET average_rating = EXCLUDED.average_rating,
                    review_count = EXCLUDED.review_count,
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(reviewee_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(summary)
    }

    async fn get_rating_summary(&self, user_id: Uuid) -> Result<Option<RatingSummary>, Error> {
        let summary =
            sqlx::query_as::<_, RatingSummary>("SELECT * FROM rating_summaries WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(summary)
    }
}
