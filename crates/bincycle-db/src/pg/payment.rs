//! PostgreSQL payment repository implementation

use async_trait::async_trait;
use bincycle_types::{Payment, UserId};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::PaymentRow;
use crate::repo::{CreatePayment, PaymentRepository};

/// PostgreSQL payment repository
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.id, p.subscription_id, p.amount, p.status, p.payment_intent_id,
                   p.payment_date, p.notes, p.created_at
            FROM payments p
            JOIN subscriptions s ON s.id = p.subscription_id
            WHERE s.user_id = $1
            ORDER BY p.payment_date DESC, p.id DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn create(&self, payment: CreatePayment) -> DbResult<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (subscription_id, amount, status, payment_intent_id,
                                  payment_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, subscription_id, amount, status, payment_intent_id,
                      payment_date, notes, created_at
            "#,
        )
        .bind(payment.subscription_id.0)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(&payment.payment_intent_id)
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .fetch_one(&self.pool)
        .await?;

        Payment::try_from(row)
    }
}
