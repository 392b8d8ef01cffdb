use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BuyerId, Money, OrderId, SellerId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::order::{NewOrder, Offer, Order, OrderTimeline};
use crate::status::OrderStatus;
use crate::store::{OrderPatch, OrderStore};
use crate::{Result, StoreError};

const ORDER_COLUMNS: &str = "order_id, invoice_id, gig_id, seller_id, seller_username, \
     buyer_id, buyer_username, price, service_fee, requirements, offer, \
     status, cancelled, approved, delivered, approved_at, placed_at, \
     order_delivered_at, delivered_work";

/// PostgreSQL-backed order store implementation.
///
/// Orders are one row each; the status name and the three flag columns are
/// written together from [`OrderStatus`] and validated on load. Updates run
/// as `SELECT ... FOR UPDATE` plus `UPDATE` in one transaction, which is the
/// per-document atomicity the lifecycle service relies on.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let offer_json: serde_json::Value = row.try_get("offer")?;
        let offer: Offer = serde_json::from_value(offer_json)?;

        let work_json: serde_json::Value = row.try_get("delivered_work")?;
        let delivered_work = serde_json::from_value(work_json)?;

        let status = OrderStatus::from_flags(
            row.try_get("status")?,
            row.try_get("cancelled")?,
            row.try_get("approved")?,
            row.try_get("delivered")?,
        )?;

        Ok(Order {
            order_id: OrderId::new(row.try_get::<String, _>("order_id")?),
            invoice_id: row.try_get("invoice_id")?,
            gig_id: row.try_get("gig_id")?,
            seller_id: SellerId::new(row.try_get::<String, _>("seller_id")?),
            seller_username: row.try_get("seller_username")?,
            buyer_id: BuyerId::new(row.try_get::<String, _>("buyer_id")?),
            buyer_username: row.try_get("buyer_username")?,
            price: Money::from_cents(row.try_get("price")?),
            service_fee: Money::from_cents(row.try_get("service_fee")?),
            requirements: row.try_get("requirements")?,
            offer,
            status,
            approved_at: row.try_get::<Option<DateTime<Utc>>, _>("approved_at")?,
            timeline: OrderTimeline {
                placed: row.try_get("placed_at")?,
                order_delivered: row.try_get::<Option<DateTime<Utc>>, _>("order_delivered_at")?,
            },
            delivered_work,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_seller_id(&self, seller_id: &SellerId) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE seller_id = $1 \
             ORDER BY placed_at ASC, order_id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(seller_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn find_by_buyer_id(&self, buyer_id: &BuyerId) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_id = $1 \
             ORDER BY placed_at ASC, order_id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(buyer_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn insert(&self, data: NewOrder) -> Result<Order> {
        data.validate()?;
        let order = data.into_order(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, invoice_id, gig_id, seller_id, seller_username,
                buyer_id, buyer_username, price, service_fee, requirements, offer,
                status, cancelled, approved, delivered, approved_at, placed_at,
                order_delivered_at, delivered_work)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(&order.invoice_id)
        .bind(&order.gig_id)
        .bind(order.seller_id.as_str())
        .bind(&order.seller_username)
        .bind(order.buyer_id.as_str())
        .bind(&order.buyer_username)
        .bind(order.price.cents())
        .bind(order.service_fee.cents())
        .bind(&order.requirements)
        .bind(serde_json::to_value(&order.offer)?)
        .bind(order.status.as_str())
        .bind(order.cancelled())
        .bind(order.approved())
        .bind(order.delivered())
        .bind(order.approved_at)
        .bind(order.timeline.placed)
        .bind(order.timeline.order_delivered)
        .bind(serde_json::to_value(&order.delivered_work)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::DuplicateOrder(order.order_id.clone());
            }
            StoreError::Database(e)
        })?;

        tracing::debug!(order_id = %order.order_id, "order inserted");
        Ok(order)
    }

    async fn update_by_order_id(
        &self,
        order_id: &OrderId,
        patch: OrderPatch,
    ) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut order = Self::row_to_order(row)?;
        order.apply(&patch)?;

        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, cancelled = $3, approved = $4, delivered = $5,
                approved_at = $6, order_delivered_at = $7, delivered_work = $8
            WHERE order_id = $1
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.status.as_str())
        .bind(order.cancelled())
        .bind(order.approved())
        .bind(order.delivered())
        .bind(order.approved_at)
        .bind(order.timeline.order_delivered)
        .bind(serde_json::to_value(&order.delivered_work)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(order_id = %order.order_id, status = order.status.as_str(), "order updated");
        Ok(Some(order))
    }
}
