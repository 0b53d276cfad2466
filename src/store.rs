use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Row};

use crate::error::StoreError;
use crate::models::{NewOrder, Order, OrderChanges, OrderStatus};

/// The order store, passed to handlers explicitly so tests can substitute
/// an in-memory implementation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Order>, StoreError>;
    async fn get(&self, id: i32) -> Result<Order, StoreError>;
    async fn create(&self, order: &NewOrder) -> Result<i32, StoreError>;
    async fn update(&self, id: i32, changes: &OrderChanges) -> Result<(), StoreError>;
    async fn delete(&self, id: i32) -> Result<(), StoreError>;
    /// Inserts every row in one batch; rows whose `order_id` already exists
    /// are skipped without failing the batch.
    async fn insert_batch(&self, orders: &[NewOrder]) -> Result<(), StoreError>;
    async fn contains_order_id(&self, order_id: &str) -> Result<bool, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

const ORDER_COLUMNS: &str =
    "id, order_id, customer_name, product, quantity, order_date, status, created_at, updated_at";

pub struct PgOrderStore {
    client: Client,
}

impl PgOrderStore {
    pub fn new(client: Client) -> Self {
        PgOrderStore { client }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {} FROM orders ORDER BY order_date DESC, id DESC",
            ORDER_COLUMNS
        );
        let rows = self.client.query(&sql, &[]).await.map_err(db_error)?;
        rows.iter().map(order_from_row).collect()
    }

    async fn get(&self, id: i32) -> Result<Order, StoreError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let row = self
            .client
            .query_opt(&sql, &[&id])
            .await
            .map_err(db_error)?
            .ok_or(StoreError::NotFound)?;
        order_from_row(&row)
    }

    async fn create(&self, order: &NewOrder) -> Result<i32, StoreError> {
        let row = self
            .client
            .query_one(
                "INSERT INTO orders (order_id, customer_name, product, quantity, order_date, status) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &order.order_id,
                    &order.customer_name,
                    &order.product,
                    &order.quantity,
                    &order.order_date,
                    &order.status.as_db(),
                ],
            )
            .await
            .map_err(write_error)?;
        Ok(row.get(0))
    }

    async fn update(&self, id: i32, changes: &OrderChanges) -> Result<(), StoreError> {
        let affected = self
            .client
            .execute(
                "UPDATE orders SET customer_name = $1, product = $2, quantity = $3, \
                 order_date = $4, status = $5, updated_at = NOW() WHERE id = $6",
                &[
                    &changes.customer_name,
                    &changes.product,
                    &changes.quantity,
                    &changes.order_date,
                    &changes.status.as_db(),
                    &id,
                ],
            )
            .await
            .map_err(db_error)?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let affected = self
            .client
            .execute("DELETE FROM orders WHERE id = $1", &[&id])
            .await
            .map_err(db_error)?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_batch(&self, orders: &[NewOrder]) -> Result<(), StoreError> {
        if orders.is_empty() {
            return Ok(());
        }

        let statuses: Vec<&str> = orders.iter().map(|o| o.status.as_db()).collect();
        let mut groups = Vec::with_capacity(orders.len());
        let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
            Vec::with_capacity(orders.len() * 6);
        for (i, order) in orders.iter().enumerate() {
            let base = i * 6;
            groups.push(format!(
                "(${}, ${}, ${}, ${}, ${}, ${})",
                base + 1,
                base + 2,
                base + 3,
                base + 4,
                base + 5,
                base + 6
            ));
            params.push(&order.order_id);
            params.push(&order.customer_name);
            params.push(&order.product);
            params.push(&order.quantity);
            params.push(&order.order_date);
            params.push(&statuses[i]);
        }

        let sql = format!(
            "INSERT INTO orders (order_id, customer_name, product, quantity, order_date, status) \
             VALUES {} ON CONFLICT (order_id) DO NOTHING",
            groups.join(", ")
        );
        self.client
            .execute(sql.as_str(), &params)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn contains_order_id(&self, order_id: &str) -> Result<bool, StoreError> {
        let row = self
            .client
            .query_opt("SELECT 1 FROM orders WHERE order_id = $1", &[&order_id])
            .await
            .map_err(db_error)?;
        Ok(row.is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .batch_execute("SELECT 1")
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

fn order_from_row(row: &Row) -> Result<Order, StoreError> {
    let status_text: String = row.get("status");
    let status = OrderStatus::parse(&status_text).ok_or_else(|| {
        StoreError::Database(format!("unexpected status value in row: {}", status_text))
    })?;
    Ok(Order {
        id: row.get("id"),
        order_id: row.get("order_id"),
        customer_name: row.get("customer_name"),
        product: row.get("product"),
        quantity: row.get("quantity"),
        order_date: row.get("order_date"),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn db_error(err: tokio_postgres::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

fn write_error(err: tokio_postgres::Error) -> StoreError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        StoreError::Conflict
    } else {
        db_error(err)
    }
}
