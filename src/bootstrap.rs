use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tokio_postgres::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::database;
use crate::models::{NewOrder, OrderStatus};
use crate::store::OrderStore;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_DELAY: Duration = Duration::from_secs(2);

const CREATE_ORDERS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS orders (
    id SERIAL PRIMARY KEY,
    order_id VARCHAR(50) NOT NULL UNIQUE,
    customer_name VARCHAR(100) NOT NULL,
    product VARCHAR(100) NOT NULL,
    quantity INT NOT NULL CHECK (quantity >= 1),
    order_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'Pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not connect to postgres after {attempts} attempts: {source}")]
    Connect {
        attempts: u32,
        source: tokio_postgres::Error,
    },
}

/// Startup sequence: connect, ensure the database and table exist, and hand
/// back the client for the store. Connection failure after the retry budget
/// is fatal; schema failures are logged and the service keeps running,
/// surfacing query errors until the schema exists.
pub async fn run(config: &Config) -> Result<Client, BootstrapError> {
    match database::connect_with_retry(
        &config.maintenance_pg_config(),
        CONNECT_ATTEMPTS,
        CONNECT_DELAY,
    )
    .await
    {
        Ok(maintenance) => ensure_database(&maintenance, &config.db_name).await,
        Err(e) => {
            return Err(BootstrapError::Connect {
                attempts: CONNECT_ATTEMPTS,
                source: e,
            })
        }
    }

    let client = database::connect_with_retry(&config.pg_config(), CONNECT_ATTEMPTS, CONNECT_DELAY)
        .await
        .map_err(|e| BootstrapError::Connect {
            attempts: CONNECT_ATTEMPTS,
            source: e,
        })?;

    match client.batch_execute(CREATE_ORDERS_TABLE).await {
        Ok(()) => info!("database and table ready"),
        Err(e) => warn!("could not create orders table: {}", e),
    }

    Ok(client)
}

async fn ensure_database(maintenance: &Client, name: &str) {
    let exists = match maintenance
        .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
        .await
    {
        Ok(row) => row.is_some(),
        Err(e) => {
            warn!("could not check for database {}: {}", name, e);
            return;
        }
    };
    if exists {
        return;
    }

    // CREATE DATABASE takes an identifier, not a bind parameter.
    let sql = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));
    match maintenance.batch_execute(&sql).await {
        Ok(()) => info!("created database {}", name),
        Err(e) => warn!("could not create database {}: {}", name, e),
    }
}

pub fn sample_orders() -> Vec<NewOrder> {
    vec![
        NewOrder {
            order_id: "ORD001".to_string(),
            customer_name: "John Doe".to_string(),
            product: "Cake".to_string(),
            quantity: 2,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
            status: OrderStatus::Pending,
        },
        NewOrder {
            order_id: "ORD002".to_string(),
            customer_name: "Jane Smith".to_string(),
            product: "Bread".to_string(),
            quantity: 5,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
            status: OrderStatus::Completed,
        },
    ]
}

/// Seeds the sample rows once. If any sample is already present, or the
/// presence check itself fails, the store is assumed to be seeded. The
/// insert is one conflict-tolerant batch, so a concurrent seeder cannot
/// abort it either.
pub async fn seed_sample_orders(store: &dyn OrderStore) {
    let samples = sample_orders();

    for sample in &samples {
        match store.contains_order_id(&sample.order_id).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                warn!("sample data check failed, assuming already seeded: {}", e);
                return;
            }
        }
    }

    match store.insert_batch(&samples).await {
        Ok(()) => info!("sample data inserted"),
        Err(e) => warn!("could not insert sample data: {}", e),
    }
}
