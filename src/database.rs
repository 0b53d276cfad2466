use std::time::Duration;

use tokio_postgres::{Client, NoTls};
use tracing::{error, warn};

/// Opens a connection and drives it from a background task, returning the
/// client half.
pub async fn connect(config: &tokio_postgres::Config) -> Result<Client, tokio_postgres::Error> {
    let (client, connection) = config.connect(NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("database connection error: {}", e);
        }
    });

    Ok(client)
}

/// Retries the initial connection a bounded number of times with a fixed
/// delay, then gives up with the last error.
pub async fn connect_with_retry(
    config: &tokio_postgres::Config,
    attempts: u32,
    delay: Duration,
) -> Result<Client, tokio_postgres::Error> {
    let mut attempt = 1;
    loop {
        match connect(config).await {
            Ok(client) => return Ok(client),
            Err(e) if attempt < attempts => {
                warn!(
                    "database connection attempt {}/{} failed: {}",
                    attempt, attempts, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
