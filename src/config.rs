use std::env;

/// Runtime configuration, read once at startup. Every knob has a fixed
/// fallback so the service starts with no environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_port: u16,
    pub listen_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            db_host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            db_user: env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            db_password: env::var("DB_PASSWORD").unwrap_or_else(|_| "password".to_string()),
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "bakery_orders".to_string()),
            db_port: env_port("DB_PORT", 5432),
            listen_port: env_port("PORT", 5000),
        }
    }

    /// Connection parameters for the target database.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.db_host)
            .port(self.db_port)
            .user(&self.db_user)
            .password(&self.db_password)
            .dbname(&self.db_name);
        config
    }

    /// Connection parameters for the maintenance database, used before the
    /// target database is known to exist.
    pub fn maintenance_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.db_host)
            .port(self.db_port)
            .user(&self.db_user)
            .password(&self.db_password)
            .dbname("postgres");
        config
    }
}

fn env_port(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
