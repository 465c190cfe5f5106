use std::time::Duration;

use clap::Parser;
use db::DBOptions;

/// Invoicing API server: document numbering and issuance
#[derive(Parser, Debug, Clone)]
#[command(name = "invoicing-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://invoicing.db")]
    pub database_url: String,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log filter (trace, debug, info, warn, error or a full EnvFilter directive)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 8)]
    pub db_max_connections: u32,

    /// Milliseconds a writer waits for the database lock before the request fails as busy
    #[arg(long, env = "DB_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub db_busy_timeout_ms: u64,
}

impl Config {
    pub fn db_options(&self) -> DBOptions {
        DBOptions {
            max_connections: self.db_max_connections,
            busy_timeout: Duration::from_millis(self.db_busy_timeout_ms),
            ..DBOptions::default()
        }
    }

    /// `host:port`, resolved by the listener so host names work too
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = Config::parse_from(["invoicing-server", "--host", "0.0.0.0", "--port", "9000"]);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "invoicing-server",
            "--port",
            "8080",
            "--db-busy-timeout-ms",
            "250",
            "--db-max-connections",
            "2",
        ]);
        assert_eq!(config.port, 8080);
        let options = config.db_options();
        assert_eq!(options.max_connections, 2);
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
    }
}
