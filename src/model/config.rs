use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::model::apperror::{ApplicationError, ErrorType};

/**
 * Directory holding the default database file.
 */
pub const DEFAULT_DATA_DIR: &str = "data";

/**
 * Connection string used when none is supplied.
 */
pub const DEFAULT_CONNECTION_STRING: &str = "sqlite://data/database.sqlite";

/**
 * Command-line arguments for the application.
 */
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ApplicationArguments {
    /**
     * Path to the configuration file.
     */
    #[arg(short, long)]
    pub config_file: Option<String>,
    /**
     * Database connection string, overrides the configuration file.
     */
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/**
 * Represents the configuration for the application.
 */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /**
     * Logging configuration for the application.
     */
    pub logging: LoggingConfig,
    /**
     * Server configuration for the application.
     */
    pub server: Server,
    /**
     * Database configuration for the application.
     */
    pub database: Database,
}

impl Config {
    /**
     * Reads the configuration from the specified file, or the defaults if no file is given.
     *
     * #Arguments
     * `config_file`: Optional path to the configuration file.
     *
     * #Returns
     * The parsed `Config` or an `Initialization` error if reading or parsing fails.
     */
    pub fn load(config_file: Option<&str>) -> Result<Config, ApplicationError> {
        let Some(config_file) = config_file else {
            return Ok(Config::default());
        };
        let config_str = std::fs::read_to_string(config_file).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to read config file: {err}")))?;
        Config::parse(&config_str)
    }

    /**
     * Parses the configuration from a TOML string.
     */
    pub fn parse(config_str: &str) -> Result<Config, ApplicationError> {
        toml::from_str(config_str).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to parse config file: {err}")))
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /**
     * Whether to log the target of the log message.
     */
    pub target: bool,
    /**
     * Whether to log thread IDs .
     */
    pub thread_ids: bool,
    /**
     * Whether to log thread names.
     */
    pub thread_names: bool,
    /**
     * Whether to log line numbers.
     */
    pub line_number: bool,
    /**
     * Whether to log the log level.
     */
    pub level: bool,
    /**
     * Whether to use ANSI colors in logs.
     */
    pub ansi: bool,
    /**
     * Additional directives for logging configuration.
     */
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { target: true, thread_ids: false, thread_names: false, line_number: false, level: true, ansi: true, directives: vec![] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Database {
    /**
     * SQLite connection string. Falls back to `DEFAULT_CONNECTION_STRING`.
     */
    pub connection_string: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /**
     * Timeouts in milliseconds.
     */
    pub acquire_timeout: u64,
    pub acquire_slow_threshold: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
}

impl Default for Database {
    fn default() -> Self {
        Database { connection_string: None, max_connections: 5, min_connections: 1, acquire_timeout: 30_000, acquire_slow_threshold: 2_000, idle_timeout: 300_000, max_lifetime: 3_600_000 }
    }
}

impl Database {
    /**
     * Resolves the connection string to use.
     *
     * # Arguments
     * `database_url`: Override from the command line or the `DATABASE_URL` environment variable.
     *
     * # Returns
     * The connection string and whether it is the default one.
     */
    pub fn resolve_connection_string(&self, database_url: Option<String>) -> (String, bool) {
        match database_url.or_else(|| self.connection_string.clone()) {
            Some(connection_string) => (connection_string, false),
            None => (DEFAULT_CONNECTION_STRING.to_string(), true),
        }
    }
}

/**
 * Represents the server configuration for the application.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    /**
     * Address the server binds to.
     */
    pub host: String,
    /**
     * Number of worker threads for the server.
     */
    pub workers: usize,
    /**
     * HTTP port for the server.
     */
    pub http_port: Option<u16>,
    /**
     * HTTPS configuration for the server.
     */
    pub https_config: Option<HttpsConfig>,
}

impl Default for Server {
    fn default() -> Self {
        Server { host: "127.0.0.1".to_string(), workers: 4, http_port: Some(8000), https_config: None }
    }
}

/**
 * Represents the HTTPS configuration for the server.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsConfig {
    /**
     * Port for the HTTPS server.
     */
    pub port: u16,
    /**
     * Path to the certificate file.
     */
    pub certificate_file: String,
    /**
     * Path to the private key file.
     */
    pub private_key_file: String,
}
