/// Environment variable names and defaults shared by the config loader and the CLI.

// Database connection
pub const ENV_BACKEND: &str = "DB_BACKEND";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DATABASE: &str = "DB_NAME";
pub const ENV_SQLITE_PATH: &str = "SQLITE_PATH";
pub const ENV_TABLE: &str = "PRODUCTS_TABLE";

// Runner
pub const ENV_BATCH_SIZE: &str = "BATCH_SIZE";

// Optional TOML file layered under the environment
pub const ENV_CONFIG_FILE: &str = "CLEANER_CONFIG";

// Prometheus exporter listen address; exporter is off when unset
pub const ENV_METRICS_ADDR: &str = "CLEANER_METRICS_ADDR";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "";
pub const DEFAULT_DATABASE: &str = "test";
pub const DEFAULT_SQLITE_PATH: &str = "products.db";
pub const DEFAULT_TABLE: &str = "products";

/// Rows per page. 5000-10000 suits a workstation with plenty of RAM; drop to
/// 500-1000 on constrained hosts or slow links.
pub const DEFAULT_BATCH_SIZE: usize = 5000;
