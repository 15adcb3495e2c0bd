/// Application name
pub const APP_NAME: &str = "Hearth";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plugin API version offered by the host
pub const API_VERSION: &str = "0.1.0";

/// Largest encoded message payload delivered to an entity, in bytes
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 32 * 1024;

/// Log level used when neither the command line nor the environment sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
