use std::str::FromStr;

use log::LevelFilter;

/// Install the global logger.
///
/// An explicit `--log-level` wins, then `RUST_LOG`, then the config file's level.
pub fn init(cli_level: Option<&str>, config_level: &str) -> Result<(), String> {
    let mut builder = env_logger::Builder::new();
    match cli_level {
        Some(level) => {
            let filter = LevelFilter::from_str(level)
                .map_err(|_| format!("unknown log level '{}'", level))?;
            builder.filter_level(filter);
        }
        None => match std::env::var("RUST_LOG") {
            Ok(spec) if !spec.is_empty() => {
                builder.parse_filters(&spec);
            }
            _ => {
                builder.parse_filters(config_level);
            }
        },
    }
    builder
        .try_init()
        .map_err(|e| format!("Failed to initialize env_logger: {}", e))
}
