// Global constants used across the bridge.

/// The default configuration file name, looked up in the current working
/// directory when no `--config` flag or `LB_CONFIG` variable is given.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "bridge.toml";

/// Prefix for auto-generated MQTT client ids.
pub const CLIENT_ID_PREFIX: &str = "lumen-bridge";

/// Directory for rolling log files when file logging is enabled.
pub const LOG_DIR: &str = "./logs";

/// Rolling log file name prefix.
pub const LOG_FILE_NAME: &str = "bridge.log";
