//! Centralized constants for the CKAN configuration workspace.
//!
//! Reserved section names, reserved keys, and environment prefixes shared by
//! the loader, the logging reconfigurator, and the CLI.

// =============================================================================
// Reserved Sections
// =============================================================================

/// Section whose values act as per-file fallbacks for every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Section read into the merged configuration unless overridden.
pub const DEFAULT_MAIN_SECTION: &str = "app:main";

// =============================================================================
// Reserved Keys
// =============================================================================

/// Implicit per-file key bound to the directory of the defining file.
pub const HERE_KEY: &str = "here";

/// Key that always names the originally requested root file.
pub const FILE_KEY: &str = "__file__";

/// Key holding the chain directive (`use = config:base.ini`).
pub const USE_KEY: &str = "use";

/// Directive scheme that chains to another configuration file.
pub const CONFIG_SCHEME: &str = "config";

// =============================================================================
// Environment
// =============================================================================

/// Prefix of environment variables visible to interpolation.
pub const DEFAULT_ENV_PREFIX: &str = "CKAN_";

/// Environment variable naming the root configuration file for the CLI.
pub const CONFIG_PATH_ENV: &str = "CKAN_INI";

/// Environment variable that disables `.env` loading when set to `1`/`true`.
pub const DOTENV_DISABLED_ENV: &str = "DOTENV_DISABLED";

// =============================================================================
// Logging Sections
// =============================================================================

/// Section listing the configured loggers.
pub const LOGGERS_SECTION: &str = "loggers";

/// Section listing the configured handlers.
pub const HANDLERS_SECTION: &str = "handlers";

/// Section listing the configured formatters.
pub const FORMATTERS_SECTION: &str = "formatters";

/// Prefix of per-logger sections (`[logger_root]`).
pub const LOGGER_SECTION_PREFIX: &str = "logger_";

/// Prefix of per-handler sections (`[handler_console]`).
pub const HANDLER_SECTION_PREFIX: &str = "handler_";

/// Prefix of per-formatter sections (`[formatter_generic]`).
pub const FORMATTER_SECTION_PREFIX: &str = "formatter_";

/// Name of the mandatory root logger.
pub const ROOT_LOGGER: &str = "root";

/// Logging keys that are never interpolated (they carry `%(...)s` records).
pub const RAW_LOGGING_KEYS: &[&str] = &["format", "datefmt"];

/// Format used when a handler names no formatter.
pub const DEFAULT_LOG_FORMAT: &str = "%(message)s";

/// Format of the bootstrap logging layer installed before any configuration.
pub const BOOTSTRAP_LOG_FORMAT: &str = "%(asctime)s %(levelname)-5.5s [%(name)s] %(message)s";
