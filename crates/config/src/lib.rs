//! Chained INI configuration for CKAN.
//!
//! A root file may delegate to a base file with `use = config:base.ini`,
//! which may delegate further. Each file is interpolated on its own
//! (`%(here)s` is always the defining file's directory, unresolved names fall
//! back to `CKAN_`-prefixed environment variables) and the results are
//! merged with nearer files winning. Logging sections found in the chain
//! replace the process-wide `tracing` setup.
//!
//! ```no_run
//! let config = ckan_config::load_config("/etc/ckan/default/ckan.ini")?;
//! let site_url = config.require("ckan.site_url")?;
//! # let _ = site_url;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constants;
pub mod ini;
mod loader;
pub mod logging;
pub mod paths;
pub mod types;

pub use loader::{
    Chain, ChainMerger, ChainResolver, ConfigError, ConfigFile, ConfigLoader, ConfigurationError,
    Directive, EnvironmentView, FileInterpolator, LoggingSections, MergedChain,
    ResolvedFileMapping, env_var_or_none, is_logging_section, load_config, load_dotenv, merge,
    parse_directive,
};
pub use logging::{LoggingBackend, LoggingError, LoggingReconfigurator, LoggingSpec, TracingBackend};
pub use types::{LookupError, MergedConfig};
