pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_from_str, load_effective_config, validate_config, API_BASE_URL_ENV,
    CONFIG_PATH_ENV,
};
pub use schema::{ClientConfig, PollingConfig, ProgressConfig};
