pub mod loader;
pub mod schema;

pub use {
    loader::{clear_config_dir, config_dir, discover_and_load, home_dir, load_config, set_config_dir},
    schema::{AccountsConfig, GemboxConfig, OauthProviderOverride},
};
