pub mod config;
pub mod logger;
pub mod setmeta_toml;

pub use config::*;
pub use logger::{Colors, setup_logging};
pub use setmeta_toml::{apply_file_to_opts, load_setmeta_toml};
