//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    store_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                store_filename: format!(".{pkg}.db"),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Default local object store file.
    pub fn store_filename(&self) -> &str {
        &self.store_filename
    }

    /// Optional settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Pipeline ----

/// Batch pipeline defaults and queue sizes.
pub struct PipelineConsts;

impl PipelineConsts {
    /// Workers in recursive mode when neither the settings file nor `--routines` says otherwise.
    pub const DEFAULT_ROUTINES: usize = 5;
    /// Write attempts per object.
    pub const DEFAULT_RETRY_TIMES: usize = 10;
    /// Work queue capacity; the producer blocks when this many keys are waiting.
    pub const WORK_QUEUE_CAP: usize = 1000;
    /// Keys fetched per listing query by the local store.
    pub const LIST_PAGE_SIZE: usize = 1000;
}
