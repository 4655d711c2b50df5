//! Load `.setmeta.toml` from a directory (CLI only). Lib callers pass `SetMetaOpts` directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct SetmetaToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    store: Option<String>,
    routines: Option<usize>,
    retry_times: Option<usize>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir` if present. Returns None if missing or unreadable; a file
/// that does not parse is reported and ignored.
pub fn load_setmeta_toml(dir: &Path) -> Option<SetmetaToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_setmeta_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_setmeta_toml(s: &str) -> Result<SetmetaToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &SetmetaToml, opts: &mut Opts) {
    let section = &file.settings;
    if let Some(ref p) = section.store {
        opts.store_path = PathBuf::from(p);
    }
    apply_file_opt!(section, opts, routines);
    apply_file_opt!(section, opts, retry_times);
    apply_file_opt!(section, opts, verbose);
}
