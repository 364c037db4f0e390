//! Config path resolution
//!
//! Every plugin gets its own directory under `<base>/plugins/`.

use std::path::{Path, PathBuf};

/// Directory holding a plugin's files.
///
/// Path: `<base>/plugins/{plugin_name}/`
pub fn plugin_config_dir(base: &Path, plugin_name: &str) -> PathBuf {
    base.join("plugins").join(plugin_name)
}

/// Path of a plugin's message catalog.
///
/// Path: `<base>/plugins/{plugin_name}/acf-messages.toml`
pub fn messages_path(base: &Path, plugin_name: &str) -> PathBuf {
    plugin_config_dir(base, plugin_name).join("acf-messages.toml")
}

/// Path of a plugin's manager settings.
///
/// Path: `<base>/plugins/{plugin_name}/acf.toml`
pub fn manager_config_path(base: &Path, plugin_name: &str) -> PathBuf {
    plugin_config_dir(base, plugin_name).join("acf.toml")
}
