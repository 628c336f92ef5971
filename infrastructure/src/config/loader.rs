//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_FILES: [&str; 2] = ["ragloop.toml", ".ragloop.toml"];
const ENV_PREFIX: &str = "RAGLOOP_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `RAGLOOP_<SECTION>__<KEY>` (e.g. `RAGLOOP_RETRIEVER__URL`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ragloop.toml` or `./.ragloop.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/ragloop/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load a single file over the defaults, ignoring discovered files and
    /// the environment (for `--no-config --config <PATH>`)
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/ragloop/config.toml if set,
    /// otherwise falls back to ~/.config/ragloop/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ragloop").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>, discover: bool) {
        for line in Self::describe_config_sources(explicit, discover) {
            println!("{}", line);
        }
    }

    /// One line per configuration source, highest priority first.
    ///
    /// With `discover` off only the explicit file (if any) is read over the
    /// defaults.
    pub fn describe_config_sources(explicit: Option<&PathBuf>, discover: bool) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        if discover {
            lines.push(format!("  [ENV  ] Environment: {}*", ENV_PREFIX));
        }

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            lines.push(format!("  [{}] Explicit: {}", mark, path.display()));
        }

        if !discover {
            lines.push("  [     ] Default: built-in defaults only (--no-config)".to_string());
            return lines;
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./ragloop.toml or ./.ragloop.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}
