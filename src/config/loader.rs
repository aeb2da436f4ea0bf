//! Configuration loader - handles TOML config hierarchy

use super::{Config, CONFIG_FILE_NAME};
use crate::markdown::grid::{OverflowPolicy, TableBorder};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration with precedence:
    /// 1. CLI arguments (handled separately via with_overrides)
    /// 2. Environment variables
    /// 3. ./termdown.toml or ./.termdown.toml (project local)
    /// 4. ~/.config/termdown/config.toml (XDG config)
    /// 5. Defaults (hardcoded)
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Load in reverse precedence order (lowest first, higher overwrites)
        for path in [Self::find_xdg_config(), Self::find_local_config()]
            .into_iter()
            .flatten()
        {
            match Self::load_from_file(&path) {
                Ok(loaded) => config = Self::merge(config, loaded),
                Err(err) => tracing::warn!(path = %path.display(), "skipping config: {:#}", err),
            }
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load one explicit config file; unlike discovered files, errors are fatal
    pub fn load_explicit(path: &Path) -> Result<Self> {
        let config = Self::load_from_file(path)?;
        Ok(Self::apply_env_overrides(Self::merge(Config::default(), config)))
    }

    /// Find XDG config file
    /// On Linux: ~/.config/termdown/config.toml
    /// On macOS: ~/Library/Application Support/termdown/config.toml OR ~/.config/termdown/config.toml
    /// On Windows: C:\Users\<user>\AppData\Roaming\termdown\config.toml
    fn find_xdg_config() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("termdown").join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // On macOS, also check ~/.config/ for Unix compatibility
        #[cfg(target_os = "macos")]
        {
            if let Some(home) = dirs::home_dir() {
                let path = home.join(".config").join("termdown").join("config.toml");
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Find project local config
    fn find_local_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_in_dir(&cwd)
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }

        let path = dir.join(format!(".{}", CONFIG_FILE_NAME));
        if path.exists() {
            return Some(path);
        }

        None
    }

    /// Load config from a specific file
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Load config from a TOML string
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Merge two configs (overlay takes precedence).
    /// Sections are replaced whole, except that an unset width keeps the base width.
    fn merge(base: Config, overlay: Config) -> Config {
        Config {
            tokenizer: overlay.tokenizer,
            render: super::RenderConfig {
                width: overlay.render.width.or(base.render.width),
                color: overlay.render.color,
            },
            table: overlay.table,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: Config) -> Config {
        Self::apply_env(config, |key| std::env::var(key).ok())
    }

    fn apply_env(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(width) = var("TERMDOWN_WIDTH").and_then(|v| v.parse().ok()) {
            config.render.width = Some(width);
        }
        if let Some(color) = var("TERMDOWN_COLOR") {
            config.render.color = parse_bool(&color);
        }
        // https://no-color.org: presence alone disables colour
        if var("NO_COLOR").is_some() {
            config.render.color = false;
        }
        if let Some(overflow) = var("TERMDOWN_TABLE_OVERFLOW") {
            match overflow.parse::<OverflowPolicy>() {
                Ok(overflow) => config.table.overflow = overflow,
                Err(err) => tracing::warn!("ignoring TERMDOWN_TABLE_OVERFLOW: {}", err),
            }
        }
        if let Some(border) = var("TERMDOWN_TABLE_BORDER") {
            match border.parse::<TableBorder>() {
                Ok(border) => config.table.border = border,
                Err(err) => tracing::warn!("ignoring TERMDOWN_TABLE_BORDER: {}", err),
            }
        }

        config
    }
}

/// Parse boolean from string (true/false/1/0/yes/no)
fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tokenizer.table);
        assert!(config.tokenizer.strikethrough);
        assert_eq!(config.render.width, None);
        assert!(config.render.color);
        assert_eq!(config.table.overflow, OverflowPolicy::Clip);
        assert_eq!(config.table.border, TableBorder::Rounded);
        assert!(config.table.bold_header);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[table]
overflow = "widen"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.table.overflow, OverflowPolicy::Widen);
        // Border should use default since not specified
        assert_eq!(config.table.border, TableBorder::Rounded);
        assert!(config.tokenizer.table);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[tokenizer]
table = false
strikethrough = false

[render]
width = 72
color = false

[table]
overflow = "clip"
border = "ascii"
bold_header = false
"#;
        let config = Config::from_toml(toml).unwrap();
        assert!(!config.tokenizer.table);
        assert!(!config.tokenizer.strikethrough);
        assert_eq!(config.render.width, Some(72));
        assert!(!config.render.color);
        assert_eq!(config.table.border, TableBorder::Ascii);
        assert!(!config.table.bold_header);
    }

    #[test]
    fn test_template_parses() {
        let config = Config::from_toml(super::super::DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        assert!(Config::from_toml("[table]\noverflow = \"stretch\"\n").is_err());
    }

    #[test]
    fn test_merge_keeps_base_width() {
        let base = Config::from_toml("[render]\nwidth = 90\n").unwrap();
        let overlay = Config::from_toml("[table]\nborder = \"sharp\"\n").unwrap();
        let merged = Config::merge(base, overlay);
        assert_eq!(merged.render.width, Some(90));
        assert_eq!(merged.table.border, TableBorder::Sharp);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::apply_env(
            Config::default(),
            env(&[
                ("TERMDOWN_WIDTH", "66"),
                ("TERMDOWN_TABLE_OVERFLOW", "widen"),
                ("TERMDOWN_TABLE_BORDER", "bogus"),
            ]),
        );
        assert_eq!(config.render.width, Some(66));
        assert_eq!(config.table.overflow, OverflowPolicy::Widen);
        assert_eq!(config.table.border, TableBorder::Rounded);
    }

    #[test]
    fn test_no_color_env() {
        let config = Config::apply_env(Config::default(), env(&[("NO_COLOR", "1")]));
        assert!(!config.render.color);

        let config = Config::apply_env(Config::default(), env(&[("NO_COLOR", "")]));
        assert!(!config.render.color);

        let config = Config::apply_env(Config::default(), env(&[("TERMDOWN_COLOR", "off")]));
        assert!(!config.render.color);
    }

    #[test]
    fn test_local_config_lookup() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::find_in_dir(dir.path()).is_none());

        let hidden = dir.path().join(".termdown.toml");
        std::fs::write(&hidden, "[render]\nwidth = 10\n").unwrap();
        assert_eq!(Config::find_in_dir(dir.path()), Some(hidden));

        let visible = dir.path().join("termdown.toml");
        std::fs::write(&visible, "").unwrap();
        assert_eq!(Config::find_in_dir(dir.path()), Some(visible));
    }

    #[test]
    fn test_load_explicit_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load_explicit(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config"));
    }
}
