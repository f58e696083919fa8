mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations tried, in order, when no `--config` is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["./cinetag.toml", "~/.config/cinetag/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    finalize(read_config(path)?)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    finalize(read_config_or_default(custom_path)?)
}

/// Parse a TOML file without applying overrides or validating.
pub fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// [`read_config`] on `custom_path`, the first default location that
/// exists, or the defaults.
pub fn read_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return read_config(path);
    }

    match find_config_file() {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

/// First existing file among [`DEFAULT_CONFIG_PATHS`].
pub fn find_config_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.is_file())
}

/// Apply environment overrides, then validate.
pub fn finalize(mut config: Config) -> Result<Config> {
    apply_env_overrides(&mut config);
    validate_config(&mut config)?;
    Ok(config)
}

/// Override secrets from `TMDB_API_KEY` and `OPENSUBTITLES_*`.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Same as [`apply_env_overrides`] with an explicit variable lookup. Empty
/// values are ignored.
pub fn apply_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = get("TMDB_API_KEY") {
        config.tmdb.api_key = key;
    }
    if let Some(key) = get("OPENSUBTITLES_API_KEY") {
        config.subtitles.api_key = Some(key);
    }
    if let Some(user) = get("OPENSUBTITLES_USERNAME") {
        config.subtitles.username = Some(user);
    }
    if let Some(password) = get("OPENSUBTITLES_PASSWORD") {
        config.subtitles.password = Some(password);
    }
}

/// Validate configuration
///
/// Subtitles without complete credentials are turned off here, with a
/// warning.
pub fn validate_config(config: &mut Config) -> Result<()> {
    if config.tmdb.primary_language.trim().is_empty() {
        anyhow::bail!("tmdb.primary_language cannot be empty");
    }
    if config.tmdb.fallback_language.trim().is_empty() {
        anyhow::bail!("tmdb.fallback_language cannot be empty");
    }
    if config.tmdb.primary_language == config.tmdb.fallback_language {
        tracing::warn!(
            "Primary and fallback languages are both {}, no fallback search will happen",
            config.tmdb.primary_language
        );
    }

    if config.library.processed_marker.is_empty() {
        anyhow::bail!("library.processed_marker cannot be empty");
    }

    if config.subtitles.enabled {
        if config.subtitles.language.trim().is_empty() {
            anyhow::bail!("subtitles.language cannot be empty");
        }
        if config.subtitles.credentials().is_none() {
            tracing::warn!(
                "Subtitles enabled but OpenSubtitles api_key/username/password are incomplete, disabling subtitles"
            );
            config.subtitles.enabled = false;
        }
    }

    for (name, path) in [
        ("ffmpeg_path", &config.tools.ffmpeg_path),
        ("ffprobe_path", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("tools.{} does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

/// The TMDB key, required to organize a library.
pub fn require_tmdb_key(config: &Config) -> Result<&str> {
    let key = config.tmdb.api_key.trim();
    if key.is_empty() {
        anyhow::bail!("No TMDB API key: set tmdb.api_key in the config file or TMDB_API_KEY");
    }
    Ok(key)
}
