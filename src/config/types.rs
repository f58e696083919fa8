use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metadata::providers::{TMDB_BASE_URL, TMDB_IMAGE_BASE};
use crate::metadata::{DEFAULT_FALLBACK_LANGUAGE, DEFAULT_PRIMARY_LANGUAGE};
use crate::pipeline::{DEFAULT_EMBEDDED_LANGUAGE, DEFAULT_SKIP_AUDIO_LANGUAGE};
use crate::subtitles::{Credentials, DEFAULT_SUBTITLE_LANGUAGE, OPENSUBTITLES_BASE_URL};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub subtitles: SubtitlesConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// v3 API key (overridden by `TMDB_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_primary_language")]
    pub primary_language: String,

    /// Searched only when the primary language returns nothing
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

fn default_primary_language() -> String {
    DEFAULT_PRIMARY_LANGUAGE.to_string()
}
fn default_fallback_language() -> String {
    DEFAULT_FALLBACK_LANGUAGE.to_string()
}
fn default_tmdb_base_url() -> String {
    TMDB_BASE_URL.to_string()
}
fn default_image_base_url() -> String {
    TMDB_IMAGE_BASE.to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            primary_language: default_primary_language(),
            fallback_language: default_fallback_language(),
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubtitlesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language searched for and used in the sidecar name
    #[serde(default = "default_subtitle_language")]
    pub language: String,

    /// First audio stream in this language means no subtitle is needed
    #[serde(default = "default_skip_audio_language")]
    pub skip_audio_language: String,

    /// Embedded subtitle stream in this language means no download
    #[serde(default = "default_embedded_language")]
    pub embedded_language: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_opensubtitles_base_url")]
    pub base_url: String,
}

fn default_true() -> bool {
    true
}
fn default_subtitle_language() -> String {
    DEFAULT_SUBTITLE_LANGUAGE.to_string()
}
fn default_skip_audio_language() -> String {
    DEFAULT_SKIP_AUDIO_LANGUAGE.to_string()
}
fn default_embedded_language() -> String {
    DEFAULT_EMBEDDED_LANGUAGE.to_string()
}
fn default_opensubtitles_base_url() -> String {
    OPENSUBTITLES_BASE_URL.to_string()
}

impl Default for SubtitlesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_subtitle_language(),
            skip_audio_language: default_skip_audio_language(),
            embedded_language: default_embedded_language(),
            api_key: None,
            username: None,
            password: None,
            base_url: default_opensubtitles_base_url(),
        }
    }
}

impl SubtitlesConfig {
    /// Login credentials, when all three are set and non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(String::from);
        Some(Credentials {
            api_key: present(&self.api_key)?,
            username: present(&self.username)?,
            password: present(&self.password)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Inserted before the extension of remux output; files carrying it are
    /// never picked up again
    #[serde(default = "default_processed_marker")]
    pub processed_marker: String,

    /// Run log, appended to
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_processed_marker() -> String {
    cinetag_common::paths::DEFAULT_PROCESSED_MARKER.to_string()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("cinetag.log")
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            processed_marker: default_processed_marker(),
            log_file: default_log_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
