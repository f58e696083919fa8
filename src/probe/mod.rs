// Re-export probe functionality from cinetag-av
pub use cinetag_av::probe::*;
pub use cinetag_av::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};

use std::path::Path;

/// Stream-language questions the pipeline asks before tagging a file.
///
/// Implementations block; the pipeline calls them from a blocking task.
pub trait Inspector: Send + Sync {
    /// Language tag of the first audio stream.
    fn audio_language(&self, path: &Path) -> Option<String>;

    /// Whether a subtitle stream tagged `language` is embedded.
    fn has_embedded_subtitle(&self, path: &Path, language: &str) -> bool;
}

impl Inspector for Ffprobe {
    fn audio_language(&self, path: &Path) -> Option<String> {
        Ffprobe::audio_language(self, path)
    }

    fn has_embedded_subtitle(&self, path: &Path, language: &str) -> bool {
        Ffprobe::has_embedded_subtitle(self, path, language)
    }
}
