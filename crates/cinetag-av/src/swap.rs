//! In-place replacement of an original file by its processed copy.

use crate::{Error, Result};
use cinetag_common::paths::backup_path;
use std::path::{Path, PathBuf};

/// Replace `original` with `processed`, keeping the original as
/// `<original>.bak`.
///
/// Two renames: original to backup, then processed to original. If the
/// first rename fails the original is untouched and `processed` is removed.
/// If the second fails, [`Error::SwapIncomplete`] names both files left on
/// disk. Returns the backup path on success.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use cinetag_av::swap_in;
///
/// let backup = swap_in(Path::new("/m/Movie.mkv"), Path::new("/m/Movie_processed.mkv"))?;
/// assert_eq!(backup, Path::new("/m/Movie.mkv.bak"));
/// # Ok::<(), cinetag_av::Error>(())
/// ```
pub fn swap_in(original: &Path, processed: &Path) -> Result<PathBuf> {
    if !processed.exists() {
        return Err(Error::file_not_found(processed));
    }

    let backup = backup_path(original);

    if let Err(e) = std::fs::rename(original, &backup) {
        let _ = std::fs::remove_file(processed);
        return Err(Error::Io(e));
    }

    if let Err(e) = std::fs::rename(processed, original) {
        #[cfg(feature = "tracing")]
        tracing::error!(
            backup = %backup.display(),
            processed = %processed.display(),
            error = %e,
            "Failed to move processed file into place"
        );
        let _ = e;
        return Err(Error::SwapIncomplete {
            backup,
            processed: processed.to_path_buf(),
        });
    }

    Ok(backup)
}
