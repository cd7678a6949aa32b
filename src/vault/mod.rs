pub mod render;

pub use render::render_document;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Name of the note written into the vault.
pub const ISSUES_FILE_NAME: &str = "GitHub_Issues.md";

/// Mode for a freshly created note (unix only).
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Failed to access issues file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace issues file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or replaced.
    Written(PathBuf),
    /// Existing content matched after trimming; nothing was touched.
    Unchanged(PathBuf),
}

pub fn issues_file(vault: &Path) -> PathBuf {
    vault.join(ISSUES_FILE_NAME)
}

/// Write `content` to the issues file unless it already holds the same
/// text, ignoring leading and trailing whitespace.
///
/// New content goes to a temp file next to the note and is renamed over
/// it, so readers never observe a partial note. An existing note keeps its
/// permissions and, if it is a symlink, the link itself.
#[instrument(skip(vault, content), fields(vault = %vault.display(), bytes = content.len()))]
pub fn write_if_changed(vault: &Path, content: &str) -> Result<WriteOutcome, VaultError> {
    let path = issues_file(vault);

    let existing = match fs::read(&path) {
        Ok(existing) => {
            if std::str::from_utf8(&existing).map(str::trim) == Ok(content.trim()) {
                debug!(path = %path.display(), "content unchanged");
                return Ok(WriteOutcome::Unchanged(path));
            }
            debug!(path = %path.display(), "content changed");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "issues file does not exist yet");
            false
        }
        Err(e) => return Err(e.into()),
    };

    // A symlinked note is replaced at its destination so the link survives.
    let target = if existing {
        fs::canonicalize(&path)?
    } else {
        path.clone()
    };
    let dir = target.parent().unwrap_or(vault);

    let mut tmp = tempfile::Builder::new()
        .prefix(".GitHub_Issues.")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    if existing {
        tmp.as_file().set_permissions(fs::metadata(&target)?.permissions())?;
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file().set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))?;
        }
    }
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target)?;

    Ok(WriteOutcome::Written(path))
}
