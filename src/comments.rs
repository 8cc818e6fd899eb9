use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::state::CommentQueue;

const HANDOFF_DIR: &str = ".differ";
const HANDOFF_FILE: &str = "comments.json";

pub fn comments_path(repo_path: &Path) -> PathBuf {
    repo_path.join(HANDOFF_DIR).join(HANDOFF_FILE)
}

/// Ensure `.differ/` is listed in `.gitignore`.
fn ensure_gitignore(repo_path: &Path) -> Result<()> {
    let gitignore_path = repo_path.join(".gitignore");
    let entry = format!("{HANDOFF_DIR}/");

    match fs::read_to_string(&gitignore_path) {
        Ok(contents) => {
            if contents.lines().any(|line| line.trim() == entry) {
                return Ok(());
            }
            let mut f = fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)
                .with_context(|| format!("Failed to open {}", gitignore_path.display()))?;
            if !contents.is_empty() && !contents.ends_with('\n') {
                writeln!(f)?;
            }
            writeln!(f, "{entry}")?;
        }
        Err(_) => {
            fs::write(&gitignore_path, format!("{entry}\n"))
                .with_context(|| format!("Failed to create {}", gitignore_path.display()))?;
        }
    }
    Ok(())
}

/// Write every pending comment to `<repo>/.differ/comments.json`, then drain
/// the queue. On failure the queue is left untouched.
///
/// Returns the written path, or `None` when the queue was empty. An existing
/// file is replaced.
pub fn write_comments(repo_path: &Path, queue: &mut CommentQueue) -> Result<Option<PathBuf>> {
    if queue.is_empty() {
        return Ok(None);
    }

    let path = comments_path(repo_path);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if let Err(e) = ensure_gitignore(repo_path) {
        warn!("could not update .gitignore: {e:#}");
    }

    let pending: Vec<_> = queue.iter().collect();
    let json = serde_json::to_string_pretty(&pending).context("Failed to serialize comments")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    let count = std::iter::from_fn(|| queue.dequeue()).count();
    debug!(count, path = %path.display(), "wrote review comments");
    Ok(Some(path))
}
