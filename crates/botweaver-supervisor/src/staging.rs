//! Per-run staging directories.

use std::io;
use std::path::{Path, PathBuf};

use botweaver_codegen::ProjectArtifact;
use tracing::{debug, warn};
use uuid::Uuid;

/// Fresh directory path under `root` for one run of `slug`.
pub(crate) fn run_dir(root: &Path, slug: &str) -> PathBuf {
    let safe: String = slug
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    root.join(format!("running-{safe}-{}", Uuid::now_v7().simple()))
}

/// Write every file of `artifact` into `dir`, creating it.
pub(crate) async fn write_project(dir: &Path, artifact: &ProjectArtifact) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    for (rel, contents) in &artifact.files {
        let path = dir.join(rel);
        tokio::fs::write(&path, contents).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = artifact.file_mode(rel);
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).await?;
        }
    }
    debug!(dir = %dir.display(), files = artifact.files.len(), "Staged project");
    Ok(())
}

/// Remove a staging directory; failures are logged and swallowed.
pub(crate) async fn remove(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!(dir = %dir.display(), "Removed staging directory"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to remove staging directory"),
    }
}
