//! `/api/file` actions: `list` and `read`, both confined to a workspace.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workspace::{Workspace, WorkspaceError};

#[derive(Debug, Clone, Deserialize)]
pub struct FileRequest {
    pub action: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
}

fn default_path() -> String {
    ".".to_string()
}

impl FileRequest {
    /// `path` joined with `filename` when one is given.
    pub fn target(&self) -> String {
        match self.filename.as_deref().filter(|f| !f.is_empty()) {
            Some(name) => PathBuf::from(&self.path)
                .join(name)
                .to_string_lossy()
                .into_owned(),
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: String,
    pub items: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub size: u64,
}

fn rfc3339(t: SystemTime) -> String {
    DateTime::<Utc>::from(t).to_rfc3339()
}

/// Directory entries, hidden names dropped, directories first then by name.
pub async fn list(ws: &Workspace, requested: &str) -> Result<Listing, WorkspaceError> {
    let dir = ws.resolve(requested)?;
    let meta = tokio::fs::metadata(&dir)
        .await
        .map_err(|e| WorkspaceError::io(requested, e))?;
    if !meta.is_dir() {
        return Err(WorkspaceError::NotADirectory {
            requested: requested.to_string(),
        });
    }

    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| WorkspaceError::io(requested, e))?;

    let mut items = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| WorkspaceError::io(requested, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // Follow links so list and read agree; a dangling link keeps its own metadata.
        let meta = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta,
            Err(_) => match entry.metadata().await {
                Ok(meta) => meta,
                Err(_) => continue,
            },
        };
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        items.push(FileEntry {
            name,
            kind,
            size: if kind == EntryKind::Directory { 0 } else { meta.len() },
            modified: meta.modified().ok().map(rfc3339),
        });
    }

    items.sort_by(|a, b| {
        (a.kind != EntryKind::Directory, &a.name).cmp(&(b.kind != EntryKind::Directory, &b.name))
    });

    Ok(Listing {
        path: ws.relative(&dir),
        items,
    })
}

/// File text with invalid UTF-8 replaced. Directories and oversize files are refused.
pub async fn read(
    ws: &Workspace,
    requested: &str,
    max_bytes: u64,
) -> Result<FileContent, WorkspaceError> {
    let path = ws.resolve(requested)?;
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| WorkspaceError::io(requested, e))?;
    if meta.is_dir() {
        return Err(WorkspaceError::IsADirectory {
            requested: requested.to_string(),
        });
    }
    if meta.len() > max_bytes {
        return Err(WorkspaceError::TooLarge {
            requested: requested.to_string(),
            size: meta.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| WorkspaceError::io(requested, e))?;
    Ok(FileContent {
        path: ws.relative(&path),
        size: bytes.len() as u64,
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Workspace) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join(".hidden"), "h").unwrap();
        std::fs::create_dir(dir.path().join("zdir")).unwrap();
        std::fs::write(dir.path().join("bin.dat"), [0x66, 0xff, 0x6f]).unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        (dir, ws)
    }

    #[tokio::test]
    async fn list_filters_hidden_and_sorts_dirs_first() {
        let (_dir, ws) = setup();
        let listing = list(&ws, ".").await.unwrap();
        let names: Vec<&str> = listing.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["zdir", "a.txt", "bin.dat"]);
        assert_eq!(listing.items[0].kind, EntryKind::Directory);
        assert_eq!(listing.items[1].size, 5);
        assert!(listing.items[1].modified.is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn linked_directory_lists_as_directory() {
        let (dir, ws) = setup();
        std::os::unix::fs::symlink(dir.path().join("zdir"), dir.path().join("alias")).unwrap();

        let listing = list(&ws, ".").await.unwrap();
        let alias = listing.items.iter().find(|i| i.name == "alias").unwrap();
        assert_eq!(alias.kind, EntryKind::Directory);
        assert!(matches!(
            read(&ws, "alias", 1024).await,
            Err(WorkspaceError::IsADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn list_of_file_is_rejected() {
        let (_dir, ws) = setup();
        assert!(matches!(
            list(&ws, "a.txt").await,
            Err(WorkspaceError::NotADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn read_replaces_invalid_utf8() {
        let (_dir, ws) = setup();
        let file = read(&ws, "bin.dat", 1024).await.unwrap();
        assert_eq!(file.content, "f\u{FFFD}o");
        assert_eq!(file.size, 3);
    }

    #[tokio::test]
    async fn read_rejects_directories_and_large_files() {
        let (_dir, ws) = setup();
        assert!(matches!(
            read(&ws, "zdir", 1024).await,
            Err(WorkspaceError::IsADirectory { .. })
        ));
        assert!(matches!(
            read(&ws, "a.txt", 2).await,
            Err(WorkspaceError::TooLarge { size: 5, .. })
        ));
    }

    #[test]
    fn target_joins_filename() {
        let req: FileRequest =
            serde_json::from_value(serde_json::json!({"action": "read", "path": "docs", "filename": "x.md"}))
                .unwrap();
        assert_eq!(req.target(), "docs/x.md");
        let req: FileRequest =
            serde_json::from_value(serde_json::json!({"action": "list"})).unwrap();
        assert_eq!(req.target(), ".");
    }
}
