//! Workspace scanner.
//!
//! Walks the tree synchronously (callers run it on the blocking pool) and
//! reports line-level issues. Only `trailing-whitespace` and
//! `missing-final-newline` are fixable.

use std::io::Read;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::workspace::{Workspace, WorkspaceError};

pub const MAX_FILE_BYTES: u64 = 1024 * 1024;
pub const MAX_LINE_CHARS: usize = 120;
pub const MAX_FILES: usize = 10_000;

lazy_static! {
    /// Quoted literal assigned to a credential-looking name.
    static ref SECRET_ASSIGNMENT: Regex = Regex::new(
        r#"(?i)\b(password|passwd|secret|api[_-]?key|access[_-]?token|token)\b\s*[:=]\s*["'][^"'\s]{4,}["']"#
    )
    .unwrap();
    static ref TODO_MARKER: Regex = Regex::new(r"\b(TODO|FIXME|XXX)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    TrailingWhitespace,
    MissingFinalNewline,
    LongLine,
    TodoMarker,
    HardcodedSecret,
    #[serde(other)]
    Unknown,
}

impl IssueKind {
    pub fn is_fixable(self) -> bool {
        matches!(self, Self::TrailingWhitespace | Self::MissingFinalNewline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub file: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub fixable: bool,
    #[serde(default)]
    pub message: String,
}

impl Issue {
    fn new(kind: IssueKind, file: &str, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.to_string(),
            line,
            fixable: kind.is_fixable(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub max_file_bytes: u64,
    pub max_line_chars: usize,
    pub max_files: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_line_chars: MAX_LINE_CHARS,
            max_files: MAX_FILES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub issues: Vec<Issue>,
    pub files_scanned: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Scan `ws`, optionally under `path`. Paths in issues are workspace-relative.
pub fn scan_workspace(
    ws: &Workspace,
    path: Option<&str>,
    opts: &ScanOptions,
) -> Result<ScanReport, WorkspaceError> {
    let requested = path.unwrap_or(".");
    let start = ws.resolve(requested)?;

    let mut files = Vec::new();
    let mut truncated = false;
    if start.is_file() {
        files.push(start);
    } else {
        collect_files(&start, opts.max_files, &mut files, &mut truncated)
            .map_err(|e| WorkspaceError::io(requested, e))?;
    }
    files.sort();

    let mut report = ScanReport {
        truncated,
        ..ScanReport::default()
    };
    for file in &files {
        let Some(text) = load_text(file, opts.max_file_bytes) else {
            continue;
        };
        let rel = ws.relative(file);
        report.issues.extend(scan_text(&rel, &text, opts));
        report.files_scanned += 1;
    }

    debug!(
        root = %ws.root().display(),
        files = report.files_scanned,
        issues = report.issues.len(),
        truncated = report.truncated,
        "scan complete"
    );
    Ok(report)
}

fn collect_files(
    dir: &Path,
    limit: usize,
    out: &mut Vec<PathBuf>,
    truncated: &mut bool,
) -> std::io::Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        // file_type does not follow symlinks; links are neither dirs nor files here.
        let ft = entry.file_type()?;
        if ft.is_dir() {
            if should_skip_dir(&name) {
                continue;
            }
            collect_files(&entry.path(), limit, out, truncated)?;
        } else if ft.is_file() {
            if out.len() >= limit {
                *truncated = true;
                return Ok(());
            }
            out.push(entry.path());
        }
        if *truncated {
            return Ok(());
        }
    }
    Ok(())
}

fn should_skip_dir(name: &str) -> bool {
    matches!(name, "target" | "node_modules" | "__pycache__")
}

/// `None` for oversize, unreadable or binary (NUL byte) files.
fn load_text(path: &Path, max_bytes: u64) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > max_bytes {
        debug!(file = %path.display(), size = meta.len(), "skipping large file");
        return None;
    }
    let mut bytes = Vec::with_capacity(meta.len() as usize);
    std::fs::File::open(path)
        .ok()?
        .take(max_bytes)
        .read_to_end(&mut bytes)
        .ok()?;
    if bytes.contains(&0) {
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Issues for one file's text. Line numbers are 1-based.
pub fn scan_text(file: &str, text: &str, opts: &ScanOptions) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut last_line = 0;

    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(raw);

        if line.ends_with([' ', '\t']) {
            issues.push(Issue::new(
                IssueKind::TrailingWhitespace,
                file,
                line_no,
                "Trailing whitespace",
            ));
        }
        let chars = line.chars().count();
        if chars > opts.max_line_chars {
            issues.push(Issue::new(
                IssueKind::LongLine,
                file,
                line_no,
                format!("Line has {} characters (max {})", chars, opts.max_line_chars),
            ));
        }
        if let Some(m) = TODO_MARKER.find(line) {
            issues.push(Issue::new(
                IssueKind::TodoMarker,
                file,
                line_no,
                format!("{} marker", m.as_str()),
            ));
        }
        if SECRET_ASSIGNMENT.is_match(line) {
            issues.push(Issue::new(
                IssueKind::HardcodedSecret,
                file,
                line_no,
                "Possible hardcoded secret",
            ));
        }
    }

    if !text.is_empty() && !text.ends_with('\n') {
        issues.push(Issue::new(
            IssueKind::MissingFinalNewline,
            file,
            last_line,
            "Missing final newline",
        ));
    }
    issues
}
