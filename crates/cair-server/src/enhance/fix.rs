//! Applies fixable scan issues.
//!
//! Every target goes through the workspace guard before it is read. Each file
//! is rewritten through a temp file in its own directory and renamed into
//! place, so a reader sees either the old or the new content.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::scan::{Issue, IssueKind};
use super::workspace::{Workspace, WorkspaceError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixEntry {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FixEntry {
    fn new(issue: &Issue, reason: Option<String>) -> Self {
        Self {
            file: issue.file.clone(),
            kind: issue.kind,
            line: issue.line,
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FixReport {
    pub fixed: Vec<FixEntry>,
    pub rejected: Vec<FixEntry>,
    pub skipped: Vec<FixEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FixEntry>,
}

/// Apply `issues` under `ws`. Never writes outside the workspace.
pub fn apply_fixes(ws: &Workspace, issues: &[Issue]) -> FixReport {
    let mut report = FixReport::default();
    let mut by_file: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();

    for issue in issues {
        if issue.fixable && issue.kind.is_fixable() {
            by_file.entry(issue.file.as_str()).or_default().push(issue);
        } else {
            report
                .skipped
                .push(FixEntry::new(issue, Some("not fixable".to_string())));
        }
    }

    for (file, file_issues) in by_file {
        let path = match ws.resolve(file) {
            Ok(p) => p,
            Err(e @ WorkspaceError::PathEscape { .. }) => {
                let reason = e.to_string();
                report.rejected.extend(
                    file_issues
                        .iter()
                        .map(|i| FixEntry::new(i, Some(reason.clone()))),
                );
                continue;
            }
            Err(e) => {
                let reason = e.to_string();
                report.skipped.extend(
                    file_issues
                        .iter()
                        .map(|i| FixEntry::new(i, Some(reason.clone()))),
                );
                continue;
            }
        };

        if let Err(e) = fix_file(&path, &file_issues, &mut report) {
            warn!(file, error = %e, "fix failed");
            let reason = e.to_string();
            report.failed.extend(
                file_issues
                    .iter()
                    .map(|i| FixEntry::new(i, Some(reason.clone()))),
            );
        }
    }

    info!(
        fixed = report.fixed.len(),
        rejected = report.rejected.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "fix complete"
    );
    report
}

fn fix_file(path: &Path, issues: &[&Issue], report: &mut FixReport) -> std::io::Result<()> {
    if !path.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    let original = std::fs::read_to_string(path)?;
    let mut lines: Vec<String> = original.split_inclusive('\n').map(String::from).collect();

    let mut fixed = Vec::new();
    let mut skipped = Vec::new();
    let mut add_newline = false;

    for issue in issues {
        let applied = match issue.kind {
            IssueKind::TrailingWhitespace => issue
                .line
                .checked_sub(1)
                .and_then(|idx| lines.get_mut(idx))
                .is_some_and(strip_trailing),
            IssueKind::MissingFinalNewline => {
                let missing = !original.is_empty() && !original.ends_with('\n');
                add_newline |= missing;
                missing && !fixed.iter().any(|f: &&Issue| f.kind == issue.kind)
            }
            _ => false,
        };
        if applied {
            fixed.push(*issue);
        } else {
            skipped.push(*issue);
        }
    }

    let mut updated = lines.concat();
    if add_newline {
        updated.push('\n');
    }
    if updated != original {
        write_atomic(path, updated.as_bytes())?;
    }

    report.fixed.extend(fixed.into_iter().map(|i| FixEntry::new(i, None)));
    report.skipped.extend(
        skipped
            .into_iter()
            .map(|i| FixEntry::new(i, Some("already clean".to_string()))),
    );
    Ok(())
}

/// Strip trailing spaces and tabs, keeping any `\r\n` or `\n` terminator.
fn strip_trailing(line: &mut String) -> bool {
    let (body, ending) = match line.strip_suffix("\r\n") {
        Some(b) => (b, "\r\n"),
        None => match line.strip_suffix('\n') {
            Some(b) => (b, "\n"),
            None => (line.as_str(), ""),
        },
    };
    let trimmed = body.trim_end_matches([' ', '\t']);
    if trimmed.len() == body.len() {
        return false;
    }
    *line = format!("{}{}", trimmed, ending);
    true
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
