mod lines;

pub use lines::{DiffLine, Hunk, Tag};

use crate::changeset::{ChangeKind, StagedEntry, StagedSource};
use crate::constants::{
    DEFAULT_CONTEXT, EXCLUDED_EXTENSIONS, EXCLUDED_SUFFIXES, MAX_ADDED_FILE_PREVIEW,
    MAX_FILE_DIFF_SIZE,
};
use crate::error::Error;
use lines::{diff_lines, split_lines};
use std::fmt;
use std::path::Path;

/// size limits applied while rendering
#[derive(Debug, Clone, Copy)]
pub struct DiffLimits {
    /// cap for a modified file's rendered patch, in characters
    pub max_file_diff_size: usize,
    /// cap for the content shown of an added file, in characters
    pub added_preview_limit: usize,
    /// unchanged lines shown around each change
    pub context_lines: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_file_diff_size: MAX_FILE_DIFF_SIZE,
            added_preview_limit: MAX_ADDED_FILE_PREVIEW,
            context_lines: DEFAULT_CONTEXT,
        }
    }
}

/// rendered patch for one staged entry
#[derive(Debug, Clone)]
pub struct PatchFragment {
    pub path: String,
    pub kind: ChangeKind,
    pub hunks: Vec<Hunk>,
    /// full text as it goes into the document, after any truncation
    pub text: String,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub enum FileDiff {
    Patch(PatchFragment),
    Excluded { path: String },
}

impl FileDiff {
    pub fn path(&self) -> &str {
        match self {
            FileDiff::Patch(fragment) => &fragment.path,
            FileDiff::Excluded { path } => path,
        }
    }
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileDiff::Patch(fragment) => f.write_str(&fragment.text),
            FileDiff::Excluded { path } => {
                writeln!(f, "Excluded file: {path} (binary or large data file)")
            }
        }
    }
}

/// every staged change of a run, in enumeration order
#[derive(Debug, Clone, Default)]
pub struct DiffDocument {
    pub files: Vec<FileDiff>,
}

impl DiffDocument {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DiffDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(f, "{file}")?;
        }
        Ok(())
    }
}

/// build the diff document for everything staged in `source`
pub fn build_diff(source: &impl StagedSource, limits: &DiffLimits) -> Result<DiffDocument, Error> {
    let mut files = Vec::new();
    for entry in source.staged_entries()? {
        if let Some(file) = diff_entry(source, &entry, limits)? {
            files.push(file);
        }
    }
    Ok(DiffDocument { files })
}

/// render a single entry; `None` when a modification turns out to be a no-op
fn diff_entry(
    source: &impl StagedSource,
    entry: &StagedEntry,
    limits: &DiffLimits,
) -> Result<Option<FileDiff>, Error> {
    let path = entry.path.as_str();
    if has_excluded_name(path) {
        return Ok(Some(excluded(path)));
    }

    // sniff the content that would be rendered; deleted files only exist in HEAD
    let content = match entry.kind {
        ChangeKind::Deleted => source.committed_content(path)?,
        ChangeKind::Added | ChangeKind::Modified => match source.working_content(path) {
            Ok(content) => content,
            // unreadable is treated as binary
            Err(_) => return Ok(Some(excluded(path))),
        },
    };
    if looks_binary(&content) {
        return Ok(Some(excluded(path)));
    }
    let content = String::from_utf8_lossy(&content);

    let fragment = match entry.kind {
        ChangeKind::Added => added_patch(path, &content, limits.added_preview_limit),
        ChangeKind::Deleted => deleted_patch(path, &content),
        ChangeKind::Modified => {
            let old = source.committed_content(path)?;
            let old = String::from_utf8_lossy(&old);
            match modified_patch(path, &old, &content, limits) {
                Some(fragment) => fragment,
                None => return Ok(None),
            }
        }
    };

    Ok(Some(FileDiff::Patch(fragment)))
}

fn excluded(path: &str) -> FileDiff {
    FileDiff::Excluded {
        path: path.to_string(),
    }
}

/// denylisted extension or lock-file name
pub fn has_excluded_name(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    if EXCLUDED_SUFFIXES
        .iter()
        .any(|suffix| path_lower.ends_with(suffix))
    {
        return true;
    }

    Path::new(&path_lower)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext))
}

/// null bytes are a reliable enough sign of binary content
pub fn looks_binary(content: &[u8]) -> bool {
    content.contains(&0)
}

fn added_patch(path: &str, content: &str, preview_limit: usize) -> PatchFragment {
    let header = vec![
        format!("diff --git a/{path} b/{path}"),
        "new file mode 100644".to_string(),
        "--- /dev/null".to_string(),
        format!("+++ b/{path}"),
    ];

    let total_chars = content.chars().count();
    let total_lines = split_lines(content).len();
    let preview = total_chars > preview_limit;

    let shown: String = if preview {
        content.chars().take(preview_limit).collect()
    } else {
        content.to_string()
    };

    // a preview always gets its hunk header, even when it shows no lines
    let mut hunks = Vec::new();
    if preview || !shown.is_empty() {
        hunks.push(Hunk {
            old_start: 0,
            old_len: 0,
            new_start: 1,
            new_len: total_lines,
            lines: split_lines(&shown)
                .into_iter()
                .map(|line| DiffLine {
                    tag: Tag::Added,
                    text: line.to_string(),
                })
                .collect(),
            preview,
        });
    }

    let mut text = render(&header, &hunks);
    if preview {
        text.push_str(&format!(
            "\n... (file truncated, total {total_chars} characters) ...\n"
        ));
    }

    PatchFragment {
        path: path.to_string(),
        kind: ChangeKind::Added,
        hunks,
        text,
        truncated: preview,
    }
}

fn deleted_patch(path: &str, content: &str) -> PatchFragment {
    let header = vec![
        format!("diff --git a/{path} b/{path}"),
        "deleted file mode 100644".to_string(),
        format!("--- a/{path}"),
        "+++ /dev/null".to_string(),
    ];

    let lines = split_lines(content);
    let mut hunks = Vec::new();
    if !lines.is_empty() {
        hunks.push(Hunk {
            old_start: 1,
            old_len: lines.len(),
            new_start: 0,
            new_len: 0,
            lines: lines
                .into_iter()
                .map(|line| DiffLine {
                    tag: Tag::Removed,
                    text: line.to_string(),
                })
                .collect(),
            preview: false,
        });
    }

    let text = render(&header, &hunks);
    PatchFragment {
        path: path.to_string(),
        kind: ChangeKind::Deleted,
        hunks,
        text,
        truncated: false,
    }
}

fn modified_patch(path: &str, old: &str, new: &str, limits: &DiffLimits) -> Option<PatchFragment> {
    let hunks = diff_lines(&split_lines(old), &split_lines(new), limits.context_lines);
    if hunks.is_empty() {
        return None;
    }

    let header = vec![
        format!("diff --git a/{path} b/{path}"),
        format!("--- a/{path}"),
        format!("+++ b/{path}"),
    ];

    let mut text = render(&header, &hunks);
    let total_chars = text.chars().count();
    let truncated = total_chars > limits.max_file_diff_size;
    if truncated {
        text = truncate_patch(&text, header.len(), limits.max_file_diff_size);
        text.push_str(&format!(
            "\n... (truncated, total {total_chars} characters) ...\n"
        ));
    }

    Some(PatchFragment {
        path: path.to_string(),
        kind: ChangeKind::Modified,
        hunks,
        text,
        truncated,
    })
}

fn render(header: &[String], hunks: &[Hunk]) -> String {
    let mut out = String::new();
    for line in header {
        out.push_str(line);
        out.push('\n');
    }
    for hunk in hunks {
        hunk.render(&mut out);
    }
    out
}

/// cut a rendered patch down to roughly `max_size` characters
///
/// header lines and hunk headers are always kept; other lines are kept in
/// order until the first one that no longer fits, and nothing after it is
fn truncate_patch(patch: &str, header_lines: usize, max_size: usize) -> String {
    let mut out = String::new();
    let mut size = 0;

    for (idx, line) in patch.split_inclusive('\n').enumerate() {
        let len = line.chars().count();
        if idx < header_lines || line.starts_with("@@") {
            out.push_str(line);
            size += len;
            continue;
        }
        if size + len > max_size {
            break;
        }
        out.push_str(line);
        size += len;
    }

    out
}
