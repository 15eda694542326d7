use crate::error::Error;
use std::fmt;
use std::io;

/// kind of staged change; anything else git reports is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
        };
        write!(f, "{ch}")
    }
}

/// a single path with a pending staged change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub path: String,
    pub kind: ChangeKind,
}

impl StagedEntry {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// read-only view of a repository, as needed to build a staged diff
pub trait StagedSource {
    /// every path with a staged change, in a stable order
    fn staged_entries(&self) -> Result<Vec<StagedEntry>, Error>;

    /// content of `path` in the last commit (empty if absent there)
    fn committed_content(&self, path: &str) -> Result<Vec<u8>, Error>;

    /// current content of `path` in the working copy
    fn working_content(&self, path: &str) -> io::Result<Vec<u8>>;
}
