use crate::changeset::{ChangeKind, StagedEntry, StagedSource};
use crate::error::Error;
use git2::{Delta, ErrorCode, ObjectType, Repository, Tree};
use std::path::{Path, PathBuf};

/// read-only handle on the repository the tool was started in
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// open the repository containing `path` (can be anywhere within the repo)
    pub fn discover(path: &Path) -> Result<Self, Error> {
        let repo = Repository::discover(path).map_err(|e| Error::repo("open git repository", e))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                Error::repo(
                    "find working directory",
                    git2::Error::from_str("repository is bare"),
                )
            })?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// tree of HEAD, or None on an unborn branch (no commits yet)
    fn head_tree(&self) -> Result<Option<Tree<'_>>, Error> {
        match self.repo.head() {
            Ok(head) => head
                .peel_to_tree()
                .map(Some)
                .map_err(|e| Error::repo("get HEAD tree", e)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(Error::repo("get HEAD", e)),
        }
    }

    /// the most recent `limit` commit messages reachable from HEAD, newest first
    pub fn recent_messages(&self, limit: usize) -> Result<Vec<String>, Error> {
        if limit == 0 || self.head_tree()?.is_none() {
            return Ok(Vec::new());
        }

        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| Error::repo("walk history", e))?;
        revwalk
            .push_head()
            .map_err(|e| Error::repo("walk history", e))?;

        let mut messages = Vec::new();
        for oid in revwalk.take(limit) {
            let oid = oid.map_err(|e| Error::repo("walk history", e))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| Error::repo("read commit", e))?;
            messages.push(String::from_utf8_lossy(commit.message_bytes()).into_owned());
        }
        Ok(messages)
    }
}

impl StagedSource for GitRepo {
    fn staged_entries(&self) -> Result<Vec<StagedEntry>, Error> {
        let tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_index(tree.as_ref(), None, None)
            .map_err(|e| Error::repo("create staged diff", e))?;

        let mut entries = Vec::new();
        for delta in diff.deltas() {
            let (kind, file) = match delta.status() {
                Delta::Added => (ChangeKind::Added, delta.new_file()),
                Delta::Modified => (ChangeKind::Modified, delta.new_file()),
                Delta::Deleted => (ChangeKind::Deleted, delta.old_file()),
                _ => continue, // renames, typechanges, conflicts, etc.
            };
            if let Some(path) = file.path() {
                entries.push(StagedEntry::new(path.to_string_lossy(), kind));
            }
        }
        Ok(entries)
    }

    fn committed_content(&self, path: &str) -> Result<Vec<u8>, Error> {
        let Some(tree) = self.head_tree()? else {
            return Ok(Vec::new());
        };
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::repo(format!("look up {path} in HEAD"), e)),
        };
        // submodules and other non-blob entries have no content of their own
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(Vec::new());
        }
        let blob = self
            .repo
            .find_blob(entry.id())
            .map_err(|e| Error::repo(format!("read {path} from HEAD"), e))?;
        Ok(blob.content().to_vec())
    }

    fn working_content(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.workdir.join(path))
    }
}
