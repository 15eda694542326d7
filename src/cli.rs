use crate::constants::{
    DEFAULT_CONTEXT, DEFAULT_HISTORY, MAX_ADDED_FILE_PREVIEW, MAX_FILE_DIFF_SIZE,
};
use crate::diff::DiffLimits;
use clap::Parser;
use std::path::PathBuf;

/// git-commit-gen: suggest a commit message for the staged changes
#[derive(Parser, Debug)]
#[command(name = "git-commit-gen", about, long_about = None)]
pub struct Cli {
    /// repository to inspect (any path inside it)
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// prompt template file (overrides GIT_COMMIT_GEN_TEMPLATE)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// number of recent commit messages to show the model as style examples
    #[arg(long, default_value_t = DEFAULT_HISTORY)]
    pub history: usize,

    /// maximum characters of a modified file's diff
    #[arg(long, default_value_t = MAX_FILE_DIFF_SIZE)]
    pub max_file_diff: usize,

    /// maximum characters shown of an added file
    #[arg(long, default_value_t = MAX_ADDED_FILE_PREVIEW)]
    pub max_added_preview: usize,

    /// unchanged lines shown around each change
    #[arg(long, default_value_t = DEFAULT_CONTEXT)]
    pub context: usize,

    /// print the prompt sent to the model
    #[arg(long)]
    pub debug_prompt: bool,

    /// print the raw response from the model
    #[arg(long)]
    pub debug_response: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn limits(&self) -> DiffLimits {
        DiffLimits {
            max_file_diff_size: self.max_file_diff,
            added_preview_limit: self.max_added_preview,
            context_lines: self.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["git-commit-gen"]).unwrap();
        assert_eq!(cli.repo, PathBuf::from("."));
        assert_eq!(cli.history, DEFAULT_HISTORY);
        assert!(!cli.debug_prompt);

        let limits = cli.limits();
        assert_eq!(limits.max_file_diff_size, MAX_FILE_DIFF_SIZE);
        assert_eq!(limits.added_preview_limit, MAX_ADDED_FILE_PREVIEW);
        assert_eq!(limits.context_lines, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "git-commit-gen",
            "--history",
            "0",
            "--max-file-diff",
            "500",
            "--context",
            "1",
            "--template",
            "my-prompt.txt",
        ])
        .unwrap();
        assert_eq!(cli.history, 0);
        assert_eq!(cli.limits().max_file_diff_size, 500);
        assert_eq!(cli.limits().context_lines, 1);
        assert_eq!(cli.template, Some(PathBuf::from("my-prompt.txt")));
    }
}
