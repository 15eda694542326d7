mod changeset;
mod cli;
mod config;
mod constants;
mod diff;
mod error;
mod git;
mod llm;
mod message;
mod prompt;
mod ui;

use crate::cli::Cli;
use crate::config::Config;
use crate::constants::{DIFF_SIZE_WARNING_BYTES, MAX_FILES_TO_SHOW};
use crate::diff::{DiffDocument, FileDiff};
use crate::error::Error;
use crate::git::GitRepo;
use crate::message::Generator;
use crate::prompt::PromptTemplate;
use anyhow::{Context, Result};
use num_format::{Locale, ToFormattedString};
use std::io::{self, IsTerminal, Write};

fn main() {
    if let Err(e) = run().and_then(|message| print_message(&message)) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn print_message(message: &str) -> Result<()> {
    let stdout = io::stdout();
    let terminal = stdout.is_terminal();
    write_message(&mut stdout.lock(), message, terminal)
        .context("failed to write commit message to stdout")
}

/// keep the output pipe-friendly: no trailing newline unless a human is watching
fn write_message(out: &mut impl Write, message: &str, terminal: bool) -> io::Result<()> {
    if terminal {
        writeln!(out, "{message}")?;
    } else {
        write!(out, "{message}")?;
    }
    out.flush()
}

fn run() -> Result<String> {
    let cli = Cli::parse_args();
    dotenvy::dotenv().ok();

    // configuration problems are reported before touching the repository
    let config = Config::from_env()?;
    let template = PromptTemplate::load(cli.template.as_deref())?;

    let repo = GitRepo::discover(&cli.repo)?;
    let document = diff::build_diff(&repo, &cli.limits())?;
    if document.is_empty() {
        return Err(Error::EmptyChangeSet.into());
    }
    report_files(&document);

    let diff_size = document.render().chars().count();
    if diff_size > DIFF_SIZE_WARNING_BYTES {
        warning!(
            "diff is large ({} chars), this may use many tokens",
            diff_size.to_formatted_string(&Locale::en)
        );
    }

    // style examples are a nicety; a broken history should not stop the run
    let history = repo.recent_messages(cli.history).unwrap_or_else(|e| {
        warning!("ignoring commit history: {}", e);
        Vec::new()
    });

    let generator = Generator::new(template, llm::build_backends(&config.backends))
        .with_debug(cli.debug_prompt, cli.debug_response);
    Ok(generator.generate(&document, &history)?)
}

/// list the files going into the prompt
fn report_files(diff: &DiffDocument) {
    let file_count = diff.files.len();
    let file_word = if file_count == 1 { "file" } else { "files" };
    status!(
        "generating commit message from {} staged {}...",
        file_count,
        file_word
    );

    for file in diff.files.iter().take(MAX_FILES_TO_SHOW) {
        match file {
            FileDiff::Patch(fragment) => {
                let hunks = fragment.hunks.len();
                let hunk_word = if hunks == 1 { "hunk" } else { "hunks" };
                let note = if fragment.truncated { ", truncated" } else { "" };
                info!("{} {} ({hunks} {hunk_word}{note})", fragment.kind, fragment.path);
            }
            FileDiff::Excluded { .. } => info!("  {} (excluded)", file.path()),
        }
    }

    // show count of remaining files if there are more than MAX_FILES_TO_SHOW
    if file_count > MAX_FILES_TO_SHOW {
        info!("(+{} more)", file_count - MAX_FILES_TO_SHOW);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// writer standing in for a closed pipe
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_message_newline_only_on_terminal() {
        let mut piped = Vec::new();
        write_message(&mut piped, "Fix typo", false).unwrap();
        assert_eq!(piped, b"Fix typo");

        let mut terminal = Vec::new();
        write_message(&mut terminal, "Fix typo", true).unwrap();
        assert_eq!(terminal, b"Fix typo\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let err = write_message(&mut ClosedPipe, "Fix typo", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
