use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const TEMPLATE_ENV: &str = "GIT_COMMIT_GEN_TEMPLATE";
const TEMPLATE_FILE: &str = "prompt.txt";
const APP_DIR: &str = "git-commit-gen";

const DEFAULT_TEMPLATE: &str = r#"
You are a commit message generator. You will be given the staged changes of a
git repository as a unified diff. Write a commit message that describes them.

Format:
- first line: a summary in the imperative mood, at most 72 characters
- then, only if the change needs it, a blank line and a short body of
  "- " bullets explaining what changed and why
- plain text only: no markdown headings, no code fences, no preamble

Focus on the intent of the change, not a file-by-file listing. Lines marked
"Excluded file" are binary or generated files; mention them only if they
matter.

Example diff:
```
diff --git a/src/config.rs b/src/config.rs
--- a/src/config.rs
+++ b/src/config.rs
@@ -12,1 +12,2 @@
     pub timeout: u64,
+    pub retries: u32,
```

Example answer:
```
Add configurable retry count

- read `retries` from the config file alongside the timeout
```
"#;

/// system instruction sent with every request; read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_TEMPLATE.trim())
    }

    /// load from `--template`, the environment or the user config dir, else the built-in one
    ///
    /// a template that was asked for explicitly must be readable; the config
    /// dir file is only used if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit.map(Path::to_path_buf).or_else(|| {
            std::env::var_os(TEMPLATE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        if let Some(path) = explicit {
            return Self::from_file(&path);
        }

        if let Some(path) = default_template_path()
            && path.is_file()
        {
            return Self::from_file(&path);
        }

        Ok(Self::builtin())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt template {}", path.display()))?;
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("prompt template {} is empty", path.display());
        }
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn default_template_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(TEMPLATE_FILE))
}

/// drop trailer lines that tools add to commit messages
fn strip_bot_trailers(message: &str) -> String {
    message
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            let lower = trimmed.to_lowercase();
            !(lower.starts_with("co-authored-by:")
                || trimmed.starts_with('🤖')
                || trimmed.contains("Generated with"))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// build the user message: recent commit messages for style, then the diff
pub fn user_content(diff: &str, history: &[String]) -> String {
    let examples: Vec<String> = history
        .iter()
        .map(|message| strip_bot_trailers(message))
        .filter(|message| !message.is_empty())
        .collect();

    if examples.is_empty() {
        return diff.to_string();
    }

    let mut content =
        String::from("Recent commit messages in this repository (match their style):\n");
    for message in examples {
        // continuation lines are indented under their bullet
        content.push_str("- ");
        content.push_str(&message.replace('\n', "\n  "));
        content.push('\n');
    }
    content.push('\n');
    content.push_str(diff);
    content
}
