use crate::diff::DiffDocument;
use crate::error::{BackendError, Error};
use crate::llm::{CompletionBackend, CompletionRequest};
use crate::prompt::{PromptTemplate, user_content};
use crate::{ui, warning};

/// lead-ins models like to put in front of the actual message
const LEAD_INS: &[&str] = &[
    "Here is the commit message:",
    "Here's the commit message:",
    "Here is a commit message:",
    "Here's a commit message:",
    "Suggested commit message:",
    "Commit message:",
];

const FENCE: &str = "```";

/// language tags accepted on an opening fence; any other word is message text
const FENCE_LANGUAGES: &[&str] = &[
    "text",
    "plaintext",
    "txt",
    "git",
    "commit",
    "markdown",
    "md",
    "diff",
    "shell",
    "bash",
];

/// turns a diff into a commit message using the first backend that answers
pub struct Generator {
    template: PromptTemplate,
    backends: Vec<Box<dyn CompletionBackend>>,
    debug_prompt: bool,
    debug_response: bool,
}

impl Generator {
    pub fn new(template: PromptTemplate, backends: Vec<Box<dyn CompletionBackend>>) -> Self {
        Self {
            template,
            backends,
            debug_prompt: false,
            debug_response: false,
        }
    }

    /// print the prompt and/or raw answers on stderr
    pub fn with_debug(mut self, prompt: bool, response: bool) -> Self {
        self.debug_prompt = prompt;
        self.debug_response = response;
        self
    }

    /// generate a message for `diff`, trying each backend once, in order
    ///
    /// `history` holds recent commit messages, newest first, used as style
    /// examples
    pub fn generate(&self, diff: &DiffDocument, history: &[String]) -> Result<String, Error> {
        if diff.is_empty() {
            return Err(Error::EmptyChangeSet);
        }

        let diff_text = diff.render();
        let diff_chars = diff_text.chars().count();
        let user = user_content(&diff_text, history);

        if self.debug_prompt {
            debug_block("system prompt", self.template.as_str());
            debug_block("user prompt", &user);
        }

        let mut failures = Vec::new();
        for backend in &self.backends {
            let model = backend.model_for(diff_chars);
            let request = CompletionRequest {
                model: &model,
                system: self.template.as_str(),
                user: &user,
            };

            let spinner = ui::spinner(format!("asking {} ({model})...", backend.name()));
            let result = backend.complete(&request);
            spinner.finish_and_clear();

            let failure = match result {
                Ok(raw) => {
                    if self.debug_response {
                        debug_block(&format!("{} response", backend.name()), &raw);
                    }
                    let message = clean_message(&raw);
                    if !message.is_empty() {
                        return Ok(message);
                    }
                    BackendError::EmptyResponse
                }
                Err(e) => e,
            };

            warning!("{} failed: {}", backend.name(), failure);
            failures.push((backend.name().to_string(), failure));
        }

        Err(Error::AllBackendsFailed(failures))
    }
}

fn debug_block(title: &str, body: &str) {
    use colored::Colorize;
    use std::io::{self, Write};
    let _ = writeln!(io::stderr(), "{}", format!("--- {title} ---").cyan());
    let _ = writeln!(io::stderr(), "{}", body.dimmed());
}

/// strip whitespace, code fences and lead-in phrases from a model answer
///
/// repeats until nothing changes, so cleaning twice equals cleaning once
pub fn clean_message(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let mut text = text.trim();

    if let Some(rest) = LEAD_INS.iter().find_map(|prefix| text.strip_prefix(prefix)) {
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_prefix(FENCE) {
        // an opening fence may carry a language tag, e.g. ```text
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            _ => rest,
        };
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim().to_string()
}

fn is_language_tag(tag: &str) -> bool {
    let tag = tag.trim();
    tag.is_empty()
        || FENCE_LANGUAGES
            .iter()
            .any(|language| tag.eq_ignore_ascii_case(language))
}
