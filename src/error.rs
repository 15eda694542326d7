use thiserror::Error;

/// fatal errors for a run
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "no API credential configured (set GROQ_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY)"
    )]
    Configuration,

    #[error("failed to {context}: {source}")]
    RepositoryAccess {
        context: String,
        #[source]
        source: git2::Error,
    },

    #[error("no staged changes to commit")]
    EmptyChangeSet,

    #[error("all backends failed ({})", summarize(.0))]
    AllBackendsFailed(Vec<(String, BackendError)>),
}

impl Error {
    pub fn repo(context: impl Into<String>, source: git2::Error) -> Self {
        Error::RepositoryAccess {
            context: context.into(),
            source,
        }
    }
}

/// why a single backend attempt failed; the caller moves on to the next one
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("response contained no message")]
    EmptyResponse,
}

impl From<ureq::Error> for BackendError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => BackendError::Status(code),
            other => BackendError::Transport(other.to_string()),
        }
    }
}

fn summarize(failures: &[(String, BackendError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
