// diff
pub const MAX_FILE_DIFF_SIZE: usize = 10_000;
pub const MAX_ADDED_FILE_PREVIEW: usize = 10_000;
pub const DEFAULT_CONTEXT: usize = 3;
pub const DIFF_SIZE_WARNING_BYTES: usize = 50 * 1024;

// files whose diffs carry no useful signal
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "zip", "tar", "gz", "exe", "dll", "so", "dylib", "class",
    "pyc", "jar", "war", "ear", "sum", "lock",
];
pub const EXCLUDED_SUFFIXES: &[&str] = &["-lock.json", "-lock.yaml"];

// ui
pub const MAX_FILES_TO_SHOW: usize = 10;

// history
pub const DEFAULT_HISTORY: usize = 5;

// backends
pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const GROQ_LARGE_DIFF_MODEL: &str = "llama-3.1-8b-instant";
pub const GROQ_CONTEXT_TOKENS: usize = 8192;
pub const CHARS_PER_TOKEN: usize = 4;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const MAX_RESPONSE_TOKENS: u32 = 512;
pub const TEMPERATURE: f32 = 0.2;
