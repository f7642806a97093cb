use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("language model API key is not configured")]
    MissingApiKey,

    #[error("language model request timed out")]
    Timeout,

    #[error("language model request failed: {0}")]
    Transport(String),

    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed language model response: {0}")]
    Malformed(String),

    #[error("language model returned an empty reply")]
    EmptyReply,

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Malformed(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}
