use thiserror::Error;

/// Failures at the model boundary. Credential and transport problems are
/// fatal for the session; everything downstream of a successful call is
/// handled leniently by the parser instead.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("OPENAI_API_KEY not found; set it in the environment, a .env file, or the config file")]
    MissingApiKey,

    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model response contained no choices")]
    EmptyResponse,
}
