use thiserror::Error;

use crate::endpoint::Endpoint;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("invalid api url: {url}, {msg}")]
    InvalidUrl { url: String, msg: String },

    #[error("request to {endpoint} failed: {error}")]
    Transport {
        endpoint: Endpoint,
        error: reqwest::Error,
    },

    #[error("unable to decode {endpoint} response: {error}")]
    Decode {
        endpoint: Endpoint,
        error: serde_json::Error,
    },

    #[error("{endpoint} returned an error: {msg}")]
    Api { endpoint: Endpoint, msg: String },

    #[error("no such user")]
    NotFound,
}

impl SlackError {
    /// The error string reported by Slack, untouched.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { msg, .. } => Some(msg),
            _ => None,
        }
    }
}
