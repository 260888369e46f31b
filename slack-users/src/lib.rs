mod client;
pub mod endpoint;
mod error;
mod utils;

pub use client::SlackClient;
pub use endpoint::users::{Profile, User};
pub use endpoint::Endpoint;
pub use error::SlackError;
