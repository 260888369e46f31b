use std::fmt::Display;

pub mod users;

pub(crate) static API_URL: &str = "https://slack.com/api/";

/// Slack Web API methods this crate knows how to call
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum Endpoint {
    UsersList,
    UsersInfo,
}

impl Endpoint {
    pub fn method(&self) -> &'static str {
        match self {
            Self::UsersList => "users.list",
            Self::UsersInfo => "users.info",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.method())
    }
}
