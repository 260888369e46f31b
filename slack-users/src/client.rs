use reqwest::{header, Client, Url};
use tracing::{debug, warn};

use crate::endpoint::users::{decode_users_info, decode_users_list, find_user, User};
use crate::endpoint::{Endpoint, API_URL};
use crate::error::SlackError;

#[derive(Clone, Debug)]
pub struct SlackClient<'a> {
    reqwest_client: &'a Client,
    auth: String,
    base_url: Url,
}

impl<'a> SlackClient<'a> {
    /// Create a new SlackClient authenticated with `token`
    pub fn new(reqwest_client: &'a Client, token: &str) -> Self {
        Self {
            reqwest_client,
            auth: format!("Bearer {}", token),
            base_url: Url::parse(API_URL).expect("default api url is valid"),
        }
    }

    /// Send requests to `base_url` instead of `https://slack.com/api/`
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, SlackError> {
        let mut url = Url::parse(base_url).map_err(|e| SlackError::InvalidUrl {
            url: base_url.to_string(),
            msg: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SlackError::InvalidUrl {
                url: base_url.to_string(),
                msg: "url cannot be a base".to_string(),
            });
        }

        // Method names are joined onto the path
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        self.base_url = url;
        Ok(self)
    }

    /// List every member of the workspace
    pub async fn users_list(&self) -> Result<Vec<User>, SlackError> {
        let body = self.get_request(Endpoint::UsersList, &[]).await?;
        let members = decode_users_list(&body).inspect_err(log_api_error)?;
        debug!(count = members.len(), "decoded workspace members");
        Ok(members)
    }

    /// Fetch a single member by id
    pub async fn users_info(&self, user_id: &str) -> Result<User, SlackError> {
        let body = self
            .get_request(Endpoint::UsersInfo, &[("user", user_id)])
            .await?;
        decode_users_info(&body).inspect_err(log_api_error)
    }

    /// Fetch the member list and return the first member matching `predicate`
    pub async fn find_user<P>(&self, predicate: P) -> Result<User, SlackError>
    where
        P: FnMut(&User) -> bool,
    {
        let members = self.users_list().await?;
        find_user(&members, predicate).cloned()
    }

    pub async fn find_user_by_name(&self, name: &str) -> Result<User, SlackError> {
        self.find_user(|u| u.name == name).await
    }

    /// Email comparison ignores ASCII case
    pub async fn find_user_by_email(&self, email: &str) -> Result<User, SlackError> {
        self.find_user(|u| u.email().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .await
    }

    pub(crate) async fn get_request(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<Vec<u8>, SlackError> {
        let err_func = |error: reqwest::Error| SlackError::Transport { endpoint, error };

        let url = self
            .base_url
            .join(endpoint.method())
            .map_err(|e| SlackError::InvalidUrl {
                url: self.base_url.to_string(),
                msg: e.to_string(),
            })?;
        debug!(%endpoint, %url, "sending request");

        let resp = self
            .reqwest_client
            .get(url)
            .header(header::AUTHORIZATION, &self.auth)
            .query(params)
            .send()
            .await
            .map_err(err_func)?;
        debug!(%endpoint, status = %resp.status(), "received response");

        let body = resp
            .error_for_status()
            .map_err(err_func)?
            .bytes()
            .await
            .map_err(err_func)?;
        debug!(%endpoint, bytes = body.len(), "read response body");

        Ok(body.to_vec())
    }
}

fn log_api_error(err: &SlackError) {
    if let SlackError::Api { endpoint, msg } = err {
        warn!(%endpoint, error = %msg, "slack api reported failure");
    }
}
