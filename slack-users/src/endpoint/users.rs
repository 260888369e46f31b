use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::Endpoint;
use crate::error::SlackError;
use crate::utils::deserialize_nullable;

#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq, Debug)]
pub struct User {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub deleted: bool,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub color: String,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub is_owner: bool,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub has_2fa: bool,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub has_files: bool,
}

impl User {
    /// Email from the user's profile, if Slack returned a non-empty one
    pub fn email(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .map(|p| p.email.as_str())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq, Debug)]
pub struct Profile {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub real_name: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub skype: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image_24: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image_32: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image_48: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image_72: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub image_192: String,
}

// The member array stays raw until `ok` has been checked.
#[derive(Deserialize)]
struct UsersListResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    members: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct UsersInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Decode the body of a `users.list` response.
///
/// Members are returned in the order Slack sent them.
pub fn decode_users_list(body: &[u8]) -> Result<Vec<User>, SlackError> {
    let endpoint = Endpoint::UsersList;
    let response: UsersListResponse = serde_json::from_slice(body)
        .map_err(|error| SlackError::Decode { endpoint, error })?;
    check_ok(endpoint, response.ok, response.error)?;

    let raw = response
        .members
        .ok_or_else(|| missing_field(endpoint, "members"))?;
    serde_json::from_str(raw.get()).map_err(|error| SlackError::Decode { endpoint, error })
}

/// Decode the body of a `users.info` response.
pub fn decode_users_info(body: &[u8]) -> Result<User, SlackError> {
    let endpoint = Endpoint::UsersInfo;
    let response: UsersInfoResponse = serde_json::from_slice(body)
        .map_err(|error| SlackError::Decode { endpoint, error })?;
    check_ok(endpoint, response.ok, response.error)?;

    response.user.ok_or_else(|| missing_field(endpoint, "user"))
}

/// Return the first member, in order, that satisfies `predicate`.
pub fn find_user<P>(members: &[User], mut predicate: P) -> Result<&User, SlackError>
where
    P: FnMut(&User) -> bool,
{
    members
        .iter()
        .find(|member| predicate(member))
        .ok_or(SlackError::NotFound)
}

fn check_ok(endpoint: Endpoint, ok: bool, error: Option<String>) -> Result<(), SlackError> {
    if ok {
        Ok(())
    } else {
        Err(SlackError::Api {
            endpoint,
            msg: error.unwrap_or_default(),
        })
    }
}

fn missing_field(endpoint: Endpoint, field: &'static str) -> SlackError {
    SlackError::Decode {
        endpoint,
        error: <serde_json::Error as serde::de::Error>::missing_field(field),
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn users(ids: &[&str]) -> Vec<User> {
        ids.iter()
            .map(|id| User {
                id: id.to_string(),
                name: format!("name-{}", id),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn list_keeps_server_order() {
        let body = json!({
            "ok": true,
            "members": [
                {"id": "U3", "name": "carol"},
                {"id": "U1", "name": "alice", "is_admin": true},
                {"id": "U2", "name": "bob", "deleted": true},
            ]
        })
        .to_string();

        let members = decode_users_list(body.as_bytes()).unwrap();
        let ids: Vec<_> = members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["U3", "U1", "U2"]);
        assert!(members[1].is_admin);
        assert!(members[2].deleted);
    }

    #[test]
    fn list_full_member() {
        let body = json!({
            "ok": true,
            "members": [{
                "id": "U023BECGF",
                "name": "bobby",
                "deleted": false,
                "color": "9f69e7",
                "is_admin": true,
                "is_owner": false,
                "has_2fa": true,
                "has_files": true,
                "profile": {
                    "first_name": "Bobby",
                    "last_name": "Tables",
                    "real_name": "Bobby Tables",
                    "email": "bobby@slack.com",
                    "skype": "my-skype-name",
                    "phone": "+1 (123) 456 7890",
                    "image_24": "https://example.com/24.jpg",
                    "image_32": "https://example.com/32.jpg",
                    "image_48": "https://example.com/48.jpg",
                    "image_72": "https://example.com/72.jpg",
                    "image_192": "https://example.com/192.jpg"
                }
            }]
        })
        .to_string();

        let members = decode_users_list(body.as_bytes()).unwrap();
        assert_eq!(1, members.len());
        let bobby = &members[0];
        assert_eq!(bobby.color, "9f69e7");
        assert!(bobby.has_2fa && bobby.has_files && !bobby.is_owner);
        let profile = bobby.profile.as_ref().unwrap();
        assert_eq!(profile.real_name, "Bobby Tables");
        assert_eq!(profile.image_192, "https://example.com/192.jpg");
        assert_eq!(bobby.email(), Some("bobby@slack.com"));
    }

    #[test]
    fn list_empty() {
        let members = decode_users_list(br#"{"ok": true, "members": []}"#).unwrap();
        assert!(members.is_empty());
    }

    #[test]
    fn list_api_error() {
        let err = decode_users_list(br#"{"ok": false, "error": "rate_limited"}"#).unwrap_err();
        match err {
            SlackError::Api { endpoint, msg } => {
                assert_eq!(endpoint, Endpoint::UsersList);
                assert_eq!(msg, "rate_limited");
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn api_error_wins_over_payload() {
        let err = decode_users_list(br#"{"ok": false, "error": "invalid_auth", "members": 7}"#)
            .unwrap_err();
        assert_eq!(err.api_message(), Some("invalid_auth"));
    }

    #[test]
    fn api_error_without_message() {
        let err = decode_users_list(br#"{"ok": false}"#).unwrap_err();
        assert_eq!(err.api_message(), Some(""));
    }

    #[test]
    fn list_malformed_json() {
        let err = decode_users_list(br#"{"ok": true, "members": [{"id": "U1"}"#).unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));

        let err = decode_users_list(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));
    }

    #[test]
    fn list_wrong_member_shape() {
        // One bad member fails the whole list
        let body = br#"{"ok": true, "members": [{"id": "U1"}, {"id": 2}]}"#;
        let err = decode_users_list(body).unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));

        let body = br#"{"ok": true, "members": {"id": "U1"}}"#;
        assert!(matches!(
            decode_users_list(body),
            Err(SlackError::Decode { .. })
        ));
    }

    #[test]
    fn list_missing_members() {
        let err = decode_users_list(br#"{"ok": true}"#).unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));
        assert!(err.to_string().contains("members"));

        let err = decode_users_list(br#"{"ok": true, "members": null}"#).unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));
    }

    #[test]
    fn info_minimal_user() {
        let body = br#"{"ok":true,"user":{"id":"U123","name":"alice"}}"#;
        let user = decode_users_info(body).unwrap();
        assert_eq!(user.id, "U123");
        assert_eq!(user.name, "alice");
        assert_eq!(user.color, "");
        assert!(!user.deleted && !user.is_admin && !user.is_owner);
        assert!(!user.has_2fa && !user.has_files);
        assert_eq!(user.profile, None);
        assert_eq!(user.email(), None);
    }

    #[test]
    fn info_null_fields() {
        let body = json!({
            "ok": true,
            "user": {
                "id": "U9",
                "name": null,
                "deleted": null,
                "profile": {"real_name": "Nine", "email": null}
            }
        })
        .to_string();
        let user = decode_users_info(body.as_bytes()).unwrap();
        assert_eq!(user.name, "");
        assert!(!user.deleted);
        let profile = user.profile.unwrap();
        assert_eq!(profile.real_name, "Nine");
        assert_eq!(profile.email, "");
    }

    #[test]
    fn info_null_profile() {
        let body = br#"{"ok": true, "user": {"id": "U1", "profile": null}}"#;
        assert_eq!(decode_users_info(body).unwrap().profile, None);
    }

    #[test]
    fn info_api_error() {
        let err = decode_users_info(br#"{"ok": false, "error": "user_not_found"}"#).unwrap_err();
        match err {
            SlackError::Api { endpoint, msg } => {
                assert_eq!(endpoint, Endpoint::UsersInfo);
                assert_eq!(msg, "user_not_found");
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn info_missing_user() {
        let err = decode_users_info(br#"{"ok": true}"#).unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));
    }

    #[test]
    fn info_malformed_json() {
        let err = decode_users_info(b"").unwrap_err();
        assert!(matches!(err, SlackError::Decode { .. }));
    }

    #[test]
    fn find_returns_first_match() {
        let members = users(&["U1", "U2", "U1"]);
        let found = find_user(&members, |m| m.id == "U1").unwrap();
        assert!(std::ptr::eq(found, &members[0]));
    }

    #[test]
    fn find_later_match() {
        let members = users(&["U1", "U2", "U3"]);
        let found = find_user(&members, |m| m.name == "name-U3").unwrap();
        assert_eq!(found.id, "U3");
    }

    #[test]
    fn find_stops_at_first_match() {
        let members = users(&["U1", "U2", "U3"]);
        let mut calls = 0;
        find_user(&members, |m| {
            calls += 1;
            m.id == "U2"
        })
        .unwrap();
        assert_eq!(calls, 2);
    }

    #[test]
    fn find_not_found() {
        let err = find_user(&[], |_| true).unwrap_err();
        assert!(matches!(err, SlackError::NotFound));

        let members = users(&["U1", "U2"]);
        let err = find_user(&members, |m| m.id == "U3").unwrap_err();
        assert!(matches!(err, SlackError::NotFound));
        assert_eq!(members.len(), 2);
    }
}
