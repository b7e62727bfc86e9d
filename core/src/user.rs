//! A user key bound to a `Client`.

use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::Result;
use crate::http::Transport;
use crate::response::Response;

/// Forwards `notify` and `validate` to its client with `key` filled in.
#[derive(Debug)]
pub struct UserHandle<'a, T> {
    key: String,
    client: &'a Client<T>,
}

impl<'a, T: Transport> UserHandle<'a, T> {
    pub fn new(key: impl Into<String>, client: &'a Client<T>) -> Self {
        Self {
            key: key.into(),
            client,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn client(&self) -> &'a Client<T> {
        self.client
    }

    pub fn notify(&self, message: &str, options: &Map<String, Value>) -> Result<Response> {
        self.client.notify(&self.key, message, options)
    }

    pub fn validate(&self, device: Option<&str>) -> Result<Response> {
        self.client.validate(&self.key, device)
    }

    pub fn validate_ok(&self, device: Option<&str>) -> Result<bool> {
        self.client.validate_ok(&self.key, device)
    }
}

impl<T> Clone for UserHandle<'_, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            client: self.client,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{form_fields, MockTransport};

    #[test]
    fn notify_matches_client_request() {
        let client = Client::with_transport("app-token", MockTransport::ok());
        let user = UserHandle::new("u1", &client);

        user.notify("hi", &Map::new()).unwrap();
        client.notify("u1", "hi", &Map::new()).unwrap();

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
    }

    #[test]
    fn validate_forwards_device() {
        let client = Client::with_transport("app-token", MockTransport::ok());
        let user = client.user("u1");

        assert!(user.validate_ok(Some("pixel")).unwrap());
        let sent = client.transport().requests();
        assert_eq!(
            form_fields(&sent[0]),
            vec![
                ("token".to_string(), "app-token".to_string()),
                ("user".to_string(), "u1".to_string()),
                ("device".to_string(), "pixel".to_string()),
            ]
        );
    }

    #[test]
    fn failed_validation_is_false() {
        let client = Client::with_transport(
            "app-token",
            MockTransport::reply(
                400,
                r#"{"status":0,"user":"invalid","errors":["user key is invalid"]}"#,
            ),
        );
        let user = client.user("bad");
        let response = user.validate(None).unwrap();
        assert_eq!(response.get("user"), Some(&json!("invalid")));
        assert!(!user.validate_ok(None).unwrap());
    }

    #[test]
    fn set_key_retargets_later_calls() {
        let client = Client::with_transport("app-token", MockTransport::ok());
        let mut user = client.user("u1");
        user.set_key("u2");
        assert_eq!(user.key(), "u2");

        user.notify("hi", &Map::new()).unwrap();
        let sent = user.client().transport().requests();
        assert!(form_fields(&sent[0]).contains(&("user".to_string(), "u2".to_string())));
    }
}
