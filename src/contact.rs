//! Contact form submission client.
//!
//! Serializes the form to JSON and POSTs it to the configured endpoint.
//! HTTP 200 with a readable body is success; everything else maps to a
//! distinct error so the page can show a specific message. Nothing is
//! retried automatically.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ContactOptions;

const SENT_MESSAGE: &str = "Message sent successfully!";
const REJECTED_MESSAGE: &str = "Something went wrong!";

#[derive(Debug, Clone, Serialize)]
pub struct ContactForm {
    pub access_key: String,
    pub name: String,
    pub email: String,
    pub message: String,
    /// Any further fields the page form carries, passed through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ContactForm {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            name: String::new(),
            email: String::new(),
            message: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    /// The access key was empty; nothing was sent.
    #[error("missing access key; message not sent")]
    MissingAccessKey,

    /// The endpoint answered with a non-200 status.
    #[error("submission rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The endpoint answered 200 but the body was unreadable.
    #[error("unreadable submission response: {0}")]
    MalformedResponse(String),

    /// The request never completed.
    #[error("network failure submitting message: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    message: String,
}

pub struct ContactClient {
    client: Client,
    endpoint: String,
}

impl ContactClient {
    pub fn new(opts: &ContactOptions) -> Self {
        Self {
            client: Client::new(),
            endpoint: opts.endpoint.clone(),
        }
    }

    /// Submit the form. Returns the user-visible confirmation message.
    pub async fn submit(&self, form: &ContactForm) -> Result<String, ContactError> {
        if form.access_key.trim().is_empty() {
            return Err(ContactError::MissingAccessKey);
        }
        debug!(endpoint = %self.endpoint, "submitting contact form");
        let response = self.client.post(&self.endpoint).json(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        classify(status, &body)
    }
}

fn classify(status: u16, body: &str) -> Result<String, ContactError> {
    let parsed: Result<SubmitResponse, _> = serde_json::from_str(body);
    match (status, parsed) {
        (200, Ok(resp)) => Ok(if resp.message.is_empty() {
            SENT_MESSAGE.to_string()
        } else {
            resp.message
        }),
        (200, Err(err)) => Err(ContactError::MalformedResponse(err.to_string())),
        (status, Ok(resp)) => Err(ContactError::Rejected {
            status,
            message: if resp.message.is_empty() {
                REJECTED_MESSAGE.to_string()
            } else {
                resp.message
            },
        }),
        (status, Err(_)) => Err(ContactError::Rejected {
            status,
            message: REJECTED_MESSAGE.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_with_server_message_passes_it_through() {
        let msg = classify(200, r#"{"message": "Thanks for reaching out"}"#).unwrap();
        assert_eq!(msg, "Thanks for reaching out");
    }

    #[test]
    fn ok_without_a_message_uses_the_default() {
        let msg = classify(200, r#"{"success": true}"#).unwrap();
        assert_eq!(msg, SENT_MESSAGE);
    }

    #[test]
    fn ok_with_an_unreadable_body_is_its_own_error() {
        let err = classify(200, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ContactError::MalformedResponse(_)), "got {err:?}");
    }

    #[test]
    fn rejection_carries_the_server_message_when_readable() {
        let err = classify(422, r#"{"message": "Invalid email"}"#).unwrap_err();
        match err {
            ContactError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid email");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn rejection_with_junk_body_falls_back_to_the_generic_message() {
        let err = classify(500, "oops").unwrap_err();
        match err {
            ContactError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, REJECTED_MESSAGE);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_access_key_never_sends() {
        let client = ContactClient::new(&ContactOptions {
            // Unroutable on purpose; the key check must fire first.
            endpoint: "http://127.0.0.1:1/submit".to_string(),
            access_key: String::new(),
            result_visible: std::time::Duration::from_secs(5),
        });
        let form = ContactForm::new("   ");
        let err = client.submit(&form).await.unwrap_err();
        assert!(matches!(err, ContactError::MissingAccessKey), "got {err:?}");
    }
}
