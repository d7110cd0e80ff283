//! HTTP client for the `/api/emails` backend.

use std::future::Future;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::types::{Ack, EmailId, EmailSummary, NewEmail, UnreadUpdate};

/// Collection path relative to the service URL.
const EMAILS_PATH: &str = "/api/emails";

/// Operations the view controller needs from a mail backend.
///
/// `ServiceClient` is the production implementation; tests substitute a
/// scripted in-memory backend.
pub trait MailBackend: Clone + Send + Sync + 'static {
    /// `GET /api/emails`
    fn list_emails(&self) -> impl Future<Output = Result<Vec<EmailSummary>>> + Send;

    /// `POST /api/emails`
    fn create_email(&self, draft: &NewEmail) -> impl Future<Output = Result<Ack>> + Send;

    /// `PUT /api/emails/{id}` with `{ "unread": .. }`
    fn set_unread(&self, id: &EmailId, unread: bool) -> impl Future<Output = Result<Ack>> + Send;

    /// `DELETE /api/emails/{id}`
    fn delete_email(&self, id: &EmailId) -> impl Future<Output = Result<Ack>> + Send;
}

/// Client for the email backend.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a new service client.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the backend answers the collection resource; returns the email count.
    pub async fn health(&self) -> Result<usize> {
        self.list_emails().await.map(|emails| emails.len())
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, EMAILS_PATH)
    }

    fn item_url(&self, id: &EmailId) -> String {
        format!("{}{}/{}", self.base_url, EMAILS_PATH, id.to_path_segment())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = request.header(ACCEPT, "application/json").send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        decode_body(status, &text)
    }
}

impl MailBackend for ServiceClient {
    async fn list_emails(&self) -> Result<Vec<EmailSummary>> {
        log::debug!("GET {}", self.collection_url());
        self.send(self.http.get(self.collection_url())).await
    }

    async fn create_email(&self, draft: &NewEmail) -> Result<Ack> {
        log::debug!("POST {}", self.collection_url());
        self.send(self.http.post(self.collection_url()).json(draft))
            .await
    }

    async fn set_unread(&self, id: &EmailId, unread: bool) -> Result<Ack> {
        let url = self.item_url(id);
        log::debug!("PUT {url} unread={unread}");
        self.send(self.http.put(url).json(&UnreadUpdate { unread }))
            .await
    }

    async fn delete_email(&self, id: &EmailId) -> Result<Ack> {
        let url = self.item_url(id);
        log::debug!("DELETE {url}");
        self.send(self.http.delete(url)).await
    }
}

/// Turn a status and body into a decoded value or a service error.
fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    if !status.is_success() {
        // Try to extract error detail from JSON response
        if let Ok(val) = serde_json::from_str::<Value>(text)
            && let Some(detail) = val
                .as_object()
                .and_then(|m| m.get("detail").or_else(|| m.get("error")))
                .and_then(|d| d.as_str())
        {
            return Err(Error::Service(format!("{status}: {detail}")));
        }
        let snippet: String = text.chars().take(400).collect();
        return Err(Error::Service(format!("{status}: {snippet}")));
    }

    serde_json::from_str(text).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_client_url_normalization() {
        let client = ServiceClient::new("http://localhost:3000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.collection_url(), "http://localhost:3000/api/emails");
    }

    #[test]
    fn test_item_url_encodes_text_ids() {
        let client = ServiceClient::new("http://localhost:3000", None).unwrap();
        assert_eq!(
            client.item_url(&EmailId::from(12)),
            "http://localhost:3000/api/emails/12"
        );
        assert_eq!(
            client.item_url(&EmailId::Text("a/b".to_string())),
            "http://localhost:3000/api/emails/a%2Fb"
        );
    }

    #[test]
    fn test_decode_ack() {
        let ack: Ack = decode_body(StatusCode::OK, r#"{"success": true}"#).unwrap();
        assert!(ack.success);
        let ack: Ack = decode_body(StatusCode::OK, r#"{"success": false}"#).unwrap();
        assert!(!ack.success);
    }

    #[test]
    fn test_decode_email_list() {
        let emails: Vec<EmailSummary> = decode_body(
            StatusCode::OK,
            r#"[{"id": 1, "subject": "a", "unread": true}, {"id": 2}]"#,
        )
        .unwrap();
        assert_eq!(emails.len(), 2);
        assert!(emails[0].unread);
    }

    #[test]
    fn test_decode_malformed_body_is_json_error() {
        let err = decode_body::<Vec<EmailSummary>>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_decode_error_status_uses_detail() {
        let err = decode_body::<Ack>(
            StatusCode::NOT_FOUND,
            r#"{"detail": "no such email"}"#,
        )
        .unwrap_err();
        match err {
            Error::Service(msg) => assert!(msg.contains("no such email")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_status_truncates_body() {
        let body = "x".repeat(1000);
        let err = decode_body::<Ack>(StatusCode::INTERNAL_SERVER_ERROR, &body).unwrap_err();
        match err {
            Error::Service(msg) => assert!(msg.len() < 450),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
