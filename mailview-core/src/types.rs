//! Wire types for the `/api/emails` resource.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Opaque email identifier. The backend may hand out numbers or strings.
///
/// Numbers are kept as JSON numbers, so negative or fractional ids survive
/// decoding and print back the way the backend sent them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailId {
    Number(Number),
    Text(String),
}

impl EmailId {
    /// Parse a command-line argument: a JSON number becomes a numeric id, anything else text.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Number>() {
            Ok(n) => EmailId::Number(n),
            Err(_) => EmailId::Text(raw.to_string()),
        }
    }

    /// Path segment for `/api/emails/{id}`.
    pub fn to_path_segment(&self) -> String {
        match self {
            EmailId::Number(n) => n.to_string(),
            EmailId::Text(s) => urlencoding::encode(s).into_owned(),
        }
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailId::Number(n) => write!(f, "{n}"),
            EmailId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EmailId {
    fn from(n: i64) -> Self {
        EmailId::Number(n.into())
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        EmailId::Text(s.to_string())
    }
}

/// A single message as exposed by `GET /api/emails`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: EmailId,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "from", alias = "sender", default)]
    pub sender: String,
    #[serde(
        rename = "to",
        alias = "recipient",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient: Option<String>,
    /// Display string, not parsed by the view.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub unread: bool,
    #[serde(rename = "message", alias = "body", default)]
    pub body: String,
    /// Any other fields the backend sends, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmailSummary {
    /// Build the locally approximated entry for a freshly sent email.
    pub fn from_draft(draft: &NewEmail, id: EmailId, date: String) -> Self {
        Self {
            id,
            subject: draft.subject.clone(),
            sender: draft.sender.clone(),
            recipient: Some(draft.recipient.clone()),
            date,
            unread: true,
            body: draft.body.clone(),
            extra: Map::new(),
        }
    }
}

/// Compose-form payload for `POST /api/emails`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmail {
    #[serde(rename = "from", alias = "sender", default)]
    pub sender: String,
    #[serde(rename = "to", alias = "recipient")]
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "message", alias = "body", default)]
    pub body: String,
}

/// Body of `PUT /api/emails/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadUpdate {
    pub unread: bool,
}

/// Mutation acknowledgement. An absent `success` counts as failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_id_accepts_number_and_string() {
        let n: EmailId = serde_json::from_str("7").unwrap();
        let s: EmailId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(n, EmailId::from(7));
        assert_eq!(s, EmailId::from("abc"));
        assert_ne!(EmailId::from(1), EmailId::from("1"));
    }

    #[test]
    fn test_negative_and_fractional_ids_decode() {
        let emails: Vec<EmailSummary> =
            serde_json::from_str(r#"[{"id": 1}, {"id": -3}, {"id": 2.5}]"#).unwrap();
        assert_eq!(emails.len(), 3);
        assert_eq!(emails[1].id, EmailId::from(-3));
        assert_eq!(emails[1].id.to_string(), "-3");
        assert_eq!(emails[1].id.to_path_segment(), "-3");
        assert_eq!(emails[2].id.to_string(), "2.5");
        assert_eq!(serde_json::to_string(&emails[1].id).unwrap(), "-3");
    }

    #[test]
    fn test_email_id_parse_and_path_segment() {
        assert_eq!(EmailId::parse("42"), EmailId::from(42));
        assert_eq!(EmailId::parse("-3"), EmailId::from(-3));
        assert_eq!(EmailId::parse("a b"), EmailId::from("a b"));
        assert_eq!(EmailId::parse("a b").to_path_segment(), "a%20b");
        assert_eq!(EmailId::from(9).to_path_segment(), "9");
    }

    #[test]
    fn test_email_summary_from_backend_json() {
        let json = r#"{
            "id": 3,
            "from": "ada@example.com",
            "to": "me@example.com",
            "subject": "Hello",
            "date": "Mon Jan 01 2024",
            "message": "Body text",
            "unread": true,
            "labels": ["inbox"]
        }"#;
        let email: EmailSummary = serde_json::from_str(json).unwrap();
        assert_eq!(email.id, EmailId::from(3));
        assert_eq!(email.sender, "ada@example.com");
        assert_eq!(email.recipient.as_deref(), Some("me@example.com"));
        assert_eq!(email.body, "Body text");
        assert!(email.unread);
        assert_eq!(email.extra["labels"], serde_json::json!(["inbox"]));
    }

    #[test]
    fn test_email_summary_minimal_json() {
        let email: EmailSummary = serde_json::from_str(r#"{"id": "x1"}"#).unwrap();
        assert_eq!(email.id, EmailId::from("x1"));
        assert!(!email.unread);
        assert!(email.subject.is_empty());
        assert!(email.extra.is_empty());
    }

    #[test]
    fn test_new_email_serialization_uses_backend_names() {
        let draft = NewEmail {
            sender: "me@example.com".to_string(),
            recipient: "you@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello there".to_string(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["from"], "me@example.com");
        assert_eq!(json["to"], "you@example.com");
        assert_eq!(json["message"], "Hello there");
    }

    #[test]
    fn test_ack_missing_success_is_failure() {
        let ack: Ack = serde_json::from_str("{}").unwrap();
        assert!(!ack.success);
        let ack: Ack = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ack.success);
    }

    #[test]
    fn test_from_draft_is_unread() {
        let draft = NewEmail {
            recipient: "you@example.com".to_string(),
            subject: "Hi".to_string(),
            ..Default::default()
        };
        let email = EmailSummary::from_draft(&draft, EmailId::from(5), "now".to_string());
        assert!(email.unread);
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.date, "now");
    }
}
