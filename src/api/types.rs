//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::contacts::Contact;
use crate::error::ValidationError;
use crate::mail::{Credentials, ReconciledMessage};
use crate::outreach::BatchResult;

/// `POST /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub countries: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub contacts: Vec<Contact>,
    pub message: String,
}

/// `POST /api/send-emails` and `POST /api/follow-up`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub email_template: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub email_password: String,
}

impl DispatchRequest {
    /// Check required fields, in the order a caller would fix them.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        if self.contacts.is_empty() {
            return Err(ValidationError::NoContacts);
        }
        if self.email_template.is_empty() {
            return Err(ValidationError::EmptyTemplate);
        }
        Credentials::new(self.sender_email.as_str(), self.email_password.as_str())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub sent_to: Vec<String>,
    pub failed_to: Vec<String>,
}

impl From<BatchResult> for DispatchResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            success: true,
            sent: result.sent_to.len(),
            failed: result.failed.len(),
            sent_to: result.sent_to,
            failed_to: result.failed,
        }
    }
}

/// `POST /api/check-responses`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponsesRequest {
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub email_password: String,
}

impl CheckResponsesRequest {
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        Credentials::new(self.sender_email.as_str(), self.email_password.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponsesResponse {
    pub success: bool,
    pub responses: Vec<ReconciledMessage>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outreach::DispatchOutcome;

    fn request(json: &str) -> DispatchRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_contacts_checked_first() {
        let req = request(r#"{"emailTemplate": "", "senderEmail": ""}"#);
        assert_eq!(req.validate().unwrap_err(), ValidationError::NoContacts);
    }

    #[test]
    fn empty_template_rejected() {
        let req = request(
            r#"{"contacts": [{"email": "a@x.com"}], "emailTemplate": "",
                "senderEmail": "me@gmail.com", "emailPassword": "pw"}"#,
        );
        assert_eq!(req.validate().unwrap_err(), ValidationError::EmptyTemplate);
    }

    #[test]
    fn whitespace_template_is_accepted() {
        let req = request(
            r#"{"contacts": [{"email": "a@x.com"}], "emailTemplate": "  ",
                "senderEmail": "me@gmail.com", "emailPassword": "pw"}"#,
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_password_rejected() {
        let req = request(
            r#"{"contacts": [{"email": "a@x.com"}], "emailTemplate": "Hi",
                "senderEmail": "me@gmail.com"}"#,
        );
        assert_eq!(req.validate().unwrap_err(), ValidationError::MissingCredentials);
    }

    #[test]
    fn complete_request_yields_credentials() {
        let req = request(
            r#"{"contacts": [{"email": "a@x.com", "status": "pending"}], "emailTemplate": "Hi {name}",
                "senderEmail": "me@gmail.com", "emailPassword": "pw"}"#,
        );
        assert_eq!(req.validate().unwrap().address, "me@gmail.com");
    }

    #[test]
    fn dispatch_response_shape() {
        let mut result = BatchResult::default();
        result.record(DispatchOutcome::new("a@x.com", true));
        result.record(DispatchOutcome::new("b@x.com", false));
        let json = serde_json::to_value(DispatchResponse::from(result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "sent": 1,
                "failed": 1,
                "sentTo": ["a@x.com"],
                "failedTo": ["b@x.com"],
            })
        );
    }
}
