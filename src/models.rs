// Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{License, LicenseStatus};

// Generation requests

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementRequest {
    /// Raw idea, or feedback when refining
    pub raw_requirement: String,
    #[serde(default)]
    pub current_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDocRequest {
    pub requirements_doc: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub current_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TechDocRequest {
    pub product_doc: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub current_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoRequest {
    pub tech_doc: String,
    #[serde(default)]
    pub requirements_doc: Option<String>,
    #[serde(default)]
    pub product_doc: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub current_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub requirements_doc: Option<String>,
    pub product_doc: Option<String>,
    pub tech_doc: Option<String>,
    pub demo_code: Option<String>,
    pub feedback: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IterateRequest {
    pub current_code: String,
    pub user_feedback: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// An element the user picked in the prototype preview
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedElement {
    pub selector: String,
    pub html: String,
    #[serde(default, rename = "traceId", alias = "trace_id")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialEditRequest {
    pub current_code: String,
    pub user_feedback: String,
    pub selected_elements: Vec<SelectedElement>,
    #[serde(default)]
    pub model: Option<String>,
}

// Accounts

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
    pub is_admin: bool,
}

impl TokenResponse {
    pub fn bearer(access_token: String, username: String, is_admin: bool) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            username,
            is_admin,
        }
    }
}

// Licensing

fn default_max_calls() -> i32 {
    100
}

fn default_valid_days() -> i64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseCreate {
    pub username: String,
    #[serde(default = "default_max_calls")]
    pub max_calls: i32,
    #[serde(default = "default_valid_days")]
    pub valid_days: i64,
}

/// Answer to "what is the state of my license?"
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LicenseCheck {
    #[serde(rename = "none")]
    Missing {
        message: &'static str,
    },
    Valid(LicenseState),
    Invalid(LicenseState),
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseState {
    pub license_key: String,
    pub max_calls: i32,
    pub used_calls: i32,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub is_exhausted: bool,
}

impl LicenseCheck {
    pub fn from_license(license: Option<&License>, now: DateTime<Utc>) -> Self {
        let Some(license) = license else {
            return LicenseCheck::Missing {
                message: "No active license",
            };
        };

        let state = LicenseState {
            license_key: license.license_key.clone(),
            max_calls: license.max_calls,
            used_calls: license.used_calls,
            expires_at: license.expires_at,
            is_expired: license.is_expired(now),
            is_exhausted: license.is_exhausted(),
        };

        match license.status_at(now) {
            LicenseStatus::Valid => LicenseCheck::Valid(state),
            LicenseStatus::Expired | LicenseStatus::Exhausted => LicenseCheck::Invalid(state),
        }
    }
}

// Projects

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub share_token: String,
    pub url: String,
}

impl PublishResponse {
    pub fn new(share_token: String) -> Self {
        let url = format!("/preview/{}", share_token);
        Self { share_token, url }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicPreview {
    pub name: String,
    pub demo_code: Option<String>,
    pub project_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub id: i64,
    pub filename: String,
    pub url: String,
}

/// `{"status": ...}` acknowledgements
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl StatusResponse {
    pub fn new(status: &'static str) -> Self {
        Self {
            status,
            message: None,
            reason: None,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }
}
