//! Request and response models for the RP API v5.1.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::messages::MessageId;
use crate::status::{HintCode, OrderStatus, resolve_collect};

/// Value for `userVisibleDataFormat` enabling simple markdown rendering.
pub const SIMPLE_MARKDOWN_V1: &str = "simpleMarkdownV1";

/// Body of an `/auth` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub end_user_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_visible_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_non_visible_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_visible_data_format: Option<String>,
}

impl AuthenticateRequest {
    pub fn new(end_user_ip: impl Into<String>) -> Self {
        Self {
            end_user_ip: end_user_ip.into(),
            personal_number: None,
            user_visible_data: None,
            user_non_visible_data: None,
            user_visible_data_format: None,
        }
    }

    /// Personal number of the user to authenticate, format YYYYMMDDXXXX.
    pub fn personal_number(mut self, personal_number: impl Into<String>) -> Self {
        self.personal_number = Some(personal_number.into());
        self
    }

    /// Text shown to the user while authenticating. Base64-encoded here;
    /// callers pass plain text.
    pub fn visible_data(mut self, data: &str) -> Self {
        self.user_visible_data = Some(BASE64.encode(data));
        self
    }

    /// Data held at the BankID servers, e.g. to later verify what was
    /// approved. Not shown to the user.
    pub fn hidden_data(mut self, data: &str) -> Self {
        self.user_non_visible_data = Some(BASE64.encode(data));
        self
    }

    pub fn visible_data_format(mut self, format: impl Into<String>) -> Self {
        self.user_visible_data_format = Some(format.into());
        self
    }
}

/// Body of a `/sign` request. Unlike authentication, the text the user
/// is prompted to sign is mandatory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub end_user_ip: String,
    pub user_visible_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_non_visible_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_visible_data_format: Option<String>,
}

impl SignRequest {
    pub fn new(end_user_ip: impl Into<String>, visible_data: &str) -> Self {
        Self {
            end_user_ip: end_user_ip.into(),
            user_visible_data: BASE64.encode(visible_data),
            personal_number: None,
            user_non_visible_data: None,
            user_visible_data_format: None,
        }
    }

    pub fn personal_number(mut self, personal_number: impl Into<String>) -> Self {
        self.personal_number = Some(personal_number.into());
        self
    }

    pub fn hidden_data(mut self, data: &str) -> Self {
        self.user_non_visible_data = Some(BASE64.encode(data));
        self
    }

    pub fn visible_data_format(mut self, format: impl Into<String>) -> Self {
        self.user_visible_data_format = Some(format.into());
        self
    }
}

/// Body of the `/collect` and `/cancel` requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRefRequest {
    pub order_ref: String,
}

/// Response to `/auth` and `/sign`: the opaque order reference to poll
/// with, plus the tokens used to start the client app.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_ref: String,
    pub auto_start_token: String,
    #[serde(default)]
    pub qr_start_token: Option<String>,
    #[serde(default)]
    pub qr_start_secret: Option<String>,
}

/// Response to `/collect`. Created per poll; callers repeat `collect`
/// with the same orderRef until `status` is terminal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub order_ref: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub hint_code: Option<HintCode>,
    #[serde(default)]
    pub completion_data: Option<CompletionData>,
}

impl CollectResponse {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Complete | OrderStatus::Failed)
    }

    /// Ordered candidate messages for this outcome, with the unknown-code
    /// fallbacks already applied.
    pub fn message_ids(&self) -> &'static [MessageId] {
        resolve_collect(self.status, self.hint_code.as_ref())
    }
}

/// Evidence returned once an order completes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    #[serde(default)]
    pub user: Option<CompletedUser>,
    #[serde(default)]
    pub device: Option<CompletedDevice>,
    #[serde(default)]
    pub cert: Option<CompletedCert>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub ocsp_response: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedUser {
    pub personal_number: String,
    pub name: String,
    pub given_name: String,
    pub surname: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedDevice {
    pub ip_address: String,
}

/// Validity window of the user certificate, as Unix millisecond strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCert {
    pub not_before: String,
    pub not_after: String,
}
