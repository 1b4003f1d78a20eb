//! Order status and fault code resolution.
//!
//! Translates the coded outcomes of the BankID service (collect statuses,
//! hint sub-codes, request-level fault codes) into the catalogued message
//! identifiers a relying party should consider showing. Unrecognized wire
//! codes funnel into an explicit `Unknown` variant and resolve to the
//! RFA21/RFA22 fallbacks instead of failing.

use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::messages::MessageId;

/// Sub-status returned while polling an order, indicating why it is
/// still pending or why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum HintCode {
    OutstandingTransaction,
    NoClient,
    Started,
    UserSign,
    ExpiredTransaction,
    CertificateErr,
    UserCancel,
    Cancelled,
    StartFailed,
    /// A code this integration does not recognize, kept verbatim for logs.
    Unknown(String),
}

/// Request-level fault code returned instead of a normal order response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ErrorCode {
    InvalidParameters,
    AlreadyInProgress,
    Unauthorized,
    NotFound,
    RequestTimeout,
    UnsupportedMediaType,
    InternalError,
    Maintenance,
    /// A code this integration does not recognize, kept verbatim for logs.
    Unknown(String),
}

/// Terminal or non-terminal state of a collect poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Complete,
    Failed,
}

/// Structured rationale for a known code, for logging and diagnostics.
///
/// `messages` is the ordered candidate list; a multi-entry list (the
/// `started` hint) is a caller-side UX choice the resolver never makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeDescription {
    pub reason: &'static str,
    pub action: &'static str,
    pub messages: &'static [MessageId],
}

/// A recognized code from either table, as extracted from a fault body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCode {
    Error(ErrorCode),
    Hint(HintCode),
}

impl From<String> for HintCode {
    fn from(raw: String) -> Self {
        HintCode::from(raw.as_str())
    }
}

// Wire tokens are matched case-insensitively; the service has emitted
// inconsistent casing across API revisions.
impl From<&str> for HintCode {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "outstandingtransaction" => HintCode::OutstandingTransaction,
            "noclient" => HintCode::NoClient,
            "started" => HintCode::Started,
            "usersign" => HintCode::UserSign,
            "expiredtransaction" => HintCode::ExpiredTransaction,
            "certificateerr" => HintCode::CertificateErr,
            "usercancel" => HintCode::UserCancel,
            "cancelled" => HintCode::Cancelled,
            "startfailed" => HintCode::StartFailed,
            _ => HintCode::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for HintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            HintCode::OutstandingTransaction => "outstandingTransaction",
            HintCode::NoClient => "noClient",
            HintCode::Started => "started",
            HintCode::UserSign => "userSign",
            HintCode::ExpiredTransaction => "expiredTransaction",
            HintCode::CertificateErr => "certificateErr",
            HintCode::UserCancel => "userCancel",
            HintCode::Cancelled => "cancelled",
            HintCode::StartFailed => "startFailed",
            HintCode::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{token}")
    }
}

impl From<String> for ErrorCode {
    fn from(raw: String) -> Self {
        ErrorCode::from(raw.as_str())
    }
}

impl From<&str> for ErrorCode {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "invalidparameters" => ErrorCode::InvalidParameters,
            "alreadyinprogress" => ErrorCode::AlreadyInProgress,
            "unauthorized" => ErrorCode::Unauthorized,
            "notfound" => ErrorCode::NotFound,
            "requesttimeout" => ErrorCode::RequestTimeout,
            "unsupportedmediatype" => ErrorCode::UnsupportedMediaType,
            "internalerror" => ErrorCode::InternalError,
            "maintenance" => ErrorCode::Maintenance,
            _ => ErrorCode::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ErrorCode::InvalidParameters => "invalidParameters",
            ErrorCode::AlreadyInProgress => "alreadyInProgress",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::NotFound => "notFound",
            ErrorCode::RequestTimeout => "requestTimeout",
            ErrorCode::UnsupportedMediaType => "unsupportedMediaType",
            ErrorCode::InternalError => "internalError",
            ErrorCode::Maintenance => "maintenance",
            ErrorCode::Unknown(raw) => raw.as_str(),
        };
        write!(f, "{token}")
    }
}

const NOT_A_BANKID_ERROR: &str = "RP must not try the same request again. \
    This is an internal error within RP's system and must not be \
    communicated to the user as a BankID error.";

const HINT_OUTSTANDING_TRANSACTION: CodeDescription = CodeDescription {
    reason: "The order is pending. The client has not yet received the order. \
        The hintCode will later change to noClient, started or userSign.",
    action: "If RP tried to start the client automatically, inform the user \
        that the app is starting (RFA13). If RP did not try to start the \
        client automatically, inform the user to start the app (RFA1).",
    messages: &[MessageId::Rfa13, MessageId::Rfa1],
};

const HINT_NO_CLIENT: CodeDescription = CodeDescription {
    reason: "The order is pending. The client has not yet received the order.",
    action: "The user has not started her client, or an automatic start \
        failed. RP should inform the user. Message RFA1 should be used.",
    messages: &[MessageId::Rfa1],
};

const HINT_STARTED: CodeDescription = CodeDescription {
    reason: "The order is pending. A client has been started with the \
        autostarttoken but a usable ID has not yet been found in the started \
        client.",
    action: "If the user provided her personal number, use RFA14; otherwise \
        use RFA15, with the variant matching the end-user device. Note: \
        started is not an error, RP should keep on polling using collect.",
    messages: &[
        MessageId::Rfa14A,
        MessageId::Rfa14B,
        MessageId::Rfa15A,
        MessageId::Rfa15B,
    ],
};

const HINT_USER_SIGN: CodeDescription = CodeDescription {
    reason: "The order is pending. The client has received the order.",
    action: "The RP should inform the user. Message RFA9 should be used.",
    messages: &[MessageId::Rfa9],
};

const HINT_EXPIRED_TRANSACTION: CodeDescription = CodeDescription {
    reason: "The order has expired. The BankID security app/program did not \
        start, the user did not finalize the signing or the RP called \
        collect too late.",
    action: "RP must inform the user. Message RFA8.",
    messages: &[MessageId::Rfa8],
};

const HINT_CERTIFICATE_ERR: CodeDescription = CodeDescription {
    reason: "The user has entered the wrong security code too many times, or \
        the user's BankID is revoked or invalid.",
    action: "RP must inform the user. Message RFA16.",
    messages: &[MessageId::Rfa16],
};

const HINT_USER_CANCEL: CodeDescription = CodeDescription {
    reason: "The user decided to cancel the order.",
    action: "RP must inform the user. Message RFA6.",
    messages: &[MessageId::Rfa6],
};

const HINT_CANCELLED: CodeDescription = CodeDescription {
    reason: "The order was cancelled. The system received a new order for \
        the user.",
    action: "RP must inform the user. Message RFA3.",
    messages: &[MessageId::Rfa3],
};

const HINT_START_FAILED: CodeDescription = CodeDescription {
    reason: "The user did not provide her ID, or the client did not start \
        within a certain time limit. The client software may not be \
        installed, or RP did not use the autoStartToken when starting the \
        app.",
    action: "The RP must inform the user. Message RFA17.",
    messages: &[MessageId::Rfa17],
};

/// Fallback description when the order is pending with an unrecognized
/// hint code.
pub const UNKNOWN_PENDING: CodeDescription = CodeDescription {
    reason: "The order is pending. RP does not recognize the hintCode.",
    action: "Use the fallback message. Message RFA21.",
    messages: &[MessageId::Rfa21],
};

/// Fallback description when the order has failed with an unrecognized
/// hint code.
pub const UNKNOWN_FAILED: CodeDescription = CodeDescription {
    reason: "The order failed. RP does not recognize the hintCode.",
    action: "Use the fallback message. Message RFA22.",
    messages: &[MessageId::Rfa22],
};

const ERROR_INVALID_PARAMETERS: CodeDescription = CodeDescription {
    reason: "Invalid parameter. Invalid use of method.",
    action: NOT_A_BANKID_ERROR,
    messages: &[],
};

const ERROR_ALREADY_IN_PROGRESS: CodeDescription = CodeDescription {
    reason: "An order for this user is already in progress. The order is \
        aborted. No order is created.",
    action: "RP must inform the user that an identification or signing \
        operation is already initiated for this user. Message RFA4 should \
        be used.",
    messages: &[MessageId::Rfa4],
};

const ERROR_UNAUTHORIZED: CodeDescription = CodeDescription {
    reason: "RP does not have access to the service.",
    action: NOT_A_BANKID_ERROR,
    messages: &[],
};

const ERROR_NOT_FOUND: CodeDescription = CodeDescription {
    reason: "An erroneous URL path was used.",
    action: NOT_A_BANKID_ERROR,
    messages: &[],
};

const ERROR_REQUEST_TIMEOUT: CodeDescription = CodeDescription {
    reason: "It took too long to transmit the request.",
    action: "RP must not automatically try again. This error may occur if \
        the processing at RP or the communication is too slow. RP must \
        inform the user. Message RFA5.",
    messages: &[MessageId::Rfa5],
};

const ERROR_UNSUPPORTED_MEDIA_TYPE: CodeDescription = CodeDescription {
    reason: "The Content-Type is missing or erroneous. \"application/json\" \
        takes neither optional nor required parameters, so adding a charset \
        parameter is not allowed.",
    action: NOT_A_BANKID_ERROR,
    messages: &[],
};

const ERROR_INTERNAL_ERROR: CodeDescription = CodeDescription {
    reason: "Internal technical error in the BankID system.",
    action: "RP must not automatically try again. RP must inform the user \
        that a technical error has occurred. Message RFA5 should be used.",
    messages: &[MessageId::Rfa5],
};

const ERROR_MAINTENANCE: CodeDescription = CodeDescription {
    reason: "The service is temporarily out of service.",
    action: "RP may try again without informing the user. If this error is \
        returned repeatedly, RP must inform the user. Message RFA5.",
    messages: &[MessageId::Rfa5],
};

impl HintCode {
    /// Every hint code with a registered description.
    pub const KNOWN: [HintCode; 9] = [
        HintCode::OutstandingTransaction,
        HintCode::NoClient,
        HintCode::Started,
        HintCode::UserSign,
        HintCode::ExpiredTransaction,
        HintCode::CertificateErr,
        HintCode::UserCancel,
        HintCode::Cancelled,
        HintCode::StartFailed,
    ];

    /// The registered description for this code, `None` for unknown codes.
    pub fn description(&self) -> Option<&'static CodeDescription> {
        match self {
            HintCode::OutstandingTransaction => Some(&HINT_OUTSTANDING_TRANSACTION),
            HintCode::NoClient => Some(&HINT_NO_CLIENT),
            HintCode::Started => Some(&HINT_STARTED),
            HintCode::UserSign => Some(&HINT_USER_SIGN),
            HintCode::ExpiredTransaction => Some(&HINT_EXPIRED_TRANSACTION),
            HintCode::CertificateErr => Some(&HINT_CERTIFICATE_ERR),
            HintCode::UserCancel => Some(&HINT_USER_CANCEL),
            HintCode::Cancelled => Some(&HINT_CANCELLED),
            HintCode::StartFailed => Some(&HINT_START_FAILED),
            HintCode::Unknown(_) => None,
        }
    }

    /// Ordered candidate messages for this code.
    ///
    /// `None` both for an unknown code and for a known code that carries
    /// no user-facing message; callers apply their own fallback policy.
    pub fn message_ids(&self) -> Option<&'static [MessageId]> {
        self.description()
            .map(|d| d.messages)
            .filter(|m| !m.is_empty())
    }
}

impl ErrorCode {
    /// Every error code with a registered description.
    pub const KNOWN: [ErrorCode; 8] = [
        ErrorCode::InvalidParameters,
        ErrorCode::AlreadyInProgress,
        ErrorCode::Unauthorized,
        ErrorCode::NotFound,
        ErrorCode::RequestTimeout,
        ErrorCode::UnsupportedMediaType,
        ErrorCode::InternalError,
        ErrorCode::Maintenance,
    ];

    /// The registered description for this code, `None` for unknown codes.
    pub fn description(&self) -> Option<&'static CodeDescription> {
        match self {
            ErrorCode::InvalidParameters => Some(&ERROR_INVALID_PARAMETERS),
            ErrorCode::AlreadyInProgress => Some(&ERROR_ALREADY_IN_PROGRESS),
            ErrorCode::Unauthorized => Some(&ERROR_UNAUTHORIZED),
            ErrorCode::NotFound => Some(&ERROR_NOT_FOUND),
            ErrorCode::RequestTimeout => Some(&ERROR_REQUEST_TIMEOUT),
            ErrorCode::UnsupportedMediaType => Some(&ERROR_UNSUPPORTED_MEDIA_TYPE),
            ErrorCode::InternalError => Some(&ERROR_INTERNAL_ERROR),
            ErrorCode::Maintenance => Some(&ERROR_MAINTENANCE),
            ErrorCode::Unknown(_) => None,
        }
    }

    /// Ordered candidate messages for this code. `None` for unknown codes
    /// and for faults that must never be surfaced to the end user.
    pub fn message_ids(&self) -> Option<&'static [MessageId]> {
        self.description()
            .map(|d| d.messages)
            .filter(|m| !m.is_empty())
    }
}

impl ApiCode {
    pub fn message_ids(&self) -> Option<&'static [MessageId]> {
        match self {
            ApiCode::Error(code) => code.message_ids(),
            ApiCode::Hint(code) => code.message_ids(),
        }
    }
}

impl fmt::Display for ApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiCode::Error(code) => code.fmt(f),
            ApiCode::Hint(code) => code.fmt(f),
        }
    }
}

/// Tests a raw fault-body code against the union of both code tables.
///
/// Unrecognized codes classify as `invalidParameters`, the generic
/// integration-bug fault.
pub fn classify_code(raw: &str) -> ApiCode {
    match ErrorCode::from(raw) {
        ErrorCode::Unknown(_) => match HintCode::from(raw) {
            HintCode::Unknown(unknown) => {
                warn!(code = %unknown, "unrecognized fault code, classifying as invalidParameters");
                ApiCode::Error(ErrorCode::InvalidParameters)
            }
            hint => ApiCode::Hint(hint),
        },
        code => ApiCode::Error(code),
    }
}

/// Resolves a collect outcome to the messages the caller should consider
/// showing.
///
/// A completed order carries no instructional message. A pending or
/// failed order with a hint code this integration does not know resolves
/// to the RFA21/RFA22 fallbacks so the caller always has something
/// displayable, even when the service introduces new codes.
pub fn resolve_collect(status: OrderStatus, hint: Option<&HintCode>) -> &'static [MessageId] {
    match status {
        OrderStatus::Complete => &[],
        OrderStatus::Pending | OrderStatus::Failed => {
            if let Some(description) = hint.and_then(HintCode::description) {
                return description.messages;
            }
            match hint {
                Some(HintCode::Unknown(raw)) => {
                    warn!(hint = %raw, ?status, "unrecognized hint code, using fallback message")
                }
                _ => warn!(?status, "collect response without hint code, using fallback message"),
            }
            if status == OrderStatus::Pending {
                UNKNOWN_PENDING.messages
            } else {
                UNKNOWN_FAILED.messages
            }
        }
    }
}
