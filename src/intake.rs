//! Form intake: validation and dispatch of lead and support submissions.
//!
//! Raw, untyped JSON payloads are validated against a per-form schema. All
//! violated field rules are collected (no short-circuiting) in field
//! declaration order, because the site renders the error list in that order.
//! A submission that passes validation is handed to exactly one delivery
//! strategy; nothing is delivered for a rejected submission.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{error, info};

use crate::delivery::{DeliveryError, DeliveryStrategy};

/// Fixed success message for accepted leads
pub const LEAD_SUCCESS_MESSAGE: &str = "¡Gracias! Te contactaremos pronto";

/// Fixed success message for accepted support requests
pub const SUPPORT_SUCCESS_MESSAGE: &str = "¡Solicitud enviada! Te contactaremos pronto";

/// Error header returned alongside the per-field details
pub const VALIDATION_ERROR_MESSAGE: &str = "Datos inválidos";

/// Generic message for delivery faults; internal detail stays in the logs
pub const GENERIC_ERROR_MESSAGE: &str = "Error al procesar la solicitud";

// Per-field validation messages, verbatim from the site
const MSG_NAME_TOO_SHORT: &str = "El nombre debe tener al menos 2 caracteres";
const MSG_EMAIL_INVALID: &str = "Email inválido";
const MSG_COMPANY_TOO_SHORT: &str =
    "El nombre de la empresa debe tener al menos 2 caracteres";
const MSG_TYPE_INVALID: &str = "Tipo de solicitud inválido";
const MSG_LABEL_REQUIRED: &str = "Etiqueta de tipo requerida";
const MSG_DESCRIPTION_TOO_SHORT: &str =
    "La descripción debe tener al menos 10 caracteres";

/// Which form schema to apply to an incoming payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Lead,
    Support,
}

impl FormKind {
    fn success_message(&self) -> &'static str {
        match self {
            FormKind::Lead => LEAD_SUCCESS_MESSAGE,
            FormKind::Support => SUPPORT_SUCCESS_MESSAGE,
        }
    }
}

/// A validated prospective-customer inquiry. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone: Option<String>,
}

/// The closed set of support request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestType {
    WebIssue,
    MobileIssue,
    Suggestion,
    PaymentIssue,
    Other,
}

impl RequestType {
    pub fn from_code(code: &str) -> Option<RequestType> {
        match code {
            "webIssue" => Some(RequestType::WebIssue),
            "mobileIssue" => Some(RequestType::MobileIssue),
            "suggestion" => Some(RequestType::Suggestion),
            "paymentIssue" => Some(RequestType::PaymentIssue),
            "other" => Some(RequestType::Other),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RequestType::WebIssue => "webIssue",
            RequestType::MobileIssue => "mobileIssue",
            RequestType::Suggestion => "suggestion",
            RequestType::PaymentIssue => "paymentIssue",
            RequestType::Other => "other",
        }
    }
}

/// A validated support inquiry.
///
/// `request_type_label` is supplied by the caller and is forwarded as-is; it
/// is never derived from `request_type` and the two are not cross-validated,
/// matching the site's behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub name: String,
    pub email: String,
    pub request_type: RequestType,
    pub request_type_label: String,
    pub description: String,
}

/// A validated submission of either form, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Lead(LeadSubmission),
    Support(SupportRequest),
}

impl Submission {
    /// Submitter's email address (the natural key for leads).
    pub fn email(&self) -> &str {
        match self {
            Submission::Lead(lead) => &lead.email,
            Submission::Support(request) => &request.email,
        }
    }
}

/// The uniform result of processing one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Validation passed and the delivery strategy succeeded (201)
    Accepted { id: String, message: &'static str },
    /// One or more field rules were violated (400); details are in
    /// field declaration order
    Rejected { details: Vec<String> },
    /// Duplicate natural key in the persistent store (400)
    Conflict { message: String },
    /// Unexpected delivery error (500); the cause is logged, not returned
    Fault,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn meets_min_length(value: &Option<String>, min: usize) -> bool {
    value
        .as_ref()
        .map(|v| v.chars().count() >= min)
        .unwrap_or(false)
}

fn is_valid_email(value: &Option<String>) -> bool {
    value
        .as_ref()
        .map(|v| email_regex().is_match(v))
        .unwrap_or(false)
}

/// Validate a raw payload against the lead schema.
///
/// Rules are evaluated independently; every violated rule contributes its
/// message, in field declaration order (name, email, companyName).
pub fn validate_lead(payload: &Value) -> Result<LeadSubmission, Vec<String>> {
    let mut details = Vec::new();

    let name = string_field(payload, "name");
    if !meets_min_length(&name, 2) {
        details.push(MSG_NAME_TOO_SHORT.to_string());
    }

    let email = string_field(payload, "email");
    if !is_valid_email(&email) {
        details.push(MSG_EMAIL_INVALID.to_string());
    }

    let company_name = string_field(payload, "companyName");
    if !meets_min_length(&company_name, 2) {
        details.push(MSG_COMPANY_TOO_SHORT.to_string());
    }

    // Optional, no format constraint
    let phone = string_field(payload, "phone");

    if !details.is_empty() {
        return Err(details);
    }

    Ok(LeadSubmission {
        name: name.expect("validated above"),
        email: email.expect("validated above"),
        company_name: company_name.expect("validated above"),
        phone,
    })
}

/// Validate a raw payload against the support schema.
///
/// Declaration order: name, email, requestType, requestTypeLabel, description.
pub fn validate_support(payload: &Value) -> Result<SupportRequest, Vec<String>> {
    let mut details = Vec::new();

    let name = string_field(payload, "name");
    if !meets_min_length(&name, 2) {
        details.push(MSG_NAME_TOO_SHORT.to_string());
    }

    let email = string_field(payload, "email");
    if !is_valid_email(&email) {
        details.push(MSG_EMAIL_INVALID.to_string());
    }

    let request_type = string_field(payload, "requestType")
        .as_deref()
        .and_then(RequestType::from_code);
    if request_type.is_none() {
        details.push(MSG_TYPE_INVALID.to_string());
    }

    let request_type_label = string_field(payload, "requestTypeLabel");
    if !meets_min_length(&request_type_label, 1) {
        details.push(MSG_LABEL_REQUIRED.to_string());
    }

    let description = string_field(payload, "description");
    if !meets_min_length(&description, 10) {
        details.push(MSG_DESCRIPTION_TOO_SHORT.to_string());
    }

    if !details.is_empty() {
        return Err(details);
    }

    Ok(SupportRequest {
        name: name.expect("validated above"),
        email: email.expect("validated above"),
        request_type: request_type.expect("validated above"),
        request_type_label: request_type_label.expect("validated above"),
        description: description.expect("validated above"),
    })
}

/// Validate a payload and hand it to the delivery strategy.
///
/// Exactly one `deliver` call happens per accepted submission; none happens
/// for a rejected one. Delivery faults are logged here and downgraded to a
/// generic outcome so internal detail never reaches the caller. No retries
/// are performed.
pub async fn process_submission(
    kind: FormKind,
    payload: &Value,
    strategy: &dyn DeliveryStrategy,
) -> SubmissionOutcome {
    let submission = match kind {
        FormKind::Lead => match validate_lead(payload) {
            Ok(lead) => Submission::Lead(lead),
            Err(details) => return SubmissionOutcome::Rejected { details },
        },
        FormKind::Support => match validate_support(payload) {
            Ok(request) => Submission::Support(request),
            Err(details) => return SubmissionOutcome::Rejected { details },
        },
    };

    match strategy.deliver(&submission).await {
        Ok(delivered) => {
            info!("Submission accepted: id={}", delivered.id);
            SubmissionOutcome::Accepted {
                id: delivered.id,
                message: kind.success_message(),
            }
        }
        Err(DeliveryError::Conflict(message)) => {
            info!("Submission rejected as duplicate: {}", message);
            SubmissionOutcome::Conflict { message }
        }
        Err(DeliveryError::Fault(e)) => {
            error!("Delivery failed: {:#}", e);
            SubmissionOutcome::Fault
        }
    }
}
