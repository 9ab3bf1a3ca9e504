//! Delivery strategies for validated submissions.
//!
//! Exactly one strategy is active per deployment, selected by
//! `DELIVERY_STRATEGY`. All strategies satisfy the same contract:
//! `deliver(submission) -> Delivered | DeliveryError`, so the intake
//! dispatcher is written and tested once against the trait.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, DeliveryKind};
use crate::db::Database;
use crate::intake::Submission;

/// Message returned when a lead's email already exists in the store
pub const DUPLICATE_LEAD_MESSAGE: &str = "Ya hemos recibido una solicitud con este email";

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A record with the same natural key already exists (client error)
    #[error("{0}")]
    Conflict(String),

    /// Mail provider, transport or storage failure (server fault)
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

/// Successful delivery result.
#[derive(Debug, Clone)]
pub struct Delivered {
    /// Identifier for the delivered submission (placeholder, provider id
    /// or generated record id, depending on the strategy)
    pub id: String,
}

#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    async fn deliver(&self, submission: &Submission) -> Result<Delivered, DeliveryError>;
}

/// Build the strategy selected by configuration.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn DeliveryStrategy>> {
    match config.delivery_strategy {
        DeliveryKind::Log => Ok(Arc::new(LogDelivery)),
        DeliveryKind::Email => Ok(Arc::new(EmailDelivery::new(config))),
        DeliveryKind::Database => {
            let db = Database::new(&config.database_path)?;
            Ok(Arc::new(DatabaseDelivery::new(db)))
        }
    }
}

// ==================== Log-only Strategy ====================

/// Records the submission in the operational log and synthesizes a
/// placeholder identifier from the current timestamp.
pub struct LogDelivery;

#[async_trait]
impl DeliveryStrategy for LogDelivery {
    async fn deliver(&self, submission: &Submission) -> Result<Delivered, DeliveryError> {
        match submission {
            Submission::Lead(lead) => info!(
                "New lead received: {} <{}> ({})",
                lead.name, lead.email, lead.company_name
            ),
            Submission::Support(request) => info!(
                "New support request: {} <{}> [{}]",
                request.name, request.email, request.request_type_label
            ),
        }

        // Placeholder id until a persistent store is wired in
        Ok(Delivered {
            id: format!("temp-{}", Utc::now().timestamp_millis()),
        })
    }
}

// ==================== Email Strategy ====================

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    subject: String,
    html: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Forwards the submission to the support team through a Resend-compatible
/// mail API. Misconfiguration (missing key or recipients) is a delivery
/// fault, reported only when the strategy actually runs.
pub struct EmailDelivery {
    api_key: Option<String>,
    api_base: String,
    from_email: String,
    recipients: Vec<String>,
}

impl EmailDelivery {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.resend_api_key.clone(),
            api_base: config.resend_api_base.clone(),
            from_email: config.from_email.clone(),
            recipients: config.support_emails.clone(),
        }
    }

    fn render(&self, submission: &Submission) -> SendEmailRequest {
        match submission {
            Submission::Lead(lead) => {
                let phone = lead.phone.as_deref().unwrap_or("-");
                SendEmailRequest {
                    from: format!("ParkPool Leads <{}>", self.from_email),
                    to: self.recipients.clone(),
                    reply_to: None,
                    subject: format!(
                        "[Nuevo Lead ParkPool] {} - {}",
                        lead.company_name, lead.name
                    ),
                    html: format!(
                        "<div style=\"font-family: Arial, sans-serif;\">\
                         <h1>Nuevo Lead</h1>\
                         <p><b>Nombre:</b> {}</p>\
                         <p><b>Email:</b> <a href=\"mailto:{}\">{}</a></p>\
                         <p><b>Empresa:</b> {}</p>\
                         <p><b>Teléfono:</b> {}</p>\
                         </div>",
                        lead.name, lead.email, lead.email, lead.company_name, phone
                    ),
                    text: format!(
                        "Nuevo Lead\n\nNombre: {}\nEmail: {}\nEmpresa: {}\nTeléfono: {}\n",
                        lead.name, lead.email, lead.company_name, phone
                    ),
                }
            }
            Submission::Support(request) => SendEmailRequest {
                from: format!("ParkPool Support <{}>", self.from_email),
                to: self.recipients.clone(),
                // Support replies go straight back to the submitter
                reply_to: Some(request.email.clone()),
                subject: format!(
                    "[Soporte ParkPool] {} - {}",
                    request.request_type_label, request.name
                ),
                html: format!(
                    "<div style=\"font-family: Arial, sans-serif;\">\
                     <h1>Nueva Solicitud de Soporte</h1>\
                     <p><b>Nombre:</b> {}</p>\
                     <p><b>Email:</b> <a href=\"mailto:{}\">{}</a></p>\
                     <p><b>Tipo de solicitud:</b> {}</p>\
                     <h3>Descripción:</h3>\
                     <p style=\"white-space: pre-wrap;\">{}</p>\
                     <p style=\"color: #6b7280;\">Enviado desde el formulario de soporte de ParkPool. \
                     Puedes responder directamente a este correo para contactar al usuario.</p>\
                     </div>",
                    request.name,
                    request.email,
                    request.email,
                    request.request_type_label,
                    request.description
                ),
                text: format!(
                    "Nueva Solicitud de Soporte\n\nNombre: {}\nEmail: {}\nTipo: {}\n\n{}\n",
                    request.name, request.email, request.request_type_label, request.description
                ),
            },
        }
    }
}

#[async_trait]
impl DeliveryStrategy for EmailDelivery {
    async fn deliver(&self, submission: &Submission) -> Result<Delivered, DeliveryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("RESEND_API_KEY not set"))?;
        if self.recipients.is_empty() {
            return Err(anyhow!("SUPPORT_EMAILS is empty").into());
        }

        let request = self.render(submission);

        let client = reqwest::Client::new();
        let url = format!("{}/emails", self.api_base);

        let response = client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to mail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Mail API error ({}): {}", status, body).into());
        }

        let parsed: SendEmailResponse = response
            .json()
            .await
            .unwrap_or(SendEmailResponse { id: None });

        Ok(Delivered {
            id: parsed
                .id
                .unwrap_or_else(|| format!("email-{}", Utc::now().timestamp_millis())),
        })
    }
}

// ==================== Database Strategy ====================

/// Persists the submission. Leads are deduplicated on their email address
/// (the natural key); a duplicate is a conflict, not a fault.
pub struct DatabaseDelivery {
    db: Database,
}

impl DatabaseDelivery {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn is_constraint_violation(e: &anyhow::Error) -> bool {
        e.downcast_ref::<rusqlite::Error>()
            .and_then(|db_err| db_err.sqlite_error_code())
            .map(|code| code == rusqlite::ErrorCode::ConstraintViolation)
            .unwrap_or(false)
    }
}

#[async_trait]
impl DeliveryStrategy for DatabaseDelivery {
    async fn deliver(&self, submission: &Submission) -> Result<Delivered, DeliveryError> {
        match submission {
            Submission::Lead(lead) => {
                if self.db.lead_exists(&lead.email)? {
                    return Err(DeliveryError::Conflict(DUPLICATE_LEAD_MESSAGE.to_string()));
                }

                let id = format!("lead-{}", Uuid::new_v4());
                if let Err(e) = self.db.insert_lead(&id, lead) {
                    // The UNIQUE constraint catches a race between the
                    // existence check and the insert
                    if Self::is_constraint_violation(&e) {
                        return Err(DeliveryError::Conflict(
                            DUPLICATE_LEAD_MESSAGE.to_string(),
                        ));
                    }
                    return Err(DeliveryError::Fault(e));
                }

                Ok(Delivered { id })
            }
            Submission::Support(request) => {
                let id = format!("support-{}", Uuid::new_v4());
                self.db.insert_support_request(&id, request)?;
                Ok(Delivered { id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{LeadSubmission, RequestType, SupportRequest};
    use tempfile::TempDir;

    fn sample_lead(email: &str) -> Submission {
        Submission::Lead(LeadSubmission {
            name: "Jo".to_string(),
            email: email.to_string(),
            company_name: "Acme".to_string(),
            phone: None,
        })
    }

    fn sample_support() -> Submission {
        Submission::Support(SupportRequest {
            name: "Laura Gómez".to_string(),
            email: "laura@empresa.com".to_string(),
            request_type: RequestType::MobileIssue,
            request_type_label: "Problema con la app móvil".to_string(),
            description: "La app se cierra al abrir el mapa".to_string(),
        })
    }

    fn test_config() -> Config {
        Config {
            port: 8080,
            delivery_strategy: DeliveryKind::Email,
            database_path: "unused.db".to_string(),
            resend_api_key: Some("re_test_key".to_string()),
            resend_api_base: "https://api.resend.com".to_string(),
            support_emails: vec!["soporte@fixitg.com".to_string()],
            from_email: "support@parkpool.tech".to_string(),
        }
    }

    // ==================== LogDelivery Tests ====================

    #[tokio::test]
    async fn test_log_delivery_synthesizes_placeholder_id() {
        let delivered = LogDelivery
            .deliver(&sample_lead("jo@x.com"))
            .await
            .expect("Should succeed");

        assert!(delivered.id.starts_with("temp-"));
        // The suffix is a unix-millis timestamp
        let suffix = delivered.id.strip_prefix("temp-").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_log_delivery_accepts_support_requests() {
        let delivered = LogDelivery
            .deliver(&sample_support())
            .await
            .expect("Should succeed");
        assert!(delivered.id.starts_with("temp-"));
    }

    // ==================== EmailDelivery Tests ====================

    #[tokio::test]
    async fn test_email_delivery_missing_api_key_is_fault() {
        let mut config = test_config();
        config.resend_api_key = None;
        let strategy = EmailDelivery::new(&config);

        let result = strategy.deliver(&sample_support()).await;
        match result {
            Err(DeliveryError::Fault(e)) => {
                assert!(e.to_string().contains("RESEND_API_KEY"));
            }
            other => panic!("Expected Fault, got {:?}", other.map(|d| d.id)),
        }
    }

    #[tokio::test]
    async fn test_email_delivery_empty_recipients_is_fault() {
        let mut config = test_config();
        config.support_emails.clear();
        let strategy = EmailDelivery::new(&config);

        let result = strategy.deliver(&sample_support()).await;
        assert!(matches!(result, Err(DeliveryError::Fault(_))));
    }

    #[test]
    fn test_render_support_sets_reply_to_and_subject() {
        let strategy = EmailDelivery::new(&test_config());

        let request = strategy.render(&sample_support());

        assert_eq!(request.reply_to, Some("laura@empresa.com".to_string()));
        assert_eq!(
            request.subject,
            "[Soporte ParkPool] Problema con la app móvil - Laura Gómez"
        );
        assert_eq!(request.to, vec!["soporte@fixitg.com"]);
        assert!(request.html.contains("Nueva Solicitud de Soporte"));
        assert!(request.html.contains("La app se cierra al abrir el mapa"));
        assert!(request.text.contains("Laura Gómez"));
    }

    #[test]
    fn test_render_lead_has_no_reply_to() {
        let strategy = EmailDelivery::new(&test_config());

        let request = strategy.render(&sample_lead("jo@x.com"));

        assert!(request.reply_to.is_none());
        assert_eq!(request.subject, "[Nuevo Lead ParkPool] Acme - Jo");
        assert!(request.html.contains("jo@x.com"));
        // Missing phone renders as a dash
        assert!(request.text.contains("Teléfono: -"));
    }

    #[test]
    fn test_send_email_request_omits_null_reply_to() {
        let request = SendEmailRequest {
            from: "ParkPool Leads <support@parkpool.tech>".to_string(),
            to: vec!["a@b.com".to_string()],
            reply_to: None,
            subject: "s".to_string(),
            html: "<p>h</p>".to_string(),
            text: "t".to_string(),
        };

        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("reply_to"));
    }

    // ==================== DatabaseDelivery Tests ====================

    fn create_db_strategy() -> (DatabaseDelivery, Database, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("delivery.db");
        let db = Database::new(path.to_str().unwrap()).expect("db");
        (DatabaseDelivery::new(db.clone()), db, temp_dir)
    }

    #[tokio::test]
    async fn test_database_delivery_creates_lead_with_status_new() {
        let (strategy, db, _temp_dir) = create_db_strategy();

        let delivered = strategy
            .deliver(&sample_lead("jo@x.com"))
            .await
            .expect("Should deliver");

        assert!(delivered.id.starts_with("lead-"));

        let record = db
            .get_lead_by_email("jo@x.com")
            .expect("fetch")
            .expect("exists");
        assert_eq!(record.id, delivered.id);
        assert_eq!(record.status, "NEW");
        assert_eq!(record.name, "Jo");
    }

    #[tokio::test]
    async fn test_database_delivery_duplicate_email_is_conflict() {
        let (strategy, db, _temp_dir) = create_db_strategy();

        strategy
            .deliver(&sample_lead("jo@x.com"))
            .await
            .expect("first");

        let result = strategy.deliver(&sample_lead("jo@x.com")).await;
        match result {
            Err(DeliveryError::Conflict(message)) => {
                assert_eq!(message, DUPLICATE_LEAD_MESSAGE);
            }
            other => panic!("Expected Conflict, got {:?}", other.map(|d| d.id)),
        }

        assert_eq!(db.lead_count().expect("count"), 1, "No second record");
    }

    #[tokio::test]
    async fn test_database_delivery_support_requests_not_deduplicated() {
        let (strategy, db, _temp_dir) = create_db_strategy();

        strategy.deliver(&sample_support()).await.expect("first");
        strategy.deliver(&sample_support()).await.expect("second");

        assert_eq!(db.support_request_count().expect("count"), 2);
    }

    #[tokio::test]
    async fn test_database_delivery_generates_unique_ids() {
        let (strategy, _db, _temp_dir) = create_db_strategy();

        let first = strategy
            .deliver(&sample_lead("a@x.com"))
            .await
            .expect("a");
        let second = strategy
            .deliver(&sample_lead("b@x.com"))
            .await
            .expect("b");

        assert_ne!(first.id, second.id);
    }

    // ==================== from_config Tests ====================

    #[tokio::test]
    async fn test_from_config_log_strategy() {
        let mut config = test_config();
        config.delivery_strategy = DeliveryKind::Log;

        let strategy = from_config(&config).expect("Should build");
        let delivered = strategy
            .deliver(&sample_lead("jo@x.com"))
            .await
            .expect("deliver");
        assert!(delivered.id.starts_with("temp-"));
    }

    #[tokio::test]
    async fn test_from_config_database_strategy() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut config = test_config();
        config.delivery_strategy = DeliveryKind::Database;
        config.database_path = temp_dir
            .path()
            .join("from_config.db")
            .to_str()
            .unwrap()
            .to_string();

        let strategy = from_config(&config).expect("Should build");
        let delivered = strategy
            .deliver(&sample_lead("jo@x.com"))
            .await
            .expect("deliver");
        assert!(delivered.id.starts_with("lead-"));
    }
}
