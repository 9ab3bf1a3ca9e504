use anyhow::{bail, Context, Result};

/// Which delivery strategy handles validated submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Log the submission and synthesize a placeholder id
    Log,
    /// Forward the submission to the support team via the mail API
    Email,
    /// Persist the submission in the local database
    Database,
}

impl DeliveryKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "log" => Ok(DeliveryKind::Log),
            "email" => Ok(DeliveryKind::Email),
            "database" => Ok(DeliveryKind::Database),
            other => bail!(
                "Unknown delivery strategy '{}'. Expected log, email or database",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Delivery
    pub delivery_strategy: DeliveryKind,

    // Database (database strategy)
    pub database_path: String,

    // Mail API (email strategy). A missing key is surfaced as a delivery
    // fault when the email strategy runs, never as a validation failure.
    pub resend_api_key: Option<String>,
    pub resend_api_base: String,
    pub support_emails: Vec<String>,
    pub from_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            delivery_strategy: match std::env::var("DELIVERY_STRATEGY") {
                Ok(value) => {
                    DeliveryKind::parse(&value).context("Invalid DELIVERY_STRATEGY")?
                }
                Err(_) => DeliveryKind::Log,
            },

            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "parkpool.db".to_string()),

            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            resend_api_base: std::env::var("RESEND_API_BASE")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            support_emails: std::env::var("SUPPORT_EMAILS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            from_email: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "support@parkpool.tech".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "PORT",
            "DELIVERY_STRATEGY",
            "DATABASE_PATH",
            "RESEND_API_KEY",
            "RESEND_API_BASE",
            "SUPPORT_EMAILS",
            "FROM_EMAIL",
        ] {
            std::env::remove_var(key);
        }
    }

    // ==================== DeliveryKind Tests ====================

    #[test]
    fn test_parse_delivery_kind() {
        assert_eq!(DeliveryKind::parse("log").unwrap(), DeliveryKind::Log);
        assert_eq!(DeliveryKind::parse("email").unwrap(), DeliveryKind::Email);
        assert_eq!(
            DeliveryKind::parse("database").unwrap(),
            DeliveryKind::Database
        );
    }

    #[test]
    fn test_parse_delivery_kind_case_insensitive() {
        assert_eq!(DeliveryKind::parse("EMAIL").unwrap(), DeliveryKind::Email);
        assert_eq!(DeliveryKind::parse("Log").unwrap(), DeliveryKind::Log);
    }

    #[test]
    fn test_parse_delivery_kind_invalid() {
        let result = DeliveryKind::parse("carrier-pigeon");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown delivery strategy"));
    }

    // ==================== from_env Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().expect("Should load with defaults");

        assert_eq!(config.port, 8080);
        assert_eq!(config.delivery_strategy, DeliveryKind::Log);
        assert_eq!(config.database_path, "parkpool.db");
        assert!(config.resend_api_key.is_none());
        assert_eq!(config.resend_api_base, "https://api.resend.com");
        assert!(config.support_emails.is_empty());
        assert_eq!(config.from_email, "support@parkpool.tech");
    }

    #[test]
    #[serial]
    fn test_from_env_custom_values() {
        clear_env();
        std::env::set_var("PORT", "9090");
        std::env::set_var("DELIVERY_STRATEGY", "email");
        std::env::set_var("RESEND_API_KEY", "re_test_key");
        std::env::set_var(
            "SUPPORT_EMAILS",
            "ana@fixitg.com, juan@fixitg.com ,, maria@fixitg.com",
        );

        let config = Config::from_env().expect("Should load");

        assert_eq!(config.port, 9090);
        assert_eq!(config.delivery_strategy, DeliveryKind::Email);
        assert_eq!(config.resend_api_key, Some("re_test_key".to_string()));
        assert_eq!(
            config.support_emails,
            vec!["ana@fixitg.com", "juan@fixitg.com", "maria@fixitg.com"]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_strategy_fails() {
        clear_env();
        std::env::set_var("DELIVERY_STRATEGY", "postcard");

        let result = Config::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_empty_api_key_treated_as_missing() {
        clear_env();
        std::env::set_var("RESEND_API_KEY", "");

        let config = Config::from_env().expect("Should load");
        assert!(config.resend_api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port_falls_back_to_default() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.port, 8080);

        clear_env();
    }
}
