//! Locale type: the closed set of languages the site ships in.

use anyhow::{bail, Result};

use crate::i18n::strings::{Messages, EN_MESSAGES, ES_MESSAGES};

/// A supported site locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// Spanish, the primary locale and universal fallback
    Es,
    /// English, the secondary locale
    En,
}

impl Locale {
    /// The locale every session starts in and every fallback resolves to.
    pub const DEFAULT: Locale = Locale::Es;

    /// Parse an ISO 639-1 code.
    ///
    /// Unknown codes are an error at this level. Callers that consume
    /// untrusted codes (e.g. a stored preference) decide whether to
    /// surface or swallow it.
    pub fn from_code(code: &str) -> Result<Locale> {
        match code {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            other => bail!("Unsupported locale code: '{}'", other),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    /// Name of the language in that language, for locale switchers.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::Es => "Español",
            Locale::En => "English",
        }
    }

    /// The full message catalog for this locale.
    pub fn messages(&self) -> &'static Messages {
        match self {
            Locale::Es => &ES_MESSAGES,
            Locale::En => &EN_MESSAGES,
        }
    }
}
