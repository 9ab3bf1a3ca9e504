//! Per-visitor locale resolution.
//!
//! A session always starts in the default locale so the first render never
//! blocks on storage. Resolution then runs once, applying the precedence
//! chain: stored preference, then the client's reported language, then the
//! default. Explicit switches win over everything and are persisted for
//! future sessions.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::i18n::Locale;

/// Name of the durable slot the preference is kept under.
pub const PREFERENCE_KEY: &str = "parkpool-locale";

/// Durable storage for the visitor's locale preference.
///
/// Load failures are tolerated by the resolver (the chain falls through),
/// save failures are tolerated by the switcher (the session still changes
/// locale). Both are logged.
pub trait PreferenceStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, code: &str) -> Result<()>;
}

/// Preference store backed by a single file named after [`PREFERENCE_KEY`]
/// inside the given directory.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(PREFERENCE_KEY),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read locale preference"),
        }
    }

    fn save(&self, code: &str) -> Result<()> {
        fs::write(&self.path, code).context("Failed to write locale preference")
    }
}

/// Map the client's reported language (e.g. `en-US`, `es-MX`) to a locale.
/// Only the primary subtag matters; anything that is not English resolves
/// to the default.
pub fn detect_client_locale(client_language: Option<&str>) -> Locale {
    let primary = match client_language {
        Some(tag) => tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase(),
        None => return Locale::DEFAULT,
    };

    if primary == "en" {
        Locale::En
    } else {
        Locale::DEFAULT
    }
}

/// One visitor's locale state.
pub struct LocaleSession<S: PreferenceStore> {
    store: S,
    resolved: Option<Locale>,
}

impl<S: PreferenceStore> LocaleSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            resolved: None,
        }
    }

    /// Current locale. Before resolution this is the default, so callers
    /// always have a usable locale.
    pub fn locale(&self) -> Locale {
        self.resolved.unwrap_or(Locale::DEFAULT)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Message catalog for the current locale.
    pub fn messages(&self) -> &'static crate::i18n::Messages {
        self.locale().messages()
    }

    /// Run the precedence chain once: stored preference, client language,
    /// default. Later calls return the already resolved locale without
    /// touching storage.
    pub fn resolve(&mut self, client_language: Option<&str>) -> Locale {
        if let Some(locale) = self.resolved {
            return locale;
        }

        let stored = match self.store.load() {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable locale preference: {:#}", e);
                None
            }
        };

        let locale = match stored.as_deref() {
            Some(code) => match Locale::from_code(code) {
                Ok(locale) => locale,
                Err(_) => {
                    warn!("Ignoring invalid stored locale '{}'", code);
                    detect_client_locale(client_language)
                }
            },
            None => detect_client_locale(client_language),
        };

        self.resolved = Some(locale);
        locale
    }

    /// Switch to an explicit locale and persist it. The switch applies to
    /// the session even if persisting fails.
    pub fn switch_locale(&mut self, locale: Locale) {
        self.resolved = Some(locale);
        if let Err(e) = self.store.save(locale.code()) {
            warn!("Failed to persist locale preference: {:#}", e);
        }
    }
}
