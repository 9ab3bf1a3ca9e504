//! Site internationalization: supported locales, message catalogs and the
//! per-visitor locale resolution session.
//!
//! Spanish is the product's primary language and the fallback for every
//! resolution path. English is offered as the secondary locale. The set of
//! locales is a closed enum, so a message catalog for an unsupported locale
//! cannot exist.

pub mod locale;
pub mod resolver;
pub mod strings;

pub use locale::Locale;
pub use resolver::{
    detect_client_locale, FilePreferenceStore, LocaleSession, PreferenceStore, PREFERENCE_KEY,
};
pub use strings::Messages;
