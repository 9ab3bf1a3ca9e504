//! Message catalogs for the supported locales.
//!
//! Both locales share the `Messages` struct, so the compiler enforces that
//! the catalogs cover exactly the same keys. Adding a message to one locale
//! without the other is a type error, not a runtime gap.

/// Full message catalog for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub common: CommonMessages,
    pub support: SupportMessages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonMessages {
    pub language_name: &'static str,
    pub back_to_home: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportMessages {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub name_label: &'static str,
    pub name_placeholder: &'static str,
    pub email_label: &'static str,
    pub email_placeholder: &'static str,
    pub type_label: &'static str,
    pub type_placeholder: &'static str,
    pub type_options: RequestTypeLabels,
    pub description_label: &'static str,
    pub description_placeholder: &'static str,
    pub submit_button: &'static str,
    pub submitting: &'static str,
    pub success_title: &'static str,
    pub success_message: &'static str,
    pub error_generic: &'static str,
    pub error_connection: &'static str,
}

/// Display labels for the support request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTypeLabels {
    pub web_issue: &'static str,
    pub mobile_issue: &'static str,
    pub suggestion: &'static str,
    pub payment_issue: &'static str,
    pub other: &'static str,
}

impl Messages {
    /// Every leaf string in the catalog, in declaration order. Used by
    /// tests to assert catalog completeness.
    pub fn leaves(&self) -> Vec<&'static str> {
        vec![
            self.common.language_name,
            self.common.back_to_home,
            self.support.title,
            self.support.subtitle,
            self.support.name_label,
            self.support.name_placeholder,
            self.support.email_label,
            self.support.email_placeholder,
            self.support.type_label,
            self.support.type_placeholder,
            self.support.type_options.web_issue,
            self.support.type_options.mobile_issue,
            self.support.type_options.suggestion,
            self.support.type_options.payment_issue,
            self.support.type_options.other,
            self.support.description_label,
            self.support.description_placeholder,
            self.support.submit_button,
            self.support.submitting,
            self.support.success_title,
            self.support.success_message,
            self.support.error_generic,
            self.support.error_connection,
        ]
    }
}

pub static ES_MESSAGES: Messages = Messages {
    common: CommonMessages {
        language_name: "Español",
        back_to_home: "Volver al inicio",
    },
    support: SupportMessages {
        title: "Soporte",
        subtitle: "¿Tienes un problema o una sugerencia? Escríbenos y te responderemos pronto.",
        name_label: "Nombre",
        name_placeholder: "Tu nombre",
        email_label: "Email",
        email_placeholder: "tu@email.com",
        type_label: "Tipo de solicitud",
        type_placeholder: "Selecciona una opción",
        type_options: RequestTypeLabels {
            web_issue: "Problema con la web",
            mobile_issue: "Problema con la app móvil",
            suggestion: "Sugerencia",
            payment_issue: "Problema con un pago",
            other: "Otro",
        },
        description_label: "Descripción",
        description_placeholder: "Cuéntanos qué pasó o qué necesitas...",
        submit_button: "Enviar solicitud",
        submitting: "Enviando...",
        success_title: "¡Solicitud enviada!",
        success_message: "Te contactaremos pronto",
        error_generic: "Error al procesar la solicitud",
        error_connection: "Error de conexión. Inténtalo de nuevo.",
    },
};

pub static EN_MESSAGES: Messages = Messages {
    common: CommonMessages {
        language_name: "English",
        back_to_home: "Back to home",
    },
    support: SupportMessages {
        title: "Support",
        subtitle: "Found a problem or have a suggestion? Write to us and we will get back to you soon.",
        name_label: "Name",
        name_placeholder: "Your name",
        email_label: "Email",
        email_placeholder: "you@email.com",
        type_label: "Request type",
        type_placeholder: "Select an option",
        type_options: RequestTypeLabels {
            web_issue: "Issue with the website",
            mobile_issue: "Issue with the mobile app",
            suggestion: "Suggestion",
            payment_issue: "Issue with a payment",
            other: "Other",
        },
        description_label: "Description",
        description_placeholder: "Tell us what happened or what you need...",
        submit_button: "Send request",
        submitting: "Sending...",
        success_title: "Request sent!",
        success_message: "We will contact you soon",
        error_generic: "Something went wrong processing your request",
        error_connection: "Connection error. Please try again.",
    },
};
