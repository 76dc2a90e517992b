//! Submit-time validation for the two local-only site forms.
//!
//! Both forms re-run every check on each submit attempt, clearing whatever
//! messages the previous attempt left behind. Neither form performs any
//! network request; success is purely a banner plus a field reset.

use serde::Serialize;

use crate::errors::AppError;
use crate::validate::FieldValidator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FormMessage {
    /// Inline error rendered immediately after the named field.
    Error { field: String, text: String },
    /// Banner rendered at the top of the form.
    Success { text: String },
}

impl FormMessage {
    fn error(field: &str, text: &str) -> Self {
        Self::Error {
            field: field.to_string(),
            text: text.to_string(),
        }
    }

    fn success(text: &str) -> Self {
        Self::Success {
            text: text.to_string(),
        }
    }
}

/// The contact form: full name, email address, message body.
#[derive(Debug, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    messages: Vec<FormMessage>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all checks; on any failure the form is not submitted.
    pub fn submit(&mut self) -> bool {
        self.messages.clear();

        if let Err(AppError::Validation { field, message }) =
            FieldValidator::require("name", &self.name, "Full Name is required.")
        {
            self.messages.push(FormMessage::error(&field, &message));
        }

        if let Err(AppError::Validation { field, message }) = FieldValidator::validate_email(
            "email",
            &self.email,
            "A valid Email Address is required.",
        ) {
            self.messages.push(FormMessage::error(&field, &message));
        }

        if let Err(AppError::Validation { field, message }) =
            FieldValidator::require("message", &self.message, "Message is required.")
        {
            self.messages.push(FormMessage::error(&field, &message));
        }

        if !self.messages.is_empty() {
            return false;
        }

        self.messages
            .push(FormMessage::success("Thank you! Your message has been sent."));
        self.reset_fields();
        true
    }

    fn reset_fields(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    pub fn messages(&self) -> &[FormMessage] {
        &self.messages
    }
}

/// The newsletter signup form: a single email field.
#[derive(Debug, Default)]
pub struct NewsletterForm {
    pub email: String,
    messages: Vec<FormMessage>,
}

impl NewsletterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self) -> bool {
        self.messages.clear();

        if FieldValidator::validate_email("email", &self.email, "").is_err() {
            self.messages.push(FormMessage::error(
                "email",
                "Please enter a valid email address.",
            ));
            return false;
        }

        self.messages
            .push(FormMessage::success("Subscribed! Thank you."));
        self.email.clear();
        true
    }

    pub fn messages(&self) -> &[FormMessage] {
        &self.messages
    }
}
