//! Contact form submissions.

use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub message: String,
}

impl ContactForm {
    /// Trim every field, then validate.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.message = self.message.trim().to_string();
        self.phone = self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        self.subject = self.subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.validate()?;
        Ok(self)
    }
}
