//! Request thread comments.
//!
//! Both custom design requests and customization requests carry a thread of
//! comments from the customer and the admin team. A comment needs text, an
//! image, or both.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length for a comment's text content.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Which kind of request a comment thread belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadKind {
    CustomDesign,
    Customization,
}

impl ThreadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CustomDesign => "custom_design",
            Self::Customization => "customization",
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::CustomDesign => "CustomDesignRequest",
            Self::Customization => "CustomizationRequest",
        }
    }
}

/// Who wrote a comment, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAuthor {
    Admin,
    Customer,
}

impl CommentAuthor {
    pub fn from_is_admin(is_admin: bool) -> Self {
        if is_admin {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate comment content: at least one of text or image must be present.
pub fn validate_comment(content: Option<&str>, image_url: Option<&str>) -> Result<(), CoreError> {
    let text = present(content);
    if text.is_none() && present(image_url).is_none() {
        return Err(CoreError::Validation(
            "A comment must have text content or an image".to_string(),
        ));
    }
    if let Some(text) = text {
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Normalize optional comment text: trim, and drop when blank.
pub fn normalize_content(content: Option<String>) -> Option<String> {
    content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
