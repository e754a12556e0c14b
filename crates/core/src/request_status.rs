//! Status lifecycle shared by custom design and customization requests.
//!
//! ```text
//! pending  -> quoted, rejected
//! quoted   -> approved, rejected
//! approved -> completed
//! rejected, completed: terminal
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of free-text request fields (description, preferences).
pub const MAX_REQUEST_TEXT_LENGTH: usize = 5_000;

/// Maximum number of reference images attached to a request.
pub const MAX_REQUEST_IMAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Quoted,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        Self::Pending,
        Self::Quoted,
        Self::Approved,
        Self::Rejected,
        Self::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Statuses reachable from `self` in one step.
    pub fn valid_transitions(self) -> &'static [RequestStatus] {
        match self {
            Self::Pending => &[Self::Quoted, Self::Rejected],
            Self::Quoted => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Completed],
            Self::Rejected | Self::Completed => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid request status '{s}'. Must be one of: pending, quoted, approved, rejected, completed"
                ))
            })
    }
}

/// Validate a status change, including the quote a `quoted` status needs.
pub fn validate_transition(
    current: RequestStatus,
    next: RequestStatus,
    quoted_price: Option<f64>,
) -> Result<(), CoreError> {
    if !current.valid_transitions().contains(&next) {
        return Err(CoreError::Conflict(format!(
            "Cannot move request from '{current}' to '{next}'. Allowed: {:?}",
            current
                .valid_transitions()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
        )));
    }
    if next == RequestStatus::Quoted {
        match quoted_price {
            Some(price) if price.is_finite() && price > 0.0 => {}
            _ => {
                return Err(CoreError::Validation(
                    "A quote requires a positive quoted_price".to_string(),
                ))
            }
        }
    }
    Ok(())
}

/// Validate the free-text and image fields of a new request.
pub fn validate_request_fields(
    description: &str,
    stone_preferences: Option<&str>,
    image_urls: &[String],
) -> Result<(), CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "A request needs a description".to_string(),
        ));
    }
    for (field, value) in [("description", Some(description)), ("stone_preferences", stone_preferences)] {
        if value.is_some_and(|v| v.len() > MAX_REQUEST_TEXT_LENGTH) {
            return Err(CoreError::Validation(format!(
                "{field} exceeds maximum length of {MAX_REQUEST_TEXT_LENGTH} characters"
            )));
        }
    }
    if image_urls.len() > MAX_REQUEST_IMAGES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_REQUEST_IMAGES} reference images are allowed"
        )));
    }
    Ok(())
}
