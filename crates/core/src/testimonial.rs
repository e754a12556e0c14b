//! Testimonial submission and moderation.
//!
//! ```text
//! pending  -> approved | rejected
//! approved -> deleted
//! rejected -> deleted
//! ```
//!
//! Repeating the transition a testimonial already went through is a no-op,
//! so every moderation call is idempotent.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid moderation status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// An admin moderation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
    Delete,
}

/// What the repository should do for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationOutcome {
    /// Persist the new status.
    Transition(ModerationStatus),
    /// Already in the requested state; nothing to write.
    Unchanged,
    /// Remove the row.
    Delete,
}

/// Decide the outcome of `action` on a testimonial in `current`.
pub fn moderate(
    current: ModerationStatus,
    action: ModerationAction,
) -> Result<ModerationOutcome, CoreError> {
    use ModerationAction as A;
    use ModerationStatus as S;

    match (current, action) {
        (S::Pending, A::Approve) => Ok(ModerationOutcome::Transition(S::Approved)),
        (S::Pending, A::Reject) => Ok(ModerationOutcome::Transition(S::Rejected)),
        (S::Approved, A::Approve) | (S::Rejected, A::Reject) => Ok(ModerationOutcome::Unchanged),
        (S::Approved | S::Rejected, A::Delete) => Ok(ModerationOutcome::Delete),
        (S::Pending, A::Delete) => Err(CoreError::Conflict(
            "Pending testimonials must be approved or rejected before deletion".to_string(),
        )),
        (S::Approved, A::Reject) => Err(CoreError::Conflict(
            "Approved testimonials can only be deleted".to_string(),
        )),
        (S::Rejected, A::Approve) => Err(CoreError::Conflict(
            "Rejected testimonials cannot be approved".to_string(),
        )),
    }
}

/// Customer testimonial submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestimonialSubmission {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(min = 10, max = 5000, message = "must be 10-5000 characters"))]
    pub story: String,
    #[serde(default)]
    #[validate(length(max = 5, message = "at most 5 images"))]
    pub image_urls: Vec<String>,
    #[validate(length(max = 100))]
    pub product_type: Option<String>,
    pub purchase_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn submission() -> TestimonialSubmission {
        TestimonialSubmission {
            name: "Priya".into(),
            rating: 5,
            story: "The engagement ring was perfect.".into(),
            image_urls: vec![],
            product_type: Some("ring".into()),
            purchase_date: None,
        }
    }

    #[test]
    fn pending_moves_to_approved_or_rejected() {
        assert_eq!(
            moderate(ModerationStatus::Pending, ModerationAction::Approve).unwrap(),
            ModerationOutcome::Transition(ModerationStatus::Approved)
        );
        assert_eq!(
            moderate(ModerationStatus::Pending, ModerationAction::Reject).unwrap(),
            ModerationOutcome::Transition(ModerationStatus::Rejected)
        );
    }

    #[test]
    fn repeating_a_transition_is_a_no_op() {
        assert_eq!(
            moderate(ModerationStatus::Approved, ModerationAction::Approve).unwrap(),
            ModerationOutcome::Unchanged
        );
        assert_eq!(
            moderate(ModerationStatus::Rejected, ModerationAction::Reject).unwrap(),
            ModerationOutcome::Unchanged
        );
    }

    #[test]
    fn only_moderated_testimonials_can_be_deleted() {
        assert_eq!(
            moderate(ModerationStatus::Approved, ModerationAction::Delete).unwrap(),
            ModerationOutcome::Delete
        );
        assert_eq!(
            moderate(ModerationStatus::Rejected, ModerationAction::Delete).unwrap(),
            ModerationOutcome::Delete
        );
        assert_matches!(
            moderate(ModerationStatus::Pending, ModerationAction::Delete),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn terminal_states_do_not_flip() {
        assert!(moderate(ModerationStatus::Rejected, ModerationAction::Approve).is_err());
        assert!(moderate(ModerationStatus::Approved, ModerationAction::Reject).is_err());
    }

    #[test]
    fn status_parses_from_str() {
        assert_eq!("approved".parse::<ModerationStatus>().unwrap(), ModerationStatus::Approved);
        assert!("deleted".parse::<ModerationStatus>().is_err());
    }

    #[test]
    fn submission_validates_rating_range() {
        assert!(submission().validate().is_ok());

        let mut s = submission();
        s.rating = 6;
        let err = CoreError::from(s.validate().unwrap_err());
        assert!(err.to_string().contains("rating"));

        let mut s = submission();
        s.rating = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn submission_requires_a_real_story() {
        let mut s = submission();
        s.story = "ok".into();
        assert!(s.validate().is_err());
    }
}
