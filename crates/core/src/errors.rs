use thiserror::Error;

/// Caller mistakes. Surfaced immediately with a 4xx-equivalent signal;
/// no session state is touched when one of these is raised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("user_offer must be a numeric value")]
    NonNumericOffer,
    #[error("user_offer must be a finite number, got `{raw}`")]
    NonFiniteOffer { raw: String },
    #[error("user_message must be a non-empty string")]
    EmptyMessage,
    #[error("user_id must not be blank when provided")]
    BlankUserId,
}

impl InputError {
    /// Message safe to echo back to the caller verbatim.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NonNumericOffer | Self::NonFiniteOffer { .. } => {
                "Invalid input. Please provide a numeric value for user offer."
            }
            Self::EmptyMessage => "Invalid input. Please provide a message to analyze.",
            Self::BlankUserId => "Invalid input. Please provide a non-blank user id.",
        }
    }
}

/// Failures of the external collaborators (sentiment source, counteroffer
/// formatter). Always recovered inside the service layer: sentiment falls
/// back to neutral polarity, formatting falls back to the local template.
/// Never surfaced to the caller as a hard failure.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator request failed: {0}")]
    Unavailable(#[source] anyhow::Error),
    #[error("collaborator timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("collaborator returned a malformed reply: {detail}")]
    MalformedReply { detail: String },
}

#[cfg(test)]
mod tests {
    use super::{CollaboratorError, InputError};

    #[test]
    fn input_errors_have_caller_safe_messages() {
        assert_eq!(
            InputError::NonNumericOffer.user_message(),
            "Invalid input. Please provide a numeric value for user offer."
        );
        assert_eq!(
            InputError::EmptyMessage.user_message(),
            "Invalid input. Please provide a message to analyze."
        );
    }

    #[test]
    fn collaborator_timeout_names_the_budget() {
        let error = CollaboratorError::Timeout { timeout_secs: 5 };
        assert_eq!(error.to_string(), "collaborator timed out after 5s");
    }
}
