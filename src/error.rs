//! Error taxonomy shared by the client, controllers and forms

use thiserror::Error;

/// Every failure a console operation can report.
///
/// Cloneable so controllers can keep the last failure in their state
/// while also returning it to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// No authenticated session, or the token could not be obtained
    #[error("not signed in")]
    Auth,

    /// Transport failure (DNS, refused connection, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("{}", http_message(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    /// A 2xx response body that is not the JSON we expected
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Local draft or payload validation failed
    #[error("{0}")]
    Validation(String),

    /// Referenced entity is absent from a freshly loaded collection
    #[error("{0} not found")]
    NotFound(String),
}

fn http_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("request failed with status {}", status),
    }
}

/// Where an error belongs when it is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Full-page "please sign in" state
    SignIn,
    /// Shown with a retry affordance
    Retry,
    /// Next to the action that triggered it
    Inline,
    /// Inside the open form, draft kept
    Form,
    /// Page-level error, retrying the same action will not help
    Page,
}

impl ConsoleError {
    pub fn surface(&self) -> Surface {
        match self {
            ConsoleError::Auth => Surface::SignIn,
            ConsoleError::Network(_) => Surface::Retry,
            ConsoleError::Http { .. } => Surface::Inline,
            ConsoleError::Validation(_) => Surface::Form,
            ConsoleError::NotFound(_) | ConsoleError::Decode(_) => Surface::Page,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.surface(), Surface::Retry)
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_display_prefers_detail() {
        let err = ConsoleError::Http {
            status: 422,
            detail: Some("field required".to_string()),
        };
        assert_eq!(err.to_string(), "field required");

        let err = ConsoleError::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "request failed with status 500");
    }

    #[test]
    fn test_surface_mapping() {
        assert_eq!(ConsoleError::Auth.surface(), Surface::SignIn);
        assert_eq!(ConsoleError::Network("timeout".into()).surface(), Surface::Retry);
        assert_eq!(ConsoleError::Validation("bad".into()).surface(), Surface::Form);
        assert_eq!(ConsoleError::NotFound("Project".into()).surface(), Surface::Page);
        assert!(ConsoleError::Network("refused".into()).is_retryable());
        assert!(!ConsoleError::Auth.is_retryable());
    }
}
