//! Generic error handling utilities
//!
//! Provides unified error handling that can work across different error types
//! while maintaining domain-specific error logging patterns.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// User-actionable errors (like validation failures or bad configuration)
/// should show specific messages; system errors (like hardware or IO faults)
/// show generic context with debug details, so users are not overwhelmed by
/// driver internals.
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; when it returns `false`, `user_message()` should return
/// `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    /// that should be displayed directly to the user
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// - Specific messages for user-actionable errors (preserves detail)
/// - Generic context with debug details for system errors
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    if error.is_user_actionable() {
        if let Some(user_msg) = error.user_message() {
            log::error!("{}: {}", operation_context, user_msg);
        } else {
            log::error!("{} failed", operation_context);
        }
    } else {
        log::error!("{} failed", operation_context);
    }
    // Detail only at debug level
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct TestSystemError;

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "device ioctl failed with errno 5")
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_contract() {
        let err = TestUserError {
            message: "tag id cannot be empty".to_string(),
        };
        assert!(err.is_user_actionable());
        assert_eq!(err.user_message(), Some("tag id cannot be empty"));
    }

    #[test]
    fn test_system_error_contract() {
        let err = TestSystemError;
        assert!(!err.is_user_actionable());
        assert!(err.user_message().is_none());
    }

    #[test]
    fn test_log_error_with_context_does_not_panic() {
        let user_err = TestUserError {
            message: "target cannot be empty".to_string(),
        };
        log_error_with_context(&user_err, "Adding mapping");

        let sys_err = TestSystemError;
        log_error_with_context(&sys_err, "Opening scanner");
    }
}
