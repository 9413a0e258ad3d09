//! Result shape handed to presentation code.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// `{ success, data?, error? }`: the form call sites convert fetch results
/// into before rendering a value, an error message or a not-found view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult<T> {
    /// Whether the call succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the upstream reported the record as missing.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
}

const fn none<T>() -> Option<T> {
    None
}

impl<T> ActionResult<T> {
    /// A successful result.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            not_found: false,
        }
    }

    /// A failed result with a user-facing message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            not_found: false,
        }
    }

    /// A failed result for a missing record.
    #[must_use]
    pub fn missing(error: impl Into<String>) -> Self {
        Self {
            not_found: true,
            ..Self::failure(error)
        }
    }

    /// Converts a fetch result, keeping only the error's message.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }

    /// Returns true when the view should render its not-found state.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.not_found || (self.success && self.data.is_none())
    }

    /// Converts back into a `Result` with the message as error.
    ///
    /// # Errors
    ///
    /// Returns the stored message when the result is not successful.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_ok_result() {
        let result: ActionResult<u32> = ActionResult::from_result(Ok::<_, String>(25));
        assert!(result.success);
        assert_eq!(result.data, Some(25));
        assert!(!result.is_not_found());
    }

    #[test]
    fn test_from_err_result_keeps_message() {
        let result: ActionResult<u32> = ActionResult::from_result(Err("upstream down"));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("upstream down"));
        assert_eq!(result.into_result(), Err("upstream down".to_string()));
    }

    #[test]
    fn test_missing_is_not_found() {
        let result: ActionResult<u32> = ActionResult::missing("no such pokemon");
        assert!(result.is_not_found());
        assert!(!result.success);
    }

    #[test]
    fn test_serialised_shape() {
        let json = serde_json::to_value(ActionResult::<u32>::failure("boom")).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "success": false, "error": "boom" }))
        );
    }
}
