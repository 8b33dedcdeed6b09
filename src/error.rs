use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid startup configuration, including a command
    /// registered twice. Fatal.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Any failed call to the Telegram Bot API, regardless of cause.
    #[error(transparent)]
    OutboundCall(#[from] teloxide::RequestError),
}

/// Banner used for every handler failure written to the log.
pub fn format_error(error: &dyn std::fmt::Display, handler_name: &str) -> String {
    format!(
        "{banner}ERROR RAISED INSIDE {handler_name}{banner}\n {error}",
        banner = "=".repeat(8)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::{ApiError, RequestError};

    #[test]
    fn test_format_contains_handler_and_message() {
        let out = format_error(&"chat not found", "add_handler");
        assert!(out.contains("add_handler"));
        assert!(out.contains("chat not found"));
    }

    #[test]
    fn test_format_banner_layout() {
        let out = format_error(&"boom", "X");
        assert_eq!(out, "========ERROR RAISED INSIDE X========\n boom");
    }

    #[test]
    fn test_format_request_error() {
        let err = RequestError::Api(ApiError::Unknown("TOPIC_ID_INVALID".to_string()));
        let out = format_error(&err, "edit_handler");
        assert!(out.contains("edit_handler"));
        assert!(out.contains("TOPIC_ID_INVALID"));
    }

    #[test]
    fn test_outbound_error_is_transparent() {
        let err: BotError = RequestError::Api(ApiError::Unknown("nope".to_string())).into();
        assert!(err.to_string().contains("nope"));
    }
}
