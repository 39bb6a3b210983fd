//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use crate::errors::FolioChatError;
    use std::io;

    // ====== Error Type Tests ======

    #[test]
    fn test_api_status_error() {
        let error = FolioChatError::ApiStatus(401);
        assert_eq!(format!("{error}"), "API request failed: 401");
    }

    #[test]
    fn test_config_error() {
        let error = FolioChatError::ConfigError("Invalid configuration".to_string());
        assert!(matches!(error, FolioChatError::ConfigError(_)));
        let display = format!("{error}");
        assert!(display.contains("configuration"));
    }

    #[test]
    fn test_stream_read_error() {
        let error = FolioChatError::StreamRead("connection reset".to_string());
        assert_eq!(format!("{error}"), "Stream read error: connection reset");
    }

    #[test]
    fn test_session_store_error() {
        let error = FolioChatError::SessionStore("state file is not a JSON object".to_string());
        assert!(matches!(error, FolioChatError::SessionStore(_)));
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let chat_err: FolioChatError = io_err.into();

        assert!(matches!(chat_err, FolioChatError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse_result: Result<serde_json::Value, _> = serde_json::from_str("{invalid json}");

        if let Err(json_err) = parse_result {
            let chat_err: FolioChatError = json_err.into();
            assert!(matches!(chat_err, FolioChatError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_from_toml() {
        let parse_result: Result<toml::Value, _> = toml::from_str("key = ");

        if let Err(toml_err) = parse_result {
            let chat_err: FolioChatError = toml_err.into();
            assert!(matches!(chat_err, FolioChatError::TomlParsing(_)));
        }
    }

    // ====== Error Debug/Display Tests ======

    #[test]
    fn test_error_debug_format() {
        let error = FolioChatError::ConfigError("Debug test".to_string());
        let debug = format!("{error:?}");
        assert!(debug.contains("ConfigError"));
    }
}
