//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::SentimentError;
    use std::time::Duration;

    #[test]
    fn test_config_error() {
        let err = SentimentError::Config("Missing feed url".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Missing feed url"));
    }

    #[test]
    fn test_empty_registry() {
        let err = SentimentError::EmptyRegistry;
        assert_eq!(err.to_string(), "Entity registry is empty");
    }

    #[test]
    fn test_invalid_entity() {
        let err = SentimentError::InvalidEntity {
            id: "AAPL".to_string(),
            reason: "alias set is empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("alias set is empty"));
    }

    #[test]
    fn test_source_unavailable() {
        let err = SentimentError::SourceUnavailable {
            source_name: "Reuters Business".to_string(),
            reason: "HTTP 503".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Source unavailable"));
        assert!(msg.contains("Reuters Business"));
        assert!(err.is_source_failure());
    }

    #[test]
    fn test_timeout() {
        let err = SentimentError::Timeout {
            source_name: "TechCrunch".to_string(),
            after: Duration::from_secs(15),
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("15s"));
        assert!(err.is_source_failure());
    }

    #[test]
    fn test_timeout_under_a_second() {
        let err = SentimentError::Timeout {
            source_name: "TechCrunch".to_string(),
            after: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_feed_parse_is_source_failure() {
        let err = SentimentError::FeedParse("unexpected EOF".to_string());
        assert!(err.to_string().contains("Feed parse error"));
        assert!(err.is_source_failure());
    }

    #[test]
    fn test_config_is_not_source_failure() {
        assert!(!SentimentError::EmptyRegistry.is_source_failure());
        assert!(!SentimentError::Config("x".into()).is_source_failure());
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SentimentError = io.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = SentimentError::InvalidEntity {
            id: "AAPL".to_string(),
            reason: "duplicate id".to_string(),
        };
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidEntity"));
    }
}
