/*!
 * Tests for error types
 */

use tixobot::errors::{AssistantError, CatalogError, ProviderError};

#[test]
fn test_providerError_fromStatus_shouldPickVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(503, "busy".to_string()),
        ProviderError::ApiError { status_code: 503, .. }
    ));
}

#[test]
fn test_providerError_isRetryable() {
    assert!(ProviderError::Timeout(30).is_retryable());
    assert!(ProviderError::ConnectionError("reset".to_string()).is_retryable());
    assert!(ProviderError::from_status(500, String::new()).is_retryable());
    assert!(!ProviderError::from_status(400, String::new()).is_retryable());
    assert!(!ProviderError::AuthenticationError(String::new()).is_retryable());
    assert!(!ProviderError::ParseError(String::new()).is_retryable());
}

#[test]
fn test_errorMessages_shouldBeReadable() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "Internal".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 500 - Internal");

    let error = AssistantError::from(CatalogError::EmptyQuestion { index: 3 });
    assert_eq!(error.to_string(), "Catalog error: Catalog entry 3 has an empty question");

    let error = AssistantError::from(ProviderError::Timeout(5));
    assert!(error.to_string().contains("timed out after 5 seconds"));
}
