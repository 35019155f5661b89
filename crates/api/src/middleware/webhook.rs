//! Shared-secret authentication for automation callbacks.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use content_engine_core::error::CoreError;
use content_engine_core::hashing::secrets_match;

use crate::automation::WEBHOOK_SECRET_HEADER;
use crate::config::Environment;
use crate::error::AppError;
use crate::state::AppState;

/// Proof that a request carried the callback secret (or that the deployment
/// runs in development without one).
///
/// Runs before the body is read, so a bad secret is rejected with 401 no
/// matter what the payload contains:
///
/// ```ignore
/// async fn callback(_caller: WebhookCaller, ValidatedJson(body): ValidatedJson<CallbackRequest>) { .. }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WebhookCaller;

impl FromRequestParts<AppState> for WebhookCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        verify_webhook_secret(
            state.config.automation.callback_secret.as_deref(),
            provided,
            state.config.environment,
        )?;
        Ok(WebhookCaller)
    }
}

/// Check a provided secret against the configured one.
///
/// With no secret configured, only development deployments accept callbacks.
pub fn verify_webhook_secret(
    expected: Option<&str>,
    provided: Option<&str>,
    environment: Environment,
) -> Result<(), CoreError> {
    match (expected, provided) {
        (Some(expected), Some(provided)) if secrets_match(provided, expected) => Ok(()),
        (Some(_), provided) => {
            tracing::warn!(header_present = provided.is_some(), "Rejected callback with bad webhook secret");
            Err(CoreError::Unauthorized("Invalid webhook secret".into()))
        }
        (None, _) if environment.is_development() => {
            tracing::debug!("No callback secret configured, accepting in development");
            Ok(())
        }
        (None, _) => {
            tracing::warn!(
                environment = environment.as_str(),
                "Rejected callback: no callback secret configured"
            );
            Err(CoreError::Unauthorized(
                "Webhook secret not configured".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn matching_secret_is_accepted() {
        assert!(verify_webhook_secret(Some("s3"), Some("s3"), Environment::Production).is_ok());
    }

    #[test]
    fn mismatched_or_missing_secret_is_rejected_everywhere() {
        for env in [Environment::Development, Environment::Production] {
            assert_matches!(
                verify_webhook_secret(Some("s3"), Some("nope"), env),
                Err(CoreError::Unauthorized(_))
            );
            assert_matches!(
                verify_webhook_secret(Some("s3"), None, env),
                Err(CoreError::Unauthorized(_))
            );
        }
    }

    #[test]
    fn unset_secret_only_allowed_in_development() {
        assert!(verify_webhook_secret(None, None, Environment::Development).is_ok());
        assert_matches!(
            verify_webhook_secret(None, None, Environment::Production),
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            verify_webhook_secret(None, Some("anything"), Environment::Test),
            Err(CoreError::Unauthorized(_))
        );
    }
}
