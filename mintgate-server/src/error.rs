//! HTTP mapping for the workflow error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mintgate::error::{FulfillError, MintError};

/// Wraps a [`FulfillError`] for conversion into an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct GateHttpError(#[from] FulfillError);

impl IntoResponse for GateHttpError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Client can fix and resubmit.
            FulfillError::Validation(_) | FulfillError::PaymentNotVerified => {
                StatusCode::BAD_REQUEST
            }
            // Evidence could not be obtained; retryable, not a payment failure.
            FulfillError::Chain(_) | FulfillError::Mint(MintError::Chain(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            FulfillError::Mint(MintError::Rejected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "notify request failed");
        } else {
            tracing::warn!(error = %self.0, "notify request rejected");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintgate::error::{ChainError, ValidationError};

    fn status_of(err: FulfillError) -> StatusCode {
        GateHttpError(err).into_response().status()
    }

    #[test]
    fn validation_and_unverified_are_client_errors() {
        assert_eq!(
            status_of(ValidationError::MissingTxHash.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(FulfillError::PaymentNotVerified),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn chain_outage_is_retryable_not_a_client_error() {
        assert_eq!(
            status_of(ChainError::Unavailable("down".to_owned()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(FulfillError::Mint(MintError::Chain(
                ChainError::Timeout(std::time::Duration::from_secs(30))
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn mint_rejection_is_an_internal_error() {
        assert_eq!(
            status_of(FulfillError::Mint(MintError::Rejected(
                "payment id already used".to_owned()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
