//! HTTP endpoints of the payment-provider protocol binding.
//!
//! These are the routes the platform runtime calls into. The authorize route drives the
//! full pipeline; the cancel/settle/refund routes answer with canonical acknowledgments;
//! the inbound route acknowledges asynchronous notifications; `/manifest` describes the
//! provider to the platform's discovery mechanism.
//!
//! Request bodies never reach the logs whole: they can carry merchant credentials, so
//! only identifiers and error summaries are recorded.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, response::IntoResponse};
use serde_json::json;
use tracing::instrument;

use crate::connector::{AuthorizeError, PaymentsWayConnector};
use crate::provider::PaymentProvider;
use crate::types::{
    AuthorizationRequest, CancellationRequest, ErrorResponse, InboundRequest, RefundRequest,
    SettlementRequest,
};

/// Builds the protocol router. State is attached by the caller.
pub fn routes() -> Router<Arc<PaymentsWayConnector>> {
    Router::new()
        .route("/manifest", get(get_manifest))
        .route("/payments", post(post_authorize))
        .route("/payments/{payment_id}/cancellations", post(post_cancel))
        .route("/payments/{payment_id}/settlements", post(post_settle))
        .route("/payments/{payment_id}/refunds", post(post_refund))
        .route(
            "/payments/{payment_id}/inbound-request/{action}",
            post(post_inbound),
        )
}

/// `GET /manifest`: describes the provider's payment methods and the custom fields
/// merchants fill in when configuring it.
#[instrument(skip_all)]
async fn get_manifest() -> impl IntoResponse {
    Json(json!({
        "paymentMethods": [
            { "name": "PaymentsWay", "allowsSplit": "disabled" }
        ],
        "customFields": [
            { "name": "merchantId", "type": "text" },
            { "name": "terminalId", "type": "text" },
            { "name": "formId", "type": "text" },
            { "name": "apiKey", "type": "text" }
        ]
    }))
}

/// `POST /payments`: authorizes a payment through the redirect flow.
///
/// Pipeline failures surface as protocol-level errors: configuration problems as 500,
/// gateway failures as 502. The platform decides whether the shopper may retry.
#[instrument(skip_all)]
async fn post_authorize(
    State(connector): State<Arc<PaymentsWayConnector>>,
    Json(body): Json<AuthorizationRequest>,
) -> impl IntoResponse {
    match connector.authorize(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => {
            tracing::warn!(
                payment_id = %body.payment_id,
                error = %error,
                "Authorization failed"
            );
            let status = match error {
                AuthorizeError::IncompleteSettings(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthorizeError::Gateway(_) | AuthorizeError::NoRedirectUrl => {
                    StatusCode::BAD_GATEWAY
                }
            };
            (
                status,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// `POST /payments/{payment_id}/cancellations`: acknowledges a cancellation.
#[instrument(skip_all)]
async fn post_cancel(
    State(connector): State<Arc<PaymentsWayConnector>>,
    Json(body): Json<CancellationRequest>,
) -> impl IntoResponse {
    match connector.cancel(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => unexpected_failure("Cancellation", error),
    }
}

/// `POST /payments/{payment_id}/settlements`: acknowledges a settlement.
#[instrument(skip_all)]
async fn post_settle(
    State(connector): State<Arc<PaymentsWayConnector>>,
    Json(body): Json<SettlementRequest>,
) -> impl IntoResponse {
    match connector.settle(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => unexpected_failure("Settlement", error),
    }
}

/// `POST /payments/{payment_id}/refunds`: acknowledges a refund.
#[instrument(skip_all)]
async fn post_refund(
    State(connector): State<Arc<PaymentsWayConnector>>,
    Json(body): Json<RefundRequest>,
) -> impl IntoResponse {
    match connector.refund(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => unexpected_failure("Refund", error),
    }
}

/// `POST /payments/{payment_id}/inbound-request/{action}`: acknowledges an asynchronous
/// gateway notification relayed by the platform.
#[instrument(skip_all)]
async fn post_inbound(
    State(connector): State<Arc<PaymentsWayConnector>>,
    Path((_payment_id, action)): Path<(String, String)>,
    Json(body): Json<InboundRequest>,
) -> impl IntoResponse {
    tracing::debug!(action = %action, "inbound notification");
    match connector.inbound(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => unexpected_failure("Inbound", error),
    }
}

/// The acknowledgment operations cannot fail today; this keeps the routes honest if
/// that ever changes.
fn unexpected_failure(operation: &str, error: AuthorizeError) -> axum::response::Response {
    tracing::error!(operation, error = %error, "Acknowledgment operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
