//! PaymentsWay implementation of the [`PaymentProvider`] trait.
//!
//! `authorize` runs the full pipeline: resolve provider settings, build and sign the
//! transaction payload, create the transaction at the gateway, and answer with a
//! redirect instruction. The remaining four operations are acknowledgment echoes: the
//! gateway settles hosted payment links on its own side and reports through the
//! callback endpoint, so there is nothing to forward. Inbound notification authenticity
//! is not verified here (see DESIGN.md).

use tracing::instrument;
use url::Url;

use crate::gateway::{GatewayClientError, PaymentsWayClient, extract_redirect_url};
use crate::provider::PaymentProvider;
use crate::settings::{IncompleteSettings, SettingsResolver};
use crate::transaction::build_transaction;
use crate::types::{
    AuthorizationRequest, AuthorizationResponse, CancellationRequest, CancellationResponse,
    InboundRequest, InboundResponse, RefundRequest, RefundResponse, SettlementRequest,
    SettlementResponse,
};
use crate::util::truncate_json;

/// Represents all possible errors of the authorization pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizeError {
    /// Both the request and the settings store were consulted and credentials are still
    /// missing. Carries field names only.
    #[error(transparent)]
    IncompleteSettings(#[from] IncompleteSettings),
    /// The gateway call failed (transport error or non-2xx status).
    #[error(transparent)]
    Gateway(#[from] GatewayClientError),
    /// The gateway answered successfully but none of the known response keys held a
    /// usable redirect URL.
    #[error("gateway did not return a redirect URL")]
    NoRedirectUrl,
}

/// The PaymentsWay connector: settings resolution plus a gateway client.
///
/// One instance serves all requests; every call resolves its own transient data, so no
/// state is shared between concurrent invocations.
#[derive(Clone)]
pub struct PaymentsWayConnector {
    resolver: SettingsResolver,
    gateway: PaymentsWayClient,
}

impl PaymentsWayConnector {
    pub fn new(resolver: SettingsResolver, gateway: PaymentsWayClient) -> Self {
        PaymentsWayConnector { resolver, gateway }
    }
}

impl PaymentProvider for PaymentsWayConnector {
    type Error = AuthorizeError;

    /// Runs the authorization pipeline.
    ///
    /// Settings resolution strictly precedes payload construction, which strictly
    /// precedes the gateway call; each stage consumes the previous stage's output.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizeError`] if settings stay incomplete, the gateway call fails,
    /// or the gateway response holds no redirect URL. Failures propagate to the platform
    /// runtime; nothing is retried.
    #[instrument(skip_all, err, fields(payment_id = %request.payment_id))]
    async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationResponse, AuthorizeError> {
        tracing::info!(
            value = %request.value,
            currency = %request.currency,
            payment_method = request.payment_method.as_deref().unwrap_or("<unset>"),
            callback_url_present = request.callback_url.is_some(),
            merchant_settings_count = request
                .merchant_settings
                .as_ref()
                .map_or(0, |fields| fields.len()),
            "authorize"
        );

        let settings = self.resolver.resolve(request).await?;
        let payload = build_transaction(&settings, request);
        tracing::debug!(
            form_id = payload.form_id,
            terminal_id = payload.terminal_id,
            merchant_id = payload.merchant_id,
            order_number = %payload.order_number,
            response_url = %payload.response_url,
            "built transaction payload"
        );

        let response = self
            .gateway
            .create_transaction(&payload, &settings.api_key)
            .await?;
        tracing::info!(response = %truncate_json(&response), "gateway response");

        let redirect_url = extract_redirect_url(&response)
            .and_then(|raw| Url::parse(raw).ok())
            .ok_or(AuthorizeError::NoRedirectUrl)?;

        Ok(AuthorizationResponse::redirect(request, redirect_url))
    }

    /// Always succeeds; the platform cancels redirect payments that never complete.
    #[instrument(skip_all, fields(payment_id = %request.payment_id))]
    async fn cancel(
        &self,
        request: &CancellationRequest,
    ) -> Result<CancellationResponse, AuthorizeError> {
        tracing::info!(request_id = request.request_id.as_deref().unwrap_or("<unset>"), "cancel");
        Ok(CancellationResponse::processed(request))
    }

    /// Always succeeds; refunds are handled on the gateway side.
    #[instrument(skip_all, fields(payment_id = %request.payment_id))]
    async fn refund(&self, request: &RefundRequest) -> Result<RefundResponse, AuthorizeError> {
        tracing::info!(request_id = %request.request_id, value = %request.value, "refund");
        Ok(RefundResponse::processed(request))
    }

    /// Always succeeds; hosted payment links settle on the gateway side.
    #[instrument(skip_all, fields(payment_id = %request.payment_id))]
    async fn settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementResponse, AuthorizeError> {
        tracing::info!(request_id = %request.request_id, value = %request.value, "settle");
        Ok(SettlementResponse::processed(request))
    }

    /// Always acknowledges; no state transition is recorded for notifications.
    #[instrument(skip_all, fields(payment_id = %request.payment_id))]
    async fn inbound(&self, request: &InboundRequest) -> Result<InboundResponse, AuthorizeError> {
        tracing::info!(request_id = %request.request_id, "inbound");
        Ok(InboundResponse::acknowledged(request))
    }
}
