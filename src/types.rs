//! Type definitions for the VTEX Payment Provider Protocol surface of this connector.
//!
//! This mirrors the request/response shapes the platform's payment runtime exchanges
//! with a provider over HTTP. The key objects are [`AuthorizationRequest`] and the five
//! operation responses ([`AuthorizationResponse`], [`CancellationResponse`],
//! [`RefundResponse`], [`SettlementResponse`], [`InboundResponse`]).
//!
//! Requests arrive with a typed core plus an open tail: the platform embeds provider
//! configuration in different branches depending on flow and version, so every field we
//! do not model explicitly is retained in [`AuthorizationRequest::extra`] as a raw JSON
//! map and probed defensively during settings resolution.

use std::fmt;
use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// One `{name, value}` entry of the merchant settings list the platform may attach to an
/// authorization. Both members are optional on the wire; entries without a name are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSettingsField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl MerchantSettingsField {
    /// Renders the field value as a string, the way the merchant settings list is consumed:
    /// strings pass through, numbers and booleans are rendered, anything else becomes empty.
    pub fn value_string(&self) -> String {
        match &self.value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}

/// An authorization request as delivered by the platform runtime.
///
/// Only the fields this connector consumes are typed. Everything else lands in `extra`,
/// which settings resolution walks for provider configuration (see
/// [`crate::settings::SettingsResolver`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub payment_id: String,
    /// Amount to authorize, in the currency's major unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: String,
    /// Regional callback endpoint supplied by the platform. Preferred over any default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Provider configuration as an ordered name/value list, when the platform sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_settings: Option<Vec<MerchantSettingsField>>,
    /// All remaining request fields, kept raw for settings probing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authorization outcome reported back to the platform runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Approved,
    Denied,
    /// The payment is still in flight: the shopper has been redirected to the gateway and
    /// the final state will arrive through the callback endpoint.
    Undefined,
}

impl Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthorizationStatus::Approved => "approved",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Undefined => "undefined",
        };
        write!(f, "{}", s)
    }
}

/// Response to an authorization. For this connector the only produced shape is the
/// redirect instruction built by [`AuthorizationResponse::redirect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResponse {
    pub payment_id: String,
    pub status: AuthorizationStatus,
    /// Provider transaction identifier. The gateway does not return one at creation time,
    /// so the payment id doubles as the tid.
    pub tid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<Url>,
    /// Seconds the platform waits before auto-cancelling an unresolved redirect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_to_cancel: Option<u64>,
}

impl AuthorizationResponse {
    /// Builds a redirect instruction: status stays `undefined` until the gateway calls back.
    pub fn redirect(request: &AuthorizationRequest, redirect_url: Url) -> Self {
        AuthorizationResponse {
            payment_id: request.payment_id.clone(),
            status: AuthorizationStatus::Undefined,
            tid: request.payment_id.clone(),
            redirect_url: Some(redirect_url),
            delay_to_cancel: Some(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub payment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    pub payment_id: String,
    pub cancellation_id: String,
    pub code: String,
    pub message: String,
}

impl CancellationResponse {
    /// Canonical "cancellation processed" acknowledgment keyed by the payment id.
    pub fn processed(request: &CancellationRequest) -> Self {
        CancellationResponse {
            payment_id: request.payment_id.clone(),
            cancellation_id: request.payment_id.clone(),
            code: "cancellation-success".to_string(),
            message: "Cancellation processed successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub payment_id: String,
    pub request_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub payment_id: String,
    pub request_id: String,
    pub refund_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub code: String,
    pub message: String,
}

impl RefundResponse {
    /// Canonical "refund processed" acknowledgment keyed by payment, request and value.
    pub fn processed(request: &RefundRequest) -> Self {
        RefundResponse {
            payment_id: request.payment_id.clone(),
            request_id: request.request_id.clone(),
            refund_id: request.request_id.clone(),
            value: request.value,
            code: "refund-success".to_string(),
            message: "Refund processed successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    pub payment_id: String,
    pub request_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub payment_id: String,
    pub request_id: String,
    pub settle_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub code: String,
    pub message: String,
}

impl SettlementResponse {
    /// Canonical "settlement processed" acknowledgment.
    pub fn processed(request: &SettlementRequest) -> Self {
        SettlementResponse {
            payment_id: request.payment_id.clone(),
            request_id: request.request_id.clone(),
            settle_id: request.payment_id.clone(),
            value: request.value,
            code: "settlement-success".to_string(),
            message: "Settlement processed successfully".to_string(),
        }
    }
}

/// An asynchronous notification relayed by the platform to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    pub payment_id: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw HTTP response the platform relays back to the notification's original caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundResponseData {
    pub status_code: u16,
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundResponse {
    pub payment_id: String,
    pub request_id: String,
    pub response_data: InboundResponseData,
    pub code: String,
    pub message: String,
}

impl InboundResponse {
    /// Fixed success acknowledgment with a JSON `{"success":true}` body.
    pub fn acknowledged(request: &InboundRequest) -> Self {
        InboundResponse {
            payment_id: request.payment_id.clone(),
            request_id: request.request_id.clone(),
            response_data: InboundResponseData {
                status_code: 200,
                content_type: "application/json".to_string(),
                content: serde_json::json!({ "success": true }).to_string(),
            },
            code: "inbound-success".to_string(),
            message: "Inbound processed".to_string(),
        }
    }
}

/// Generic error body returned by the HTTP binding when an operation fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn authorization_request_keeps_unknown_fields_raw() {
        let request: AuthorizationRequest = serde_json::from_value(json!({
            "paymentId": "D3AA1FC8372E430E8236649DB5EBD08E",
            "value": 100.0,
            "currency": "COP",
            "paymentMethod": "PaymentsWay",
            "merchantSettings": [
                { "name": "merchantId", "value": "698" },
                { "name": "apiKey", "value": "K" }
            ],
            "paymentProvider": { "settings": { "formId": "622" } },
            "transactionId": "t-1"
        }))
        .unwrap();

        assert_eq!(request.payment_id, "D3AA1FC8372E430E8236649DB5EBD08E");
        assert_eq!(request.value, Decimal::from(100));
        assert_eq!(request.merchant_settings.as_ref().unwrap().len(), 2);
        assert!(request.extra.contains_key("paymentProvider"));
        assert!(request.extra.contains_key("transactionId"));
        assert!(request.callback_url.is_none());
    }

    #[test]
    fn merchant_settings_values_render_as_strings() {
        let field: MerchantSettingsField =
            serde_json::from_value(json!({ "name": "merchantId", "value": 698 })).unwrap();
        assert_eq!(field.value_string(), "698");

        let field: MerchantSettingsField =
            serde_json::from_value(json!({ "name": "apiKey", "value": null })).unwrap();
        assert_eq!(field.value_string(), "");
    }

    #[test]
    fn redirect_response_serializes_camel_case() {
        let request: AuthorizationRequest = serde_json::from_value(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }))
        .unwrap();
        let response = AuthorizationResponse::redirect(
            &request,
            Url::parse("https://pay.example/x").unwrap(),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["paymentId"], "P1");
        assert_eq!(value["tid"], "P1");
        assert_eq!(value["status"], "undefined");
        assert_eq!(value["redirectUrl"], "https://pay.example/x");
        assert_eq!(value["delayToCancel"], 0);
    }

    #[test]
    fn acknowledgments_echo_input_identifiers() {
        let cancel: CancellationRequest =
            serde_json::from_value(json!({ "paymentId": "P1" })).unwrap();
        let response = CancellationResponse::processed(&cancel);
        assert_eq!(response.cancellation_id, "P1");
        assert_eq!(response.code, "cancellation-success");

        let refund: RefundRequest = serde_json::from_value(
            json!({ "paymentId": "P1", "requestId": "R1", "value": 55.5 }),
        )
        .unwrap();
        let response = RefundResponse::processed(&refund);
        assert_eq!(response.refund_id, "R1");
        assert_eq!(response.value.to_string(), "55.5");

        let inbound: InboundRequest = serde_json::from_value(
            json!({ "paymentId": "P1", "requestId": "R1", "custom": { "k": "v" } }),
        )
        .unwrap();
        let response = InboundResponse::acknowledged(&inbound);
        assert_eq!(response.response_data.status_code, 200);
        assert_eq!(response.response_data.content, "{\"success\":true}");
    }
}
