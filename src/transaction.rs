//! Construction of the gateway's create-transaction payload.
//!
//! Building is pure: given complete settings and an authorization request it always
//! produces a payload. The integrity checksum concatenates the form id, api key,
//! merchant id, amount and order number with `;` in that exact order and hashes the
//! result with SHA-256 — this is the signing contract the gateway verifies, so neither
//! the order nor the separator may change.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::settings::{ApiKey, CompleteSettings};
use crate::types::AuthorizationRequest;

/// Callback endpoint used when the request does not supply one. The request-supplied
/// callback is regional and always preferred; this is the single documented fallback.
pub const DEFAULT_RESPONSE_URL: &str =
    "https://gateway.vtexpayments.com.br/api/payment-provider/callback";

static DEFAULT_RESPONSE_URL_PARSED: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_RESPONSE_URL).expect("Invalid default response URL"));

/// The create-transaction request body sent to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub form_id: i64,
    pub terminal_id: i64,
    pub merchant_id: i64,
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub checksum: String,
    pub response_url: Url,
}

/// Builds the gateway payload for one authorization.
///
/// The checksum signs the raw settings strings, so numeric coercion of the id fields
/// never perturbs it. Ids that do not parse degrade to 0 and are left for the gateway's
/// own validation to reject.
pub fn build_transaction(
    settings: &CompleteSettings,
    request: &AuthorizationRequest,
) -> TransactionPayload {
    let checksum = transaction_checksum(
        &settings.form_id,
        &settings.api_key,
        &settings.merchant_id,
        &request.value,
        &request.payment_id,
    );
    let response_url = request
        .callback_url
        .clone()
        .unwrap_or_else(|| DEFAULT_RESPONSE_URL_PARSED.clone());
    TransactionPayload {
        form_id: coerce_id(&settings.form_id),
        terminal_id: coerce_id(&settings.terminal_id),
        merchant_id: coerce_id(&settings.merchant_id),
        order_number: request.payment_id.clone(),
        amount: request.value,
        currency: request.currency.clone(),
        checksum,
        response_url,
    }
}

/// SHA-256 over `formId;apiKey;merchantId;amount;orderNumber`, lowercase hex.
pub fn transaction_checksum(
    form_id: &str,
    api_key: &ApiKey,
    merchant_id: &str,
    amount: &Decimal,
    order_number: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{};{};{};{};{}",
        form_id,
        api_key.expose(),
        merchant_id,
        amount,
        order_number
    ));
    format!("{:x}", hasher.finalize())
}

fn coerce_id(value: &str) -> i64 {
    value.trim().parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> CompleteSettings {
        CompleteSettings {
            merchant_id: "698".to_string(),
            terminal_id: "593".to_string(),
            form_id: "622".to_string(),
            api_key: ApiKey::new("K"),
        }
    }

    fn request(body: serde_json::Value) -> AuthorizationRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn builds_the_documented_payload() {
        let request = request(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }));
        let payload = build_transaction(&settings(), &request);
        assert_eq!(payload.form_id, 622);
        assert_eq!(payload.terminal_id, 593);
        assert_eq!(payload.merchant_id, 698);
        assert_eq!(payload.order_number, "P1");
        assert_eq!(payload.amount, Decimal::from(100));
        assert_eq!(payload.currency, "COP");
        // sha256("622;K;698;100;P1")
        assert_eq!(
            payload.checksum,
            "0e4f529daf73b6942668d453c62a6a375fd73eee4fc9fb23ee33396c7c35174b"
        );
        assert_eq!(payload.response_url.as_str(), DEFAULT_RESPONSE_URL);
    }

    #[test]
    fn request_callback_url_wins_over_the_default() {
        let request = request(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP",
            "callbackUrl": "https://gatewayqa.vtexpayments.com.br/api/pvt/callback"
        }));
        let payload = build_transaction(&settings(), &request);
        assert_eq!(
            payload.response_url.as_str(),
            "https://gatewayqa.vtexpayments.com.br/api/pvt/callback"
        );
    }

    #[test]
    fn checksum_is_deterministic_and_input_sensitive() {
        let amount = Decimal::from(100);
        let base = transaction_checksum("622", &ApiKey::new("K"), "698", &amount, "P1");
        assert_eq!(
            base,
            transaction_checksum("622", &ApiKey::new("K"), "698", &amount, "P1")
        );

        let variations = [
            transaction_checksum("623", &ApiKey::new("K"), "698", &amount, "P1"),
            transaction_checksum("622", &ApiKey::new("K2"), "698", &amount, "P1"),
            transaction_checksum("622", &ApiKey::new("K"), "699", &amount, "P1"),
            transaction_checksum("622", &ApiKey::new("K"), "698", &Decimal::from(101), "P1"),
            transaction_checksum("622", &ApiKey::new("K"), "698", &amount, "P2"),
        ];
        for (i, changed) in variations.iter().enumerate() {
            assert_ne!(&base, changed, "input {i} did not affect the checksum");
        }
    }

    #[test]
    fn fractional_amounts_render_without_padding() {
        let amount: Decimal = "100.5".parse().unwrap();
        let checksum = transaction_checksum("622", &ApiKey::new("K"), "698", &amount, "P1");
        // sha256("622;K;698;100.5;P1")
        assert_eq!(
            checksum,
            "bd7d0b2fbcaeac55d51cfba2631274b30560258b2bc0e57aaa44ff7df1378b67"
        );
    }

    #[test]
    fn checksum_signs_raw_setting_strings() {
        let padded = CompleteSettings {
            form_id: "0622".to_string(),
            ..settings()
        };
        let request = request(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }));
        let payload = build_transaction(&padded, &request);
        // The payload coerces to a number, the signature keeps the raw string.
        assert_eq!(payload.form_id, 622);
        assert_eq!(
            payload.checksum,
            transaction_checksum("0622", &ApiKey::new("K"), "698", &Decimal::from(100), "P1")
        );
    }

    #[test]
    fn unparsable_ids_degrade_to_zero() {
        let broken = CompleteSettings {
            terminal_id: "not-a-number".to_string(),
            ..settings()
        };
        let request = request(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }));
        let payload = build_transaction(&broken, &request);
        assert_eq!(payload.terminal_id, 0);
    }

    #[test]
    fn payload_serializes_snake_case_with_numeric_ids() {
        let request = request(json!({
            "paymentId": "P1",
            "value": 100.0,
            "currency": "COP"
        }));
        let payload = build_transaction(&settings(), &request);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["form_id"], 622);
        assert_eq!(value["terminal_id"], 593);
        assert_eq!(value["merchant_id"], 698);
        assert_eq!(value["order_number"], "P1");
        assert!(value["amount"].is_number());
        assert_eq!(value["response_url"], DEFAULT_RESPONSE_URL);
    }
}
