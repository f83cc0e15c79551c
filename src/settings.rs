//! Provider settings: normalization across key-casing variants and resolution
//! across the places a request (or the settings store) may carry them.
//!
//! The platform delivers the four gateway credentials (`merchantId`, `terminalId`,
//! `formId`, `apiKey`) in different branches of the authorization payload depending on
//! flow and version, and merchants key them with inconsistent casing. Resolution
//! therefore runs in stages: the merchant settings list first, then a fixed list of
//! alternate request locations, then the remote settings store as a fallback, merged
//! field-wise with request-supplied values winning.

use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::config::AppIdentity;
use crate::settings_store::SettingsStore;
use crate::types::AuthorizationRequest;

/// Application identifier used against the settings store when neither configuration
/// nor the request names one.
pub const DEFAULT_APP_ID: &str = "paymentswaypartnerco.paymentsway-gateway";

/// Accepted key variants per credential, probed in order. First match wins.
const MERCHANT_ID_KEYS: [&str; 4] = ["merchantId", "merchant_id", "MerchantId", "MERCHANT_ID"];
const TERMINAL_ID_KEYS: [&str; 4] = ["terminalId", "terminal_id", "TerminalId", "TERMINAL_ID"];
const FORM_ID_KEYS: [&str; 4] = ["formId", "form_id", "FormId", "FORM_ID"];
const API_KEY_KEYS: [&str; 5] = ["apiKey", "api_key", "apikey", "ApiKey", "API_KEY"];

/// Alternate request branches that may hold a provider settings object, probed in order
/// when the merchant settings list is absent or empty.
const ALTERNATE_SETTINGS_PATHS: [&[&str]; 8] = [
    &["paymentProvider", "settings"],
    &["paymentProvider", "configuration"],
    &["paymentProvider", "providerSettings"],
    &["connector", "settings"],
    &["connector", "configuration"],
    &["settings"],
    &["payment", "settings"],
    &["payment", "paymentProvider", "settings"],
];

/// The gateway api key. Debug and Display are redacted so the secret can never reach
/// logs or error messages through formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        ApiKey(value.into())
    }

    /// Grants access to the secret for outbound signing and authentication.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey([redacted])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[redacted]")
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        ApiKey(value)
    }
}

/// Partially resolved provider settings. Fields stay optional until resolution
/// completes; see [`ProviderSettings::into_complete`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    pub merchant_id: Option<String>,
    pub terminal_id: Option<String>,
    pub form_id: Option<String>,
    pub api_key: Option<ApiKey>,
}

impl ProviderSettings {
    /// True when all four credentials are present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Canonical names of the credentials still unresolved. Field presence counts only
    /// non-empty values, so an explicitly empty setting still reads as missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !matches!(&self.merchant_id, Some(v) if !v.is_empty()) {
            missing.push("merchantId");
        }
        if !matches!(&self.terminal_id, Some(v) if !v.is_empty()) {
            missing.push("terminalId");
        }
        if !matches!(&self.form_id, Some(v) if !v.is_empty()) {
            missing.push("formId");
        }
        if !matches!(&self.api_key, Some(k) if !k.is_empty()) {
            missing.push("apiKey");
        }
        missing
    }

    /// Field-wise merge: any field already set on `self` wins over the fallback.
    pub fn merge(self, fallback: ProviderSettings) -> ProviderSettings {
        ProviderSettings {
            merchant_id: self.merchant_id.or(fallback.merchant_id),
            terminal_id: self.terminal_id.or(fallback.terminal_id),
            form_id: self.form_id.or(fallback.form_id),
            api_key: self.api_key.or(fallback.api_key),
        }
    }

    /// Promotes the record to [`CompleteSettings`], or reports which fields are missing.
    pub fn into_complete(self) -> Result<CompleteSettings, IncompleteSettings> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(IncompleteSettings { missing });
        }
        Ok(CompleteSettings {
            merchant_id: self.merchant_id.unwrap_or_default(),
            terminal_id: self.terminal_id.unwrap_or_default(),
            form_id: self.form_id.unwrap_or_default(),
            api_key: self.api_key.unwrap_or_else(|| ApiKey::new("")),
        })
    }
}

/// Fully resolved provider settings. Constructing this type is the completeness proof
/// transaction building relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteSettings {
    pub merchant_id: String,
    pub terminal_id: String,
    pub form_id: String,
    pub api_key: ApiKey,
}

/// Resolution exhausted both the request and the settings store and one or more
/// credentials are still missing. Names the fields, never their values.
#[derive(Debug, Clone, thiserror::Error)]
#[error("missing required provider settings: {}", missing.join(", "))]
pub struct IncompleteSettings {
    pub missing: Vec<&'static str>,
}

/// Canonicalizes an arbitrary configuration object into a [`ProviderSettings`] record.
///
/// Each credential is probed against its ordered key-variant list; the first match wins
/// and unmatched fields stay unset. String values pass through and numbers are rendered
/// to their decimal form. Non-object input yields an empty record. Pure and total.
pub fn normalize_settings(raw: &Value) -> ProviderSettings {
    let Some(object) = raw.as_object() else {
        return ProviderSettings::default();
    };
    ProviderSettings {
        merchant_id: probe(object, &MERCHANT_ID_KEYS),
        terminal_id: probe(object, &TERMINAL_ID_KEYS),
        form_id: probe(object, &FORM_ID_KEYS),
        api_key: probe(object, &API_KEY_KEYS).map(ApiKey::new),
    }
}

fn probe(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Resolves complete provider settings for one authorization call.
///
/// Holds the settings-store handle and the application identity injected at startup;
/// each [`SettingsResolver::resolve`] call is otherwise stateless.
#[derive(Clone)]
pub struct SettingsResolver {
    store: Arc<dyn SettingsStore>,
    app: AppIdentity,
}

impl SettingsResolver {
    pub fn new(store: Arc<dyn SettingsStore>, app: AppIdentity) -> Self {
        SettingsResolver { store, app }
    }

    /// Runs the resolution pipeline against a request.
    ///
    /// 1. Flatten the merchant settings list (last-seen value wins per name). A non-empty
    ///    list short-circuits the alternate-location probes.
    /// 2. Otherwise take the first non-empty object among the alternate request branches.
    /// 3. Normalize the candidate.
    /// 4. If incomplete, fetch the settings store by application id and normalize that.
    ///    A store failure is logged and treated as an empty fallback.
    /// 5. Merge field-wise, request values winning.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteSettings`] naming the unresolved fields if both sources
    /// together do not cover all four credentials.
    #[instrument(skip_all, err, fields(payment_id = %request.payment_id))]
    pub async fn resolve(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<CompleteSettings, IncompleteSettings> {
        let candidate = settings_candidate(request);
        let from_request = normalize_settings(&candidate);
        tracing::info!(
            merchant_id = from_request.merchant_id.as_deref().unwrap_or("<unset>"),
            terminal_id = from_request.terminal_id.as_deref().unwrap_or("<unset>"),
            form_id = from_request.form_id.as_deref().unwrap_or("<unset>"),
            api_key_present = from_request.api_key.is_some(),
            "normalized request-level provider settings"
        );

        let settings = if from_request.is_complete() {
            from_request
        } else {
            let app_id = self.app_id(request);
            tracing::warn!(
                app_id = %app_id,
                "provider settings incomplete, consulting settings store"
            );
            let fallback = match self.store.fetch_app_settings(&app_id).await {
                Ok(raw) => normalize_settings(&raw),
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "settings store fetch failed, continuing with empty fallback"
                    );
                    ProviderSettings::default()
                }
            };
            let merged = from_request.merge(fallback);
            tracing::info!(
                merchant_id = merged.merchant_id.as_deref().unwrap_or("<unset>"),
                terminal_id = merged.terminal_id.as_deref().unwrap_or("<unset>"),
                form_id = merged.form_id.as_deref().unwrap_or("<unset>"),
                api_key_present = merged.api_key.is_some(),
                "merged settings after store fallback"
            );
            merged
        };

        settings.into_complete()
    }

    /// Application id precedence: configured id, then a request-supplied id, then the
    /// fixed default.
    fn app_id(&self, request: &AuthorizationRequest) -> String {
        self.app
            .app_id
            .clone()
            .or_else(|| request_app_id(request).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string())
    }
}

fn request_app_id(request: &AuthorizationRequest) -> Option<&str> {
    ["appId", "applicationId"]
        .iter()
        .find_map(|key| request.extra.get(*key).and_then(Value::as_str))
        .filter(|id| !id.is_empty())
}

/// Picks the raw settings object for a request: the flattened merchant settings list if
/// it yields anything, else the first non-empty alternate branch, else an empty object.
fn settings_candidate(request: &AuthorizationRequest) -> Value {
    let from_list = merchant_settings_map(request);
    if !from_list.is_empty() {
        tracing::debug!(fields = from_list.len(), "using merchant settings list");
        return Value::Object(from_list);
    }
    for path in ALTERNATE_SETTINGS_PATHS {
        if let Some(object) = lookup_object(&request.extra, path) {
            if !object.is_empty() {
                tracing::debug!(path = %path.join("."), "using alternate settings branch");
                return Value::Object(object.clone());
            }
        }
    }
    Value::Object(Map::new())
}

/// Flattens the merchant settings list into a name→value map. Later entries overwrite
/// earlier ones on duplicate names; entries without a name are skipped.
fn merchant_settings_map(request: &AuthorizationRequest) -> Map<String, Value> {
    let mut map = Map::new();
    let Some(fields) = &request.merchant_settings else {
        return map;
    };
    for field in fields {
        let Some(name) = &field.name else {
            continue;
        };
        map.insert(name.clone(), Value::String(field.value_string()));
    }
    map
}

fn lookup_object<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Map<String, Value>> {
    let (first, rest) = path.split_first()?;
    let mut current = root.get(*first)?;
    for key in rest {
        current = current.get(*key)?;
    }
    current.as_object()
}
