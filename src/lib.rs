//! PaymentsWay payment-provider connector.
//!
//! This crate adapts the VTEX Payment Provider Protocol to the PaymentsWay gateway's
//! hosted payment links. An authorization resolves the merchant's gateway credentials,
//! builds and signs a create-transaction payload, and answers the platform with a
//! redirect instruction pointing the shopper at the gateway's payment page. Cancel,
//! refund, settle and inbound are acknowledgment operations: hosted links settle on the
//! gateway side and report back through the platform's callback endpoint.
//!
//! # Modules
//!
//! - [`types`] — Payment Provider Protocol request/response shapes.
//! - [`provider`] — The [`provider::PaymentProvider`] trait: the five protocol operations.
//! - [`connector`] — The PaymentsWay implementation of the trait.
//! - [`settings`] — Credential normalization across key casings and resolution across
//!   request branches with a settings-store fallback.
//! - [`settings_store`] — Client for the remote settings store.
//! - [`transaction`] — Gateway payload construction and the SHA-256 signing contract.
//! - [`gateway`] — Client for the gateway's create-transaction endpoint.
//! - [`handlers`] — HTTP routes of the protocol binding.
//! - [`config`] — Server configuration and application identity.
//! - [`telemetry`] — Tracing subscriber setup.
//! - [`shutdown`] — Graceful shutdown on termination signals.
//! - [`util`] — Log truncation helpers.

pub mod config;
pub mod connector;
pub mod gateway;
pub mod handlers;
pub mod provider;
pub mod settings;
pub mod settings_store;
pub mod shutdown;
pub mod telemetry;
pub mod transaction;
pub mod types;
pub mod util;
