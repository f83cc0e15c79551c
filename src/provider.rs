//! Core trait defining the payment-provider interface this connector implements.
//!
//! The platform runtime drives a provider through five operations: authorize a payment,
//! then cancel, refund or settle it, plus an inbound channel for asynchronous gateway
//! notifications relayed through the platform.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::types::{
    AuthorizationRequest, AuthorizationResponse, CancellationRequest, CancellationResponse,
    InboundRequest, InboundResponse, RefundRequest, RefundResponse, SettlementRequest,
    SettlementResponse,
};

/// Trait defining the asynchronous interface of a payment provider.
///
/// Each operation corresponds to one protocol route and is invoked once per inbound
/// request; implementations hold no per-payment state between calls.
pub trait PaymentProvider {
    /// The error type returned by this provider.
    type Error: Debug + Display;

    /// Authorizes a payment.
    ///
    /// For redirect-flow gateways this creates the hosted transaction and returns a
    /// redirect instruction; the definitive outcome arrives later through the callback
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if credentials cannot be resolved or the gateway call
    /// fails.
    fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<AuthorizationResponse, Self::Error>> + Send;

    /// Cancels a payment previously authorized.
    fn cancel(
        &self,
        request: &CancellationRequest,
    ) -> impl Future<Output = Result<CancellationResponse, Self::Error>> + Send;

    /// Refunds a settled payment, fully or partially.
    fn refund(
        &self,
        request: &RefundRequest,
    ) -> impl Future<Output = Result<RefundResponse, Self::Error>> + Send;

    /// Settles (captures) an authorized payment.
    fn settle(
        &self,
        request: &SettlementRequest,
    ) -> impl Future<Output = Result<SettlementResponse, Self::Error>> + Send;

    /// Handles an asynchronous notification relayed by the platform.
    fn inbound(
        &self,
        request: &InboundRequest,
    ) -> impl Future<Output = Result<InboundResponse, Self::Error>> + Send;
}

impl<T: PaymentProvider> PaymentProvider for Arc<T> {
    type Error = T::Error;

    fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<AuthorizationResponse, Self::Error>> + Send {
        self.as_ref().authorize(request)
    }

    fn cancel(
        &self,
        request: &CancellationRequest,
    ) -> impl Future<Output = Result<CancellationResponse, Self::Error>> + Send {
        self.as_ref().cancel(request)
    }

    fn refund(
        &self,
        request: &RefundRequest,
    ) -> impl Future<Output = Result<RefundResponse, Self::Error>> + Send {
        self.as_ref().refund(request)
    }

    fn settle(
        &self,
        request: &SettlementRequest,
    ) -> impl Future<Output = Result<SettlementResponse, Self::Error>> + Send {
        self.as_ref().settle(request)
    }

    fn inbound(
        &self,
        request: &InboundRequest,
    ) -> impl Future<Output = Result<InboundResponse, Self::Error>> + Send {
        self.as_ref().inbound(request)
    }
}
