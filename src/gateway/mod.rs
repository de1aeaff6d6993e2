//! HTTP client for the biller payment gateway.

pub mod client;

pub use client::PaymentGatewayClient;
