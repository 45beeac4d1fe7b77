pub mod client;

pub use client::{GatewayCheckout, GatewayClient};
