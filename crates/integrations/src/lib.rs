pub mod gateway;

pub use gateway::{GatewayCheckout, GatewayClient};
