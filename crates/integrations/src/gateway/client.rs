//! Payment gateway client.
//!
//! Creates a checkout session for a payment and hands back the redirect URL
//! plus the gateway's transaction reference. The gateway later reports the
//! outcome through the webhook endpoint; provider-specific signature HMACs
//! are verified at that boundary, not here.
//!
//! Without `GATEWAY_BASE_URL` the client runs in sandbox mode and fabricates
//! the handshake, which is enough to drive the whole booking lifecycle in
//! development: post the fabricated `transaction_id` to the webhook endpoint
//! to settle the payment.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
struct CheckoutRequest<'a> {
    payment_id: Uuid,
    method: &'a str,
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCheckout {
    pub success: bool,
    pub transaction_id: String,
    pub payment_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Reads `GATEWAY_BASE_URL`; unset means sandbox mode.
    pub fn from_env() -> Self {
        let base_url = std::env::var("GATEWAY_BASE_URL").ok();
        if base_url.is_none() {
            tracing::warn!("GATEWAY_BASE_URL not set, gateway client runs in sandbox mode");
        }
        Self::new(base_url)
    }

    /// Ask the gateway for a checkout session for this payment.
    pub async fn create_checkout(
        &self,
        payment_id: Uuid,
        method: &str,
        amount: i64,
        currency: &str,
        return_url: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<GatewayCheckout> {
        let Some(base_url) = &self.base_url else {
            return Ok(self.sandbox_checkout(payment_id, method, expires_at));
        };

        let request = CheckoutRequest {
            payment_id,
            method,
            amount,
            currency,
            return_url,
            expires_at,
        };

        let response = self
            .http
            .post(format!("{base_url}/v1/checkout"))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("gateway request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("gateway returned {}", response.status()));
        }

        let checkout: GatewayCheckout = response
            .json()
            .await
            .map_err(|e| anyhow!("gateway returned malformed checkout: {e}"))?;

        Ok(checkout)
    }

    fn sandbox_checkout(
        &self,
        payment_id: Uuid,
        method: &str,
        expires_at: DateTime<Utc>,
    ) -> GatewayCheckout {
        let transaction_id = format!("{}_{}", method, Uuid::new_v4().simple());

        tracing::info!(
            %payment_id,
            %transaction_id,
            "sandbox gateway checkout created"
        );

        GatewayCheckout {
            success: true,
            transaction_id: transaction_id.clone(),
            payment_url: format!("https://sandbox.gateway.test/pay/{transaction_id}"),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_transaction_id_carries_method() {
        let client = GatewayClient::new(None);
        let checkout = client.sandbox_checkout(Uuid::new_v4(), "momo", Utc::now());
        assert!(checkout.success);
        assert!(checkout.transaction_id.starts_with("momo_"));
        assert!(checkout.payment_url.contains(&checkout.transaction_id));
    }
}
