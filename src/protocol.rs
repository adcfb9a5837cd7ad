use serde_json::Value;
use std::time::Duration;

use crate::error::PaymentError;
use crate::model::{PayPayload, PayRequestBody, PayResponse};
use crate::signing::{sign, PAY_ENDPOINT};

pub const X_VERIFY: &str = "X-VERIFY";
pub const X_MERCHANT_ID: &str = "X-MERCHANT-ID";

/// Thin client for the PhonePe create-payment call.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    merchant_id: String,
    salt_key: String,
    salt_index: String,
}

impl GatewayClient {
    pub fn new(
        base_url: &str,
        merchant_id: &str,
        salt_key: &str,
        salt_index: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            merchant_id: merchant_id.to_string(),
            salt_key: salt_key.to_string(),
            salt_index: salt_index.to_string(),
        })
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn pay_url(&self) -> String {
        format!("{}{}", self.base_url, PAY_ENDPOINT)
    }

    /// Signs the payload, posts it and returns the hosted pay-page URL.
    pub async fn create_payment(&self, payload: &PayPayload) -> Result<String, PaymentError> {
        let envelope = sign(payload, &self.salt_key, &self.salt_index)?;
        let body = serde_json::to_string(&PayRequestBody {
            request: envelope.payload_base64,
        })?;

        let url = self.pay_url();
        info!(
            "Sending pay request for {} to: {}",
            payload.merchant_transaction_id, url
        );
        let res = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(X_VERIFY, envelope.x_verify)
            .header(X_MERCHANT_ID, &self.merchant_id)
            .body(body)
            .send()
            .await?;

        let status = res.status();
        let raw: Value = res.json().await?;
        info!("Pay response received with status {}", status);

        interpret_response(raw)
    }
}

/// Splits the gateway's answer into the redirect URL, an explicit rejection,
/// or a success that lacks the fields we need.
pub fn interpret_response(raw: Value) -> Result<String, PaymentError> {
    let parsed = match serde_json::from_value::<PayResponse>(raw.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            info!("Failed to deserialize pay response: {}", e);
            return Err(PaymentError::MalformedResponse(raw));
        }
    };

    if parsed.success != Some(true) {
        info!(
            "Gateway rejected payment: code={:?} message={:?}",
            parsed.code, parsed.message
        );
        return Err(PaymentError::Rejected(raw));
    }

    match parsed.redirect_url() {
        Some(url) => Ok(url.to_string()),
        None => Err(PaymentError::MalformedResponse(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_interpret_success() {
        let raw = json!({
            "success": true,
            "data": { "instrumentResponse": { "redirectInfo": { "url": "https://pay.example/x" } } }
        });
        assert_eq!(interpret_response(raw).unwrap(), "https://pay.example/x");
    }

    #[test]
    fn test_interpret_rejection() {
        let raw = json!({
            "success": false,
            "code": "KEY_NOT_CONFIGURED",
            "message": "Key not found for the merchant"
        });
        match interpret_response(raw.clone()) {
            Err(PaymentError::Rejected(details)) => assert_eq!(details, raw),
            other => panic!("expected rejection, got {:?}", other),
        }

        assert!(matches!(
            interpret_response(json!({})),
            Err(PaymentError::Rejected(_))
        ));
    }

    #[test]
    fn test_interpret_malformed() {
        assert!(matches!(
            interpret_response(json!({ "success": true })),
            Err(PaymentError::MalformedResponse(_))
        ));
        assert!(matches!(
            interpret_response(json!({ "success": "yes" })),
            Err(PaymentError::MalformedResponse(_))
        ));
        assert!(matches!(
            interpret_response(json!([1, 2, 3])),
            Err(PaymentError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_pay_url_joins_endpoint() {
        let client = GatewayClient::new(
            "https://api-preprod.phonepe.com/apis/pg-sandbox/",
            "M1",
            "salt",
            "1",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.pay_url(),
            "https://api-preprod.phonepe.com/apis/pg-sandbox/pg/v1/pay"
        );
        assert_eq!(client.merchant_id(), "M1");
    }
}
