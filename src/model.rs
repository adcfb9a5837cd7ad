use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CUSTOMER_NAME: &str = "Joy Rentals Customer";
pub const REDIRECT_MODE_POST: &str = "POST";
pub const INSTRUMENT_PAY_PAGE: &str = "PAY_PAGE";

/// Body posted by the booking page. Every field is kept loose until
/// validated, so one badly typed field does not discard the others.
#[derive(Deserialize, Debug, Default)]
pub struct PaymentRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Payload for `/pg/v1/pay`. Field order is the order PhonePe documents and
/// is preserved in the encoded JSON.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayPayload {
    pub merchant_id: String,
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    pub name: String,
    pub amount: i64,
    pub redirect_url: String,
    pub redirect_mode: String,
    pub callback_url: String,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub payment_instrument: PaymentInstrument,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PaymentInstrument {
    #[serde(rename = "type")]
    pub type_: String,
}

impl PaymentInstrument {
    pub fn pay_page() -> Self {
        Self {
            type_: INSTRUMENT_PAY_PAGE.into(),
        }
    }
}

/// Wire body of the create-payment call: the base64 payload and nothing else.
#[derive(Serialize, Deserialize, Debug)]
pub struct PayRequestBody {
    pub request: String,
}

/// The part of the gateway's answer we consume. Everything is optional
/// because the gateway omits `data` on failures.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PayResponseData>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayResponseData {
    #[serde(default)]
    pub instrument_response: Option<InstrumentResponse>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResponse {
    #[serde(default)]
    pub redirect_info: Option<RedirectInfo>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RedirectInfo {
    #[serde(default)]
    pub url: Option<String>,
}

impl PayResponse {
    pub fn redirect_url(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .instrument_response
            .as_ref()?
            .redirect_info
            .as_ref()?
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// Reply sent back to the booking page when the gateway accepted the payment.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreated {
    pub ok: bool,
    pub payment_url: String,
    pub merchant_transaction_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_field_order_and_names() {
        let payload = PayPayload {
            merchant_id: "M1".into(),
            merchant_transaction_id: "JR1".into(),
            merchant_user_id: "9999999999".into(),
            name: DEFAULT_CUSTOMER_NAME.into(),
            amount: 100,
            redirect_url: "https://joyrentals.store/payment-status.html?txn=JR1".into(),
            redirect_mode: REDIRECT_MODE_POST.into(),
            callback_url: "https://example.com/cb".into(),
            mobile_number: "9999999999".into(),
            email: None,
            payment_instrument: PaymentInstrument::pay_page(),
        };

        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            concat!(
                r#"{"merchantId":"M1","merchantTransactionId":"JR1","#,
                r#""merchantUserId":"9999999999","name":"Joy Rentals Customer","amount":100,"#,
                r#""redirectUrl":"https://joyrentals.store/payment-status.html?txn=JR1","#,
                r#""redirectMode":"POST","callbackUrl":"https://example.com/cb","#,
                r#""mobileNumber":"9999999999","paymentInstrument":{"type":"PAY_PAGE"}}"#
            )
        );
    }

    #[test]
    fn test_redirect_url_extraction() {
        let ok: PayResponse = serde_json::from_value(json!({
            "success": true,
            "code": "PAYMENT_INITIATED",
            "data": {
                "merchantTransactionId": "JR1",
                "instrumentResponse": {
                    "type": "PAY_PAGE",
                    "redirectInfo": { "url": "https://pay.example/x", "method": "GET" }
                }
            }
        }))
        .unwrap();
        assert_eq!(ok.redirect_url(), Some("https://pay.example/x"));

        let missing: PayResponse =
            serde_json::from_value(json!({ "success": true, "data": {} })).unwrap();
        assert_eq!(missing.redirect_url(), None);

        let empty: PayResponse = serde_json::from_value(json!({
            "success": true,
            "data": { "instrumentResponse": { "redirectInfo": { "url": "" } } }
        }))
        .unwrap();
        assert_eq!(empty.redirect_url(), None);
    }

    #[test]
    fn test_request_accepts_loose_types() {
        let request: PaymentRequest =
            serde_json::from_value(json!({ "phone": 9876543210u64, "amount": "199.5" })).unwrap();
        assert_eq!(request.phone, Some(json!(9876543210u64)));
        assert_eq!(request.amount, Some(json!("199.5")));
        assert_eq!(request.name, None);

        let request: PaymentRequest = serde_json::from_value(
            json!({ "name": 42, "email": 5, "phone": "9876543210", "amount": 100 }),
        )
        .unwrap();
        assert_eq!(request.name, Some(json!(42)));
        assert_eq!(request.email, Some(json!(5)));
        assert_eq!(request.phone, Some(json!("9876543210")));
    }
}
