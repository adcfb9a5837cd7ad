use base64::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Path of the create-payment endpoint. It is part of the signing input, so
/// it must match the path actually called.
pub const PAY_ENDPOINT: &str = "/pg/v1/pay";

/// The base64 request body together with the `X-VERIFY` header that signs it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedEnvelope {
    pub payload_base64: String,
    pub x_verify: String,
}

pub fn encode_payload<T>(payload: &T) -> Result<String, serde_json::Error>
where
    T: Serialize,
{
    let payload_json = serde_json::to_string(payload)?;
    Ok(BASE64_STANDARD.encode(payload_json.as_bytes()))
}

/// `sha256(base64 + endpoint + salt_key)` as lowercase hex, then `###` and the
/// salt index.
pub fn x_verify(payload_base64: &str, endpoint: &str, salt_key: &str, salt_index: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload_base64.as_bytes());
    hasher.update(endpoint.as_bytes());
    hasher.update(salt_key.as_bytes());
    format!("{:x}###{}", hasher.finalize(), salt_index)
}

pub fn sign<T>(
    payload: &T,
    salt_key: &str,
    salt_index: &str,
) -> Result<SignedEnvelope, serde_json::Error>
where
    T: Serialize,
{
    let payload_base64 = encode_payload(payload)?;
    let x_verify = x_verify(&payload_base64, PAY_ENDPOINT, salt_key, salt_index);
    Ok(SignedEnvelope {
        payload_base64,
        x_verify,
    })
}

#[cfg(test)]
mod signing_tests {
    use base64::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_x_verify_known_digest() {
        // sha256("abc")
        assert_eq!(
            super::x_verify("a", "b", "c", "1"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad###1"
        );
    }

    #[test]
    fn test_x_verify_is_deterministic() {
        let first = super::x_verify("eyJhIjoxfQ==", super::PAY_ENDPOINT, "salt", "1");
        let second = super::x_verify("eyJhIjoxfQ==", super::PAY_ENDPOINT, "salt", "1");
        assert_eq!(first, second);

        let (digest, index) = first.split_once("###").unwrap();
        assert_eq!(index, "1");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        assert_ne!(
            first,
            super::x_verify("eyJhIjoxfQ==", super::PAY_ENDPOINT, "other-salt", "1")
        );
    }

    #[test]
    fn test_sign_encodes_compact_json() {
        let envelope = super::sign(&json!({ "amount": 19950 }), "salt", "2").unwrap();

        let decoded = BASE64_STANDARD.decode(&envelope.payload_base64).unwrap();
        assert_eq!(decoded, b"{\"amount\":19950}");
        assert_eq!(
            envelope.x_verify,
            super::x_verify(&envelope.payload_base64, "/pg/v1/pay", "salt", "2")
        );
        assert!(envelope.x_verify.ends_with("###2"));
    }
}
