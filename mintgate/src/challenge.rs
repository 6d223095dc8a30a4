//! x402 payment-challenge construction.
//!
//! [`build_challenge`] turns static price configuration and the resource
//! URL into the JSON body of an HTTP 402 response. External validators
//! compare the body structurally, so field order and value typing follow
//! the wire format exactly: the amount stays a decimal string, the timeout
//! stays a number, and serde emits fields in declaration order.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ConfigurationError;

/// Protocol version emitted in every challenge.
pub const X402_VERSION: u32 = 1;

/// The only payment scheme this gate accepts.
pub const SCHEME_EXACT: &str = "exact";

const MIME_JSON: &str = "application/json";

/// Which challenge body shape to emit.
///
/// Some validators reject unknown fields, so the minimal shape is the
/// default; the extended shape advertises the notify body and extra asset
/// metadata for clients that understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeVariant {
    /// Exactly the required fields.
    #[default]
    Minimal,
    /// Adds `outputSchema` and `extra`.
    Extended,
}

/// Static pricing configuration a challenge is built from.
#[derive(Debug, Clone)]
pub struct ChallengeConfig {
    /// Price as a decimal string in the asset's display convention,
    /// e.g. `"12.00"`.
    pub amount: String,
    /// Asset symbol, e.g. `"USDC"`.
    pub asset: String,
    /// Chain identifier, e.g. `"base"`.
    pub network: String,
    /// Treasury address that receives the payment, raw configured string.
    pub pay_to: String,
    /// Payment validity window in seconds.
    pub timeout_seconds: u64,
    /// Challenge description; a default is derived from amount and asset
    /// when absent.
    pub description: Option<String>,
    /// Body shape to emit.
    pub variant: ChallengeVariant,
    /// Extra metadata for the extended shape (e.g. token name/version).
    pub extra: Option<Value>,
}

/// One entry of the challenge's `accepts` list.
///
/// Field declaration order is the serialized order; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    /// Payment scheme identifier (always `"exact"`).
    pub scheme: String,
    /// Chain identifier.
    pub network: String,
    /// Required amount as a decimal string.
    pub max_amount_required: String,
    /// Absolute URL of the protected action.
    pub resource: String,
    /// Human-readable description of what the payment unlocks.
    pub description: String,
    /// MIME type of the protected resource.
    pub mime_type: String,
    /// Checksummed treasury address.
    pub pay_to: String,
    /// Payment validity window in seconds.
    pub max_timeout_seconds: u64,
    /// Asset symbol.
    pub asset: String,
    /// Expected notify-request shape (extended variant only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Additional metadata (extended variant only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// The full 402 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version (always 1).
    pub x402_version: u32,
    /// Accepted payment requirements.
    pub accepts: Vec<PaymentTerms>,
}

/// Builds the 402 challenge body for a resource URL.
///
/// Pure: no side effects, constructed fresh per request.
///
/// # Errors
///
/// Returns [`ConfigurationError`] when `pay_to` is absent or is not a
/// well-formed address. An invalid payee is never emitted.
pub fn build_challenge(
    config: &ChallengeConfig,
    resource_url: &str,
) -> Result<PaymentRequired, ConfigurationError> {
    let pay_to = parse_pay_to(&config.pay_to)?;

    let description = config.description.clone().unwrap_or_else(|| {
        format!("Mint 1 NFT via x402 for {} {}", config.amount, config.asset)
    });

    let (output_schema, extra) = match config.variant {
        ChallengeVariant::Minimal => (None, None),
        ChallengeVariant::Extended => (Some(notify_body_schema()), config.extra.clone()),
    };

    Ok(PaymentRequired {
        x402_version: X402_VERSION,
        accepts: vec![PaymentTerms {
            scheme: SCHEME_EXACT.to_owned(),
            network: config.network.clone(),
            max_amount_required: config.amount.clone(),
            resource: resource_url.to_owned(),
            description,
            mime_type: MIME_JSON.to_owned(),
            pay_to: pay_to.to_checksum(None),
            max_timeout_seconds: config.timeout_seconds,
            asset: config.asset.clone(),
            output_schema,
            extra,
        }],
    })
}

/// Validates the configured treasury address.
///
/// # Errors
///
/// Returns [`ConfigurationError::MissingPayTo`] for an empty value and
/// [`ConfigurationError::InvalidAddress`] for anything that is not a
/// 20-byte `0x` hex address.
pub fn parse_pay_to(raw: &str) -> Result<Address, ConfigurationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigurationError::MissingPayTo);
    }
    raw.parse()
        .map_err(|_| ConfigurationError::InvalidAddress {
            field: "payTo",
            value: raw.to_owned(),
        })
}

/// Schema of the notify request body, advertised by the extended variant.
fn notify_body_schema() -> Value {
    json!({
        "input": {
            "type": "http",
            "method": "POST",
            "bodyFields": ["txHash", "payer", "paymentId", "resource"],
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREASURY: &str = "0x1111111111111111111111111111111111111111";
    const RESOURCE: &str = "https://punks.example/api/nft/notify";

    fn config() -> ChallengeConfig {
        ChallengeConfig {
            amount: "12.00".to_owned(),
            asset: "USDC".to_owned(),
            network: "base".to_owned(),
            pay_to: TREASURY.to_owned(),
            timeout_seconds: 300,
            description: None,
            variant: ChallengeVariant::Minimal,
            extra: None,
        }
    }

    #[test]
    fn minimal_body_is_byte_stable() {
        let challenge = build_challenge(&config(), RESOURCE).unwrap();
        let body = serde_json::to_string(&challenge).unwrap();
        assert_eq!(
            body,
            concat!(
                "{\"x402Version\":1,\"accepts\":[{",
                "\"scheme\":\"exact\",",
                "\"network\":\"base\",",
                "\"maxAmountRequired\":\"12.00\",",
                "\"resource\":\"https://punks.example/api/nft/notify\",",
                "\"description\":\"Mint 1 NFT via x402 for 12.00 USDC\",",
                "\"mimeType\":\"application/json\",",
                "\"payTo\":\"0x1111111111111111111111111111111111111111\",",
                "\"maxTimeoutSeconds\":300,",
                "\"asset\":\"USDC\"",
                "}]}"
            )
        );
    }

    #[test]
    fn timeout_is_a_number_and_amount_is_a_string() {
        let challenge = build_challenge(&config(), RESOURCE).unwrap();
        let value = serde_json::to_value(&challenge).unwrap();
        assert!(value["accepts"][0]["maxTimeoutSeconds"].is_u64());
        assert!(value["accepts"][0]["maxAmountRequired"].is_string());
    }

    #[test]
    fn extended_variant_advertises_notify_body() {
        let config = ChallengeConfig {
            variant: ChallengeVariant::Extended,
            extra: Some(json!({ "name": "USD Coin", "version": "2" })),
            ..config()
        };
        let challenge = build_challenge(&config, RESOURCE).unwrap();
        let terms = &challenge.accepts[0];

        let schema = terms.output_schema.as_ref().unwrap();
        assert_eq!(
            schema["input"]["bodyFields"],
            json!(["txHash", "payer", "paymentId", "resource"])
        );
        assert_eq!(terms.extra.as_ref().unwrap()["name"], "USD Coin");
    }

    #[test]
    fn minimal_variant_omits_optional_fields() {
        let challenge = build_challenge(&config(), RESOURCE).unwrap();
        let body = serde_json::to_string(&challenge).unwrap();
        assert!(!body.contains("outputSchema"));
        assert!(!body.contains("extra"));
    }

    #[test]
    fn missing_pay_to_is_a_configuration_error() {
        let config = ChallengeConfig {
            pay_to: String::new(),
            ..config()
        };
        assert!(matches!(
            build_challenge(&config, RESOURCE),
            Err(ConfigurationError::MissingPayTo)
        ));
    }

    #[test]
    fn malformed_pay_to_is_a_configuration_error() {
        for bad in ["treasury", "0x1234", "0x11111111111111111111111111111111111111zz"] {
            let config = ChallengeConfig {
                pay_to: bad.to_owned(),
                ..config()
            };
            assert!(
                matches!(
                    build_challenge(&config, RESOURCE),
                    Err(ConfigurationError::InvalidAddress { .. })
                ),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn pay_to_is_emitted_checksummed() {
        let config = ChallengeConfig {
            pay_to: "0x00000000000000000000000000000000000000ab".to_owned(),
            ..config()
        };
        let challenge = build_challenge(&config, RESOURCE).unwrap();
        // EIP-55: hex letters keep a deterministic case, independent of the
        // casing the operator configured.
        let emitted = &challenge.accepts[0].pay_to;
        let expected: Address = "0x00000000000000000000000000000000000000ab".parse().unwrap();
        assert_eq!(emitted, &expected.to_checksum(None));
    }

    #[test]
    fn challenge_round_trips_through_serde() {
        let challenge = build_challenge(&config(), RESOURCE).unwrap();
        let body = serde_json::to_string(&challenge).unwrap();
        let parsed: PaymentRequired = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, challenge);
    }
}
