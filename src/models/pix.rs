use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_AMOUNT_IN_CENTS: i64 = 100;

/// Body accepted by `POST /api/depix`. The amount is kept as raw JSON since
/// any falsy value (`null`, `false`, `0`, `""`) selects the default.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    #[serde(default)]
    pub amount_in_cents: Option<Value>,
}

impl DepositRequest {
    pub fn new(amount_in_cents: i64) -> Self {
        Self {
            amount_in_cents: Some(Value::from(amount_in_cents)),
        }
    }

    /// Amount forwarded upstream. Truthy values pass through unchanged.
    pub fn effective_amount(&self) -> Value {
        match &self.amount_in_cents {
            Some(amount) if is_truthy(amount) => amount.clone(),
            _ => Value::from(DEFAULT_AMOUNT_IN_CENTS),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Every Eulen payload wraps its data under `response`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EulenEnvelope<T> {
    pub response: Option<T>,
}

impl<T> Default for EulenEnvelope<T> {
    fn default() -> Self {
        Self { response: None }
    }
}

impl<T: DeserializeOwned> EulenEnvelope<T> {
    /// Lenient read of a provider payload: anything that does not fit the
    /// expected shape is treated as an empty envelope.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EulenDeposit {
    pub id: Option<String>,
    pub qr_copy_paste: Option<String>,
    pub qr_image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EulenDepositStatus {
    pub status: Option<String>,
    pub bank_tx_id: Option<String>,
    #[serde(rename = "blockchainTxID")]
    pub blockchain_tx_id: Option<String>,
    pub customer_message: Option<String>,
    pub payer_name: Option<String>,
    pub expiration: Option<String>,
    pub qr_id: Option<String>,
    pub value_in_cents: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_amounts_default_to_one_real() {
        for body in [
            json!({}),
            json!({"amountInCents": null}),
            json!({"amountInCents": 0}),
            json!({"amountInCents": 0.0}),
            json!({"amountInCents": false}),
            json!({"amountInCents": ""}),
        ] {
            let request: DepositRequest = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(request.effective_amount(), json!(100), "body {body}");
        }

        assert_eq!(DepositRequest::new(2550).effective_amount(), json!(2550));
    }

    #[test]
    fn truthy_amounts_pass_through_unchanged() {
        let text: DepositRequest =
            serde_json::from_value(json!({"amountInCents": "250"})).unwrap();
        let fraction: DepositRequest =
            serde_json::from_value(json!({"amountInCents": 12.5})).unwrap();

        assert_eq!(text.effective_amount(), json!("250"));
        assert_eq!(fraction.effective_amount(), json!(12.5));
    }

    #[test]
    fn envelope_reads_for_types_without_default() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Bare {
            id: String,
        }

        let present: EulenEnvelope<Bare> =
            EulenEnvelope::from_value(&json!({"response": {"id": "dep-1"}}));
        let missing: EulenEnvelope<Bare> = EulenEnvelope::from_value(&json!({}));

        assert_eq!(present.response, Some(Bare { id: "dep-1".to_string() }));
        assert_eq!(missing.response, None);
    }

    #[test]
    fn deposit_fields_are_optional() {
        let envelope: EulenEnvelope<EulenDeposit> = EulenEnvelope::from_value(&json!({
            "response": {"id": "abc", "qrCopyPaste": "000201..."}
        }));
        let deposit = envelope.response.unwrap();

        assert_eq!(deposit.id.as_deref(), Some("abc"));
        assert_eq!(deposit.qr_copy_paste.as_deref(), Some("000201..."));
        assert_eq!(deposit.qr_image_url, None);
    }

    #[test]
    fn malformed_payloads_read_as_empty() {
        let missing: EulenEnvelope<EulenDepositStatus> = EulenEnvelope::from_value(&json!({}));
        let wrong_type: EulenEnvelope<EulenDepositStatus> =
            EulenEnvelope::from_value(&json!({"response": {"status": 42}}));
        let not_an_object: EulenEnvelope<EulenDepositStatus> =
            EulenEnvelope::from_value(&json!("oops"));

        assert_eq!(missing.response, None);
        assert_eq!(wrong_type.response, None);
        assert_eq!(not_an_object.response, None);
    }

    #[test]
    fn status_reads_provider_field_names() {
        let envelope: EulenEnvelope<EulenDepositStatus> = EulenEnvelope::from_value(&json!({
            "response": {
                "status": "depix_sent",
                "blockchainTxID": "f00",
                "valueInCents": 1000
            }
        }));
        let status = envelope.response.unwrap();

        assert_eq!(status.status.as_deref(), Some("depix_sent"));
        assert_eq!(status.blockchain_tx_id.as_deref(), Some("f00"));
        assert_eq!(status.value_in_cents, Some(1000));
    }
}
