//! Transaction records as returned by the `eventive/v1/donations` endpoint.
//!
//! The payload is loosely shaped:
//!   {"transactions": [{"category": {"ref_label": "Donation"}, "gross": "2500"}, ...]}
//! `gross` is in cents and may arrive as a number or a numeric string.
//! Anything that does not look like a donation is kept as `Other` rather than
//! rejected, so one odd record never fails the whole batch.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Category label that marks a transaction as a donation (exact, case sensitive)
pub const DONATION_LABEL: &str = "Donation";

/// A single transaction, classified at decode time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionRecord {
    /// Donation with its gross amount in minor units (cents)
    Donation { gross_cents: f64 },
    /// Any other category, or a record whose fields are missing or malformed
    Other,
}

impl TransactionRecord {
    /// Classify one raw JSON record
    pub fn from_value(value: &Value) -> Self {
        let label = value
            .get("category")
            .and_then(|c| c.get("ref_label"))
            .and_then(Value::as_str);

        if label != Some(DONATION_LABEL) {
            return TransactionRecord::Other;
        }

        match value.get("gross").and_then(parse_gross) {
            Some(gross_cents) => TransactionRecord::Donation { gross_cents },
            None => {
                warn!(record = %value, "donation record has no usable gross amount; skipping");
                TransactionRecord::Other
            }
        }
    }

    pub fn is_donation(&self) -> bool {
        matches!(self, TransactionRecord::Donation { .. })
    }

    /// Amount in major units (dollars); zero for non-donations
    pub fn amount(&self) -> f64 {
        match self {
            TransactionRecord::Donation { gross_cents } => gross_cents / 100.0,
            TransactionRecord::Other => 0.0,
        }
    }
}

fn parse_gross(value: &Value) -> Option<f64> {
    let gross = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    gross.is_finite().then_some(gross)
}

/// The decoded response body. A missing or non-array `transactions` field
/// decodes to an empty batch. Only the wire shape is read; a batch is never
/// written back out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct TransactionBatch {
    pub records: Vec<TransactionRecord>,
}

impl From<Value> for TransactionBatch {
    fn from(value: Value) -> Self {
        let records = value
            .get("transactions")
            .and_then(Value::as_array)
            .map(|txns| txns.iter().map(TransactionRecord::from_value).collect())
            .unwrap_or_default();
        Self { records }
    }
}

impl TransactionBatch {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    /// Sum of donation amounts in major units
    pub fn total_raised(&self) -> f64 {
        self.records
            .iter()
            .fold(0.0, |total, record| total + record.amount())
    }

    pub fn donation_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_donation()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
