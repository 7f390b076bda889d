//! Fundraising goal and progress computation

use serde::{Serialize, Serializer};

use crate::transactions::TransactionBatch;

/// Goal used when the configured amount is missing or unusable
pub const DEFAULT_GOAL: f64 = 1000.0;

/// Query window for the donation listing. The strings are passed to the
/// remote service verbatim; no date parsing happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Returns `None` when either bound is absent or empty
    pub fn new(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => Some(Self {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => None,
        }
    }
}

/// Monetary goal in major units. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Goal(f64);

impl Goal {
    /// Falls back to `DEFAULT_GOAL` for non-finite, zero or negative amounts
    pub fn new(amount: f64) -> Self {
        if amount.is_finite() && amount > 0.0 {
            Self(amount)
        } else {
            Self(DEFAULT_GOAL)
        }
    }

    /// Parse a goal attribute as the host supplies it
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<f64>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self(DEFAULT_GOAL)
    }
}

/// Two-decimal text with `Number.prototype.toFixed(2)` rounding: nearest on
/// the exact binary value, exact ties away from zero.
pub fn to_fixed2(x: f64) -> String {
    if x == 0.0 {
        return "0.00".to_string();
    }
    // A tie at the third decimal is only representable as an odd multiple of 1/8.
    let is_tie = x.is_finite() && (x * 8.0).fract() == 0.0 && (x * 100.0).fract() != 0.0;
    if is_tie {
        format!("{:.2}", (x * 100.0).round() / 100.0)
    } else {
        format!("{:.2}", x)
    }
}

fn serialize_fixed2<S: Serializer>(x: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(to_fixed2(*x).parse().unwrap_or(*x))
}

/// Progress towards a goal. Fields hold the unrounded values; rounding to
/// two decimals happens once, when displayed or serialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResult {
    #[serde(serialize_with = "serialize_fixed2")]
    pub total_raised: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub goal: f64,
    /// At most 100; only negative donation amounts take it below 0
    #[serde(serialize_with = "serialize_fixed2")]
    pub percent: f64,
}

impl ProgressResult {
    /// Compute progress for an already-fetched batch
    pub fn compute(batch: &TransactionBatch, goal: Goal) -> Self {
        Self::from_total(batch.total_raised(), goal)
    }

    pub fn from_total(total: f64, goal: Goal) -> Self {
        // Only the upper bound is clamped: totals are sums of gross amounts.
        let percent = (total / goal.value() * 100.0).min(100.0);
        Self {
            total_raised: total,
            goal: goal.value(),
            percent,
        }
    }

    pub fn total_display(&self) -> String {
        to_fixed2(self.total_raised)
    }

    pub fn goal_display(&self) -> String {
        to_fixed2(self.goal)
    }

    pub fn percent_display(&self) -> String {
        to_fixed2(self.percent)
    }

    /// `$<total> of $<goal> raised (<percent>%)`
    pub fn caption(&self) -> String {
        format!(
            "${} of ${} raised ({}%)",
            self.total_display(),
            self.goal_display(),
            self.percent_display()
        )
    }

    pub fn goal_reached(&self) -> bool {
        self.total_raised >= self.goal
    }
}
