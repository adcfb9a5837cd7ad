use serde_json::{Number, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PaymentError;
use crate::model::PaymentRequest;

pub const TRANSACTION_PREFIX: &str = "JR";

/// Issues merchant transaction ids of the form `JR<epoch millis>`.
///
/// Two requests landing in the same millisecond would otherwise share an id,
/// so the timestamp is bumped past the last one issued by this process.
#[derive(Debug, Default)]
pub struct TransactionIdGenerator {
    last: AtomicU64,
}

impl TransactionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        format!("{}{}", TRANSACTION_PREFIX, self.next_stamp(now))
    }

    fn next_stamp(&self, now: u64) -> u64 {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > last { now } else { last + 1 };
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

/// A request that passed validation, with `phone` normalized to a string and
/// `amount` converted to paise.
#[derive(Debug, PartialEq)]
pub struct ValidatedPayment {
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub amount_in_paise: i64,
}

impl TryFrom<PaymentRequest> for ValidatedPayment {
    type Error = PaymentError;

    fn try_from(request: PaymentRequest) -> Result<Self, Self::Error> {
        let (Some(phone), Some(amount)) = (
            request.phone.as_ref().filter(|v| is_truthy(v)),
            request.amount.as_ref().filter(|v| is_truthy(v)),
        ) else {
            return Err(PaymentError::MissingFields);
        };

        let phone = text(phone).ok_or(PaymentError::MissingFields)?;
        let amount = parse_amount(amount).ok_or(PaymentError::InvalidAmount)?;

        Ok(Self {
            name: request.name.as_ref().and_then(text),
            phone,
            email: request.email.as_ref().and_then(text),
            amount_in_paise: to_minor_units(amount)?,
        })
    }
}

/// Strings pass through and numbers are rendered as text. Anything else is
/// dropped.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(render_number(n)),
        _ => None,
    }
}

/// `98765.0` renders as `98765`, matching how a browser stringifies it.
fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// JavaScript-style truthiness for the loosely typed request fields.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Rupees to paise, rounding half away from zero.
pub fn to_minor_units(amount: f64) -> Result<i64, PaymentError> {
    let paise = (amount * 100.0).round();
    if !paise.is_finite() || paise < 1.0 || paise > i64::MAX as f64 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok(paise as i64)
}
