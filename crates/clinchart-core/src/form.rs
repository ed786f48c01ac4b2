//! Typed-input validation and record expansion.
//!
//! One submitted event form becomes zero, one, or many normalized records.
//! Each field is checked against the rule its type declares in the
//! capability table; failures are collected into one batched list so the
//! caller reports them in a single message, and fields that passed still
//! produce their records.

use chrono::{Duration, NaiveDateTime};

use clinchart_model::{ChartConfig, EVENT_KIND, Record, ValueRule, normalize_decimal};

use crate::error::{CoreError, Result};

/// A validated field value ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scaled numeric value in base units.
    Number(f64),
    /// Free text, stored as entered.
    Text(String),
}

impl FieldValue {
    /// Storage form of the value; whole numbers drop the trailing `.0`.
    pub fn into_storage(self) -> String {
        match self {
            Self::Number(value) => format_value(value),
            Self::Text(text) => text,
        }
    }
}

/// Outcome of checking one field's raw input.
///
/// `Absent` (empty input) means "field not submitted": no record and no
/// error, distinct from both a zero value and a validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Absent,
    Valid(FieldValue),
    Invalid,
}

impl FieldOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Check raw input against a value rule.
///
/// Numeric rules normalize the decimal separator, scale by the input
/// factor (natural units → base units), and range-check the scaled value.
/// Text rules pass the entered text through untouched.
pub fn check_field(raw: &str, rule: &ValueRule) -> FieldOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldOutcome::Absent;
    }
    match rule {
        ValueRule::Numeric {
            min,
            max,
            input_factor,
        } => match normalize_decimal(trimmed).parse::<f64>() {
            Ok(entered) => {
                let scaled = entered * input_factor;
                if scaled >= *min && scaled <= *max {
                    FieldOutcome::Valid(FieldValue::Number(scaled))
                } else {
                    FieldOutcome::Invalid
                }
            }
            Err(_) => FieldOutcome::Invalid,
        },
        ValueRule::Text => FieldOutcome::Valid(FieldValue::Text(trimmed.to_string())),
    }
}

/// One measurement input on the form.
#[derive(Debug, Clone)]
pub struct FieldInput {
    /// Record type the input feeds, e.g. "Vtop".
    pub kind: String,
    pub raw: String,
    /// Selected repeat multiplier, when the field offers one.
    pub repeat: Option<u32>,
}

/// One submitted clinical-event form.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub base_time: NaiveDateTime,
    pub fields: Vec<FieldInput>,
    /// Chosen event enumeration value; empty means no event.
    pub event: String,
    pub comment: String,
}

impl EventForm {
    pub fn new(base_time: NaiveDateTime) -> Self {
        Self {
            base_time,
            fields: Vec::new(),
            event: String::new(),
            comment: String::new(),
        }
    }
}

/// Normalized records plus the names of the fields that failed.
#[derive(Debug, Clone, Default)]
pub struct FormOutcome {
    pub records: Vec<Record>,
    pub rejected: Vec<String>,
}

impl FormOutcome {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Expand a form submission into normalized records.
///
/// Validation failures land in `FormOutcome::rejected` and never abort the
/// call; only structural problems (a field naming a type the capability
/// table does not declare) are hard errors.
pub fn expand_form(form: &EventForm, config: &ChartConfig) -> Result<FormOutcome> {
    let mut outcome = FormOutcome::default();

    for field in &form.fields {
        let spec = config
            .capability(&field.kind)
            .ok_or_else(|| CoreError::UnknownKind(field.kind.clone()))?;

        match check_field(&field.raw, &spec.rule) {
            FieldOutcome::Absent => {}
            FieldOutcome::Invalid => outcome.rejected.push(field.kind.clone()),
            FieldOutcome::Valid(value) => {
                let repeat = field.repeat.unwrap_or(1).max(1);
                if repeat > 1 && !spec.repeat_choices.contains(&repeat) {
                    outcome.rejected.push(field.kind.clone());
                    continue;
                }
                let stored = value.into_storage();
                for i in 0..repeat {
                    // Offsets computed from the base, not by stepping, so
                    // truncation does not accumulate when 24h does not
                    // divide evenly.
                    let offset =
                        Duration::seconds(86_400 * i64::from(i) / i64::from(repeat));
                    outcome.records.push(Record::new(
                        form.base_time + offset,
                        spec.name.clone(),
                        stored.clone(),
                        form.comment.clone(),
                    ));
                }
            }
        }
    }

    let event = form.event.trim();
    if !event.is_empty() {
        if !config.event_kinds.iter().any(|k| k == event) {
            return Err(CoreError::UnknownKind(event.to_string()));
        }
        outcome.records.push(Record::new(
            form.base_time,
            EVENT_KIND,
            event,
            form.comment.clone(),
        ));
    }

    if outcome.has_rejections() {
        tracing::warn!(rejected = ?outcome.rejected, "form fields failed validation");
    }
    Ok(outcome)
}

/// Render a validated numeric value for storage, without a trailing `.0`
/// on whole numbers.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
