//! Typed form inputs and their field-level validation.
//!
//! Each form deserializes leniently from what a browser form submits (numbers may
//! arrive as strings, optional fields as `""`) and is turned into a domain value
//! only once every rule passes. The declarative rules are `validator` attributes;
//! the numeric and date fields, which need parsing first, are checked by hand.
//! Failures are reported per field, keyed by the camelCase JSON name, so a client
//! can render them next to the offending input.

use crate::enums::TradeType;
use crate::structs::{Note, Trade, calculate_pnl};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validation failures keyed by the form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when no failures were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, failures) in errors.field_errors() {
            let key = camel_case(&field);
            for failure in failures.iter() {
                let message = match &failure.message {
                    Some(message) => message.to_string(),
                    None => failure.code.to_string(),
                };
                fields.add(&key, message);
            }
        }
        fields
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn validated<T: Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed(message));
        return Err(error);
    }
    Ok(())
}

fn instrument_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Instrument is required")
}

fn title_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Title is required")
}

fn description_present(value: &str) -> Result<(), ValidationError> {
    required(value, "Description is required")
}

/// A numeric form value as submitted: either a JSON number or the raw text of an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(Decimal),
    Text(String),
}

impl NumericInput {
    /// `Ok(None)` for blank text, `Err(())` for text that is not a number.
    fn parse(&self) -> Result<Option<Decimal>, ()> {
        match self {
            NumericInput::Number(value) => Ok(Some(*value)),
            NumericInput::Text(text) if text.trim().is_empty() => Ok(None),
            NumericInput::Text(text) => Decimal::from_str(text.trim()).map(Some).map_err(|_| ()),
        }
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        NumericInput::Number(value)
    }
}

/// Raw input of the "new trade" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTradeForm {
    #[validate(custom(function = "instrument_present"))]
    pub instrument: String,
    #[serde(rename = "type")]
    pub trade_type: Option<String>,
    pub entry_price: Option<NumericInput>,
    pub exit_price: Option<NumericInput>,
    pub size: Option<NumericInput>,
    pub commission: Option<NumericInput>,
    pub entry_date: Option<String>,
    pub exit_date: Option<String>,
    pub notes: Option<String>,
    pub chart_image_url: Option<String>,
}

impl NewTradeForm {
    /// Validates every field and builds the trade, computing its P/L when an exit price is given.
    pub fn into_trade(self) -> Result<Trade, FieldErrors> {
        let mut errors = validated(&self);
        let instrument = self.instrument.trim().to_string();

        let trade_type = match non_blank(self.trade_type).as_deref() {
            Some("Long") => Some(TradeType::Long),
            Some("Short") => Some(TradeType::Short),
            Some(_) => {
                errors.add("type", "Type must be Long or Short");
                None
            }
            None => {
                errors.add("type", "Type is required");
                None
            }
        };

        let entry_price = required_positive(&mut errors, "entryPrice", "Entry price", self.entry_price.as_ref());
        let exit_price = optional_positive(&mut errors, "exitPrice", "Exit price", self.exit_price.as_ref());
        let size = required_positive(&mut errors, "size", "Size", self.size.as_ref());
        let commission = match self.commission.as_ref().map(NumericInput::parse) {
            None | Some(Ok(None)) => Decimal::ZERO,
            Some(Ok(Some(value))) if value < Decimal::ZERO => {
                errors.add("commission", "Commission cannot be negative");
                Decimal::ZERO
            }
            Some(Ok(Some(value))) => value,
            Some(Err(())) => {
                errors.add("commission", "Commission must be a number");
                Decimal::ZERO
            }
        };

        let entry_date = match non_blank(self.entry_date) {
            None => {
                errors.add("entryDate", "Entry date is required");
                None
            }
            Some(text) => {
                let parsed = parse_timestamp(&text);
                if parsed.is_none() {
                    errors.add("entryDate", "Entry date is not a valid date");
                }
                parsed
            }
        };
        let exit_date = match non_blank(self.exit_date) {
            None => None,
            Some(text) => {
                let parsed = parse_timestamp(&text);
                if parsed.is_none() {
                    errors.add("exitDate", "Exit date is not a valid date");
                }
                parsed
            }
        };

        match (trade_type, entry_price, size, entry_date) {
            (Some(trade_type), Some(entry_price), Some(size), Some(entry_date)) if errors.is_empty() => {
                let pnl = match exit_price {
                    None => None,
                    Some(exit) => match calculate_pnl(trade_type, entry_price, exit, size, commission) {
                        Some(pnl) => Some(pnl),
                        None => {
                            errors.add("exitPrice", "P/L is out of range");
                            return Err(errors);
                        }
                    },
                };
                Ok(Trade {
                    id: Uuid::new_v4().to_string(),
                    instrument,
                    trade_type,
                    entry_price,
                    exit_price,
                    size,
                    commission,
                    entry_date,
                    exit_date,
                    notes: non_blank(self.notes),
                    chart_image_url: non_blank(self.chart_image_url),
                    pnl,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Raw input of the note create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteForm {
    #[validate(
        custom(function = "title_present"),
        length(max = 100, message = "Title must be at most 100 characters")
    )]
    pub title: String,
    #[validate(custom(function = "description_present"))]
    pub description: String,
    pub screenshot_url: Option<String>,
}

impl NoteForm {
    /// Builds a brand new note.
    pub fn into_note(self, created_at: DateTime<Utc>) -> Result<Note, FieldErrors> {
        validated(&self).into_result(())?;
        Ok(Note {
            id: Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            screenshot_url: non_blank(self.screenshot_url),
            created_at,
        })
    }

    /// Builds the full replacement for `existing`, keeping its identity and creation time.
    pub fn into_replacement(self, existing: &Note) -> Result<Note, FieldErrors> {
        let mut note = self.into_note(existing.created_at)?;
        note.id = existing.id.clone();
        Ok(note)
    }
}

/// Raw input of the sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        validated(self).into_result(())
    }
}

/// Raw input of the sign-in form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SignInForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl SignInForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        validated(self).into_result(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_positive(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    input: Option<&NumericInput>,
) -> Option<Decimal> {
    match input.map(NumericInput::parse) {
        None | Some(Ok(None)) => {
            errors.add(field, format!("{} is required", label));
            None
        }
        Some(value) => positive(errors, field, label, value),
    }
}

fn optional_positive(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    input: Option<&NumericInput>,
) -> Option<Decimal> {
    match input.map(NumericInput::parse) {
        None | Some(Ok(None)) => None,
        Some(value) => positive(errors, field, label, value),
    }
}

fn positive(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Result<Option<Decimal>, ()>,
) -> Option<Decimal> {
    match value {
        Ok(Some(v)) if v > Decimal::ZERO => Some(v),
        Ok(_) => {
            errors.add(field, format!("{} must be positive", label));
            None
        }
        Err(()) => {
            errors.add(field, format!("{} must be a number", label));
            None
        }
    }
}

/// Accepts RFC 3339 or the `datetime-local` shape (`YYYY-MM-DDTHH:MM[:SS]`), the latter read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
