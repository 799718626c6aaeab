use super::repository::{Difficulty, MealFields, Nutrition};
use crate::utils::validation::into_messages;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const FIELDS: [&str; 7] = [
    "name",
    "date",
    "difficulty",
    "nutrition",
    "cuisine",
    "rating",
    "notes",
];

const RATING_MESSAGE: &str = "rating must be between 0 and 5 with 0.5 increments";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::from(message))
}

fn string<'a>(value: &'a Value, code: &'static str, message: &'static str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| error(code, message))
}

fn trimmed_length_between(value: &str, min: usize, max: usize) -> Option<String> {
    let value = value.trim();
    let length = value.chars().count();
    (length >= min && length <= max).then(|| value.to_string())
}

fn parse_name(value: &Value) -> Result<String, ValidationError> {
    let name = string(value, "INVALID_NAME", "name must be a string")?;
    trimmed_length_between(name, 1, 100)
        .ok_or_else(|| error("INVALID_NAME", "name must be between 1 and 100 characters"))
}

fn parse_cuisine(value: &Value) -> Result<String, ValidationError> {
    let cuisine = string(value, "INVALID_CUISINE", "cuisine must be a string")?;
    trimmed_length_between(cuisine, 1, 50)
        .ok_or_else(|| error("INVALID_CUISINE", "cuisine must be between 1 and 50 characters"))
}

fn parse_date_field(value: &Value) -> Result<DateTime<Utc>, ValidationError> {
    let date = string(value, "INVALID_DATE", "date must be a string")?;
    parse_date(date).ok_or_else(|| error("INVALID_DATE", "date must be a valid ISO 8601 date"))
}

fn parse_difficulty(value: &Value) -> Result<Difficulty, ValidationError> {
    string(value, "INVALID_DIFFICULTY", "difficulty must be a string")?
        .parse()
        .map_err(|_| error("INVALID_DIFFICULTY", "difficulty must be one of EASY, MEDIUM, HARD"))
}

fn parse_nutrition(value: &Value) -> Result<Nutrition, ValidationError> {
    string(value, "INVALID_NUTRITION", "nutrition must be a string")?
        .parse()
        .map_err(|_| error("INVALID_NUTRITION", "nutrition must be one of HEALTHY, UNHEALTHY"))
}

fn parse_rating(value: &Value) -> Result<f64, ValidationError> {
    rating_value(value)
        .filter(|rating| is_valid_rating(*rating))
        .ok_or_else(|| error("INVALID_RATING", RATING_MESSAGE))
}

fn parse_notes(value: &Value) -> Result<String, ValidationError> {
    let notes = string(value, "INVALID_NOTES", "notes must be a string")?;
    match notes.chars().count() <= 1000 {
        true => Ok(notes.to_string()),
        false => Err(error("INVALID_NOTES", "notes must be at most 1000 characters")),
    }
}

fn validate_name(value: &Value) -> Result<(), ValidationError> {
    parse_name(value).map(|_| ())
}

fn validate_date(value: &Value) -> Result<(), ValidationError> {
    parse_date_field(value).map(|_| ())
}

fn validate_difficulty(value: &Value) -> Result<(), ValidationError> {
    parse_difficulty(value).map(|_| ())
}

fn validate_nutrition(value: &Value) -> Result<(), ValidationError> {
    parse_nutrition(value).map(|_| ())
}

fn validate_cuisine(value: &Value) -> Result<(), ValidationError> {
    parse_cuisine(value).map(|_| ())
}

fn validate_rating(value: &Value) -> Result<(), ValidationError> {
    parse_rating(value).map(|_| ())
}

fn validate_notes(value: &Value) -> Result<(), ValidationError> {
    parse_notes(value).map(|_| ())
}

/// Accepts RFC 3339 timestamps, naive ISO date-times (read as UTC) and bare dates.
/// Sub-microsecond digits are dropped to match what the stores keep.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    let date = DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|date| date.and_utc())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|date| date.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|date| date.and_utc())
        })?;

    Some(date.trunc_subsecs(6))
}

/// Ratings arrive as JSON numbers or, from form posts, numeric strings.
fn rating_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 0 to 5 inclusive, in steps of 0.5.
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=5.0).contains(&rating) && (rating * 10.0) % 5.0 == 0.0
}

/// A meal as submitted by a client for create or replace. Fields stay untyped
/// JSON so a wrong type is reported next to every other violation.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct MealBody {
    #[validate(
        required(message = "name is required"),
        custom(code = "INVALID_NAME", function = "validate_name")
    )]
    pub name: Option<Value>,
    #[validate(
        required(message = "date is required"),
        custom(code = "INVALID_DATE", function = "validate_date")
    )]
    pub date: Option<Value>,
    #[validate(
        required(message = "difficulty is required"),
        custom(code = "INVALID_DIFFICULTY", function = "validate_difficulty")
    )]
    pub difficulty: Option<Value>,
    #[validate(
        required(message = "nutrition is required"),
        custom(code = "INVALID_NUTRITION", function = "validate_nutrition")
    )]
    pub nutrition: Option<Value>,
    #[validate(
        required(message = "cuisine is required"),
        custom(code = "INVALID_CUISINE", function = "validate_cuisine")
    )]
    pub cuisine: Option<Value>,
    #[validate(
        required(message = "rating is required"),
        custom(code = "INVALID_RATING", function = "validate_rating")
    )]
    pub rating: Option<Value>,
    #[validate(custom(code = "INVALID_NOTES", function = "validate_notes"))]
    pub notes: Option<Value>,
}

fn present<'a>(value: &'a Option<Value>, message: &'static str) -> Result<&'a Value, ValidationError> {
    value.as_ref().ok_or_else(|| error("required", message))
}

fn into_fields(body: &MealBody) -> Result<MealFields, ValidationError> {
    Ok(MealFields {
        name: parse_name(present(&body.name, "name is required")?)?,
        date: parse_date_field(present(&body.date, "date is required")?)?,
        difficulty: parse_difficulty(present(&body.difficulty, "difficulty is required")?)?,
        nutrition: parse_nutrition(present(&body.nutrition, "nutrition is required")?)?,
        cuisine: parse_cuisine(present(&body.cuisine, "cuisine is required")?)?,
        rating: parse_rating(present(&body.rating, "rating is required")?)?,
        notes: body
            .notes
            .as_ref()
            .map(parse_notes)
            .transpose()?
            .unwrap_or_default(),
    })
}

/// Checks every rule and reports all violations together; on success returns
/// the typed, trimmed fields ready to store.
pub fn validate(body: &MealBody) -> Result<MealFields, Vec<String>> {
    body.validate()
        .map_err(|errors| into_messages(&errors, &FIELDS))?;

    into_fields(body).map_err(|err| {
        vec![err
            .message
            .map(|message| message.to_string())
            .unwrap_or_else(|| err.code.to_string())]
    })
}
