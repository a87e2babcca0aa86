//! Premium request validation
//!
//! Turns the raw request body into a [`PremiumRequest`] in a single pass,
//! collecting every problem into one field-keyed error map.

use serde_json::{Map, Value};

use crate::domain::entities::{CustomerId, PolicyId, PremiumRequest};
use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_INTEGER: &str = "A valid integer is required.";
const NOT_POSITIVE: &str = "Ensure this value is greater than or equal to 1.";

/// Parse and validate a `POST /premium/calculate` body
pub fn validate_premium_request(body: &[u8]) -> Result<PremiumRequest, AppError> {
    let fields = parse_object(body)?;
    let mut errors = FieldErrors::new();

    let customer_id = check_id(&fields, "customer_id", &mut errors);
    let policy_id = check_id(&fields, "policy_id", &mut errors);

    match (customer_id, policy_id) {
        (Some(customer_id), Some(policy_id)) if errors.is_empty() => Ok(PremiumRequest {
            customer_id: CustomerId(customer_id),
            policy_id: PolicyId(policy_id),
        }),
        _ => Err(AppError::InvalidRequest(errors)),
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    // An empty body is treated like an empty object so both fields report as missing
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        AppError::invalid_field(NON_FIELD_ERRORS, format!("JSON parse error - {}", e))
    })?;

    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::invalid_field(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&other)
            ),
        )),
    }
}

fn check_id(fields: &Map<String, Value>, name: &str, errors: &mut FieldErrors) -> Option<i64> {
    match parse_id(fields.get(name)) {
        Ok(id) => Some(id),
        Err(reason) => {
            errors
                .entry(name.to_string())
                .or_default()
                .push(reason.to_string());
            None
        }
    }
}

fn parse_id(value: Option<&Value>) -> Result<i64, &'static str> {
    let id = match value {
        None => return Err(REQUIRED),
        Some(Value::Null) => return Err(NOT_NULL),
        Some(Value::Number(n)) => integer_from_number(n),
        Some(Value::String(s)) => integer_from_str(s.trim()),
        Some(_) => None,
    }
    .ok_or(NOT_INTEGER)?;

    if id < 1 {
        return Err(NOT_POSITIVE);
    }
    Ok(id)
}

fn integer_from_number(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    // Accept 7.0 but not 7.5
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn integer_from_str(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    // "7.00" is accepted the same way as 7.0
    let (whole, fraction) = s.split_once('.')?;
    if !fraction.is_empty() && fraction.chars().all(|c| c == '0') {
        whole.parse().ok()
    } else {
        None
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
