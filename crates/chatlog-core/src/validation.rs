//! Create-request validation.
//!
//! Works on the raw JSON value so that missing fields and type mismatches are
//! reported per field alongside length violations, in a single pass.

use serde_json::Value;
use validator::Validate;

use crate::entities::NewMessage;
use crate::error::{FieldViolation, MessageError};
use crate::schemas::CreateMessageRequest;

const FIELDS: [&str; 3] = ["room_id", "sender", "content"];

/// Values that satisfy every length rule, standing in for absent fields so
/// the rules still run on the fields that were supplied.
const STAND_INS: [&str; 3] = ["-", "-", ""];

/// Turn an untrusted JSON body into a [`CreateMessageRequest`].
///
/// Every offending field is reported; nothing is accepted partially.
pub fn parse_create_request(body: &Value) -> Result<CreateMessageRequest, MessageError> {
    let Some(object) = body.as_object() else {
        return Err(MessageError::Validation(vec![FieldViolation::new(
            "body",
            format!("expected a JSON object, got {}", type_name(body)),
        )]));
    };

    let mut violations = Vec::new();
    let mut strings = STAND_INS.map(str::to_owned);
    for (slot, field) in strings.iter_mut().zip(FIELDS) {
        match object.get(field) {
            None => violations.push(FieldViolation::new(field, "field required")),
            Some(Value::String(s)) => slot.clone_from(s),
            Some(other) => violations.push(FieldViolation::new(
                field,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    let [room_id, sender, content] = strings;
    let request = CreateMessageRequest {
        room_id,
        sender,
        content,
    };
    match validate_request(&request) {
        Ok(()) => {}
        Err(MessageError::Validation(lengths)) => violations.extend(lengths),
        Err(other) => return Err(other),
    }

    if violations.is_empty() {
        Ok(request)
    } else {
        violations.sort_by_key(|v| field_position(&v.field));
        Err(MessageError::Validation(violations))
    }
}

/// Enforce the length limits of an already well-typed request.
pub fn validate_request(request: &CreateMessageRequest) -> Result<(), MessageError> {
    request.validate().map_err(|errors| {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldViolation::new(field.to_string(), message)
                })
            })
            .collect();
        violations.sort_by_key(|v| field_position(&v.field));
        MessageError::Validation(violations)
    })
}

impl From<CreateMessageRequest> for NewMessage {
    fn from(req: CreateMessageRequest) -> Self {
        NewMessage {
            room_id: req.room_id,
            sender: req.sender,
            content: req.content,
        }
    }
}

fn field_position(field: &str) -> Option<usize> {
    FIELDS.iter().position(|f| *f == field)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
