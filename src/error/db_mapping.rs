use super::app_error::AppError;

pub(super) fn map_database_error(code: Option<&str>, message: &str) -> Option<AppError> {
    match code {
        Some("23502") => Some(AppError::validation_error(
            required_field_message_from_db(message)
                .unwrap_or_else(|| "required field is missing".to_string()),
        )),
        Some("23503") => Some(AppError::validation_error(
            "referenced resource does not exist",
        )),
        Some("23514") => Some(AppError::validation_error(
            check_violation_message(message),
        )),
        Some("22P02") => Some(AppError::validation_error("invalid input format")),
        Some("08001") | Some("08006") => Some(AppError::store_unavailable(
            "Unable to connect to database. Please try again later.",
        )),
        Some("53300") | Some("57P03") => Some(AppError::store_unavailable(
            "Service temporarily unavailable. Please try again later.",
        )),
        _ => None,
    }
}

pub(super) fn required_field_message_from_db(message: &str) -> Option<String> {
    let marker = "column \"";
    let start = message.find(marker)?;
    let rest = &message[start + marker.len()..];
    let end = rest.find('"')?;
    let field = &rest[..end];
    Some(format!("{field} is required"))
}

pub(super) fn check_violation_message(message: &str) -> &'static str {
    if message.contains("messages_distinct_participants") {
        "cannot send a message to yourself"
    } else if message.contains("messages_body_check") {
        "message body cannot be empty"
    } else {
        "request violates validation rules"
    }
}
