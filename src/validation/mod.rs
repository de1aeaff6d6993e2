use std::fmt;

pub const ACCOUNT_NUMBER_MIN_LEN: usize = 6;
pub const ACCOUNT_NUMBER_MAX_LEN: usize = 20;
pub const CARD_NUMBER_MIN_LEN: usize = 16;
pub const CARD_NUMBER_MAX_LEN: usize = 19;
pub const NOTE_MAX_LEN: usize = 255;

pub const TRANSFER_AMOUNT_MIN: i64 = 1_000;
pub const TRANSFER_AMOUNT_MAX: i64 = 50_000_000;
pub const TAPMONEY_AMOUNT_MIN: i64 = 10_000;
pub const TAPMONEY_AMOUNT_MAX: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

fn validate_digits(field: &'static str, value: &str) -> ValidationResult {
    if !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(field, "must contain only digits"));
    }

    Ok(())
}

pub fn validate_account_number(field: &'static str, value: &str) -> ValidationResult {
    validate_required(field, value)?;
    validate_digits(field, value)?;

    if value.len() < ACCOUNT_NUMBER_MIN_LEN || value.len() > ACCOUNT_NUMBER_MAX_LEN {
        return Err(ValidationError::new(
            field,
            format!(
                "must be between {} and {} digits",
                ACCOUNT_NUMBER_MIN_LEN, ACCOUNT_NUMBER_MAX_LEN
            ),
        ));
    }

    Ok(())
}

pub fn validate_card_number(value: &str) -> ValidationResult {
    validate_required("card_number", value)?;
    validate_digits("card_number", value)?;

    if value.len() < CARD_NUMBER_MIN_LEN || value.len() > CARD_NUMBER_MAX_LEN {
        return Err(ValidationError::new(
            "card_number",
            format!(
                "must be between {} and {} digits",
                CARD_NUMBER_MIN_LEN, CARD_NUMBER_MAX_LEN
            ),
        ));
    }

    Ok(())
}

pub fn validate_amount(field: &'static str, amount: i64, min: i64, max: i64) -> ValidationResult {
    if amount < min || amount > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ));
    }

    Ok(())
}

pub fn validate_note(value: &str) -> ValidationResult {
    validate_max_len("note", value, NOTE_MAX_LEN)
}
