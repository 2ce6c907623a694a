#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    InvalidFormat { field: &'static str, reason: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField { field } => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidFormat { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

pub struct DraftValidator;

impl DraftValidator {
    /// Fails when the trimmed value is empty
    pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
        Ok(())
    }

    pub fn require<T>(field: &'static str, value: &Option<T>) -> Result<(), ValidationError> {
        if value.is_none() {
            return Err(ValidationError::MissingField { field });
        }
        Ok(())
    }
}

/// Clamps a raw percentage input to `[0, 100]`.
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Reads a percentage from the wire, clamping whatever number the server sent.
pub fn deserialize_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match &value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map(|f| f.round() as i64).unwrap_or(0),
        _ => 0,
    };
    Ok(clamp_percent(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-20, 0)]
    #[case(0, 0)]
    #[case(42, 42)]
    #[case(100, 100)]
    #[case(150, 100)]
    #[case(i64::MAX, 100)]
    fn test_clamp_percent(#[case] input: i64, #[case] expected: u8) {
        assert_eq!(clamp_percent(input), expected);
    }

    #[test]
    fn test_require_text_rejects_whitespace() {
        let err = DraftValidator::require_text("title", "   ").unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "title" });
        assert_eq!(err.to_string(), "title cannot be empty");
        assert!(DraftValidator::require_text("title", " x ").is_ok());
    }

    #[derive(serde::Deserialize)]
    struct Wrapped {
        #[serde(deserialize_with = "deserialize_percent")]
        value: u8,
    }

    #[test]
    fn test_deserialize_percent_clamps_wire_values() {
        let over: Wrapped = serde_json::from_str(r#"{"value": 250}"#).unwrap();
        let under: Wrapped = serde_json::from_str(r#"{"value": -4}"#).unwrap();
        let text: Wrapped = serde_json::from_str(r#"{"value": "65"}"#).unwrap();
        let float: Wrapped = serde_json::from_str(r#"{"value": 33.6}"#).unwrap();
        assert_eq!(over.value, 100);
        assert_eq!(under.value, 0);
        assert_eq!(text.value, 65);
        assert_eq!(float.value, 34);
    }

    #[test]
    fn test_require_option() {
        assert!(DraftValidator::require::<u8>("deadline", &None).is_err());
        assert!(DraftValidator::require("deadline", &Some(1)).is_ok());
    }
}
