//! Crate-wide error type.

use thiserror::Error;

/// Errors raised by the simulation core.
///
/// Configuration and data-coverage problems are fatal at startup. Per-day
/// numeric edge cases (zero demand, capacity exhaustion) never produce an
/// error; only genuinely invalid inputs do.
#[derive(Debug, Error)]
pub enum SimError {
    /// A quantity was NaN, infinite, negative, or out of range.
    #[error("invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A policy name was not present in the registry.
    #[error("unknown {domain} policy '{name}' (known: {available})")]
    UnknownPolicy {
        domain: &'static str,
        name: String,
        available: String,
    },
    /// The data provider has no value for a required key.
    #[error("missing data: {0}")]
    MissingData(String),
    /// The scenario failed validation.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Reject NaN, infinite and negative quantities.
pub fn validate_quantity(field: &'static str, value: f64) -> SimResult<f64> {
    if value.is_nan() {
        return Err(SimError::InvalidInput {
            field,
            value,
            reason: "value is NaN",
        });
    }
    if value.is_infinite() {
        return Err(SimError::InvalidInput {
            field,
            value,
            reason: "value is infinite",
        });
    }
    if value < 0.0 {
        return Err(SimError::InvalidInput {
            field,
            value,
            reason: "value is negative",
        });
    }
    Ok(value)
}

/// Like [`validate_quantity`], and additionally rejects values above 1.
pub fn validate_fraction(field: &'static str, value: f64) -> SimResult<f64> {
    validate_quantity(field, value)?;
    if value > 1.0 {
        return Err(SimError::InvalidInput {
            field,
            value,
            reason: "fraction exceeds 1.0",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("x", 0.0).is_ok());
        assert!(validate_quantity("x", 12.5).is_ok());
        assert!(validate_quantity("x", -0.1).is_err());
        assert!(validate_quantity("x", f64::NAN).is_err());
        assert!(validate_quantity("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("f", 1.0).is_ok());
        assert!(validate_fraction("f", 1.01).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = validate_quantity("demand_m3", -5.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: demand_m3 = -5 (value is negative)"
        );
    }
}
