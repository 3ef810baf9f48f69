use crate::error::ThemeError;

/// Core validation trait shared by the engine's input checks.
///
/// Validators are small stateless structs so they can be stored alongside the
/// component that uses them and composed when one check builds on another.
///
/// # Type Parameters
///
/// * `T` - The type of data being validated (can be unsized like `str`)
///
/// # Examples
///
/// ```
/// use engine::validation::{StorageKeyValidator, Validator};
///
/// assert!(StorageKeyValidator.validate("tucu-theme-storage").is_ok());
/// assert!(StorageKeyValidator.validate("../escape").is_err());
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

const MAX_IDENTIFIER_LEN: usize = 50;
const MAX_STORAGE_KEY_LEN: usize = 100;

fn check_identifier(input: &str, max_len: usize) -> Result<(), String> {
    if input.is_empty() {
        return Err("cannot be empty".to_string());
    }

    if input.len() > max_len {
        return Err(format!("too long (max {max_len} characters)"));
    }

    if !input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "contains invalid characters (only alphanumeric, hyphens, and underscores allowed)"
                .to_string(),
        );
    }

    if input.starts_with(['-', '_']) || input.ends_with(['-', '_']) {
        return Err("cannot start or end with hyphens or underscores".to_string());
    }

    Ok(())
}

/// Validator for preset identifiers (format only, not palette membership)
pub struct PresetIdValidator;

impl Validator<str> for PresetIdValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        check_identifier(input, MAX_IDENTIFIER_LEN).map_err(|reason| {
            ThemeError::invalid_setting("preset", input, format!("Preset id {reason}"))
        })?;

        if input.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ThemeError::invalid_setting(
                "preset",
                input,
                "Preset ids are lower-case",
            ));
        }

        Ok(())
    }
}

/// Validator for durable storage keys.
///
/// Keys double as file stems for [`FileStorage`](crate::persistence::FileStorage),
/// so path separators and dot segments are rejected.
pub struct StorageKeyValidator;

impl Validator<str> for StorageKeyValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        check_identifier(input, MAX_STORAGE_KEY_LEN)
            .map_err(|reason| ThemeError::storage(input, format!("Storage key {reason}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_id_validator() {
        let validator = PresetIdValidator;

        // Valid ids
        assert!(validator.validate("emerald").is_ok());
        assert!(validator.validate("deep-blue").is_ok());
        assert!(validator.validate("brand_2").is_ok());

        // Invalid ids
        assert!(validator.validate("").is_err());
        assert!(validator.validate("-emerald").is_err());
        assert!(validator.validate("emerald_").is_err());
        assert!(validator.validate("Emerald").is_err());
        assert!(validator.validate("em erald").is_err());
        assert!(validator.validate(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_storage_key_validator() {
        let validator = StorageKeyValidator;

        assert!(validator.validate("tucu-theme-storage").is_ok());
        assert!(validator.validate("Tucu_Theme").is_ok());

        assert!(validator.validate("").is_err());
        assert!(validator.validate("../theme").is_err());
        assert!(validator.validate("theme/storage").is_err());
        assert!(validator.validate("theme.json").is_err());
        assert!(validator.validate(&"k".repeat(101)).is_err());
    }
}
