use thiserror::Error;

pub const MIN_KEY_LENGTH: usize = 2;
pub const MAX_KEY_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} key cannot be empty")]
    Empty(&'static str),

    #[error("{0} key must be at least 2 characters long")]
    TooShort(&'static str),

    #[error("{0} key cannot exceed 64 characters")]
    TooLong(&'static str),

    #[error("{0} key must start with a lowercase letter")]
    InvalidStart(&'static str),

    #[error("{0} key can only contain lowercase letters, numbers, and hyphens")]
    InvalidCharacters(&'static str),

    #[error("SDK key cannot be empty")]
    SdkKeyEmpty,

    #[error("SDK key must start with \"fb_\" prefix")]
    SdkKeyPrefix,

    #[error("SDK key must be in format: fb_{{live|test}}_{{base64url}}")]
    SdkKeyFormat,

    #[error("SDK key type must be either \"live\" or \"test\"")]
    SdkKeyType,

    #[error("SDK key base64url portion must be at least 16 characters")]
    SdkKeySecretTooShort,

    #[error("SDK key contains invalid characters. Base64URL portion can only contain letters, numbers, hyphens, and underscores")]
    SdkKeyInvalidCharacters,
}

/// Validates a project, environment or flag key and returns it trimmed.
///
/// `kind` is the capitalized noun used in error messages ("Flag", "Project", ...).
pub fn validate_key(kind: &'static str, raw: &str) -> Result<String, ValidationError> {
    let key = raw.trim();

    if key.is_empty() {
        return Err(ValidationError::Empty(kind));
    }

    let length = key.chars().count();
    if length < MIN_KEY_LENGTH {
        return Err(ValidationError::TooShort(kind));
    }
    if length > MAX_KEY_LENGTH {
        return Err(ValidationError::TooLong(kind));
    }

    if !key.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidStart(kind));
    }

    if !key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ValidationError::InvalidCharacters(kind));
    }

    Ok(key.to_string())
}

/// Declares a validated, immutable key newtype.
macro_rules! key_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(value: &str) -> Result<Self, $crate::keys::ValidationError> {
                $crate::keys::validate_key($kind, value).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::keys::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> String {
                key.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::keys::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use key_type;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert_eq!(validate_key("Flag", "new-checkout").unwrap(), "new-checkout");
        assert_eq!(validate_key("Flag", "ab").unwrap(), "ab");
        assert_eq!(validate_key("Flag", "flag123").unwrap(), "flag123");
        assert_eq!(validate_key("Flag", "  padded-key  ").unwrap(), "padded-key");

        let longest = format!("a{}", "b".repeat(63));
        assert_eq!(validate_key("Flag", &longest).unwrap(), longest);
    }

    #[test]
    fn test_validate_key_error_order_and_messages() {
        let cases = [
            ("", "Flag key cannot be empty"),
            ("   ", "Flag key cannot be empty"),
            ("a", "Flag key must be at least 2 characters long"),
            ("1flag", "Flag key must start with a lowercase letter"),
            ("-flag", "Flag key must start with a lowercase letter"),
            ("Flag", "Flag key must start with a lowercase letter"),
            ("my_flag", "Flag key can only contain lowercase letters, numbers, and hyphens"),
            ("my flag", "Flag key can only contain lowercase letters, numbers, and hyphens"),
            ("myFlag", "Flag key can only contain lowercase letters, numbers, and hyphens"),
        ];

        for (input, message) in cases {
            let err = validate_key("Flag", input).unwrap_err();
            assert_eq!(err.to_string(), message, "input: {:?}", input);
        }

        let too_long = format!("a{}", "b".repeat(64));
        assert_eq!(
            validate_key("Flag", &too_long).unwrap_err(),
            ValidationError::TooLong("Flag")
        );
    }

    #[test]
    fn test_kind_appears_in_message() {
        let err = validate_key("Environment", "").unwrap_err();
        assert_eq!(err.to_string(), "Environment key cannot be empty");
    }

    proptest! {
        #[test]
        fn valid_keys_pass(key in "[a-z][a-z0-9-]{1,63}") {
            prop_assert_eq!(validate_key("Flag", &key), Ok(key.clone()));
        }

        #[test]
        fn digit_start_fails(key in "[0-9][a-z0-9-]{1,20}") {
            prop_assert_eq!(validate_key("Flag", &key), Err(ValidationError::InvalidStart("Flag")));
        }

        #[test]
        fn uppercase_anywhere_fails(prefix in "[a-z]{1,10}", upper in "[A-Z]{1,5}") {
            let key = format!("{}{}", prefix, upper);
            prop_assert!(validate_key("Flag", &key).is_err());
        }
    }
}
