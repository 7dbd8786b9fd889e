use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::keys::{key_type, ValidationError};

// MODELS

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(key: ProjectKey, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

key_type!(
    /// Project key, unique across the installation.
    ProjectKey,
    "Project"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkKeyType {
    Live,
    Test,
}

impl SdkKeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            SdkKeyType::Live => "live",
            SdkKeyType::Test => "test",
        }
    }
}

/// An SDK authentication key: `fb_{live|test}_{base64url}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdkKey {
    value: String,
    key_type: SdkKeyType,
}

const SDK_KEY_PREFIX: &str = "fb_";
const MIN_SECRET_LENGTH: usize = 16;
const DISPLAY_PREFIX_LENGTH: usize = 15;

// HELPER FUNCTIONS

impl SdkKey {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(ValidationError::SdkKeyEmpty);
        }

        if !value.starts_with(SDK_KEY_PREFIX) {
            return Err(ValidationError::SdkKeyPrefix);
        }

        let parts: Vec<&str> = value.split('_').collect();
        if parts.len() < 3 {
            return Err(ValidationError::SdkKeyFormat);
        }

        let key_type = match parts[1] {
            "live" => SdkKeyType::Live,
            "test" => SdkKeyType::Test,
            _ => return Err(ValidationError::SdkKeyType),
        };

        // the secret may itself contain underscores
        let secret = parts[2..].join("_");
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ValidationError::SdkKeySecretTooShort);
        }

        if !secret.chars().all(is_base64url) {
            return Err(ValidationError::SdkKeyInvalidCharacters);
        }

        Ok(Self {
            value: value.to_string(),
            key_type,
        })
    }

    /// Generate a fresh key carrying 32 random bytes of base64url secret.
    /// Format: "fb_" + type + "_" + 43 base64url characters
    pub fn generate(key_type: SdkKeyType) -> Self {
        use rand::Rng;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        const SECRET_LENGTH: usize = 43;

        let mut rng = rand::thread_rng();
        let secret: String = (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        Self {
            value: format!("{}{}_{}", SDK_KEY_PREFIX, key_type.as_str(), secret),
            key_type,
        }
    }

    pub fn key_type(&self) -> SdkKeyType {
        self.key_type
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Shortened form that is safe to show in listings, e.g. `fb_live_abc1234...`.
    pub fn display_prefix(&self) -> String {
        let head: String = self.value.chars().take(DISPLAY_PREFIX_LENGTH).collect();
        format!("{}...", head)
    }
}

impl fmt::Display for SdkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

fn is_base64url(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sdk_key() {
        let key1 = SdkKey::generate(SdkKeyType::Live);
        let key2 = SdkKey::generate(SdkKeyType::Live);

        assert!(key1.as_str().starts_with("fb_live_"));
        assert_eq!(key1.as_str().len(), 51); // "fb_live_" (8) + 43 chars
        assert_ne!(key1, key2); // Should be random

        let parsed = SdkKey::parse(key1.as_str()).unwrap();
        assert_eq!(parsed, key1);
    }

    #[test]
    fn test_generate_test_key() {
        let key = SdkKey::generate(SdkKeyType::Test);
        assert!(key.as_str().starts_with("fb_test_"));
        assert_eq!(key.key_type(), SdkKeyType::Test);
    }

    #[test]
    fn test_parse_valid_keys() {
        let key = SdkKey::parse("fb_live_abcdefghijklmnop").unwrap();
        assert_eq!(key.key_type(), SdkKeyType::Live);

        let key = SdkKey::parse("  fb_test_ABCD-efgh_1234-5678  ").unwrap();
        assert_eq!(key.key_type(), SdkKeyType::Test);
        assert_eq!(key.as_str(), "fb_test_ABCD-efgh_1234-5678");
    }

    #[test]
    fn test_parse_error_messages() {
        let cases = [
            ("", "SDK key cannot be empty"),
            ("   ", "SDK key cannot be empty"),
            ("sk_live_abcdefghijklmnop", "SDK key must start with \"fb_\" prefix"),
            ("FB_live_abcdefghijklmnop", "SDK key must start with \"fb_\" prefix"),
            ("fb_live", "SDK key must be in format: fb_{live|test}_{base64url}"),
            ("fb_prod_abcdefghijklmnop", "SDK key type must be either \"live\" or \"test\""),
            ("fb__abcdefghijklmnop", "SDK key type must be either \"live\" or \"test\""),
            ("fb_live_short", "SDK key base64url portion must be at least 16 characters"),
        ];

        for (input, message) in cases {
            let err = SdkKey::parse(input).unwrap_err();
            assert_eq!(err.to_string(), message, "input: {:?}", input);
        }

        let err = SdkKey::parse("fb_live_abcdefgh!jklmnop").unwrap_err();
        assert_eq!(err, ValidationError::SdkKeyInvalidCharacters);
    }

    #[test]
    fn test_display_prefix() {
        let key = SdkKey::parse("fb_live_abcdefghijklmnop").unwrap();
        assert_eq!(key.display_prefix(), "fb_live_abcdefg...");
    }

    #[test]
    fn test_project_key() {
        assert_eq!(ProjectKey::parse("my-project").unwrap().as_str(), "my-project");
        assert_eq!(
            ProjectKey::parse("").unwrap_err().to_string(),
            "Project key cannot be empty"
        );

        let project = Project::new(ProjectKey::parse("storefront").unwrap(), "Storefront");
        assert_eq!(project.key, "storefront");
    }
}
