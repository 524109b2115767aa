//! Upload parameter value objects.
//!
//! These are supplied by the caller when selections are promoted to uploads.
//! The queue treats them as opaque data and never validates their contents.

use crate::utils::error::PhotoQueueError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account an upload is published through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Credentials are never written to the store
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            access_token: None,
        }
    }
}

/// A person tagged on a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: String,
    pub name: String,
}

/// Location tag attached to an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Upload quality options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadQuality {
    Low,
    Medium,
    High,
    Original,
}

impl UploadQuality {
    /// Convert to the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Original => "original",
        }
    }

}

impl FromStr for UploadQuality {
    type Err = PhotoQueueError;

    /// Parse from the string stored in the database.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "original" => Ok(Self::Original),
            _ => Err(PhotoQueueError::UnknownValue {
                kind: "quality",
                value: s.to_string(),
            }),
        }
    }
}

impl Default for UploadQuality {
    fn default() -> Self {
        Self::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_string_mapping() {
        for quality in [
            UploadQuality::Low,
            UploadQuality::Medium,
            UploadQuality::High,
            UploadQuality::Original,
        ] {
            assert_eq!(quality.as_str().parse::<UploadQuality>().ok(), Some(quality));
        }
        let err = "ultra".parse::<UploadQuality>().unwrap_err();
        assert!(matches!(err, PhotoQueueError::UnknownValue { kind: "quality", .. }));
    }

    #[test]
    fn test_account_token_not_serialized() {
        let mut account = Account::new("acct-1", "Me");
        account.access_token = Some("secret".to_string());

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret"));
    }
}
