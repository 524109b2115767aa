//! Photo upload record and its upload state machine

use super::params::{Account, Friend, Place, UploadQuality};
use crate::utils::error::PhotoQueueError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Stable identity of a photo, derived from its source URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn from_uri(uri: &str) -> Self {
        Self(uri.trim().to_string())
    }

    /// An empty identity cannot be tracked
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upload state
///
/// `Selected` items live on the selection list, the three `Upload*` states on
/// the upload list, and `None` on neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadState {
    None,
    Selected,
    UploadWaiting,
    UploadError,
    UploadCompleted,
}

impl UploadState {
    /// Convert to the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Selected => "selected",
            Self::UploadWaiting => "upload_waiting",
            Self::UploadError => "upload_error",
            Self::UploadCompleted => "upload_completed",
        }
    }

    /// States that belong on the upload list
    pub fn is_upload_state(&self) -> bool {
        matches!(
            self,
            Self::UploadWaiting | Self::UploadError | Self::UploadCompleted
        )
    }
}

impl FromStr for UploadState {
    type Err = PhotoQueueError;

    /// Parse from the string stored in the database.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "selected" => Ok(Self::Selected),
            "upload_waiting" => Ok(Self::UploadWaiting),
            "upload_error" => Ok(Self::UploadError),
            "upload_completed" => Ok(Self::UploadCompleted),
            _ => Err(PhotoQueueError::UnknownValue {
                kind: "state",
                value: s.to_string(),
            }),
        }
    }
}

impl Default for UploadState {
    fn default() -> Self {
        Self::None
    }
}

/// A photo tracked through selection and upload.
///
/// Equality and hashing use the identity only. The state is owned by the
/// queue manager and can only be read from outside the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUpload {
    id: PhotoId,
    pub source_uri: String,
    state: UploadState,
    #[serde(default)]
    pub(crate) position: u64,
    pub account_id: Option<String>,
    #[serde(skip)]
    pub account: Option<Account>,
    pub target_id: Option<String>,
    pub quality: Option<UploadQuality>,
    pub place: Option<Place>,
    pub caption: Option<String>,
    #[serde(default)]
    pub tagged_friend_ids: Vec<String>,
    #[serde(skip)]
    pub tagged_friends: Vec<Friend>,
}

impl PhotoUpload {
    /// Create an untracked record for the photo at `uri`
    pub fn new(uri: &str) -> Self {
        Self {
            id: PhotoId::from_uri(uri),
            source_uri: uri.to_string(),
            state: UploadState::None,
            position: 0,
            account_id: None,
            account: None,
            target_id: None,
            quality: None,
            place: None,
            caption: None,
            tagged_friend_ids: Vec::new(),
            tagged_friends: Vec::new(),
        }
    }

    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: UploadState) {
        self.state = state;
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.place = Some(place);
        self
    }

    pub fn has_place(&self) -> bool {
        self.place.is_some()
    }

    /// Tag a friend on this photo, ignoring repeats
    pub fn tag_friend(&mut self, friend: Friend) {
        if self.tagged_friend_ids.contains(&friend.id) {
            return;
        }
        self.tagged_friend_ids.push(friend.id.clone());
        self.tagged_friends.push(friend);
    }

    pub(crate) fn set_upload_params(
        &mut self,
        account: &Account,
        target_id: &str,
        quality: UploadQuality,
    ) {
        self.account_id = Some(account.id.clone());
        self.account = Some(account.clone());
        self.target_id = Some(target_id.to_string());
        self.quality = Some(quality);
    }

    /// Resolve the stored account id into a full account.
    ///
    /// Records loaded from the store only carry the id.
    pub fn populate_from_accounts(&mut self, accounts: &HashMap<String, Account>) {
        if let Some(account_id) = &self.account_id {
            if let Some(account) = accounts.get(account_id) {
                self.account = Some(account.clone());
            }
        }
    }

    /// Resolve the stored friend ids into friends; unknown ids stay unresolved
    pub fn populate_from_friends(&mut self, friends: &HashMap<String, Friend>) {
        self.tagged_friends = self
            .tagged_friend_ids
            .iter()
            .filter_map(|id| friends.get(id).cloned())
            .collect();
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_record(
        id: PhotoId,
        source_uri: String,
        state: UploadState,
        position: u64,
        account_id: Option<String>,
        target_id: Option<String>,
        quality: Option<UploadQuality>,
        place: Option<Place>,
        caption: Option<String>,
        tagged_friend_ids: Vec<String>,
    ) -> Self {
        Self {
            id,
            source_uri,
            state,
            position,
            account_id,
            account: None,
            target_id,
            quality,
            place,
            caption,
            tagged_friend_ids,
            tagged_friends: Vec::new(),
        }
    }
}

impl PartialEq for PhotoUpload {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PhotoUpload {}

impl Hash for PhotoUpload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_uri() {
        let a = PhotoUpload::new("content://media/1");
        let b = PhotoUpload::new(" content://media/1 ").with_caption("other");
        assert_eq!(a, b);
        assert!(a.id().is_valid());
        assert!(!PhotoId::from_uri("   ").is_valid());
    }

    #[test]
    fn test_new_upload_is_untracked() {
        let upload = PhotoUpload::new("content://media/2");
        assert_eq!(upload.state(), UploadState::None);
        assert!(upload.account.is_none());
        assert!(!upload.has_place());
    }

    #[test]
    fn test_state_string_mapping() {
        for state in [
            UploadState::None,
            UploadState::Selected,
            UploadState::UploadWaiting,
            UploadState::UploadError,
            UploadState::UploadCompleted,
        ] {
            assert_eq!(state.as_str().parse::<UploadState>().ok(), Some(state));
        }
        assert!("uploading".parse::<UploadState>().is_err());
    }

    #[test]
    fn test_upload_states() {
        assert!(!UploadState::None.is_upload_state());
        assert!(!UploadState::Selected.is_upload_state());
        assert!(UploadState::UploadWaiting.is_upload_state());
        assert!(UploadState::UploadError.is_upload_state());
        assert!(UploadState::UploadCompleted.is_upload_state());
    }

    #[test]
    fn test_populate_from_accounts_and_friends() {
        let mut upload = PhotoUpload::new("content://media/3");
        upload.account_id = Some("acct-1".to_string());
        upload.tagged_friend_ids = vec!["f1".to_string(), "missing".to_string()];

        let accounts = HashMap::from([("acct-1".to_string(), Account::new("acct-1", "Me"))]);
        let friends = HashMap::from([(
            "f1".to_string(),
            Friend {
                id: "f1".to_string(),
                name: "Alex".to_string(),
            },
        )]);

        upload.populate_from_accounts(&accounts);
        upload.populate_from_friends(&friends);

        assert_eq!(upload.account.as_ref().map(|a| a.name.as_str()), Some("Me"));
        assert_eq!(upload.tagged_friends.len(), 1);
        assert_eq!(upload.tagged_friend_ids.len(), 2);
    }

    #[test]
    fn test_tag_friend_ignores_repeats() {
        let mut upload = PhotoUpload::new("content://media/4");
        let friend = Friend {
            id: "f1".to_string(),
            name: "Alex".to_string(),
        };
        upload.tag_friend(friend.clone());
        upload.tag_friend(friend);
        assert_eq!(upload.tagged_friend_ids, vec!["f1".to_string()]);
    }
}
