//! Member entity and related types

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::validation::MemberValidationError;

/// Member identifier - a random 128-bit UUID, never nil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct MemberId(Uuid);

impl MemberId {
    /// Parse a member ID from its textual form
    pub fn parse(raw: &str) -> Result<Self, MemberValidationError> {
        if raw.is_empty() {
            return Err(MemberValidationError::EmptyId);
        }

        let uuid = Uuid::parse_str(raw).map_err(|_| MemberValidationError::MalformedId)?;
        Self::from_uuid(uuid)
    }

    /// Wrap an existing UUID, rejecting the nil sentinel
    pub fn from_uuid(uuid: Uuid) -> Result<Self, MemberValidationError> {
        if uuid.is_nil() {
            return Err(MemberValidationError::NilId);
        }
        Ok(Self(uuid))
    }

    /// Draw a fresh random (v4) identifier
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl TryFrom<Uuid> for MemberId {
    type Error = MemberValidationError;

    fn try_from(value: Uuid) -> Result<Self, Self::Error> {
        Self::from_uuid(value)
    }
}

impl From<MemberId> for Uuid {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key used for case-insensitive username uniqueness
pub fn username_key(username: &str) -> String {
    username.to_lowercase()
}

/// Opaque avatar descriptor derived from a seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarData(String);

impl AvatarData {
    /// Derive the avatar for a seed. The same seed always yields the same avatar;
    /// an empty seed draws a random one.
    pub fn from_seed(seed: &str) -> Self {
        if seed.is_empty() {
            return Self::random();
        }

        let digest = Sha256::digest(seed.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn random() -> Self {
        let mut seed = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::from_seed(&hex::encode(seed))
    }

    /// Restore a previously stored descriptor
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Persisted member entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    username: String,
    email: String,
    name: String,
    nickname: String,
    avatar: AvatarData,
    /// Argon2 hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: Option<String>,
    active: bool,
    /// Bumped by the store on every successful update
    #[serde(default)]
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a new, active member
    pub fn new(
        id: MemberId,
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        nickname: impl Into<String>,
        avatar: AvatarData,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: username.into(),
            email: email.into(),
            name: name.into(),
            nickname: nickname.into(),
            avatar,
            password_hash: None,
            active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a password hash at construction time
    pub fn with_password_hash(mut self, password_hash: Option<String>) -> Self {
        self.password_hash = password_hash;
        self
    }

    /// Restore the active flag (used when loading from storage)
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Restore the stored version (used when loading from storage)
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Restore timestamps (used when loading from storage)
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    // Getters

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn username_key(&self) -> String {
        username_key(&self.username)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn avatar(&self) -> &AvatarData {
        &self.avatar
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Version this copy was read at; updates are only accepted against it
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.touch();
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.touch();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = Some(password_hash.into());
        self.touch();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
        self.touch();
    }

    pub fn set_avatar(&mut self, avatar: AvatarData) {
        self.avatar = avatar;
        self.touch();
    }

    /// Clear the active flag; the member then behaves as absent
    pub fn deactivate(&mut self) {
        if self.active {
            self.active = false;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
