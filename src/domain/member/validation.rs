//! Member field validation
//!
//! Every validator is a pure, total function from a raw field value to a
//! [`ValidationOutcome`]. Checks that need storage (username availability)
//! belong to the request handlers, not here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::entity::MemberId;

/// Field names reported in validation errors
pub mod fields {
    pub const ID: &str = "id";
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const NICKNAME: &str = "nickname";
    pub const PASSWORD: &str = "password";
    pub const AVATAR_SEED: &str = "avatar_seed";
}

/// Reasons a single member field can be rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    #[error("Member ID cannot be empty")]
    EmptyId,

    #[error("Member ID is not a valid UUID")]
    MalformedId,

    #[error("Member ID cannot be the nil UUID")]
    NilId,

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username must start with a letter or number")]
    InvalidUsernameStart,

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, underscores, hyphens and periods are allowed")]
    InvalidUsernameCharacter(char),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email cannot contain whitespace")]
    EmailContainsWhitespace,

    #[error("Email must contain exactly one '@'")]
    EmailAtCount,

    #[error("Email is missing the part before '@'")]
    EmptyEmailLocalPart,

    #[error("Email is missing the domain after '@'")]
    EmptyEmailDomain,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Nickname cannot be empty")]
    EmptyNickname,

    #[error("Nickname exceeds maximum length of {0} characters")]
    NicknameTooLong(usize),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Avatar seed exceeds maximum length of {0} characters")]
    AvatarSeedTooLong(usize),
}

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_NICKNAME_LENGTH: usize = 64;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_AVATAR_SEED_LENGTH: usize = 64;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid username pattern"));

/// A rejected field and the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, error: &MemberValidationError) -> Self {
        Self {
            field,
            message: error.to_string(),
        }
    }
}

/// Result of validating one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(FieldError),
}

impl ValidationOutcome {
    fn of(field: &'static str, check: Result<(), MemberValidationError>) -> Self {
        match check {
            Ok(()) => Self::Valid,
            Err(e) => Self::Invalid(FieldError::new(field, &e)),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Every field error collected while validating one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the rejected fields, in the order they were checked
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

/// Conjunction of per-field outcomes.
///
/// Keeps checking after the first failure so the caller sees every
/// rejected field at once.
#[derive(Debug, Default)]
pub struct FieldValidation {
    errors: Vec<FieldError>,
}

impl FieldValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, outcome: ValidationOutcome) -> Self {
        if let ValidationOutcome::Invalid(error) = outcome {
            self.errors.push(error);
        }
        self
    }

    /// Check an optional field; `None` is always valid
    pub fn check_optional<T: ?Sized>(
        self,
        value: Option<&T>,
        validate: impl FnOnce(&T) -> ValidationOutcome,
    ) -> Self {
        match value {
            Some(v) => self.check(validate(v)),
            None => self,
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Validate a member identifier
///
/// Rules:
/// - Must parse as a UUID
/// - The nil UUID is reserved and rejected
pub fn validate_id(raw: &str) -> ValidationOutcome {
    ValidationOutcome::of(fields::ID, MemberId::parse(raw).map(|_| ()))
}

/// Validate a username
///
/// Rules:
/// - Between 3 and 32 characters
/// - Starts with a letter or number
/// - Only alphanumeric characters, underscores, hyphens and periods
pub fn validate_username(username: &str) -> ValidationOutcome {
    ValidationOutcome::of(fields::USERNAME, username_rule(username))
}

fn username_rule(username: &str) -> Result<(), MemberValidationError> {
    if username.is_empty() {
        return Err(MemberValidationError::EmptyUsername);
    }

    let length = username.chars().count();

    if length < MIN_USERNAME_LENGTH {
        return Err(MemberValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(MemberValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    if USERNAME_PATTERN.is_match(username) {
        return Ok(());
    }

    match username.chars().next() {
        Some(first) if !first.is_ascii_alphanumeric() => {
            Err(MemberValidationError::InvalidUsernameStart)
        }
        _ => {
            let bad = username
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '-' | '.'))
                .unwrap_or('?');
            Err(MemberValidationError::InvalidUsernameCharacter(bad))
        }
    }
}

/// Validate an email address
///
/// Rules:
/// - Non-empty, at most 254 characters, no whitespace
/// - Exactly one '@' with a non-empty local part and domain
pub fn validate_email(email: &str) -> ValidationOutcome {
    ValidationOutcome::of(fields::EMAIL, email_rule(email))
}

fn email_rule(email: &str) -> Result<(), MemberValidationError> {
    if email.is_empty() {
        return Err(MemberValidationError::EmptyEmail);
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(MemberValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(MemberValidationError::EmailContainsWhitespace);
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(MemberValidationError::EmailAtCount),
    };

    if local.is_empty() {
        return Err(MemberValidationError::EmptyEmailLocalPart);
    }

    if domain.is_empty() {
        return Err(MemberValidationError::EmptyEmailDomain);
    }

    Ok(())
}

/// Validate a display name (non-blank, at most 64 characters)
pub fn validate_name(name: &str) -> ValidationOutcome {
    let check = if name.trim().is_empty() {
        Err(MemberValidationError::EmptyName)
    } else if name.chars().count() > MAX_NAME_LENGTH {
        Err(MemberValidationError::NameTooLong(MAX_NAME_LENGTH))
    } else {
        Ok(())
    };

    ValidationOutcome::of(fields::NAME, check)
}

/// Validate a nickname (non-blank, at most 64 characters)
pub fn validate_nickname(nickname: &str) -> ValidationOutcome {
    let check = if nickname.trim().is_empty() {
        Err(MemberValidationError::EmptyNickname)
    } else if nickname.chars().count() > MAX_NICKNAME_LENGTH {
        Err(MemberValidationError::NicknameTooLong(MAX_NICKNAME_LENGTH))
    } else {
        Ok(())
    };

    ValidationOutcome::of(fields::NICKNAME, check)
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> ValidationOutcome {
    let length = password.chars().count();

    let check = if length < MIN_PASSWORD_LENGTH {
        Err(MemberValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH))
    } else if length > MAX_PASSWORD_LENGTH {
        Err(MemberValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH))
    } else {
        Ok(())
    };

    ValidationOutcome::of(fields::PASSWORD, check)
}

/// Validate an avatar seed. Empty seeds are allowed and mean "pick one".
pub fn validate_avatar_seed(seed: &str) -> ValidationOutcome {
    let check = if seed.chars().count() > MAX_AVATAR_SEED_LENGTH {
        Err(MemberValidationError::AvatarSeedTooLong(MAX_AVATAR_SEED_LENGTH))
    } else {
        Ok(())
    };

    ValidationOutcome::of(fields::AVATAR_SEED, check)
}
