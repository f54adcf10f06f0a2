//! Member request handlers
//!
//! Every handler has the same shape: validate all fields, resolve the member
//! (or reserve a username and key), persist, and report one terminal outcome.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::member::{
    project_detail, project_list, validate_avatar_seed, validate_email, validate_id,
    validate_name, validate_nickname, validate_password, validate_username, AvatarData,
    FieldValidation, KeyGenerator, Member, MemberDetailReadModel, MemberId, MemberListReadModel,
    MemberRepository, SaveOutcome,
};
use crate::domain::pipeline::{
    ChangeEmail, ChangeOther, ChangePassword, ChangeUsername, DeactivateMember, GetMemberDetail,
    Handler, ListMembers, Outcome, RegisterMember,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Return `Outcome::Invalid` from the enclosing handler when validation fails
macro_rules! ensure_valid {
    ($validation:expr) => {
        if let Err(errors) = $validation.finish() {
            debug!(fields = ?errors.fields(), "Request rejected by validation");
            return Ok(Outcome::Invalid(errors));
        }
    };
}

/// Parse an identifier that has already passed `validate_id`
fn validated_id(raw: &str) -> Result<MemberId, DomainError> {
    MemberId::parse(raw).map_err(|e| DomainError::invalid_id(e.to_string()))
}

/// Fetch a member that is still active; deactivated members count as absent
async fn load_active(
    repository: &dyn MemberRepository,
    id: &MemberId,
) -> Result<Option<Member>, DomainError> {
    Ok(repository.get(id).await?.filter(Member::is_active))
}

/// Reloads allowed before a contended update gives up
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Apply `change` to the active member `id` and store it.
///
/// The write is accepted only against the version that was read. When another
/// write lands first the member is reloaded and `change` reapplied, so a
/// concurrent deactivation or rename is never overwritten.
async fn update_active<F>(
    repository: &dyn MemberRepository,
    id: &MemberId,
    mut change: F,
) -> Result<Outcome<()>, DomainError>
where
    F: FnMut(&mut Member) + Send,
{
    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let Some(mut member) = load_active(repository, id).await? else {
            return Ok(Outcome::NotFound);
        };

        change(&mut member);

        match repository.update(&member).await? {
            SaveOutcome::Saved => return Ok(Outcome::Success(())),
            SaveOutcome::Missing => return Ok(Outcome::NotFound),
            SaveOutcome::UsernameTaken => {
                debug!(member_id = %id, username = %member.username(), "Username already registered");
                return Ok(Outcome::UsernameUnavailable);
            }
            SaveOutcome::Stale => {
                debug!(member_id = %id, attempt, "Member changed concurrently, reloading");
            }
            SaveOutcome::DuplicateId => {
                return Err(DomainError::internal(format!(
                    "Update of member '{}' reported a duplicate ID",
                    id
                )));
            }
        }
    }

    warn!(member_id = %id, attempts = MAX_UPDATE_ATTEMPTS, "Member update kept losing races");
    Err(DomainError::write_conflict(id.to_string(), MAX_UPDATE_ATTEMPTS))
}

/// Handles self-service registration
#[derive(Debug)]
pub struct RegisterMemberHandler {
    repository: Arc<dyn MemberRepository>,
    keys: Arc<dyn KeyGenerator>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegisterMemberHandler {
    pub fn new(
        repository: Arc<dyn MemberRepository>,
        keys: Arc<dyn KeyGenerator>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            repository,
            keys,
            hasher,
        }
    }
}

#[async_trait]
impl Handler<RegisterMember> for RegisterMemberHandler {
    async fn handle(&self, request: RegisterMember) -> Result<Outcome<MemberId>, DomainError> {
        ensure_valid!(FieldValidation::new()
            .check(validate_username(&request.username))
            .check(validate_email(&request.email))
            .check(validate_name(&request.name))
            .check(validate_nickname(&request.nickname))
            .check(validate_avatar_seed(&request.avatar_seed))
            .check_optional(request.password.as_deref(), validate_password));

        if self.repository.username_exists(&request.username).await? {
            debug!(username = %request.username, "Username already registered");
            return Ok(Outcome::UsernameUnavailable);
        }

        let id = self.keys.generate().await?;

        let password_hash = match request.password {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        let member = Member::new(
            id,
            request.username,
            request.email,
            request.name,
            request.nickname,
            AvatarData::from_seed(&request.avatar_seed),
        )
        .with_password_hash(password_hash);

        match self.repository.insert(&member).await? {
            SaveOutcome::Saved => {
                info!(member_id = %id, username = %member.username(), "Member registered");
                Ok(Outcome::Success(id))
            }
            SaveOutcome::DuplicateId => {
                warn!(member_id = %id, "Generated member ID collided on insert");
                Ok(Outcome::DuplicateId)
            }
            SaveOutcome::UsernameTaken => {
                warn!(username = %member.username(), "Username claimed concurrently");
                Ok(Outcome::UsernameUnavailable)
            }
            SaveOutcome::Missing | SaveOutcome::Stale => Err(DomainError::internal(
                "Insert of a new member reported an update conflict",
            )),
        }
    }
}

#[derive(Debug)]
pub struct ChangeEmailHandler {
    repository: Arc<dyn MemberRepository>,
}

impl ChangeEmailHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<ChangeEmail> for ChangeEmailHandler {
    async fn handle(&self, request: ChangeEmail) -> Result<Outcome<()>, DomainError> {
        ensure_valid!(FieldValidation::new()
            .check(validate_id(&request.id))
            .check(validate_email(&request.email)));

        let id = validated_id(&request.id)?;

        update_active(self.repository.as_ref(), &id, |member| {
            member.set_email(request.email.as_str())
        })
        .await
    }
}

#[derive(Debug)]
pub struct ChangeUsernameHandler {
    repository: Arc<dyn MemberRepository>,
}

impl ChangeUsernameHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<ChangeUsername> for ChangeUsernameHandler {
    async fn handle(&self, request: ChangeUsername) -> Result<Outcome<()>, DomainError> {
        ensure_valid!(FieldValidation::new()
            .check(validate_id(&request.id))
            .check(validate_username(&request.username)));

        let id = validated_id(&request.id)?;

        // Uniqueness is checked by the store; a member may recase its own name.
        update_active(self.repository.as_ref(), &id, |member| {
            member.set_username(request.username.as_str())
        })
        .await
    }
}

#[derive(Debug)]
pub struct ChangePasswordHandler {
    repository: Arc<dyn MemberRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ChangePasswordHandler {
    pub fn new(repository: Arc<dyn MemberRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }
}

#[async_trait]
impl Handler<ChangePassword> for ChangePasswordHandler {
    async fn handle(&self, request: ChangePassword) -> Result<Outcome<()>, DomainError> {
        ensure_valid!(FieldValidation::new()
            .check(validate_id(&request.id))
            .check(validate_password(&request.password)));

        let id = validated_id(&request.id)?;

        if load_active(self.repository.as_ref(), &id).await?.is_none() {
            return Ok(Outcome::NotFound);
        }

        let password_hash = self.hasher.hash(request.password).await?;

        update_active(self.repository.as_ref(), &id, |member| {
            member.set_password_hash(password_hash.as_str())
        })
        .await
    }
}

#[derive(Debug)]
pub struct ChangeOtherHandler {
    repository: Arc<dyn MemberRepository>,
}

impl ChangeOtherHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<ChangeOther> for ChangeOtherHandler {
    async fn handle(&self, request: ChangeOther) -> Result<Outcome<()>, DomainError> {
        ensure_valid!(FieldValidation::new()
            .check(validate_id(&request.id))
            .check(validate_name(&request.name))
            .check(validate_nickname(&request.nickname))
            .check_optional(request.avatar_seed.as_deref(), validate_avatar_seed));

        let id = validated_id(&request.id)?;
        let avatar = request.avatar_seed.as_deref().map(AvatarData::from_seed);

        update_active(self.repository.as_ref(), &id, |member| {
            member.set_name(request.name.as_str());
            member.set_nickname(request.nickname.as_str());

            if let Some(avatar) = &avatar {
                member.set_avatar(avatar.clone());
            }
        })
        .await
    }
}

#[derive(Debug)]
pub struct DeactivateMemberHandler {
    repository: Arc<dyn MemberRepository>,
}

impl DeactivateMemberHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<DeactivateMember> for DeactivateMemberHandler {
    async fn handle(&self, request: DeactivateMember) -> Result<Outcome<()>, DomainError> {
        ensure_valid!(FieldValidation::new().check(validate_id(&request.id)));

        let id = validated_id(&request.id)?;
        let outcome = update_active(self.repository.as_ref(), &id, Member::deactivate).await?;

        if outcome.is_success() {
            info!(member_id = %id, "Member deactivated");
        }

        Ok(outcome)
    }
}

#[derive(Debug)]
pub struct MemberDetailHandler {
    repository: Arc<dyn MemberRepository>,
}

impl MemberDetailHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<GetMemberDetail> for MemberDetailHandler {
    async fn handle(
        &self,
        request: GetMemberDetail,
    ) -> Result<Outcome<MemberDetailReadModel>, DomainError> {
        ensure_valid!(FieldValidation::new().check(validate_id(&request.id)));

        let id = validated_id(&request.id)?;

        Ok(match load_active(self.repository.as_ref(), &id).await? {
            Some(member) => Outcome::Success(project_detail(&member)),
            None => Outcome::NotFound,
        })
    }
}

#[derive(Debug)]
pub struct MemberListHandler {
    repository: Arc<dyn MemberRepository>,
}

impl MemberListHandler {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler<ListMembers> for MemberListHandler {
    async fn handle(&self, _request: ListMembers) -> Result<Outcome<MemberListReadModel>, DomainError> {
        let members = self.repository.list().await?;
        let active: Vec<&Member> = members.iter().filter(|m| m.is_active()).collect();

        if active.is_empty() {
            return Ok(Outcome::NotFound);
        }

        Ok(Outcome::Success(project_list(active)))
    }
}
