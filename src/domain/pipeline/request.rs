//! Typed requests, one per member operation

use std::fmt::Debug;

use crate::domain::member::{MemberDetailReadModel, MemberId, MemberListReadModel};

/// Whether a request mutates state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

/// An immutable description of one operation and its inputs.
///
/// Identifier fields carry the raw text received from the caller; handlers
/// validate them together with every other field.
pub trait Request: Debug + Send + 'static {
    /// Payload returned on success
    type Payload: Debug + Send;

    const NAME: &'static str;
    const KIND: RequestKind;
}

/// Self-service registration of a new member.
///
/// `Debug` is written by hand so the password never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterMember {
    pub username: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub avatar_seed: String,
    pub password: Option<String>,
}

impl RegisterMember {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        nickname: impl Into<String>,
        avatar_seed: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            name: name.into(),
            nickname: nickname.into(),
            avatar_seed: avatar_seed.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl Debug for RegisterMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterMember")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("nickname", &self.nickname)
            .field("avatar_seed", &self.avatar_seed)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Request for RegisterMember {
    type Payload = MemberId;
    const NAME: &'static str = "register_member";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEmail {
    pub id: String,
    pub email: String,
}

impl ChangeEmail {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

impl Request for ChangeEmail {
    type Payload = ();
    const NAME: &'static str = "change_email";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeUsername {
    pub id: String,
    pub username: String,
}

impl ChangeUsername {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl Request for ChangeUsername {
    type Payload = ();
    const NAME: &'static str = "change_username";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Clone, PartialEq, Eq)]
pub struct ChangePassword {
    pub id: String,
    pub password: String,
}

impl ChangePassword {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }
}

impl Debug for ChangePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePassword")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Request for ChangePassword {
    type Payload = ();
    const NAME: &'static str = "change_password";
    const KIND: RequestKind = RequestKind::Command;
}

/// Change the descriptive attributes of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOther {
    pub id: String,
    pub name: String,
    pub nickname: String,
    pub avatar_seed: Option<String>,
}

impl ChangeOther {
    pub fn new(id: impl Into<String>, name: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nickname: nickname.into(),
            avatar_seed: None,
        }
    }

    pub fn with_avatar_seed(mut self, seed: impl Into<String>) -> Self {
        self.avatar_seed = Some(seed.into());
        self
    }
}

impl Request for ChangeOther {
    type Payload = ();
    const NAME: &'static str = "change_other";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivateMember {
    pub id: String,
}

impl DeactivateMember {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Request for DeactivateMember {
    type Payload = ();
    const NAME: &'static str = "deactivate_member";
    const KIND: RequestKind = RequestKind::Command;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMemberDetail {
    pub id: String,
}

impl GetMemberDetail {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Request for GetMemberDetail {
    type Payload = MemberDetailReadModel;
    const NAME: &'static str = "get_member_detail";
    const KIND: RequestKind = RequestKind::Query;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListMembers;

impl Request for ListMembers {
    type Payload = MemberListReadModel;
    const NAME: &'static str = "list_members";
    const KIND: RequestKind = RequestKind::Query;
}
