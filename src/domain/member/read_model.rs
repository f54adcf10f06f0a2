//! Presentation-shaped projections of members and outcomes
//!
//! Projection is pure: it never validates or fetches, and it drops fields
//! presentation must not see (password hash, active flag).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{Member, MemberId};
use crate::domain::pipeline::Outcome;

/// Everything shown on a member's detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDetailReadModel {
    pub id: MemberId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub avatar: String,
    pub registered_at: DateTime<Utc>,
}

/// One row of the member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSummaryReadModel {
    pub id: MemberId,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberListReadModel {
    pub members: Vec<MemberSummaryReadModel>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSeverity {
    Informational,
    Warning,
}

/// Uniform message page for any outcome other than success
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDisplayReadModel {
    pub heading: String,
    pub sub_heading: String,
    pub status_code: u16,
    pub severity: MessageSeverity,
    pub messages: Vec<String>,
}

pub fn project_detail(member: &Member) -> MemberDetailReadModel {
    MemberDetailReadModel {
        id: *member.id(),
        username: member.username().to_string(),
        email: member.email().to_string(),
        name: member.name().to_string(),
        nickname: member.nickname().to_string(),
        avatar: member.avatar().as_str().to_string(),
        registered_at: member.created_at(),
    }
}

pub fn project_list<'a>(members: impl IntoIterator<Item = &'a Member>) -> MemberListReadModel {
    let members: Vec<MemberSummaryReadModel> = members
        .into_iter()
        .map(|m| MemberSummaryReadModel {
            id: *m.id(),
            username: m.username().to_string(),
            nickname: m.nickname().to_string(),
            avatar: m.avatar().as_str().to_string(),
        })
        .collect();
    let total = members.len();

    MemberListReadModel { members, total }
}

/// Message page for a non-success outcome; `None` on success
pub fn project_message<T>(
    heading: &str,
    sub_heading: &str,
    outcome: &Outcome<T>,
) -> Option<MessageDisplayReadModel> {
    let (status_code, severity, messages) = match outcome {
        Outcome::Success(_) => return None,
        Outcome::NotFound => (
            404,
            MessageSeverity::Informational,
            vec!["No matching member could be found.".to_string()],
        ),
        Outcome::Invalid(errors) => (
            400,
            MessageSeverity::Warning,
            errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect(),
        ),
        Outcome::DuplicateId => (
            409,
            MessageSeverity::Warning,
            vec!["The generated identifier was already in use. Please try again.".to_string()],
        ),
        Outcome::UsernameUnavailable => (
            409,
            MessageSeverity::Warning,
            vec!["That username is unavailable.".to_string()],
        ),
    };

    Some(MessageDisplayReadModel {
        heading: heading.to_string(),
        sub_heading: sub_heading.to_string(),
        status_code,
        severity,
        messages,
    })
}
