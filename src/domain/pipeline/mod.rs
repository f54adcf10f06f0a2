//! Request pipeline
//!
//! Requests, their outcomes, and the handler seam the dispatcher routes to.

mod outcome;
mod request;

use async_trait::async_trait;

use crate::domain::DomainError;

pub use outcome::{Outcome, Status};
pub use request::{
    ChangeEmail, ChangeOther, ChangePassword, ChangeUsername, DeactivateMember, GetMemberDetail,
    ListMembers, RegisterMember, Request, RequestKind,
};

/// Logic implementing one request type.
///
/// `Ok` always holds a terminal outcome; `Err` is reserved for failures the
/// caller cannot fix by changing its input.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Result<Outcome<R::Payload>, DomainError>;
}
