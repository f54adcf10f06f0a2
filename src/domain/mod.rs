//! Domain layer - Core business logic and entities

pub mod error;
pub mod member;
pub mod pipeline;

pub use error::DomainError;
pub use member::{
    AvatarData, FieldError, KeyGenerator, Member, MemberDetailReadModel, MemberId,
    MemberListReadModel, MemberRepository, MessageDisplayReadModel, SaveOutcome, ValidationErrors,
};
pub use pipeline::{
    ChangeEmail, ChangeOther, ChangePassword, ChangeUsername, DeactivateMember, GetMemberDetail,
    Handler, ListMembers, Outcome, RegisterMember, Request, RequestKind, Status,
};
