//! Member domain
//!
//! This module provides the member entity, field validators, the storage
//! and key-generation seams, and the read models handed to presentation.

mod entity;
mod key_generator;
mod read_model;
mod repository;
mod validation;

pub use entity::{username_key, AvatarData, Member, MemberId};
pub use key_generator::KeyGenerator;
pub use read_model::{
    project_detail, project_list, project_message, MemberDetailReadModel, MemberListReadModel,
    MemberSummaryReadModel, MessageDisplayReadModel, MessageSeverity,
};
pub use repository::{MemberRepository, SaveOutcome};
pub use validation::{
    fields, validate_avatar_seed, validate_email, validate_id, validate_name, validate_nickname,
    validate_password, validate_username, FieldError, FieldValidation, MemberValidationError,
    ValidationErrors, ValidationOutcome,
};

#[cfg(test)]
pub use repository::MockMemberRepository;
