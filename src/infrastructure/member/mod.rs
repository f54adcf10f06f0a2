//! Member infrastructure
//!
//! Storage backends, key generators, password hashing, and the request
//! handlers wired together by [`MemberDispatcher`].

mod dispatcher;
mod handlers;
mod key_generator;
mod password;
mod postgres_repository;
mod repository;

pub use dispatcher::{MemberDispatcher, Route};
pub use handlers::{
    ChangeEmailHandler, ChangeOtherHandler, ChangePasswordHandler, ChangeUsernameHandler,
    DeactivateMemberHandler, MemberDetailHandler, MemberListHandler, RegisterMemberHandler,
};
pub use key_generator::{
    create_key_generator, KeyStrategy, RandomKeyGenerator, VerifiedKeyGenerator,
    DEFAULT_MAX_ATTEMPTS,
};
pub use password::{
    Argon2Hasher, PasswordHasher, DEFAULT_ITERATIONS, DEFAULT_LANES, DEFAULT_MEMORY_KIB,
};
pub use postgres_repository::PostgresMemberRepository;
pub use repository::InMemoryMemberRepository;
