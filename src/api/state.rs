//! Application state shared by the HTTP endpoints

use std::sync::Arc;

use crate::domain::member::{KeyGenerator, MemberRepository};
use crate::infrastructure::member::{MemberDispatcher, PasswordHasher};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<MemberDispatcher>,
    /// Used directly only by the readiness check
    pub repository: Arc<dyn MemberRepository>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn MemberRepository>,
        keys: Arc<dyn KeyGenerator>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(MemberDispatcher::new(repository.clone(), keys, hasher)),
            repository,
        }
    }
}
