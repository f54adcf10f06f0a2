//! In-memory member repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::member::{username_key, Member, MemberId, MemberRepository, SaveOutcome};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    members: HashMap<MemberId, Member>,
    /// Lowercased username -> member ID
    username_index: HashMap<String, MemberId>,
    /// Insertion order, for stable listing
    order: Vec<MemberId>,
}

/// In-memory implementation of MemberRepository.
///
/// A single lock guards the member map and the username index, so every
/// conditional write checks and mutates both atomically.
#[derive(Debug, Default)]
pub struct InMemoryMemberRepository {
    state: RwLock<State>,
}

impl InMemoryMemberRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial members; later duplicates are skipped
    pub fn with_members(members: Vec<Member>) -> Self {
        let mut state = State::default();

        for member in members {
            let key = member.username_key();

            if state.members.contains_key(member.id()) || state.username_index.contains_key(&key) {
                continue;
            }

            state.username_index.insert(key, *member.id());
            state.order.push(*member.id());
            state.members.insert(*member.id(), member);
        }

        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn exists(&self, id: &MemberId) -> Result<bool, DomainError> {
        Ok(self.state.read().await.members.contains_key(id))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.username_index.contains_key(&username_key(username)))
    }

    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        Ok(self.state.read().await.members.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Member>, DomainError> {
        let state = self.state.read().await;

        Ok(state
            .order
            .iter()
            .filter_map(|id| state.members.get(id).cloned())
            .collect())
    }

    async fn insert(&self, member: &Member) -> Result<SaveOutcome, DomainError> {
        let mut state = self.state.write().await;
        let key = member.username_key();

        if state.members.contains_key(member.id()) {
            return Ok(SaveOutcome::DuplicateId);
        }

        if state.username_index.contains_key(&key) {
            return Ok(SaveOutcome::UsernameTaken);
        }

        state.username_index.insert(key, *member.id());
        state.order.push(*member.id());
        state.members.insert(*member.id(), member.clone());

        Ok(SaveOutcome::Saved)
    }

    async fn update(&self, member: &Member) -> Result<SaveOutcome, DomainError> {
        let mut state = self.state.write().await;
        let id = *member.id();

        let Some(stored) = state.members.get(&id) else {
            return Ok(SaveOutcome::Missing);
        };

        if stored.version() != member.version() {
            return Ok(SaveOutcome::Stale);
        }

        let old_key = stored.username_key();
        let new_key = member.username_key();

        if old_key != new_key {
            if state.username_index.contains_key(&new_key) {
                return Ok(SaveOutcome::UsernameTaken);
            }

            state.username_index.remove(&old_key);
            state.username_index.insert(new_key, id);
        }

        let next = member.clone().with_version(member.version() + 1);
        state.members.insert(id, next);

        Ok(SaveOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::AvatarData;
    use std::sync::Arc;

    fn create_test_member(username: &str) -> Member {
        Member::new(
            MemberId::random(),
            username,
            "a@example.com",
            "Alice A",
            "Al",
            AvatarData::from_seed(username),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryMemberRepository::new();
        let member = create_test_member("alice");

        assert_eq!(repo.insert(&member).await.unwrap(), SaveOutcome::Saved);

        let retrieved = repo.get(member.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.username(), "alice");
        assert!(repo.exists(member.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = InMemoryMemberRepository::new();

        assert!(repo.get(&MemberId::random()).await.unwrap().is_none());
        assert!(!repo.exists(&MemberId::random()).await.unwrap());
    }

    #[tokio::test]
    async fn test_username_exists_ignores_case() {
        let repo = InMemoryMemberRepository::new();
        repo.insert(&create_test_member("Alice")).await.unwrap();

        assert!(repo.username_exists("alice").await.unwrap());
        assert!(repo.username_exists("ALICE").await.unwrap());
        assert!(!repo.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let repo = InMemoryMemberRepository::new();
        let first = create_test_member("alice");
        let second = Member::new(
            *first.id(),
            "bob",
            "b@example.com",
            "Bob B",
            "Bo",
            AvatarData::from_seed("bob"),
        );

        repo.insert(&first).await.unwrap();

        assert_eq!(repo.insert(&second).await.unwrap(), SaveOutcome::DuplicateId);
        assert!(!repo.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_username() {
        let repo = InMemoryMemberRepository::new();

        repo.insert(&create_test_member("alice")).await.unwrap();

        let outcome = repo.insert(&create_test_member("ALICE")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::UsernameTaken);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_same_username() {
        let repo = Arc::new(InMemoryMemberRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.insert(&create_test_member("racer")).await.unwrap() })
            })
            .collect();

        let mut saved = 0;
        for handle in handles {
            if handle.await.unwrap() == SaveOutcome::Saved {
                saved += 1;
            }
        }

        assert_eq!(saved, 1);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_renames_index() {
        let repo = InMemoryMemberRepository::new();
        let mut member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        member.set_username("alicia");
        assert_eq!(repo.update(&member).await.unwrap(), SaveOutcome::Saved);

        assert!(!repo.username_exists("alice").await.unwrap());
        assert!(repo.username_exists("alicia").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_case_change_keeps_ownership() {
        let repo = InMemoryMemberRepository::new();
        let mut member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        member.set_username("Alice");
        assert_eq!(repo.update(&member).await.unwrap(), SaveOutcome::Saved);
        assert_eq!(repo.get(member.id()).await.unwrap().unwrap().username(), "Alice");
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let repo = InMemoryMemberRepository::new();
        repo.insert(&create_test_member("alice")).await.unwrap();
        let mut bob = create_test_member("bob");
        repo.insert(&bob).await.unwrap();

        bob.set_username("ALICE");
        assert_eq!(repo.update(&bob).await.unwrap(), SaveOutcome::UsernameTaken);
        assert_eq!(repo.get(bob.id()).await.unwrap().unwrap().username(), "bob");
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let repo = InMemoryMemberRepository::new();
        let member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        let mut loaded = repo.get(member.id()).await.unwrap().unwrap();
        loaded.set_email("b@example.com");
        assert_eq!(repo.update(&loaded).await.unwrap(), SaveOutcome::Saved);

        assert_eq!(repo.get(member.id()).await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn test_update_from_stale_copy_is_rejected() {
        let repo = InMemoryMemberRepository::new();
        let member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        let mut first = repo.get(member.id()).await.unwrap().unwrap();
        let mut second = first.clone();

        first.deactivate();
        assert_eq!(repo.update(&first).await.unwrap(), SaveOutcome::Saved);

        second.set_email("b@example.com");
        assert_eq!(repo.update(&second).await.unwrap(), SaveOutcome::Stale);

        let stored = repo.get(member.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
        assert_eq!(stored.email(), "a@example.com");
    }

    #[tokio::test]
    async fn test_stale_rename_keeps_username_index() {
        let repo = InMemoryMemberRepository::new();
        let member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        let mut first = repo.get(member.id()).await.unwrap().unwrap();
        let mut second = first.clone();

        first.set_username("alicia");
        repo.update(&first).await.unwrap();

        second.set_username("ally");
        assert_eq!(repo.update(&second).await.unwrap(), SaveOutcome::Stale);

        assert!(repo.username_exists("alicia").await.unwrap());
        assert!(!repo.username_exists("ally").await.unwrap());
        assert!(!repo.username_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_copy_is_not_blamed_on_reclaimed_username() {
        let repo = InMemoryMemberRepository::new();
        let member = create_test_member("alice");
        repo.insert(&member).await.unwrap();

        let mut stale = repo.get(member.id()).await.unwrap().unwrap();
        let mut renamed = stale.clone();
        renamed.set_username("alicia");
        repo.update(&renamed).await.unwrap();
        repo.insert(&create_test_member("alice")).await.unwrap();

        stale.set_email("b@example.com");
        assert_eq!(repo.update(&stale).await.unwrap(), SaveOutcome::Stale);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = InMemoryMemberRepository::new();

        let outcome = repo.update(&create_test_member("ghost")).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Missing);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = InMemoryMemberRepository::with_members(vec![
            create_test_member("carol"),
            create_test_member("alice"),
            create_test_member("bob"),
        ]);

        let usernames: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|m| m.username().to_string())
            .collect();

        assert_eq!(usernames, vec!["carol", "alice", "bob"]);
    }
}
