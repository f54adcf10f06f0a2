//! Request dispatcher
//!
//! The request-to-handler table is the set of `Route` impls below, so a
//! request type without a handler fails to compile instead of failing at
//! dispatch time.

use std::sync::Arc;

use tracing::{debug, error, info_span, Instrument};

use crate::domain::member::{KeyGenerator, MemberRepository};
use crate::domain::pipeline::{
    ChangeEmail, ChangeOther, ChangePassword, ChangeUsername, DeactivateMember, GetMemberDetail,
    Handler, ListMembers, Outcome, RegisterMember, Request,
};
use crate::domain::DomainError;

use super::handlers::{
    ChangeEmailHandler, ChangeOtherHandler, ChangePasswordHandler, ChangeUsernameHandler,
    DeactivateMemberHandler, MemberDetailHandler, MemberListHandler, RegisterMemberHandler,
};
use super::password::PasswordHasher;

/// Binds a request type to the one handler that serves it
pub trait Route<R: Request> {
    fn handler(&self) -> &dyn Handler<R>;
}

/// Owns one handler per member request type
#[derive(Debug)]
pub struct MemberDispatcher {
    register: RegisterMemberHandler,
    change_email: ChangeEmailHandler,
    change_username: ChangeUsernameHandler,
    change_password: ChangePasswordHandler,
    change_other: ChangeOtherHandler,
    deactivate: DeactivateMemberHandler,
    detail: MemberDetailHandler,
    list: MemberListHandler,
}

impl MemberDispatcher {
    /// Wire every handler against the same collaborators
    pub fn new(
        repository: Arc<dyn MemberRepository>,
        keys: Arc<dyn KeyGenerator>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            register: RegisterMemberHandler::new(repository.clone(), keys, hasher.clone()),
            change_email: ChangeEmailHandler::new(repository.clone()),
            change_username: ChangeUsernameHandler::new(repository.clone()),
            change_password: ChangePasswordHandler::new(repository.clone(), hasher),
            change_other: ChangeOtherHandler::new(repository.clone()),
            deactivate: DeactivateMemberHandler::new(repository.clone()),
            detail: MemberDetailHandler::new(repository.clone()),
            list: MemberListHandler::new(repository),
        }
    }

    /// Run `request` through its handler exactly once
    pub async fn dispatch<R>(&self, request: R) -> Result<Outcome<R::Payload>, DomainError>
    where
        R: Request,
        Self: Route<R>,
    {
        let span = info_span!("dispatch", request = R::NAME, kind = ?R::KIND);

        async move {
            let result = <Self as Route<R>>::handler(self).handle(request).await;

            match &result {
                Ok(outcome) => debug!(status = %outcome.status(), "Request resolved"),
                Err(e) => error!(error = %e, "Request failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

impl Route<RegisterMember> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<RegisterMember> {
        &self.register
    }
}

impl Route<ChangeEmail> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<ChangeEmail> {
        &self.change_email
    }
}

impl Route<ChangeUsername> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<ChangeUsername> {
        &self.change_username
    }
}

impl Route<ChangePassword> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<ChangePassword> {
        &self.change_password
    }
}

impl Route<ChangeOther> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<ChangeOther> {
        &self.change_other
    }
}

impl Route<DeactivateMember> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<DeactivateMember> {
        &self.deactivate
    }
}

impl Route<GetMemberDetail> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<GetMemberDetail> {
        &self.detail
    }
}

impl Route<ListMembers> for MemberDispatcher {
    fn handler(&self) -> &dyn Handler<ListMembers> {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{fields, MemberId, MockMemberRepository};
    use crate::domain::Status;
    use crate::infrastructure::member::{
        Argon2Hasher, InMemoryMemberRepository, RandomKeyGenerator, VerifiedKeyGenerator,
    };

    fn create_dispatcher() -> MemberDispatcher {
        let repository: Arc<dyn MemberRepository> = Arc::new(InMemoryMemberRepository::new());
        let keys = Arc::new(VerifiedKeyGenerator::new(repository.clone()));
        MemberDispatcher::new(repository, keys, Arc::new(Argon2Hasher::new()))
    }

    async fn register(dispatcher: &MemberDispatcher, username: &str) -> MemberId {
        let request = RegisterMember::new(username, "a@example.com", "Alice A", "Al", "seed");
        dispatcher
            .dispatch(request)
            .await
            .unwrap()
            .into_payload()
            .expect("registration should succeed")
    }

    #[tokio::test]
    async fn test_full_member_lifecycle() {
        let dispatcher = create_dispatcher();
        let id = register(&dispatcher, "alice").await;
        let raw = id.to_string();

        let steps: Vec<Status> = vec![
            dispatcher
                .dispatch(ChangeEmail::new(&raw, "new@example.com"))
                .await
                .unwrap()
                .status(),
            dispatcher
                .dispatch(ChangeUsername::new(&raw, "alicia"))
                .await
                .unwrap()
                .status(),
            dispatcher
                .dispatch(ChangePassword::new(&raw, "hunter2hunter2"))
                .await
                .unwrap()
                .status(),
            dispatcher
                .dispatch(ChangeOther::new(&raw, "Alicia A", "Ali"))
                .await
                .unwrap()
                .status(),
        ];
        assert!(steps.iter().all(|s| *s == Status::Success));

        let detail = dispatcher
            .dispatch(GetMemberDetail::new(&raw))
            .await
            .unwrap()
            .into_payload()
            .unwrap();
        assert_eq!(detail.username, "alicia");
        assert_eq!(detail.email, "new@example.com");
        assert_eq!(detail.nickname, "Ali");

        let outcome = dispatcher.dispatch(DeactivateMember::new(&raw)).await.unwrap();
        assert_eq!(outcome.status(), Status::Success);

        let list = dispatcher.dispatch(ListMembers).await.unwrap();
        assert_eq!(list, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_dispatch_reports_invalid_input() {
        let dispatcher = create_dispatcher();
        let id = register(&dispatcher, "alice").await;

        let outcome = dispatcher
            .dispatch(ChangeUsername::new(id.to_string(), ""))
            .await
            .unwrap();

        assert_eq!(outcome.status(), Status::Invalid);
        assert_eq!(outcome.validation_errors().unwrap().fields(), vec![fields::USERNAME]);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_member() {
        let dispatcher = create_dispatcher();

        let outcome = dispatcher
            .dispatch(GetMemberDetail::new(MemberId::random().to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_fatal_errors() {
        let mut mock = MockMemberRepository::new();
        mock.expect_list()
            .times(1)
            .returning(|| Err(DomainError::storage("disk on fire")));

        let dispatcher = MemberDispatcher::new(
            Arc::new(mock),
            Arc::new(RandomKeyGenerator::new()),
            Arc::new(Argon2Hasher::new()),
        );

        let err = dispatcher.dispatch(ListMembers).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_list_is_invoked_once_per_dispatch() {
        let mut mock = MockMemberRepository::new();
        mock.expect_list().times(2).returning(|| Ok(Vec::new()));

        let dispatcher = MemberDispatcher::new(
            Arc::new(mock),
            Arc::new(RandomKeyGenerator::new()),
            Arc::new(Argon2Hasher::new()),
        );

        for _ in 0..2 {
            let outcome = dispatcher.dispatch(ListMembers).await.unwrap();
            assert_eq!(outcome.status(), Status::NotFound);
        }
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_distinct_ids() {
        let dispatcher = Arc::new(create_dispatcher());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    let request = RegisterMember::new(
                        format!("member{}", i),
                        "m@example.com",
                        "Member",
                        "M",
                        "",
                    );
                    dispatcher.dispatch(request).await.unwrap().into_payload().unwrap()
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for task in tasks {
            assert!(ids.insert(task.await.unwrap()));
        }

        assert_eq!(ids.len(), 16);
        let list = dispatcher.dispatch(ListMembers).await.unwrap().into_payload().unwrap();
        assert_eq!(list.total, 16);
    }
}
