use chrono::{DateTime, Utc};
use serde::Serialize;

use taxifleet_core::{DomainResult, Entity, Repository, SessionId, SoftDelete, UserId};

/// Persisted backing of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: UserId, token: String, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::default(),
            user_id,
            token,
            expires_at,
            created_at: now,
            deleted_at: None,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl Entity for Session {
    type Id = SessionId;

    fn id(&self) -> SessionId {
        self.id
    }

    fn set_id(&mut self, id: SessionId) {
        self.id = id;
    }
}

impl SoftDelete for Session {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }
}

pub trait SessionRepository: Repository<Session> {
    fn find_by_token(&self, token: &str) -> DomainResult<Option<Session>>;

    /// Remove the live session of `user_id` holding `token`; returns whether
    /// one was removed. Sessions of other users are left alone.
    fn delete_by_token(&self, user_id: UserId, token: &str) -> DomainResult<bool>;

    /// Revoke every session of a user; returns how many were removed.
    fn delete_for_user(&self, user_id: UserId) -> DomainResult<usize>;
}
