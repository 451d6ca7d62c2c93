//! Live session repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{EndedSession, Session, SessionId};

/// Repository trait for workstation sessions.
///
/// Starting and ending a session also moves the PC between `free` and
/// `occupied`, and ending one stores its usage record, all in one step.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// List every session, newest first.
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>>;

    /// Fetch one session.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no session has this id
    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session>;

    /// Open a session on a free PC and mark the PC occupied.
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored session with its id and PC number
    /// * `Err(RepositoryError::NotFound)` - If the PC does not exist
    /// * `Err(RepositoryError::ValidationError)` - If the PC is not free
    async fn start_session(&self, session: &Session) -> RepositoryResult<Session>;

    /// Close an active session at `ended_at`, store its usage record and free the PC.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no session has this id
    /// * `Err(RepositoryError::ValidationError)` - If the session already ended
    async fn end_session(
        &self,
        id: SessionId,
        ended_at: DateTime<Utc>,
    ) -> RepositoryResult<EndedSession>;
}
