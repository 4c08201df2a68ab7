//! Persistence gateway
//!
//! Services never talk to a database directly. Each operation opens one
//! [`UnitOfWork`] through [`Store::begin`], performs all of its reads and
//! writes on it and calls [`UnitOfWork::commit`] as the last step. Dropping a
//! unit of work without committing rolls everything back, so every early
//! return through `?` and every cancelled future leaves no partial writes.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{
    Candidate, PrStats, PullRequestRecord, PullRequestShort, SortOrder, TeamMember, User,
    UserAssignmentStats,
};
use crate::Result;

pub use memory::MemoryStore;

/// Source of units of work
#[async_trait]
pub trait Store: Send + Sync {
    /// Start a new atomic unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// Atomic group of reads and writes that commits or rolls back as a whole
///
/// Implementations report a duplicate team name or pull request id as
/// `Error::AlreadyExists` and a failed optimistic version check as
/// `Error::Conflict`. Anything else that goes wrong is `Error::Store`.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Insert a new team
    async fn create_team(&mut self, team_name: &str) -> Result<()>;

    /// Check whether a team exists
    async fn team_exists(&mut self, team_name: &str) -> Result<bool>;

    /// All members of a team ordered by user id
    async fn team_members(&mut self, team_name: &str) -> Result<Vec<TeamMember>>;

    /// Insert a user or overwrite its name, team and active flag
    async fn upsert_user(&mut self, user: &User) -> Result<()>;

    /// Look up a user
    async fn find_user(&mut self, user_id: &str) -> Result<Option<User>>;

    /// Update the active flag; returns false when the user does not exist
    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<bool>;

    /// Active members of a team with their open review counts, ordered by user id
    async fn active_candidates(&mut self, team_name: &str) -> Result<Vec<Candidate>>;

    /// Insert a new pull request
    async fn insert_pull_request(&mut self, pr: &PullRequestRecord) -> Result<()>;

    /// Look up a pull request
    async fn find_pull_request(&mut self, pr_id: &str) -> Result<Option<PullRequestRecord>>;

    /// Transition an OPEN pull request to MERGED if its version still matches
    async fn mark_merged(
        &mut self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<()>;

    /// Reviewer ids of a pull request in assignment order
    async fn reviewers(&mut self, pr_id: &str) -> Result<Vec<String>>;

    /// Assign a reviewer to a pull request
    async fn add_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<()>;

    /// Swap `old_reviewer` for `new_reviewer` if the version still matches
    ///
    /// The removed reviewer is remembered in the pull request's replacement
    /// history.
    async fn replace_reviewer(
        &mut self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
        expected_version: i64,
    ) -> Result<()>;

    /// Reviewers previously removed from a pull request by reassignment
    async fn replaced_reviewers(&mut self, pr_id: &str) -> Result<Vec<String>>;

    /// Pull requests (any status) the user is currently assigned to review
    async fn reviews_for_user(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>>;

    /// Assignment counts for every user
    async fn assignment_stats(&mut self, order: SortOrder) -> Result<Vec<UserAssignmentStats>>;

    /// Pull request totals by status
    async fn pr_stats(&mut self) -> Result<PrStats>;

    /// Make all writes of this unit of work durable
    async fn commit(self: Box<Self>) -> Result<()>;
}
