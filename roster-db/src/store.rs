//! SQLite persistence gateway
//!
//! A unit of work owns one sqlx transaction. Dropping it without calling
//! `commit` rolls the transaction back.
//!
//! Transactions start with `BEGIN IMMEDIATE`, so a unit of work holds the
//! write lock from its first statement and units of work run one at a time.
//! Readers in WAL mode are not blocked. A second unit of work waits in
//! `begin` for up to the connection's busy timeout instead of failing at
//! commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::model::{
    Candidate, PrStats, PullRequestRecord, PullRequestShort, SortOrder, TeamMember, User,
    UserAssignmentStats,
};
use roster_core::store::{Store, UnitOfWork};
use roster_core::{Entity, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::Error;
use crate::repos::{PullRequestsRepo, StatsRepo, TeamsRepo, UsersRepo};

/// Store handing out transactional units of work over a SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(Error::from)?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// One open transaction
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteUnitOfWork {
    fn teams(&mut self) -> TeamsRepo<'_> {
        TeamsRepo::new(&mut *self.tx)
    }

    fn users(&mut self) -> UsersRepo<'_> {
        UsersRepo::new(&mut *self.tx)
    }

    fn pull_requests(&mut self) -> PullRequestsRepo<'_> {
        PullRequestsRepo::new(&mut *self.tx)
    }

    fn stats(&mut self) -> StatsRepo<'_> {
        StatsRepo::new(&mut *self.tx)
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn create_team(&mut self, team_name: &str) -> Result<()> {
        self.teams().create(team_name).await?;
        Ok(())
    }

    async fn team_exists(&mut self, team_name: &str) -> Result<bool> {
        Ok(self.teams().exists(team_name).await?)
    }

    async fn team_members(&mut self, team_name: &str) -> Result<Vec<TeamMember>> {
        Ok(self.teams().members(team_name).await?)
    }

    async fn upsert_user(&mut self, user: &User) -> Result<()> {
        let team_id = self.teams().id_of(&user.team_name).await?.ok_or_else(|| {
            Error::Missing {
                entity: Entity::Team,
                id: user.team_name.clone(),
            }
        })?;
        self.users().upsert(user, team_id).await?;
        Ok(())
    }

    async fn find_user(&mut self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users().find(user_id).await?)
    }

    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<bool> {
        Ok(self.users().set_active(user_id, is_active).await?)
    }

    async fn active_candidates(&mut self, team_name: &str) -> Result<Vec<Candidate>> {
        Ok(self.users().active_candidates(team_name).await?)
    }

    async fn insert_pull_request(&mut self, pr: &PullRequestRecord) -> Result<()> {
        Ok(self.pull_requests().insert(pr).await?)
    }

    async fn find_pull_request(&mut self, pr_id: &str) -> Result<Option<PullRequestRecord>> {
        Ok(self.pull_requests().find(pr_id).await?)
    }

    async fn mark_merged(
        &mut self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<()> {
        Ok(self
            .pull_requests()
            .mark_merged(pr_id, merged_at, expected_version)
            .await?)
    }

    async fn reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        Ok(self.pull_requests().reviewers(pr_id).await?)
    }

    async fn add_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<()> {
        Ok(self.pull_requests().add_reviewer(pr_id, user_id).await?)
    }

    async fn replace_reviewer(
        &mut self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
        expected_version: i64,
    ) -> Result<()> {
        Ok(self
            .pull_requests()
            .replace_reviewer(pr_id, old_reviewer, new_reviewer, expected_version)
            .await?)
    }

    async fn replaced_reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        Ok(self.pull_requests().replaced_reviewers(pr_id).await?)
    }

    async fn reviews_for_user(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        Ok(self.pull_requests().reviews_for_user(user_id).await?)
    }

    async fn assignment_stats(&mut self, order: SortOrder) -> Result<Vec<UserAssignmentStats>> {
        Ok(self.stats().assignments(order).await?)
    }

    async fn pr_stats(&mut self) -> Result<PrStats> {
        Ok(self.stats().pull_requests().await?)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(Error::from)?;
        Ok(())
    }
}
