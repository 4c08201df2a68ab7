//! In-memory persistence gateway.
//!
//! A unit of work holds the store lock for its whole lifetime and edits a
//! private copy of the state, which replaces the shared state on commit.
//! Units of work are therefore fully serialised.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, UnitOfWork};
use crate::error::{Entity, Error, Result};
use crate::model::{
    Candidate, PrStats, PrStatus, PullRequestRecord, PullRequestShort, SortOrder, TeamMember,
    User, UserAssignmentStats,
};

#[derive(Debug, Clone, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequestRecord>,
    /// (pull request id, reviewer id) in assignment order
    reviewers: Vec<(String, String)>,
    /// (pull request id, reviewer id) removed by reassignment
    replaced: Vec<(String, String)>,
}

impl State {
    fn pull_request_mut(&mut self, pr_id: &str) -> Result<&mut PullRequestRecord> {
        self.pull_requests
            .get_mut(pr_id)
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))
    }

    fn is_assigned(&self, pr_id: &str, user_id: &str) -> bool {
        self.reviewers
            .iter()
            .any(|(pr, user)| pr == pr_id && user == user_id)
    }

    fn open_reviews(&self, user_id: &str) -> u32 {
        let count = self
            .reviewers
            .iter()
            .filter(|(pr, user)| {
                user == user_id
                    && self
                        .pull_requests
                        .get(pr)
                        .is_some_and(|p| p.status.is_open())
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Process-local store, useful for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

/// Unit of work over a [`MemoryStore`]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn create_team(&mut self, team_name: &str) -> Result<()> {
        if !self.working.teams.insert(team_name.to_string()) {
            return Err(Error::already_exists(Entity::Team, team_name));
        }
        Ok(())
    }

    async fn team_exists(&mut self, team_name: &str) -> Result<bool> {
        Ok(self.working.teams.contains(team_name))
    }

    async fn team_members(&mut self, team_name: &str) -> Result<Vec<TeamMember>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<()> {
        if !self.working.teams.contains(&user.team_name) {
            return Err(Error::not_found(Entity::Team, &user.team_name));
        }
        self.working
            .users
            .insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&mut self, user_id: &str) -> Result<Option<User>> {
        Ok(self.working.users.get(user_id).cloned())
    }

    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<bool> {
        match self.working.users.get_mut(user_id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_candidates(&mut self, team_name: &str) -> Result<Vec<Candidate>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .map(|u| Candidate::new(&u.user_id, self.working.open_reviews(&u.user_id)))
            .collect())
    }

    async fn insert_pull_request(&mut self, pr: &PullRequestRecord) -> Result<()> {
        if self.working.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(Error::already_exists(
                Entity::PullRequest,
                &pr.pull_request_id,
            ));
        }
        if !self.working.users.contains_key(&pr.author_id) {
            return Err(Error::not_found(Entity::User, &pr.author_id));
        }
        self.working
            .pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn find_pull_request(&mut self, pr_id: &str) -> Result<Option<PullRequestRecord>> {
        Ok(self.working.pull_requests.get(pr_id).cloned())
    }

    async fn mark_merged(
        &mut self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<()> {
        let pr = self.working.pull_request_mut(pr_id)?;
        if pr.version != expected_version || !pr.status.is_open() {
            return Err(Error::Conflict(pr_id.to_string()));
        }
        pr.status = PrStatus::Merged;
        pr.merged_at = Some(merged_at);
        pr.version += 1;
        Ok(())
    }

    async fn reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        Ok(self
            .working
            .reviewers
            .iter()
            .filter(|(pr, _)| pr == pr_id)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn add_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<()> {
        if !self.working.users.contains_key(user_id) {
            return Err(Error::not_found(Entity::User, user_id));
        }
        if self.working.is_assigned(pr_id, user_id) {
            return Err(Error::Conflict(pr_id.to_string()));
        }
        self.working.pull_request_mut(pr_id)?.version += 1;
        self.working
            .reviewers
            .push((pr_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn replace_reviewer(
        &mut self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
        expected_version: i64,
    ) -> Result<()> {
        if !self.working.users.contains_key(new_reviewer) {
            return Err(Error::not_found(Entity::User, new_reviewer));
        }

        let pr = self.working.pull_request_mut(pr_id)?;
        if pr.version != expected_version || !pr.status.is_open() {
            return Err(Error::Conflict(pr_id.to_string()));
        }

        if self.working.is_assigned(pr_id, new_reviewer) {
            return Err(Error::Conflict(pr_id.to_string()));
        }
        let position = self
            .working
            .reviewers
            .iter()
            .position(|(pr, user)| pr == pr_id && user == old_reviewer)
            .ok_or_else(|| Error::NotAssigned {
                pull_request: pr_id.to_string(),
                reviewer: old_reviewer.to_string(),
            })?;

        let (_, removed) = self.working.reviewers.remove(position);
        if !self
            .working
            .replaced
            .iter()
            .any(|(pr, user)| pr == pr_id && *user == removed)
        {
            self.working.replaced.push((pr_id.to_string(), removed));
        }
        self.working
            .reviewers
            .push((pr_id.to_string(), new_reviewer.to_string()));
        self.working.pull_request_mut(pr_id)?.version += 1;
        Ok(())
    }

    async fn replaced_reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        Ok(self
            .working
            .replaced
            .iter()
            .filter(|(pr, _)| pr == pr_id)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn reviews_for_user(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let state = &self.working;
        Ok(state
            .reviewers
            .iter()
            .filter(|(_, user)| user == user_id)
            .filter_map(|(pr, _)| state.pull_requests.get(pr))
            .map(|pr| PullRequestShort {
                pull_request_id: pr.pull_request_id.clone(),
                pull_request_name: pr.pull_request_name.clone(),
                author_id: pr.author_id.clone(),
                status: pr.status,
            })
            .collect())
    }

    async fn assignment_stats(&mut self, order: SortOrder) -> Result<Vec<UserAssignmentStats>> {
        let mut stats: Vec<UserAssignmentStats> = self
            .working
            .users
            .values()
            .map(|u| UserAssignmentStats {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                assignment_count: i64::try_from(
                    self.working
                        .reviewers
                        .iter()
                        .filter(|(_, user)| user == &u.user_id)
                        .count(),
                )
                .unwrap_or(i64::MAX),
            })
            .collect();

        stats.sort_by(|a, b| {
            let by_count = match order {
                SortOrder::Asc => a.assignment_count.cmp(&b.assignment_count),
                SortOrder::Desc => b.assignment_count.cmp(&a.assignment_count),
            };
            by_count.then_with(|| a.username.cmp(&b.username))
        });
        Ok(stats)
    }

    async fn pr_stats(&mut self) -> Result<PrStats> {
        let mut stats = PrStats::default();
        for pr in self.working.pull_requests.values() {
            stats.total += 1;
            match pr.status {
                PrStatus::Open => stats.open += 1,
                PrStatus::Merged => stats.merged += 1,
            }
        }
        Ok(stats)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.create_team("backend").await.unwrap();
        for id in ["u1", "u2", "u3"] {
            uow.upsert_user(&User::new(id, id.to_uppercase(), "backend"))
                .await
                .unwrap();
        }
        uow.commit().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = seeded().await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.create_team("frontend").await.unwrap();
            uow.set_user_active("u1", false).await.unwrap();
        }

        let mut uow = store.begin().await.unwrap();
        assert!(!uow.team_exists("frontend").await.unwrap());
        assert!(uow.find_user("u1").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_duplicate_team_rejected() {
        let store = seeded().await;
        let mut uow = store.begin().await.unwrap();

        let err = uow.create_team("backend").await.unwrap_err();
        assert!(matches!(
            err,
            Error::AlreadyExists {
                entity: Entity::Team,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_replace_reviewer_checks_version() {
        let store = seeded().await;
        let mut uow = store.begin().await.unwrap();

        let pr = PullRequestRecord::open("pr-1", "Add search", "u1", Utc::now());
        uow.insert_pull_request(&pr).await.unwrap();
        uow.add_reviewer("pr-1", "u2").await.unwrap();

        let current = uow.find_pull_request("pr-1").await.unwrap().unwrap();
        assert_eq!(current.version, 1);

        let err = uow
            .replace_reviewer("pr-1", "u2", "u3", current.version - 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        uow.replace_reviewer("pr-1", "u2", "u3", current.version)
            .await
            .unwrap();
        assert_eq!(uow.reviewers("pr-1").await.unwrap(), vec!["u3".to_string()]);
        assert_eq!(
            uow.replaced_reviewers("pr-1").await.unwrap(),
            vec!["u2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_open_review_counts_ignore_merged() {
        let store = seeded().await;
        let mut uow = store.begin().await.unwrap();

        for id in ["pr-1", "pr-2"] {
            uow.insert_pull_request(&PullRequestRecord::open(id, "Title", "u1", Utc::now()))
                .await
                .unwrap();
            uow.add_reviewer(id, "u2").await.unwrap();
        }
        let version = uow.find_pull_request("pr-2").await.unwrap().unwrap().version;
        uow.mark_merged("pr-2", Utc::now(), version).await.unwrap();

        let candidates = uow.active_candidates("backend").await.unwrap();
        let u2 = candidates.iter().find(|c| c.user_id == "u2").unwrap();
        assert_eq!(u2.open_reviews, 1);

        let stats = uow.assignment_stats(SortOrder::Desc).await.unwrap();
        assert_eq!(stats[0].user_id, "u2");
        assert_eq!(stats[0].assignment_count, 2);
        assert!(stats[1..].iter().all(|s| s.assignment_count == 0));
    }
}
