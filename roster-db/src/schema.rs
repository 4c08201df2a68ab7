//! Row types read back from SQLite

use chrono::{DateTime, Utc};
use roster_core::model::{
    Candidate, PrStatus, PullRequestRecord, PullRequestShort, TeamMember, User,
    UserAssignmentStats,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamMemberRow {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            is_active: row.is_active,
        }
    }
}

/// User joined with its team name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(row.user_id, row.username, row.team_name).with_active(row.is_active)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub user_id: String,
    pub open_reviews: i64,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        let open_reviews = u32::try_from(row.open_reviews).unwrap_or(u32::MAX);
        Candidate::new(row.user_id, open_reviews)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub version: i64,
}

fn parse_status(status: &str) -> Result<PrStatus> {
    status
        .parse()
        .map_err(|_| Error::InvalidData(format!("unknown pull request status '{}'", status)))
}

impl TryFrom<PullRequestRow> for PullRequestRecord {
    type Error = Error;

    fn try_from(row: PullRequestRow) -> Result<Self> {
        Ok(Self {
            status: parse_status(&row.status)?,
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            created_at: row.created_at,
            merged_at: row.merged_at,
            version: row.version,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestShortRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = Error;

    fn try_from(row: PullRequestShortRow) -> Result<Self> {
        Ok(Self {
            status: parse_status(&row.status)?,
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentStatsRow {
    pub user_id: String,
    pub username: String,
    pub assignment_count: i64,
}

impl From<AssignmentStatsRow> for UserAssignmentStats {
    fn from(row: AssignmentStatsRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            assignment_count: row.assignment_count,
        }
    }
}
