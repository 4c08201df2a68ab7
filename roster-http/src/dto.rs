//! Request and response bodies

use roster_core::model::{PullRequest, Team, TeamMember, User};
use serde::{Deserialize, Serialize};

use crate::error::{bad_request, ApiErr};

/// Minimum length of a pull request title, in characters
pub const MIN_PR_NAME_LEN: usize = 5;

fn require(field: &str, value: &str) -> Result<(), ApiErr> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{} is required", field)));
    }
    Ok(())
}

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddTeamRequest {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl AddTeamRequest {
    pub fn validate(&self) -> Result<(), ApiErr> {
        require("team_name", &self.team_name)?;
        for member in &self.members {
            require("members.user_id", &member.user_id)?;
            require("members.username", &member.username)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

impl CreatePullRequest {
    pub fn validate(&self) -> Result<(), ApiErr> {
        require("pull_request_id", &self.pull_request_id)?;
        require("author_id", &self.author_id)?;
        if self.pull_request_name.chars().count() < MIN_PR_NAME_LEN {
            return Err(bad_request(format!(
                "pull_request_name must be at least {} characters",
                MIN_PR_NAME_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequest {
    pub pull_request_id: String,
}

impl MergePullRequest {
    pub fn validate(&self) -> Result<(), ApiErr> {
        require("pull_request_id", &self.pull_request_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
}

impl ReassignRequest {
    pub fn validate(&self) -> Result<(), ApiErr> {
        require("pull_request_id", &self.pull_request_id)?;
        require("old_reviewer_id", &self.old_reviewer_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

impl SetActiveRequest {
    pub fn validate(&self) -> Result<(), ApiErr> {
        require("user_id", &self.user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub sort: Option<String>,
}

// ── Response envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TeamEnvelope {
    pub team: Team,
}

#[derive(Debug, Serialize)]
pub struct PullRequestEnvelope {
    pub pr: PullRequest,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_name_length_counts_characters() {
        let request = CreatePullRequest {
            pull_request_id: "pr-1".into(),
            pull_request_name: "Fix".into(),
            author_id: "u1".into(),
        };
        assert!(request.validate().is_err());

        let request = CreatePullRequest {
            pull_request_name: "Fixé!".into(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_ids_rejected() {
        let request = ReassignRequest {
            pull_request_id: "pr-1".into(),
            old_reviewer_id: "  ".into(),
        };
        assert!(request.validate().is_err());
    }
}
