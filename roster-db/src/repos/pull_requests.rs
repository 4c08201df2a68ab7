//! Pull request and reviewer assignment repository
//!
//! Every write to a pull request or its reviewer set bumps the `version`
//! column. Writes that carry an expected version only apply when the row
//! still has it and is OPEN; otherwise they fail with `StaleVersion`.

use chrono::{DateTime, Utc};
use roster_core::model::{PullRequestRecord, PullRequestShort};
use roster_core::Entity;
use sqlx::SqliteConnection;

use crate::error::{Error, Result};
use crate::schema::{PullRequestRow, PullRequestShortRow};

/// Repository for pull requests and their reviewers
pub struct PullRequestsRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PullRequestsRepo<'c> {
    /// Create a new pull request repository
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a new pull request
    pub async fn insert(&mut self, pr: &PullRequestRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id,
                status, created_at, merged_at, version
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .bind(pr.version)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| Error::on_insert(e, Entity::PullRequest, &pr.pull_request_id))
        .map_err(|e| Error::on_reference(e, Entity::User, &pr.author_id))?;

        Ok(())
    }

    /// Get a pull request by id
    pub async fn find(&mut self, pr_id: &str) -> Result<Option<PullRequestRecord>> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id,
                   status, created_at, merged_at, version
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(PullRequestRecord::try_from).transpose()
    }

    /// Transition to MERGED if still OPEN at `expected_version`
    pub async fn mark_merged(
        &mut self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = 'MERGED', merged_at = ?, version = version + 1
            WHERE pull_request_id = ? AND version = ? AND status = 'OPEN'
            "#,
        )
        .bind(merged_at)
        .bind(pr_id)
        .bind(expected_version)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::StaleVersion(pr_id.to_string()));
        }
        Ok(())
    }

    /// Reviewer ids in assignment order
    pub async fn reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY rowid",
        )
        .bind(pr_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(Into::into)
    }

    /// Assign a reviewer
    pub async fn add_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<()> {
        self.bump_version(pr_id).await?;
        self.insert_reviewer(pr_id, user_id).await
    }

    /// Swap `old_reviewer` for `new_reviewer` if still OPEN at `expected_version`
    pub async fn replace_reviewer(
        &mut self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
        expected_version: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET version = version + 1
            WHERE pull_request_id = ? AND version = ? AND status = 'OPEN'
            "#,
        )
        .bind(pr_id)
        .bind(expected_version)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::StaleVersion(pr_id.to_string()));
        }

        let deleted =
            sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND user_id = ?")
                .bind(pr_id)
                .bind(old_reviewer)
                .execute(&mut *self.conn)
                .await?;

        if deleted.rows_affected() == 0 {
            return Err(Error::NotAssigned {
                pull_request: pr_id.to_string(),
                reviewer: old_reviewer.to_string(),
            });
        }

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO pr_reviewer_history (pull_request_id, user_id, replaced_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(pr_id)
        .bind(old_reviewer)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        self.insert_reviewer(pr_id, new_reviewer).await
    }

    /// Reviewers removed from the pull request by earlier reassignments
    pub async fn replaced_reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM pr_reviewer_history WHERE pull_request_id = ? ORDER BY rowid",
        )
        .bind(pr_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(Into::into)
    }

    /// Pull requests of any status the user reviews, in assignment order
    pub async fn reviews_for_user(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows = sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
            FROM pr_reviewers r
            JOIN pull_requests pr ON pr.pull_request_id = r.pull_request_id
            WHERE r.user_id = ?
            ORDER BY r.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(PullRequestShort::try_from).collect()
    }

    async fn bump_version(&mut self, pr_id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE pull_requests SET version = version + 1 WHERE pull_request_id = ?",
        )
        .bind(pr_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Missing {
                entity: Entity::PullRequest,
                id: pr_id.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO pr_reviewers (pull_request_id, user_id, assigned_at) VALUES (?, ?, ?)",
        )
        .bind(pr_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await
        .map_err(|e| match Error::on_insert(e, Entity::User, user_id) {
            // already on the reviewer set
            Error::Duplicate { .. } => Error::StaleVersion(pr_id.to_string()),
            other => Error::on_reference(other, Entity::User, user_id),
        })?;

        Ok(())
    }
}
