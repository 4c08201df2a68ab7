//! User repository

use roster_core::model::{Candidate, User};
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::schema::{CandidateRow, UserRow};

/// Repository for users and reviewer eligibility
pub struct UsersRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UsersRepo<'c> {
    /// Create a new user repository
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a user or move it into `team_id` with the given name and flag
    pub async fn upsert(&mut self, user: &User, team_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_id, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                team_id = excluded.team_id,
                is_active = excluded.is_active
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(team_id)
        .bind(user.is_active)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Get a user together with its team name
    pub async fn find(&mut self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.user_id, u.username, t.team_name, u.is_active
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE u.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Update the active flag, returning whether the user exists
    pub async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active members of a team with the number of OPEN pull requests each reviews
    pub async fn active_candidates(&mut self, team_name: &str) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT u.user_id, COUNT(pr.pull_request_id) AS open_reviews
            FROM users u
            JOIN teams t ON t.id = u.team_id
            LEFT JOIN pr_reviewers r ON r.user_id = u.user_id
            LEFT JOIN pull_requests pr
                ON pr.pull_request_id = r.pull_request_id AND pr.status = 'OPEN'
            WHERE t.team_name = ? AND u.is_active = 1
            GROUP BY u.user_id
            ORDER BY u.user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
