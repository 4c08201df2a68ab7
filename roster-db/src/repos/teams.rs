//! Team repository

use chrono::Utc;
use roster_core::model::TeamMember;
use roster_core::Entity;
use sqlx::SqliteConnection;

use crate::error::{Error, Result};
use crate::schema::TeamMemberRow;

/// Repository for teams and their membership
pub struct TeamsRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> TeamsRepo<'c> {
    /// Create a new team repository
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a team, returning its surrogate id
    pub async fn create(&mut self, team_name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO teams (team_name, created_at) VALUES (?, ?)")
            .bind(team_name)
            .bind(Utc::now())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| Error::on_insert(e, Entity::Team, team_name))?;

        Ok(result.last_insert_rowid())
    }

    /// Surrogate id of a team
    pub async fn id_of(&mut self, team_name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(Into::into)
    }

    /// Check whether a team exists
    pub async fn exists(&mut self, team_name: &str) -> Result<bool> {
        Ok(self.id_of(team_name).await?.is_some())
    }

    /// All members of a team ordered by user id
    pub async fn members(&mut self, team_name: &str) -> Result<Vec<TeamMember>> {
        let rows = sqlx::query_as::<_, TeamMemberRow>(
            r#"
            SELECT u.user_id, u.username, u.is_active
            FROM users u
            JOIN teams t ON t.id = u.team_id
            WHERE t.team_name = ?
            ORDER BY u.user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
