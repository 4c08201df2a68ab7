//! Aggregate statistics queries

use roster_core::model::{PrStats, SortOrder, UserAssignmentStats};
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::schema::AssignmentStatsRow;

/// Read-only rollups over users and pull requests
pub struct StatsRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> StatsRepo<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Current assignment count of every user, zero included
    pub async fn assignments(&mut self, order: SortOrder) -> Result<Vec<UserAssignmentStats>> {
        let query = format!(
            r#"
            SELECT u.user_id, u.username, COUNT(r.pull_request_id) AS assignment_count
            FROM users u
            LEFT JOIN pr_reviewers r ON r.user_id = u.user_id
            GROUP BY u.user_id, u.username
            ORDER BY assignment_count {}, u.username ASC
            "#,
            order.as_sql()
        );

        let rows = sqlx::query_as::<_, AssignmentStatsRow>(&query)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Pull request totals by status
    pub async fn pull_requests(&mut self) -> Result<PrStats> {
        let (total, open, merged) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'OPEN' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'MERGED' THEN 1 ELSE 0 END), 0)
            FROM pull_requests
            "#,
        )
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(PrStats {
            total,
            open,
            merged,
        })
    }
}
