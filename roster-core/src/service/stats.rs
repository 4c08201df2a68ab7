//! Read-only assignment and pull request statistics

use std::sync::Arc;

use crate::model::{SortOrder, Statistics};
use crate::store::Store;
use crate::Result;

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Per-user assignment counts and pull request totals
    pub async fn statistics(&self, order: SortOrder) -> Result<Statistics> {
        let mut uow = self.store.begin().await?;
        let users = uow.assignment_stats(order).await?;
        let pull_requests = uow.pr_stats().await?;
        uow.commit().await?;

        Ok(Statistics {
            users,
            pull_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TeamMember;
    use crate::selection::LeastLoadedSelection;
    use crate::service::Services;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_statistics_counts_and_order() {
        let services = Services::new(Arc::new(MemoryStore::new()), Arc::new(LeastLoadedSelection));
        let members = [("a", "Ann"), ("r1", "Rob"), ("r2", "Rae")]
            .iter()
            .map(|(id, name)| TeamMember {
                user_id: id.to_string(),
                username: name.to_string(),
                is_active: true,
            })
            .collect();
        services.teams.add("backend", members).await.unwrap();

        // least loaded: r1, r2, r1
        for id in ["pr-1", "pr-2", "pr-3"] {
            services.pull_requests.create(id, "Change", "a").await.unwrap();
        }
        services.pull_requests.merge("pr-1").await.unwrap();

        let stats = services.stats.statistics(SortOrder::Desc).await.unwrap();
        let counts: Vec<(&str, i64)> = stats
            .users
            .iter()
            .map(|u| (u.user_id.as_str(), u.assignment_count))
            .collect();
        assert_eq!(counts, vec![("r1", 2), ("r2", 1), ("a", 0)]);
        assert_eq!(stats.pull_requests.total, 3);
        assert_eq!(stats.pull_requests.open, 2);
        assert_eq!(stats.pull_requests.merged, 1);

        let asc = services.stats.statistics(SortOrder::Asc).await.unwrap();
        assert_eq!(asc.users[0].user_id, "a");
    }
}
