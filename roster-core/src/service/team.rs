//! Team roster management

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Entity, Error, Result};
use crate::model::{Team, TeamMember, User};
use crate::store::Store;

#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn Store>,
}

impl TeamService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a team and upsert its members into it
    ///
    /// Users that already exist are moved into the new team with the
    /// submitted name and active flag.
    pub async fn add(&self, team_name: &str, members: Vec<TeamMember>) -> Result<Team> {
        let mut seen = HashSet::new();
        if let Some(dup) = members.iter().find(|m| !seen.insert(m.user_id.as_str())) {
            return Err(Error::InvalidInput(format!(
                "user '{}' listed more than once",
                dup.user_id
            )));
        }

        let mut uow = self.store.begin().await?;
        uow.create_team(team_name).await?;

        for member in &members {
            let user = User::new(&member.user_id, &member.username, team_name)
                .with_active(member.is_active);
            uow.upsert_user(&user).await?;
        }

        uow.commit().await?;
        tracing::info!(team = %team_name, members = members.len(), "Team created");

        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    /// Get a team with all of its members
    pub async fn get(&self, team_name: &str) -> Result<Team> {
        let mut uow = self.store.begin().await?;

        if !uow.team_exists(team_name).await? {
            return Err(Error::not_found(Entity::Team, team_name));
        }
        let members = uow.team_members(team_name).await?;
        uow.commit().await?;

        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn member(id: &str, active: bool) -> TeamMember {
        TeamMember {
            user_id: id.to_string(),
            username: id.to_uppercase(),
            is_active: active,
        }
    }

    #[tokio::test]
    async fn test_add_and_get_team() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));

        let team = service
            .add("backend", vec![member("u2", true), member("u1", false)])
            .await
            .unwrap();
        assert_eq!(team.members.len(), 2);

        let fetched = service.get("backend").await.unwrap();
        assert_eq!(fetched.team_name, "backend");
        assert_eq!(fetched.members, vec![member("u1", false), member("u2", true)]);
    }

    #[tokio::test]
    async fn test_duplicate_team_keeps_membership() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        service
            .add("backend", vec![member("u1", true)])
            .await
            .unwrap();

        let err = service
            .add("backend", vec![member("u1", false), member("u9", true)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AlreadyExists {
                entity: Entity::Team,
                ..
            }
        ));

        let team = service.get("backend").await.unwrap();
        assert_eq!(team.members, vec![member("u1", true)]);
    }

    #[tokio::test]
    async fn test_member_moves_between_teams() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        service.add("backend", vec![member("u1", true)]).await.unwrap();
        service.add("frontend", vec![member("u1", true)]).await.unwrap();

        assert!(service.get("backend").await.unwrap().members.is_empty());
        assert_eq!(service.get("frontend").await.unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_member_rejected() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));

        let err = service
            .add("backend", vec![member("u1", true), member("u1", false)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(matches!(
            service.get("backend").await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }
}
