//! Route table and handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use roster_core::model::{Reassignment, SortOrder, Statistics, Team, UserReviews};

use crate::dto::{
    AddTeamRequest, CreatePullRequest, Health, MergePullRequest, PullRequestEnvelope,
    ReassignRequest, SetActiveRequest, StatsQuery, TeamEnvelope, TeamQuery, UserEnvelope,
    UserQuery,
};
use crate::error::ApiErr;
use crate::AppState;

/// Build the API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
        .route("/stats", get(statistics))
}

/// GET /health
async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// POST /team/add - create a team and upsert its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<AddTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let team = state
        .services
        .teams
        .add(&request.team_name, request.members)
        .await?;
    Ok((StatusCode::CREATED, Json(TeamEnvelope { team })))
}

/// GET /team/get?team_name=X
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(query) = query?;
    Ok(Json(state.services.teams.get(&query.team_name).await?))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .services
        .users
        .set_active(&request.user_id, request.is_active)
        .await?;
    Ok(Json(UserEnvelope { user }))
}

/// GET /users/getReview?user_id=X - pull requests the user reviews.
async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviews>, ApiErr> {
    let Query(query) = query?;
    Ok(Json(state.services.users.reviews(&query.user_id).await?))
}

/// POST /pullRequest/create - create a PR and assign its first reviewer.
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestEnvelope>), ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let pr = state
        .services
        .pull_requests
        .create(
            &request.pull_request_id,
            &request.pull_request_name,
            &request.author_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PullRequestEnvelope { pr })))
}

/// POST /pullRequest/merge - idempotent.
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequest>, JsonRejection>,
) -> Result<Json<PullRequestEnvelope>, ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let pr = state
        .services
        .pull_requests
        .merge(&request.pull_request_id)
        .await?;
    Ok(Json(PullRequestEnvelope { pr }))
}

/// POST /pullRequest/reassign
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let Json(request) = payload?;
    request.validate()?;

    let outcome = state
        .services
        .pull_requests
        .reassign(&request.pull_request_id, &request.old_reviewer_id)
        .await?;
    Ok(Json(outcome))
}

/// GET /stats?sort=asc|desc
async fn statistics(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Statistics>, ApiErr> {
    let Query(query) = query?;
    let order = match query.sort.as_deref() {
        Some(sort) => sort.parse::<SortOrder>()?,
        None => SortOrder::default(),
    };

    Ok(Json(state.services.stats.statistics(order).await?))
}
