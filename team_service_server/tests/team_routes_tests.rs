use serde_json::{json, Value};

use sea_orm::prelude::Uuid;
use team_service_entities::domain::team::{TeamPage, TeamWithRoster};
use team_service_entities::domain::{MemberRole, SkillLevel, TeamStatus};

mod common;
use common::Fixture;


fn tournament(n: u128) -> String {
    Uuid::from_u128(n).to_string()
}

fn profile(n: u128) -> String {
    Uuid::from_u128(n).to_string()
}

async fn create_team(fixture: &mut Fixture, name: &str, tournament_id: u128, captain_id: u128) -> TeamWithRoster {
    let mut response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": name,
                "tournament_id": tournament(tournament_id),
                "captain_id": profile(captain_id),
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    response.json().await
}

#[tokio::test]
async fn test_create_team_returns_team_with_captain() {
    let mut fixture = Fixture::new().await;

    let mut response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "Falcons",
                "tournament_id": tournament(1),
                "captain_id": profile(100),
                "captain_position": "setter",
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let team: TeamWithRoster = response.json().await;
    assert_eq!(team.team.name, "Falcons");
    assert_eq!(team.team.status, TeamStatus::Registered);
    assert_eq!(team.team.skill_level, SkillLevel::Amateur);
    assert_eq!(team.members.len(), 1);
    assert_eq!(team.members[0].role, MemberRole::Captain);
    assert_eq!(team.members[0].user_id, Uuid::from_u128(100));
    assert_eq!(team.tournament.as_ref().unwrap().name, "Spring Open");
}

#[tokio::test]
async fn test_create_team_rejects_unknown_references() {
    let mut fixture = Fixture::new().await;

    let response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "Falcons",
                "tournament_id": tournament(1),
                "captain_id": profile(999),
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "Falcons",
                "tournament_id": tournament(999),
                "captain_id": profile(100),
            }),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_create_team_reports_field_errors() {
    let mut fixture = Fixture::new().await;

    let mut response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "x",
                "tournament_id": tournament(1),
                "captain_id": profile(100),
                "contact_email": "not-an-email",
                "contact_phone": "123456789012345678901",
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_team_rejects_unknown_skill_level() {
    let mut fixture = Fixture::new().await;

    let mut response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "Falcons",
                "tournament_id": tournament(1),
                "captain_id": profile(100),
                "skill_level": "galactic",
            }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await;
    assert!(body["message"].as_str().unwrap().contains("Invalid skill level"));
}

#[tokio::test]
async fn test_create_team_rejects_duplicate_name_within_tournament() {
    let mut fixture = Fixture::new().await;

    create_team(&mut fixture, "Falcons", 1, 100).await;

    let response = fixture
        .post_json(
            "/api/teams",
            json!({
                "name": "Falcons",
                "tournament_id": tournament(1),
                "captain_id": profile(101),
            }),
        )
        .await;
    assert_eq!(response.status(), 409);

    // Same name in another tournament is allowed.
    create_team(&mut fixture, "Falcons", 2, 101).await;
}

#[tokio::test]
async fn test_get_team() {
    let mut fixture = Fixture::new().await;
    let created = create_team(&mut fixture, "Falcons", 1, 100).await;

    let mut response = fixture.get(&format!("/api/teams/{}", created.team.uuid)).await;
    assert_eq!(response.status(), 200);
    let team: TeamWithRoster = response.json().await;
    assert_eq!(team.team.uuid, created.team.uuid);
    assert_eq!(team.member_count, 1);

    let response = fixture.get(&format!("/api/teams/{}", Uuid::from_u128(31337))).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_team() {
    let mut fixture = Fixture::new().await;
    let created = create_team(&mut fixture, "Falcons", 1, 100).await;

    let mut response = fixture
        .patch_json(
            &format!("/api/teams/{}", created.team.uuid),
            json!({"name": "Fire Falcons", "status": "confirmed"}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let team: TeamWithRoster = response.json().await;
    assert_eq!(team.team.name, "Fire Falcons");
    assert_eq!(team.team.status, TeamStatus::Confirmed);

    // An empty patch succeeds and leaves the fields alone.
    let mut response = fixture
        .patch_json(&format!("/api/teams/{}", created.team.uuid), json!({}))
        .await;
    assert_eq!(response.status(), 200);
    let team: TeamWithRoster = response.json().await;
    assert_eq!(team.team.name, "Fire Falcons");

    let response = fixture
        .patch_json(&format!("/api/teams/{}", created.team.uuid), json!({"status": "sleeping"}))
        .await;
    assert_eq!(response.status(), 400);

    let response = fixture
        .patch_json(&format!("/api/teams/{}", Uuid::from_u128(31337)), json!({"name": "Ghosts"}))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_team_rejects_rename_collision() {
    let mut fixture = Fixture::new().await;
    create_team(&mut fixture, "Falcons", 1, 100).await;
    let hawks = create_team(&mut fixture, "Hawks", 1, 101).await;

    let response = fixture
        .patch_json(&format!("/api/teams/{}", hawks.team.uuid), json!({"name": "Falcons"}))
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_delete_team() {
    let mut fixture = Fixture::new().await;
    let created = create_team(&mut fixture, "Falcons", 1, 100).await;

    let response = fixture.delete(&format!("/api/teams/{}", created.team.uuid)).await;
    assert_eq!(response.status(), 200);

    let response = fixture.get(&format!("/api/teams/{}", created.team.uuid)).await;
    assert_eq!(response.status(), 404);

    // The roster went with the team.
    let mut response = fixture.get(&format!("/api/teams/{}/members", created.team.uuid)).await;
    assert_eq!(response.status(), 200);
    let members: Vec<Value> = response.json().await;
    assert!(members.is_empty());

    let response = fixture.delete(&format!("/api/teams/{}", created.team.uuid)).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_list_teams_with_filters() {
    let mut fixture = Fixture::new().await;
    create_team(&mut fixture, "Falcons", 1, 100).await;
    create_team(&mut fixture, "Hawks", 1, 101).await;
    create_team(&mut fixture, "Night Owls", 2, 102).await;

    let mut response = fixture.get("/api/teams").await;
    assert_eq!(response.status(), 200);
    let page: TeamPage = response.json().await;
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);

    let mut response = fixture.get("/api/teams?name=fAlC").await;
    let page: TeamPage = response.json().await;
    assert_eq!(page.total, 1);
    assert_eq!(page.teams[0].team.name, "Falcons");

    let mut response = fixture.get(&format!("/api/teams?tournament_id={}", tournament(1))).await;
    let page: TeamPage = response.json().await;
    assert_eq!(page.total, 2);

    // Zero results still echo the paging info.
    let mut response = fixture.get("/api/teams?status=withdrawn").await;
    let page: TeamPage = response.json().await;
    assert_eq!(page.total, 0);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);

    let response = fixture.get("/api/teams?status=sleeping").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_list_teams_clamps_pagination() {
    let mut fixture = Fixture::new().await;
    create_team(&mut fixture, "Falcons", 1, 100).await;

    let mut response = fixture.get("/api/teams?limit=200&page=0").await;
    assert_eq!(response.status(), 200);
    let page: TeamPage = response.json().await;
    assert_eq!(page.limit, 50);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn test_get_teams_by_tournament_in_registration_order() {
    let mut fixture = Fixture::new().await;
    create_team(&mut fixture, "Falcons", 1, 100).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_team(&mut fixture, "Hawks", 1, 101).await;
    create_team(&mut fixture, "Night Owls", 2, 102).await;

    let mut response = fixture.get(&format!("/api/teams/tournament/{}", tournament(1))).await;
    assert_eq!(response.status(), 200);
    let teams: Vec<TeamWithRoster> = response.json().await;
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].team.name, "Falcons");
    assert_eq!(teams[1].team.name, "Hawks");
}

#[tokio::test]
async fn test_delete_teams_by_tournament() {
    let mut fixture = Fixture::new().await;
    create_team(&mut fixture, "Falcons", 1, 100).await;
    create_team(&mut fixture, "Hawks", 1, 101).await;
    create_team(&mut fixture, "Night Owls", 2, 102).await;

    let mut response = fixture.delete(&format!("/api/teams/tournament/{}", tournament(1))).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["deleted_teams"], 2);

    let mut response = fixture.get(&format!("/api/teams/tournament/{}", tournament(1))).await;
    let teams: Vec<TeamWithRoster> = response.json().await;
    assert!(teams.is_empty());

    // The other tournament is untouched.
    let mut response = fixture.get(&format!("/api/teams/tournament/{}", tournament(2))).await;
    let teams: Vec<TeamWithRoster> = response.json().await;
    assert_eq!(teams.len(), 1);
}

#[tokio::test]
async fn test_delete_teams_by_tournament_preconditions() {
    let mut fixture = Fixture::new().await;

    let response = fixture.delete(&format!("/api/teams/tournament/{}", tournament(999))).await;
    assert_eq!(response.status(), 404);

    // Existing tournament, but no teams registered.
    let response = fixture.delete(&format!("/api/teams/tournament/{}", tournament(1))).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_set_team_captain() {
    let mut fixture = Fixture::new().await;
    let created = create_team(&mut fixture, "Falcons", 1, 100).await;

    let mut response = fixture
        .patch_json(
            &format!("/api/teams/{}/captain", created.team.uuid),
            json!({"user_id": profile(101)}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let team: TeamWithRoster = response.json().await;
    assert_eq!(team.team.captain_id, Uuid::from_u128(101));
    // The roster itself is not changed by a captain reassignment.
    assert_eq!(team.members.len(), 1);
    assert_eq!(team.members[0].user_id, Uuid::from_u128(100));

    let response = fixture
        .patch_json(
            &format!("/api/teams/{}/captain", created.team.uuid),
            json!({"user_id": profile(999)}),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_health_route() {
    let mut fixture = Fixture::new().await;
    let mut response = fixture.get("/health").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "ok");
}
