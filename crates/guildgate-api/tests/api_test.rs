//! Router-level tests: requests go through the full middleware stack.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use guildgate_api::{build_router, middleware::ACTOR_PERMISSIONS_HEADER, AppState};
use guildgate_common::{
    config::SamplerConfig, guilds::GuildViewAggregator, permissions::Permissions,
    sampler::RateSampler,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const ROLE_A: &str = "111111111111111111";
const ROLE_B: &str = "222222222222222222";

fn app() -> (Router, RateSampler) {
    let sampler = RateSampler::new(&SamplerConfig::default());
    let state = AppState::new(
        sampler.clone(),
        GuildViewAggregator::default(),
        Duration::from_secs(5),
    );
    (build_router(state), sampler)
}

async fn send(
    router: Router,
    method: &str,
    uri: &str,
    permissions: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(p) = permissions {
        req = req.header(ACTOR_PERMISSIONS_HEADER, p);
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn bits(p: Permissions) -> String {
    p.bits().to_string()
}

fn menu(roles: usize, max_selections: Option<i64>) -> Value {
    let roles: Vec<Value> = (0..roles)
        .map(|i| json!({ "roleId": format!("{}", 300_000_000_000_000_000u64 + i as u64), "label": format!("Role {i}") }))
        .collect();
    let mut draft = json!({
        "title": "Colors",
        "description": "Pick a color",
        "roles": roles,
    });
    if let Some(max) = max_selections {
        draft["maxSelections"] = json!(max);
    }
    draft
}

#[tokio::test]
async fn health_reports_starting_until_sampler_runs() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "starting");
}

#[tokio::test]
async fn authorize_allows_listed_capability() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/modules/reactionRoles/authorize",
        Some(&bits(Permissions::MANAGE_ROLES)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "module": "reactionRoles", "allowed": true }));
}

#[tokio::test]
async fn authorize_denies_with_403() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/modules/reactionRoles/authorize",
        Some(&bits(Permissions::MANAGE_MESSAGES)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "DENIED");
}

#[tokio::test]
async fn administrator_passes_unknown_module() {
    let (router, _) = app();
    let (status, _) = send(
        router,
        "POST",
        "/api/v1/modules/somethingNew/authorize",
        Some(&bits(Permissions::ADMINISTRATOR)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_or_missing_permissions_header_is_bad_request() {
    let (router, _) = app();
    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/modules/moderation/authorize",
        Some("lots"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");

    let (status, _) = send(router, "POST", "/api/v1/modules/moderation/authorize", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn module_listing_includes_every_rule() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/v1/modules", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["key"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(keys, vec!["reactionRoles", "moderation", "administration", "verification"]);
    assert_eq!(
        body[1]["capabilities"],
        json!(["kick_members", "ban_members", "moderate_members"])
    );
}

#[tokio::test]
async fn decode_handles_bits_above_32() {
    let (router, _) = app();
    let perms = Permissions::MODERATE_MEMBERS | Permissions::MANAGE_GUILD;
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/permissions/decode",
        None,
        Some(json!({ "permissions": bits(perms) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["administrator"], false);
    assert_eq!(body["capabilities"], json!(["manage_guild", "moderate_members"]));
    assert_eq!(
        body["modules"],
        json!(["moderation", "administration", "verification"])
    );
    assert_eq!(body["permissions"], bits(perms));
}

#[tokio::test]
async fn guild_listing_merges_and_hides_bot_only_guilds() {
    let (router, _) = app();
    let guild_a = "100000000000000001";
    let guild_b = "100000000000000002";
    let guild_c = "100000000000000003";
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/guilds",
        None,
        Some(json!({
            "botGuilds": [{ "id": guild_a, "present": true }, { "id": guild_c, "present": true }],
            "userGuilds": [
                { "id": guild_a, "name": "Alpha", "icon": "a_1f2e", "owner": true, "permissions": "8" },
                { "id": guild_b, "name": "Beta", "icon": null, "owner": false, "permissions": "0" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "id": guild_a,
                "name": "Alpha",
                "iconUrl": format!("https://cdn.discordapp.com/icons/{guild_a}/a_1f2e.gif"),
                "hasBot": true,
                "manageable": true,
                "owner": true
            },
            {
                "id": guild_b,
                "name": "Beta",
                "iconUrl": "https://cdn.discordapp.com/embed/avatars/0.png",
                "hasBot": false,
                "manageable": false,
                "owner": false
            }
        ])
    );
}

#[tokio::test]
async fn guild_listing_without_user_guilds_is_empty() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/guilds",
        None,
        Some(json!({ "botGuilds": [{ "id": "100000000000000001" }], "userGuilds": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn guild_listing_rejects_non_snowflake_ids() {
    let (router, _) = app();
    let (status, _) = send(
        router,
        "POST",
        "/api/v1/guilds",
        None,
        Some(json!({ "botGuilds": [{ "id": "guild-one" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reaction_role_validation_requires_manage_roles() {
    let (router, _) = app();
    let (status, _) = send(
        router,
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&bits(Permissions::MANAGE_GUILD)),
        Some(menu(2, None)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reaction_role_validation_results() {
    let (router, _) = app();
    let manage_roles = bits(Permissions::MANAGE_ROLES);

    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(menu(25, Some(3))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "isValid": true }));

    let (_, body) = send(
        router.clone(),
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(menu(26, None)),
    )
    .await;
    assert_eq!(body["isValid"], false);
    assert!(body["message"].as_str().unwrap().contains("at most 25 roles"));

    let mut draft = json!({
        "title": "Games",
        "description": "Pick some",
        "roles": [
            { "roleId": ROLE_A, "label": "Chess", "emoji": "<a:party:123456789012345678>" },
            { "roleId": ROLE_B, "label": "Go", "emoji": "💥💥💥💥💥💥💥💥" }
        ]
    });
    let (_, body) = send(
        router.clone(),
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(draft.clone()),
    )
    .await;
    assert_eq!(body["isValid"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Role 2: emoji"));

    draft["roles"][1]["emoji"] = json!("🎲");
    draft["maxSelections"] = json!(-1);
    let (_, body) = send(
        router,
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(draft),
    )
    .await;
    assert_eq!(body["message"], "Max selections cannot be negative");
}

#[tokio::test]
async fn reaction_role_validation_reports_mistyped_fields_as_results() {
    let (router, _) = app();
    let manage_roles = bits(Permissions::MANAGE_ROLES);

    let mut draft = menu(3, None);
    draft["maxSelections"] = json!(2.5);
    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(draft),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], false);
    assert_eq!(body["message"], "Max selections must be a whole number (got 2.5)");

    let mut draft = menu(3, None);
    draft["title"] = json!(42);
    let (status, body) = send(
        router.clone(),
        "POST",
        "/api/v1/reaction-roles/validate",
        Some(&manage_roles),
        Some(draft),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], false);
    assert!(body["message"].as_str().unwrap().contains("wrong type"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/reaction-roles/validate")
        .header(ACTOR_PERMISSIONS_HEADER, &manage_roles)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn liveness_reports_sentinel_before_any_tick() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/v1/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 20.0);
    assert_eq!(body["band"], "good");
    assert_eq!(body["samples"], 0);
    assert_eq!(body["latest"], Value::Null);
}

#[tokio::test]
async fn liveness_window_reflects_recorded_ticks() {
    let (router, sampler) = app();
    let mut now = tokio::time::Instant::now();
    for _ in 0..10 {
        // Every tick twice as late as it should be
        now += Duration::from_millis(100);
        sampler.record_tick_at(now);
    }

    let (status, body) = send(router.clone(), "GET", "/api/v1/liveness?seconds=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 10.0);
    assert_eq!(body["band"], "poor");
    assert_eq!(body["samples"], 10);

    let (status, body) = send(router, "GET", "/api/v1/liveness?seconds=0", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Validation failed: seconds must be 1-3600");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let (router, _) = app();
    let response = router
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
