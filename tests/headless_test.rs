//! End-to-end tests for the headless host: JSON-line host events in, bridge
//! outcomes and backend calls out.

use serde_json::json;
use tokio::io::BufReader;
use webshell::chrome::{StatusBarStyle, Theme};
use webshell::headless::{self, SurfaceNavigations};
use webshell::{Config, PermissionState, RegistrationOutcome, RouteOutcome, Shell};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> Config {
    Config {
        start_url: "https://eodiro.com".to_string(),
        device_id: Some("host-id".to_string()),
        push_token: Some("ExponentPushToken[xyz]".to_string()),
        permission: PermissionState::Granted,
        ..Config::default()
    }
}

fn auth_message(api_host: &str) -> String {
    json!({
        "type": "message",
        "data": json!({
            "key": "auth",
            "authProps": {"isSigned": true, "tokens": {"accessToken": "abc"}},
            "apiHost": api_host
        })
        .to_string()
    })
    .to_string()
}

struct Host {
    shell: Shell,
    navigations: Option<SurfaceNavigations>,
}

async fn launched(config: Config) -> Host {
    let (collaborators, navigations) = headless::collaborators(&config).unwrap();
    let mut shell = Shell::new(config, collaborators, Theme::Light);
    shell.launch().await.unwrap();
    Host {
        shell,
        navigations: Some(navigations),
    }
}

async fn run_lines(host: &mut Host, lines: &[String]) -> Vec<RouteOutcome> {
    let input = lines.join("\n");
    let navigations = host.navigations.take().unwrap();
    headless::run(
        &mut host.shell,
        BufReader::new(input.as_bytes()),
        navigations,
        |_| {},
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn auth_at_root_registers_with_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"err": null})))
        .expect(1)
        .mount(&server)
        .await;
    let mut host = launched(config()).await;

    let outcomes = run_lines(&mut host, &[auth_message(&server.uri())]).await;

    assert_eq!(
        outcomes,
        vec![RouteOutcome::Registration(RegistrationOutcome::Registered)]
    );
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "action": "addDevice",
            "data": {"deviceId": "host-id", "pushToken": "ExponentPushToken[xyz]", "accessToken": "abc"}
        })
    );
}

#[tokio::test]
async fn auth_after_navigating_away_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"err": null})))
        .expect(0)
        .mount(&server)
        .await;
    let mut host = launched(config()).await;

    let outcomes = run_lines(
        &mut host,
        &[
            json!({"type": "navigated", "url": "https://eodiro.com/profile"}).to_string(),
            auth_message(&server.uri()),
        ],
    )
    .await;

    assert_eq!(outcomes, vec![RouteOutcome::OffRoot]);
    assert_eq!(host.shell.location().url(), "https://eodiro.com/profile");
}

#[tokio::test]
async fn garbage_and_unknown_messages_are_harmless() {
    let mut host = launched(config()).await;

    let mut outcomes = run_lines(
        &mut host,
        &[
            "this is not an event".to_string(),
            json!({"type": "message", "data": "{not json"}).to_string(),
            json!({"type": "message", "data": "{\"key\":\"ping\"}"}).to_string(),
            json!({"type": "message", "data": "{\"key\":\"goBack\"}"}).to_string(),
        ],
    )
    .await;
    outcomes.sort_by_key(|outcome| format!("{outcome:?}"));

    assert_eq!(
        outcomes,
        vec![
            RouteOutcome::Dropped,
            RouteOutcome::Unknown("ping".to_string()),
            RouteOutcome::WentBack,
        ]
    );
}

#[tokio::test]
async fn denied_permission_skips_token() {
    let mut host = launched(Config {
        permission: PermissionState::Denied,
        grant_on_request: false,
        ..config()
    })
    .await;
    assert!(!host.shell.notifications_usable());

    let outcomes = run_lines(&mut host, &[auth_message("http://127.0.0.1:9")]).await;

    assert_eq!(
        outcomes,
        vec![RouteOutcome::Registration(RegistrationOutcome::SkippedNoToken)]
    );
}

#[tokio::test]
async fn theme_and_keyboard_events_update_chrome() {
    let mut host = launched(config()).await;

    run_lines(
        &mut host,
        &[
            json!({"type": "theme", "dark": true}).to_string(),
            json!({"type": "keyboard", "visible": true}).to_string(),
            json!({"type": "nav_scrolled", "scrolled": true}).to_string(),
            json!({"type": "keyboard", "visible": false}).to_string(),
        ],
    )
    .await;

    assert_eq!(host.shell.chrome().current_style(), StatusBarStyle::LightContent);
    assert_eq!(host.shell.chrome().spacer_color(), "#1f1f1f");
    assert!(host.shell.settle_deadline().is_none());
}

#[tokio::test]
async fn go_back_returns_location_to_previous_page() {
    let mut host = launched(config()).await;

    let outcomes = run_lines(
        &mut host,
        &[
            json!({"type": "navigated", "url": "https://eodiro.com/profile"}).to_string(),
            json!({"type": "message", "data": "{\"key\":\"goBack\"}"}).to_string(),
        ],
    )
    .await;

    assert_eq!(outcomes, vec![RouteOutcome::WentBack]);
    assert_eq!(host.shell.location().url(), "https://eodiro.com");
    assert!(host.shell.location().is_root());
}
