//! Integration tests against an in-process mock of the platform API
//!
//! The mock serves search, apply, employer, resume and token endpoints on a
//! random local port and records what it received.

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use autoapply::api::{ApiClient, ApiError, HttpConfig, SearchQuery};
use autoapply::config::{ApiConfig, Config, HumanDuration};
use autoapply::employers::exclude_employers;
use autoapply::ledger::Ledgers;
use autoapply::oauth::{OAuthClient, OAuthError};
use autoapply::pipeline::{RunOptions, Runner};
use autoapply::server::{self, AuthFlow, SUCCESS_MESSAGE};

const TOKEN: &str = "test-token";

/// Requests seen by the mock
#[derive(Default)]
struct Recorded {
    searches: Vec<HashMap<String, String>>,
    applications: Vec<HashMap<String, String>>,
    authorizations: Vec<Option<String>>,
    user_agents: Vec<Option<String>>,
    token_requests: Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Recorded>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn vacancy(id: &str, name: &str, employer: &str, city: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "employer": {"id": employer, "name": format!("Employer {}", employer)},
        "area": {"id": "1", "name": city}
    })
}

async fn search(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    {
        let mut recorded = recorded.lock().unwrap();
        recorded.authorizations.push(header(&headers, "authorization"));
        recorded.user_agents.push(header(&headers, "hh-user-agent"));
        recorded.searches.push(params);
    }

    let items = match page {
        0 => vec![
            vacancy("1", "Backend Developer", "E1", "CityY"),
            vacancy("2", "Backend Intern", "E1", "CityY"),
            vacancy("3", "Backend Developer", "E9", "CityY"),
        ],
        1 => vec![
            vacancy("4", "Backend Developer", "E1", "CityX"),
            vacancy("7", "Senior Backend Engineer", "E2", "CityY"),
            vacancy("8", "Backend Lead", "E3", "CityY"),
        ],
        _ => Vec::new(),
    };

    Json(json!({
        "items": items,
        "found": 6,
        "pages": 2,
        "page": page,
        "per_page": 3
    }))
}

async fn negotiations(
    State(recorded): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let vacancy_id = form.get("vacancy_id").cloned().unwrap_or_default();
    recorded.lock().unwrap().applications.push(form);

    match vacancy_id.as_str() {
        "7" => (
            StatusCode::FORBIDDEN,
            r#"{"errors":[{"type":"negotiations","value":"already_applied"}]}"#.to_string(),
        ),
        "8" => (
            StatusCode::FORBIDDEN,
            r#"{"description":"Letter required","errors":[]}"#.to_string(),
        ),
        _ => (StatusCode::CREATED, String::new()),
    }
}

async fn employer(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "404" => (StatusCode::NOT_FOUND, Json(json!({"errors": [{"type": "not_found"}]}))),
        _ => (StatusCode::OK, Json(json!({"id": id, "name": format!("Employer {}", id)}))),
    }
}

async fn resumes(headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", TOKEN);
    if header(&headers, "authorization").as_deref() != Some(expected.as_str()) {
        return (StatusCode::FORBIDDEN, Json(json!({"errors": [{"type": "oauth"}]})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "items": [{"id": "r1", "title": "Rust developer", "updated_at": "2024-03-15T09:05:00+0300"}]
        })),
    )
}

async fn token(
    State(recorded): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let code = form.get("code").cloned().unwrap_or_default();
    recorded.lock().unwrap().token_requests.push(form);

    if code == "good-code" {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": "new-access",
                "token_type": "bearer",
                "refresh_token": "new-refresh",
                "expires_in": 1209600
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
    }
}

/// Start the mock platform, returning its base URL
async fn start_mock_platform() -> (String, Shared) {
    let recorded = Shared::default();
    let app = Router::new()
        .route("/vacancies", get(search))
        .route("/negotiations", post(negotiations))
        .route("/employers/{id}", get(employer))
        .route("/resumes/mine", get(resumes))
        .route("/oauth/token", post(token))
        .with_state(recorded.clone());

    // Bind to random available port
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", bound_addr), recorded)
}

fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        oauth_base_url: base_url.to_string(),
        ..Default::default()
    }
}

fn run_config(base_url: &str, ledger_dir: &TempDir) -> Config {
    Config {
        keywords: vec!["backend".into()],
        excluded_cities: vec!["CityX".into()],
        excluded_words: vec!["intern".into()],
        per_page: 3,
        area: 1,
        apply_delay: HumanDuration::from_millis(0),
        cover_letter: Some("Hello!".into()),
        ledger_dir: ledger_dir.path().to_path_buf(),
        api: api_config(base_url),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_search_sends_query_and_headers() {
    let (base_url, recorded) = start_mock_platform().await;
    let client = ApiClient::new(&api_config(&base_url), Some(TOKEN)).unwrap();
    let query = SearchQuery {
        text: "rust OR backend".to_string(),
        per_page: 3,
        area: 113,
    };

    let page = client.search_vacancies(&query, 1).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.pages, 2);

    let recorded = recorded.lock().unwrap();
    let params = &recorded.searches[0];
    assert_eq!(params["text"], "rust OR backend");
    assert_eq!(params["per_page"], "3");
    assert_eq!(params["area"], "113");
    assert_eq!(params["page"], "1");
    assert_eq!(recorded.authorizations[0].as_deref(), Some("Bearer test-token"));
    assert!(recorded.user_agents[0].as_deref().unwrap().starts_with("autoapply/"));
}

#[tokio::test]
async fn test_full_run_against_platform() {
    let (base_url, recorded) = start_mock_platform().await;
    let ledger_dir = TempDir::new().unwrap();
    std::fs::write(ledger_dir.path().join("excluded_employers"), "E9\n").unwrap();

    let config = run_config(&base_url, &ledger_dir);
    let client = ApiClient::new(&config.api, Some(TOKEN)).unwrap();
    let mut ledgers = Ledgers::open(&config.ledger_dir).unwrap();

    let report = Runner::new(&client, &config, "resume-1", RunOptions::default())
        .run(&mut ledgers)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.metrics.pages_fetched, 2);
    assert_eq!(report.metrics.postings_seen, 6);
    assert_eq!(report.metrics.applied, 1);
    assert_eq!(report.metrics.already_applied, 1);
    assert_eq!(report.metrics.action_required, 1);
    assert_eq!(report.metrics.skipped_excluded_word, 1);
    assert_eq!(report.metrics.skipped_employer, 1);
    assert_eq!(report.metrics.skipped_city, 1);

    {
        let recorded = recorded.lock().unwrap();
        let submitted: Vec<&str> = recorded
            .applications
            .iter()
            .map(|form| form["vacancy_id"].as_str())
            .collect();
        assert_eq!(submitted, vec!["1", "7", "8"]);
        assert_eq!(recorded.applications[0]["resume_id"], "resume-1");
        assert_eq!(recorded.applications[0]["message"], "Hello!");
    }

    let action_required = std::fs::read_to_string(ledger_dir.path().join("action_required")).unwrap();
    assert!(action_required.contains("| id: 8 |"));
    assert!(action_required.contains("reason: letter_required"));

    // Second run: everything with an outcome is skipped
    let mut ledgers = Ledgers::open(&config.ledger_dir).unwrap();
    let report = Runner::new(&client, &config, "resume-1", RunOptions::default())
        .run(&mut ledgers)
        .await;
    assert_eq!(report.metrics.skipped_duplicate, 3);
    assert_eq!(recorded.lock().unwrap().applications.len(), 3);
}

#[tokio::test]
async fn test_search_failure_aborts_run() {
    // Nothing is listening here
    let ledger_dir = TempDir::new().unwrap();
    let config = run_config("http://127.0.0.1:9", &ledger_dir);
    let client = ApiClient::with_http_config(&config.api.base_url, HttpConfig::default(), Some(TOKEN)).unwrap();
    let mut ledgers = Ledgers::open(&config.ledger_dir).unwrap();

    let report = Runner::new(&client, &config, "resume-1", RunOptions::default())
        .run(&mut ledgers)
        .await;

    assert!(!report.is_complete());
    assert_eq!(report.metrics.pages_fetched, 0);
}

#[tokio::test]
async fn test_employer_lookup_and_exclusion() {
    let (base_url, _recorded) = start_mock_platform().await;
    let client = ApiClient::new(&api_config(&base_url), Some(TOKEN)).unwrap();

    let employer = client.employer("3529").await.unwrap();
    assert_eq!(employer.name, "Employer 3529");

    let err = client.employer("404").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));

    let ledger_dir = TempDir::new().unwrap();
    let mut ledgers = Ledgers::open(ledger_dir.path()).unwrap();
    let urls = vec![
        "https://hh.ru/employer/3529".to_string(),
        "https://hh.ru/employer/404".to_string(),
    ];

    let report = exclude_employers(&client, &urls, "hh.ru", &mut ledgers).await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.lookup_failed, 1);
    assert!(ledgers.is_excluded_employer("3529"));
    assert!(!ledgers.is_excluded_employer("404"));
}

#[tokio::test]
async fn test_my_resumes() {
    let (base_url, _recorded) = start_mock_platform().await;

    let client = ApiClient::new(&api_config(&base_url), Some(TOKEN)).unwrap();
    let resumes = client.my_resumes().await.unwrap();
    assert_eq!(resumes.len(), 1);
    assert_eq!(resumes[0].id, "r1");

    let anonymous = ApiClient::new(&api_config(&base_url), None).unwrap();
    assert!(matches!(
        anonymous.my_resumes().await,
        Err(ApiError::Status { status: 403, .. })
    ));
}

#[tokio::test]
async fn test_token_exchange() {
    let (base_url, recorded) = start_mock_platform().await;
    let oauth = OAuthClient::new(&api_config(&base_url), "cid", "csecret", "http://localhost:5000/").unwrap();

    let token = oauth.exchange_code("good-code").await.unwrap();
    assert_eq!(token.access_token, "new-access");
    assert_eq!(token.refresh_token.as_deref(), Some("new-refresh"));

    let form = recorded.lock().unwrap().token_requests[0].clone();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["client_id"], "cid");
    assert_eq!(form["client_secret"], "csecret");
    assert_eq!(form["redirect_uri"], "http://localhost:5000/");

    assert!(matches!(
        oauth.exchange_code("bad-code").await,
        Err(OAuthError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_callback_completes_flow() {
    let (base_url, _recorded) = start_mock_platform().await;
    let oauth = OAuthClient::new(&api_config(&base_url), "cid", "csecret", "http://localhost:5000/").unwrap();
    let flow = AuthFlow::new(oauth, "state-1".to_string());

    let response = server::router(flow.clone(), "/")
        .oneshot(
            Request::builder()
                .uri("/?code=good-code&state=state-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), SUCCESS_MESSAGE.as_bytes());

    let token = flow.token().unwrap();
    assert_eq!(token.access_token, "new-access");
}

#[tokio::test]
async fn test_listener_stops_after_successful_exchange() {
    let (base_url, _recorded) = start_mock_platform().await;
    let oauth = OAuthClient::new(&api_config(&base_url), "cid", "csecret", "http://localhost:5000/callback").unwrap();
    let flow = AuthFlow::new(oauth, "state-2".to_string());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let callback_addr = listener.local_addr().unwrap();
    let listening = tokio::spawn(async move { server::serve(listener, flow, "/callback").await.unwrap() });

    let client = reqwest::Client::new();
    let denied = client
        .get(format!("http://{}/callback?code=good-code&state=wrong", callback_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 400);

    let accepted = client
        .get(format!("http://{}/callback?code=good-code&state=state-2", callback_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 200);
    assert_eq!(accepted.text().await.unwrap(), SUCCESS_MESSAGE);
    drop(client);

    let token = tokio::time::timeout(std::time::Duration::from_secs(10), listening)
        .await
        .expect("listener did not shut down")
        .unwrap()
        .expect("no token captured");
    assert_eq!(token.access_token, "new-access");
    assert_eq!(token.refresh_token.as_deref(), Some("new-refresh"));
}
