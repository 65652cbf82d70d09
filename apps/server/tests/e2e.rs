use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use papaya_config::AppConfig;
use papaya_gateway::{build_router, AppState};
use papaya_runtime::BackendServices;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    services: BackendServices,
    _db_dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("papaya-e2e.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.to_string_lossy());
        config.database.max_connections = 5;
        config.auth.jwt_secret = "e2e-secret".to_string();

        let services = BackendServices::initialise(&config)
            .await
            .expect("initialise backend services");

        let state = AppState::new(services.authenticator.clone(), services.notes.clone());
        let router = build_router(state);

        Self {
            router,
            services,
            _db_dir: db_dir,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match body {
            Some(json_body) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json_body).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("dispatch request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect response body")
            .to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse { status, text, json }
    }

    async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/register",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.json["token"]
            .as_str()
            .expect("register returns a token")
            .to_string()
    }
}

struct TestResponse {
    status: StatusCode,
    text: String,
    json: Value,
}

#[tokio::test]
async fn index_serves_greeting_page() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("<title>Papaya Server</title>"));
    assert!(response.text.contains("Hello World"));
}

#[tokio::test]
async fn owner_shares_note_and_recipient_sees_it_read_only() {
    let app = TestApp::new().await;

    app.register("alice@x.com", "pw1").await;
    app.register("bob@x.com", "pw2").await;

    let login = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "email": "alice@x.com", "password": "pw1" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.text);
    let alice = login.json["token"].as_str().expect("login token").to_string();

    let created = app
        .request(
            Method::POST,
            "/notes",
            Some(json!({ "title": "hi", "content": "there" })),
            Some(&alice),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.text);
    assert_eq!(created.json["starred"], json!(false));
    let note_id = created.json["id"].as_i64().expect("note id");

    let starred = app
        .request(Method::PUT, &format!("/notes/{note_id}/star"), None, Some(&alice))
        .await;
    assert_eq!(starred.status, StatusCode::OK, "{}", starred.text);
    assert_eq!(starred.json["starred"], json!(true));

    let shared = app
        .request(
            Method::POST,
            &format!("/notes/{note_id}/share"),
            Some(json!({ "email": "bob@x.com" })),
            Some(&alice),
        )
        .await;
    assert_eq!(shared.status, StatusCode::OK, "{}", shared.text);
    assert_eq!(shared.json["sharedNote"]["noteId"], json!(note_id));

    let bob_login = app
        .request(
            Method::POST,
            "/login",
            Some(json!({ "email": "bob@x.com", "password": "pw2" })),
            None,
        )
        .await;
    let bob = bob_login.json["token"].as_str().expect("bob token").to_string();

    let listed = app.request(Method::GET, "/notes", None, Some(&bob)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let titles: Vec<&str> = listed
        .json
        .as_array()
        .expect("note list")
        .iter()
        .filter_map(|note| note["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["hi"]);

    let fetched = app
        .request(Method::GET, &format!("/notes/{note_id}"), None, Some(&bob))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json["content"], json!("there"));

    let edit = app
        .request(
            Method::PUT,
            &format!("/notes/{note_id}"),
            Some(json!({ "title": "mine now", "content": "" })),
            Some(&bob),
        )
        .await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let delete = app
        .request(Method::DELETE, &format!("/notes/{note_id}"), None, Some(&bob))
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let unchanged = app
        .request(Method::GET, &format!("/notes/{note_id}"), None, Some(&alice))
        .await;
    assert_eq!(unchanged.json["title"], json!("hi"));

    app.services.shutdown().await;
}

#[tokio::test]
async fn deleting_shared_note_removes_it_for_recipient() {
    let app = TestApp::new().await;

    let alice = app.register("alice@x.com", "pw1").await;
    let bob = app.register("bob@x.com", "pw2").await;

    let created = app
        .request(
            Method::POST,
            "/notes",
            Some(json!({ "title": "temp", "content": "" })),
            Some(&alice),
        )
        .await;
    let note_id = created.json["id"].as_i64().expect("note id");

    app.request(
        Method::POST,
        &format!("/notes/{note_id}/share"),
        Some(json!({ "email": "bob@x.com" })),
        Some(&alice),
    )
    .await;

    let deleted = app
        .request(Method::DELETE, &format!("/notes/{note_id}"), None, Some(&alice))
        .await;
    assert_eq!(deleted.status, StatusCode::OK, "{}", deleted.text);

    let listed = app.request(Method::GET, "/notes", None, Some(&bob)).await;
    assert_eq!(listed.json, json!([]));

    let fetched = app
        .request(Method::GET, &format!("/notes/{note_id}"), None, Some(&bob))
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}
