use std::net::SocketAddr;

use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tempfile::TempDir;

use codeprep_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ListingConfig, ServerConfig,
};
use codeprep_server::extractors::api_key::API_KEY_HEADER;
use codeprep_server::state::AppState;
use sea_orm::DatabaseConnection;

/// Key seeded into every test database.
pub const API_KEY: &str = "cp_test_key_for_integration_tests";

/// Page size used by public listings in tests, kept small so pagination is cheap to exercise.
pub const PAGE_SIZE: u64 = 3;

pub mod routes {
    pub const PROBLEMS: &str = "/api/problems";
    pub const CATEGORIES: &str = "/api/categories";
    pub const TAGS: &str = "/api/tags";
    pub const LEVELS: &str = "/api/levels";
    pub const SEARCH: &str = "/api/search";
    pub const HOME: &str = "/api/home";
    pub const ADMIN_STATS: &str = "/api/admin/stats";
    pub const ADMIN_PROBLEMS: &str = "/api/admin/problems";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn problem(slug: &str) -> String {
        format!("/api/problems/{slug}")
    }

    pub fn category(slug_or_id: impl std::fmt::Display) -> String {
        format!("/api/categories/{slug_or_id}")
    }

    pub fn tag(slug_or_id: impl std::fmt::Display) -> String {
        format!("/api/tags/{slug_or_id}")
    }

    pub fn level(level: &str) -> String {
        format!("/api/levels/{level}")
    }
}

/// A running test server backed by its own SQLite file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url,
                // SQLite has a single writer; one connection keeps the
                // detached last_used_at update from racing a transaction.
                max_connections: 1,
                min_connections: 1,
                connect_timeout_secs: 8,
            },
            listing: ListingConfig {
                page_size: PAGE_SIZE,
            },
            auth: AuthConfig {
                bootstrap_api_key: Some(API_KEY.to_string()),
            },
        };

        let db = codeprep_server::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");
        codeprep_server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");
        codeprep_server::seed::ensure_api_key(&db, app_config.auth.bootstrap_api_key.as_deref())
            .await
            .expect("Failed to seed API key");

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };
        let app = codeprep_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn send(&self, req: RequestBuilder) -> TestResponse {
        let res = req.send().await.expect("Failed to send request");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn get_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.send(self.client.get(self.url(path)).header(API_KEY_HEADER, key))
            .await
    }

    pub async fn post_with_key(&self, path: &str, body: &Value, key: &str) -> TestResponse {
        self.send(
            self.client
                .post(self.url(path))
                .header(API_KEY_HEADER, key)
                .json(body),
        )
        .await
    }

    pub async fn post_without_key(&self, path: &str, body: &Value) -> TestResponse {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put_with_key(&self, path: &str, body: &Value, key: &str) -> TestResponse {
        self.send(
            self.client
                .put(self.url(path))
                .header(API_KEY_HEADER, key)
                .json(body),
        )
        .await
    }

    pub async fn put_without_key(&self, path: &str, body: &Value) -> TestResponse {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    pub async fn delete_with_key(&self, path: &str, key: &str) -> TestResponse {
        self.send(self.client.delete(self.url(path)).header(API_KEY_HEADER, key))
            .await
    }

    pub async fn delete_without_key(&self, path: &str) -> TestResponse {
        self.send(self.client.delete(self.url(path))).await
    }

    /// Create a category via the API and return its `id`.
    pub async fn create_category(&self, name: &str, slug: &str) -> i32 {
        let res = self
            .post_with_key(
                routes::CATEGORIES,
                &json!({ "name": name, "slug": slug }),
                API_KEY,
            )
            .await;
        assert_eq!(res.status, 201, "create_category failed: {}", res.text);
        res.id()
    }

    /// Create a tag via the API and return its `id`.
    pub async fn create_tag(&self, name: &str, slug: &str) -> i32 {
        let res = self
            .post_with_key(routes::TAGS, &json!({ "name": name, "slug": slug }), API_KEY)
            .await;
        assert_eq!(res.status, 201, "create_tag failed: {}", res.text);
        res.id()
    }

    /// Create a tutorial via the API from `body` and return the response.
    pub async fn create_tutorial(&self, body: Value) -> TestResponse {
        let res = self.post_with_key(routes::PROBLEMS, &body, API_KEY).await;
        assert_eq!(res.status, 201, "create_tutorial failed: {}", res.text);
        res
    }

    /// Create a published tutorial with the given difficulty and return its `id`.
    pub async fn publish(&self, title: &str, slug: &str, difficulty: &str) -> i32 {
        self.create_tutorial(json!({
            "title": title,
            "slug": slug,
            "difficulty": difficulty,
            "problem_statement": format!("Solve {title}."),
            "status": "published",
        }))
        .await
        .id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The `data.id` of an enveloped response.
    pub fn id(&self) -> i32 {
        self.body["data"]["id"]
            .as_i64()
            .expect("response body should contain 'data.id'") as i32
    }

    /// Slugs of the tutorials in `data`, in response order.
    pub fn slugs(&self) -> Vec<String> {
        slugs_of(&self.body["data"])
    }
}

pub fn slugs_of(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|t| t["slug"].as_str().unwrap_or_default().to_string())
        .collect()
}
