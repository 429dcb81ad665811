use chrono::{Duration as ChronoDuration, Utc};
use gatekeeper_api::config::GatekeeperConfig;
use gatekeeper_auth::{Claims, Permission, Role};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, header};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = gatekeeper_api::app::build_app(&GatekeeperConfig::new(JWT_SECRET))
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url,
            client,
            handle,
        }
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = cookie {
            req = req.header(header::COOKIE, format!("Authentication={token}"));
        }
        req.send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: Role, permissions: &[Permission], expires_in: ChronoDuration) -> String {
    let claims = Claims::new("17", role)
        .with_permissions(permissions.iter().cloned())
        .with_expiry(Utc::now() + expires_in);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("missing Location")
        .to_str()
        .unwrap()
}

fn clears_cookie(res: &reqwest::Response) -> bool {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("Authentication=;") && v.contains("Max-Age=0"))
}

#[tokio::test]
async fn health_is_not_gated() {
    let srv = TestServer::spawn().await;
    let res = srv.get("/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_credential_redirects_to_login() {
    let srv = TestServer::spawn().await;
    let res = srv.get("/students", None).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");
    assert!(!clears_cookie(&res));
}

#[tokio::test]
async fn public_route_clears_cookie_for_admin() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(Role::ADMIN, &[], ChronoDuration::minutes(10));
    let res = srv.get("/auth/login", Some(&token)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(clears_cookie(&res));
}

#[tokio::test]
async fn missing_capability_redirects_to_not_found() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(Role::TA, &[Permission::CREATE_STUDENT], ChronoDuration::minutes(10));

    let res = srv.get("/payments", Some(&token)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/not-found");
    assert!(!clears_cookie(&res));

    let res = srv.get("/not-found", Some(&token)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn held_capability_reaches_page() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(Role::TA, &[Permission::CREATE_STUDENT], ChronoDuration::minutes(10));
    let res = srv.get("/students/42", Some(&token)).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/students/42");
    assert_eq!(body["subject"], "17");
}

#[tokio::test]
async fn empty_requirement_allows_any_authenticated() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(Role::TA, &[], ChronoDuration::minutes(10));
    let res = srv.get("/assistant", Some(&token)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_and_expired_credentials_are_cleared() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/classes", Some("not-a-jwt")).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");
    assert!(clears_cookie(&res));

    let expired = mint_jwt(Role::ADMIN, &[], ChronoDuration::seconds(-5));
    let res = srv.get("/classes", Some(&expired)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");
    assert!(clears_cookie(&res));
}

#[tokio::test]
async fn bearer_header_is_accepted_and_principal_exposed() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(Role::TA, &[Permission::CREATE_CLASS], ChronoDuration::minutes(10));

    let res = srv
        .client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["subject"], "17");
    assert_eq!(body["role"], "TA");
    assert!(
        body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "CREATE_CLASS")
    );
}

#[tokio::test]
async fn excluded_assets_bypass_the_gate() {
    let srv = TestServer::spawn().await;

    for path in ["/_next/static/chunk.js", "/images/logo.png", "/favicon.ico"] {
        let res = srv.get(path, None).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn unmatched_route_allows_authenticated_only() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/dashboard", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);

    let token = mint_jwt(Role::GUEST, &[], ChronoDuration::minutes(10));
    let res = srv.get("/dashboard", Some(&token)).await;
    assert_eq!(res.status(), StatusCode::OK);
}
