//! End-to-end exercise of the page session: auth check against a mock SSO,
//! navbar/footer assembly against mock fragment endpoints, version fill-in
//! from the mock status endpoint.

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pagekit::{
    auth::AuthOutcome,
    config::Config,
    element::{create_element, ElementConfig},
    page::{FOOTER_PLACEHOLDER, NAVBAR_PLACEHOLDER},
    session::MemoryStore,
    state::Session,
};

const NAVBAR_FRAGMENT: &str = r#"<nav class="navbar"><div id="navbar_menu" class="navbar-menu"><a href="/">Home</a></div></nav>"#;
const FOOTER_FRAGMENT: &str = concat!(
    r#"<p id="footer_frontend_p">Frontend v{0}</p>"#,
    r#"<p id="footer_backend_p">API v{0}</p>"#
);

async fn spawn(app: Router) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}")
}

async fn spawn_site() -> String {
    let app = Router::new()
        .route("/sup/navbar", get(|| async { NAVBAR_FRAGMENT }))
        .route("/sup/footer", get(|| async { FOOTER_FRAGMENT }))
        .route(
            "/api/srv/get/",
            get(|| async {
                Json(json!({
                    "db_size": "12 MB",
                    "frontend_version": "1.2.3",
                    "api_version": "4.5.6",
                }))
            }),
        );

    spawn(app).await
}

async fn spawn_sso(authenticated: bool) -> String {
    let app = Router::new().route(
        "/api/user/get/",
        get(move || async move {
            if authenticated {
                (
                    StatusCode::OK,
                    Json(json!({
                        "token": "tok123",
                        "name": "sky",
                        "email": "sky@example.com",
                        "super_admin": false,
                    })),
                )
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({})))
            }
        }),
    );

    spawn(app).await
}

fn config(sso_url: String, site_url: String) -> Config {
    Config {
        sso_url,
        site_url,
        popup_timeout_ms: 10_000,
    }
}

async fn seed_placeholders(session: &Session) {
    let navbar_slot = create_element(
        "script",
        ElementConfig {
            id: Some(NAVBAR_PLACEHOLDER.to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let footer_slot = create_element(
        "div",
        ElementConfig {
            id: Some(FOOTER_PLACEHOLDER.to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let mut document = session.document.lock().await;
    document.append(navbar_slot);
    document.append(footer_slot);
}

#[tokio::test]
async fn test_startup_glue_caches_auth() {
    let sso_url = spawn_sso(true).await;
    let site_url = spawn_site().await;

    let session = Session::new(
        config(sso_url, site_url),
        Arc::new(MemoryStore::new()),
        "http://frontend/page",
    )
    .await;

    assert_eq!(session.cache.auth_token(), Some("Bearer tok123".to_string()));
    assert!(session.cache.auth_blob().is_some());
    assert_eq!(session.cache.user_details().unwrap().name, "sky");

    // a second check is served from the cache even if the SSO disappears
    let outcome = session.auth.get_user_details(true, true).await;
    assert!(matches!(outcome, AuthOutcome::Authenticated(d) if d.token == "tok123"));
}

#[tokio::test]
async fn test_unauthenticated_redirects_to_login() {
    let sso_url = spawn_sso(false).await;
    let site_url = spawn_site().await;

    let session = Session::new(
        config(sso_url.clone(), site_url),
        Arc::new(MemoryStore::new()),
        "http://frontend/page",
    )
    .await;

    // startup glue saw a 401, so nothing was cached
    assert!(session.cache.auth_token().is_none());

    match session.auth.get_user_details(true, false).await {
        AuthOutcome::LoginRedirect(url) => {
            assert!(url.starts_with(&format!("{sso_url}/login?r=")));
            assert!(url.contains("frontend"));
        }
        other => panic!("expected LoginRedirect, got {other:?}"),
    }

    // without redirecting, a 401 is the plain failure sentinel
    let outcome = session.auth.get_user_details(false, false).await;
    assert_eq!(outcome, AuthOutcome::Failed);
    assert!(session.auth.get_auth_token(false, false).await.is_none());
}

#[tokio::test]
async fn test_page_assembly_fills_versions() {
    let sso_url = spawn_sso(true).await;
    let site_url = spawn_site().await;

    let session = Session::new(
        config(sso_url, site_url),
        Arc::new(MemoryStore::new()),
        "http://frontend/page",
    )
    .await;
    seed_placeholders(&session).await;

    session.page.install_navbar().await.unwrap();
    session.page.install_footer().await.unwrap();

    let document = session.document.lock().await;
    assert!(document.get(NAVBAR_PLACEHOLDER).is_none());
    assert!(document.get(FOOTER_PLACEHOLDER).is_none());
    assert!(document.get("navbar_menu").is_some());

    assert_eq!(
        document.get("footer_frontend_p").unwrap().text(),
        Some("Frontend v1.2.3")
    );
    assert_eq!(
        document.get("footer_backend_p").unwrap().text(),
        Some("API v4.5.6")
    );
}

#[tokio::test]
async fn test_load_db_counts() {
    let sso_url = spawn_sso(true).await;
    let site_url = spawn_site().await;

    let session = Session::new(
        config(sso_url, site_url),
        Arc::new(MemoryStore::new()),
        "http://frontend/page",
    )
    .await;

    let counter = create_element(
        "p",
        ElementConfig {
            id: Some("db_size".to_string()),
            inner_text: Some("Database: {0}".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    session.document.lock().await.append(counter);

    session.page.load_db_counts().await.unwrap();

    let document = session.document.lock().await;
    assert_eq!(document.get("db_size").unwrap().text(), Some("Database: 12 MB"));
}

#[tokio::test]
async fn test_popup_lifecycle_on_session() {
    let sso_url = spawn_sso(true).await;
    let site_url = spawn_site().await;

    let session = Session::new(
        config(sso_url, site_url),
        Arc::new(MemoryStore::new()),
        "http://frontend/page",
    )
    .await;

    let id = session
        .popups
        .show_popup("saved", false, 5_000, Some(30.0))
        .await
        .unwrap();

    assert!(session.document.lock().await.get(&id).is_some());
    assert!(session.popups.remove_popup(&id).await);
    assert!(!session.popups.remove_popup(&id).await);
    assert!(session.document.lock().await.get(&id).is_none());
}
