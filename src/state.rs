//! # Session wiring
//!
//! One [`Session`] per page load: it owns the configuration, the HTTP
//! client, the session cache, the document and the managers built on top of
//! them, and runs the startup glue that warms the auth cache.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{
    auth::{AuthClient, AuthOutcome},
    config::Config,
    document::Document,
    page::PageAssembler,
    popup::PopupManager,
    session::{SessionCache, SessionStore},
};

pub struct Session {
    pub config: Config,
    pub cache: SessionCache,
    pub document: Arc<Mutex<Document>>,
    pub popups: Arc<PopupManager>,
    pub auth: AuthClient,
    pub page: PageAssembler,
}

impl Session {
    /// Wire up the collaborators, then warm the auth cache once if nothing
    /// is cached yet. Startup failures are logged, never surfaced.
    pub async fn new(config: Config, store: Arc<dyn SessionStore>, page_url: &str) -> Arc<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .expect("HTTP client misconfigured!");

        let document = Arc::new(Mutex::new(Document::new()));
        let cache = SessionCache::new(store);

        let auth = AuthClient::new(
            http.clone(),
            config.sso_url.clone(),
            page_url.to_string(),
            cache.clone(),
        );
        let popups = Arc::new(PopupManager::new(document.clone()));
        let page = PageAssembler::new(http, config.site_url.clone(), document.clone());

        let session = Arc::new(Self {
            config,
            cache,
            document,
            popups,
            auth,
            page,
        });

        session.setup().await;
        session
    }

    async fn setup(&self) {
        if self.cache.auth_blob().is_some() {
            return;
        }

        match self.auth.get_user_details(true, true).await {
            AuthOutcome::Authenticated(details) => self.cache.set_auth_blob(&details),
            AuthOutcome::LoginRedirect(url) => info!("Login required, redirect to {url}"),
            AuthOutcome::Failed => error!("Setup failed: could not fetch user details"),
        }
    }
}
