//! # Auth
//!
//! Client for the external single-sign-on service. Applies a cache-then-
//! network policy over the session store: a cached profile short-circuits
//! the request entirely, a 200 refreshes the cache, a 401 yields a login
//! redirect carrying the current page as the return target, and anything
//! else is logged and collapsed into the single failure sentinel. Nothing
//! is retried.

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::session::SessionCache;

/// Profile payload from `<sso>/api/user/get/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub token: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub super_admin: bool,
}

/// Outcome of an identity check. `Failed` covers every unknown error path;
/// callers treat it as the one failure signal.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthOutcome {
    Authenticated(UserDetails),
    /// HTTP 401 with redirecting enabled: navigate here to log in.
    LoginRedirect(String),
    Failed,
}

pub struct AuthClient {
    http: Client,
    sso_url: String,
    page_url: String,
    cache: SessionCache,
}

impl AuthClient {
    pub fn new(http: Client, sso_url: String, page_url: String, cache: SessionCache) -> Self {
        Self {
            http,
            sso_url,
            page_url,
            cache,
        }
    }

    /// Fetch the current user's profile.
    ///
    /// With `use_cache`, a cached auth entry is returned without touching
    /// the network. With `auto_redirect`, a 401 becomes
    /// [`AuthOutcome::LoginRedirect`]; otherwise it is a plain failure.
    pub async fn get_user_details(&self, auto_redirect: bool, use_cache: bool) -> AuthOutcome {
        if use_cache && self.cache.auth_token().is_some() {
            if let Some(details) = self.cache.user_details() {
                return AuthOutcome::Authenticated(details);
            }
        }

        let endpoint = format!("{}/api/user/get/", self.sso_url);
        let response = match self.http.get(&endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("[get_user_details] unknown error: {e}");
                return AuthOutcome::Failed;
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<UserDetails>().await {
                Ok(details) => {
                    self.cache.set_auth(&details);
                    AuthOutcome::Authenticated(details)
                }
                Err(e) => {
                    error!("[get_user_details] unreadable profile payload: {e}");
                    AuthOutcome::Failed
                }
            },
            StatusCode::UNAUTHORIZED => {
                if auto_redirect {
                    AuthOutcome::LoginRedirect(self.login_url())
                } else {
                    info!("[get_user_details] received http 401");
                    AuthOutcome::Failed
                }
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!("[get_user_details] received http {status}: {body}");
                AuthOutcome::Failed
            }
        }
    }

    /// The token in `Bearer <token>` form, or `None` on any failure.
    pub async fn get_auth_token(&self, auto_redirect: bool, use_cache: bool) -> Option<String> {
        if use_cache {
            if let Some(token) = self.cache.auth_token() {
                return Some(token);
            }
        }

        match self.get_user_details(auto_redirect, false).await {
            AuthOutcome::Authenticated(details) => Some(format!("Bearer {}", details.token)),
            AuthOutcome::LoginRedirect(url) => {
                info!("[get_auth_token] login required, redirect to {url}");
                None
            }
            AuthOutcome::Failed => None,
        }
    }

    /// Login page URL with the current page as the `r=` return target.
    fn login_url(&self) -> String {
        let base = format!("{}/login", self.sso_url);

        Url::parse_with_params(&base, &[("r", self.page_url.as_str())])
            .map(|url| url.to_string())
            .unwrap_or(base)
    }
}
