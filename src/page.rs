//! # Page assembly
//!
//! Fetches the shared navbar/footer fragments and swaps them into their
//! placeholder nodes, then fills in the version strings from the status
//! endpoint. The version fill-in is sequenced strictly after the footer
//! splice; the navbar install is independent of both.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    document::Document,
    element::{create_element, ElementConfig},
    error::AppError,
    fmt::format,
    fragment::parse_fragment,
};

pub const NAVBAR_PLACEHOLDER: &str = "replace_with_navbar";
pub const FOOTER_PLACEHOLDER: &str = "replace_with_footer";

/// Payload of `GET /api/srv/get/`.
#[derive(Debug, Deserialize)]
pub struct ServerStatus {
    pub db_size: Option<String>,
    pub frontend_version: String,
    pub api_version: String,
}

pub struct PageAssembler {
    http: Client,
    site_url: String,
    document: Arc<Mutex<Document>>,
}

impl PageAssembler {
    pub fn new(http: Client, site_url: String, document: Arc<Mutex<Document>>) -> Self {
        Self {
            http,
            site_url,
            document,
        }
    }

    /// Fetch `/sup/navbar` and swap it in for the `script#replace_with_navbar`
    /// placeholder.
    pub async fn install_navbar(&self) -> Result<(), AppError> {
        let text = self.fetch_fragment("/sup/navbar").await?;
        let wrapper = wrap_fragment(&text)?;

        let mut document = self.document.lock().await;
        if !document.replace_script(NAVBAR_PLACEHOLDER, wrapper) {
            return Err(AppError::ElementNotFound(NAVBAR_PLACEHOLDER.to_string()));
        }

        Ok(())
    }

    /// Fetch `/sup/footer`, swap it in for `div#replace_with_footer`, then
    /// fill the version paragraphs from the status endpoint. The fill-in
    /// only runs once the footer exists in the document.
    pub async fn install_footer(&self) -> Result<(), AppError> {
        let text = self.fetch_fragment("/sup/footer").await?;
        let wrapper = wrap_fragment(&text)?;

        {
            let mut document = self.document.lock().await;
            if !document.replace_by_id(FOOTER_PLACEHOLDER, wrapper) {
                return Err(AppError::ElementNotFound(FOOTER_PLACEHOLDER.to_string()));
            }
        }

        let status = self.fetch_status().await?;

        let mut document = self.document.lock().await;
        fill_template_text(&mut document, "footer_frontend_p", &status.frontend_version)?;
        fill_template_text(&mut document, "footer_backend_p", &status.api_version)?;

        Ok(())
    }

    pub async fn fetch_status(&self) -> Result<ServerStatus, AppError> {
        let response = self
            .http
            .get(format!("{}/api/srv/get/", self.site_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::UnexpectedStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Fill the `db_size` element from the status endpoint, falling back to
    /// `"No DB"` when the backend reports none.
    pub async fn load_db_counts(&self) -> Result<(), AppError> {
        let status = self.fetch_status().await?;
        let db_size = status.db_size.unwrap_or_else(|| "No DB".to_string());

        let mut document = self.document.lock().await;
        fill_template_text(&mut document, "db_size", &db_size)
    }

    async fn fetch_fragment(&self, path: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(format!("{}{}", self.site_url, path))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::UnexpectedStatus(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Wrap a fetched fragment in a plain div, parsing it so its nodes stay
/// addressable by id.
fn wrap_fragment(text: &str) -> Result<crate::element::Element, AppError> {
    create_element(
        "div",
        ElementConfig {
            children: Some(parse_fragment(text)),
            ..Default::default()
        },
    )
}

/// Treat the element's current text as a `{N}` template and fill it with
/// one argument.
fn fill_template_text(document: &mut Document, id: &str, arg: &str) -> Result<(), AppError> {
    let element = document
        .get_mut(id)
        .ok_or_else(|| AppError::ElementNotFound(id.to_string()))?;

    let template = element.text().unwrap_or_default().to_string();
    element.set_text(&format(&template, &[arg]));

    Ok(())
}

/// Set an element's text from its `data-text` attribute template.
///
/// Missing element or missing attribute is a configuration error.
pub fn format_element_text(
    document: &mut Document,
    id: &str,
    args: &[&str],
) -> Result<(), AppError> {
    let element = document
        .get_mut(id)
        .ok_or_else(|| AppError::ElementNotFound(id.to_string()))?;

    let template = element
        .attribute("data-text")
        .ok_or_else(|| AppError::MissingTextTemplate(id.to_string()))?
        .to_string();

    element.set_text(&format(&template, args));

    Ok(())
}

/// Toggle the navbar menu open/closed, mirroring the burger's state.
pub fn toggle_navmenu(document: &mut Document, burger_id: &str) -> Result<(), AppError> {
    document
        .get_mut("navbar_menu")
        .ok_or_else(|| AppError::ElementNotFound("navbar_menu".to_string()))?
        .toggle_class("is-active");

    document
        .get_mut(burger_id)
        .ok_or_else(|| AppError::ElementNotFound(burger_id.to_string()))?
        .toggle_class("is-active");

    Ok(())
}
