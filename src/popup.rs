//! # Popups
//!
//! Timed, dismissible notification overlays anchored to the viewport. Each
//! popup is tracked by a generated identifier and owns its auto-removal
//! timer: manual dismissal cancels the timer, and a timer firing after a
//! manual dismissal is a no-op, so removal is idempotent either way.

use std::{collections::HashMap, sync::Arc};

use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tokio::{sync::Mutex, task::JoinHandle, time::sleep};

use crate::{
    document::Document,
    element::{create_element, Element, ElementConfig, Listener},
    error::AppError,
};

const POPUP_ID_LENGTH: usize = 10;

/// Random alphanumeric identifier, uniform over the 62-character alphabet.
/// Not cryptographically meaningful; it only has to avoid colliding with
/// other live popups on the page.
pub fn make_id(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

struct PopupRecord {
    timer: Option<JoinHandle<()>>,
}

pub struct PopupManager {
    document: Arc<Mutex<Document>>,
    popups: Mutex<HashMap<String, PopupRecord>>,
}

impl PopupManager {
    pub fn new(document: Arc<Mutex<Document>>) -> Self {
        Self {
            document,
            popups: Mutex::new(HashMap::new()),
        }
    }

    /// Build a notification overlay and append it to the document body.
    ///
    /// With an explicit `width` (percent) the overlay is centered at
    /// `right = (100 - width) / 2`; otherwise it defaults to 20% wide at a
    /// 40% inset. The dismiss button carries a `click` listener that removes
    /// the popup. Returns the generated popup identifier.
    pub async fn create_popup(
        self: &Arc<Self>,
        reason: &str,
        is_danger: bool,
        width: Option<f64>,
    ) -> Result<String, AppError> {
        let id = make_id(POPUP_ID_LENGTH);

        let manager = Arc::downgrade(self);
        let popup_id = id.clone();
        let dismiss: Listener = Arc::new(move || {
            let Some(manager) = manager.upgrade() else {
                return;
            };
            let id = popup_id.clone();
            tokio::spawn(async move {
                manager.remove_popup(&id).await;
            });
        });

        let overlay = build_overlay(&id, reason, is_danger, width, dismiss)?;

        self.document.lock().await.append(overlay);
        self.popups
            .lock()
            .await
            .insert(id.clone(), PopupRecord { timer: None });

        Ok(id)
    }

    /// Detach the popup from the document and cancel its timer.
    ///
    /// Idempotent: removing an identifier that no longer resolves to a live
    /// popup returns `false` instead of failing.
    pub async fn remove_popup(&self, id: &str) -> bool {
        let record = self.popups.lock().await.remove(id);

        let Some(mut record) = record else {
            #[cfg(feature = "verbose")]
            tracing::info!("popup {id} already removed");
            return false;
        };

        if let Some(timer) = record.timer.take() {
            timer.abort();
        }

        self.document.lock().await.remove_by_id(id)
    }

    /// Create a popup and schedule its removal after `time_ms` milliseconds.
    pub async fn show_popup(
        self: &Arc<Self>,
        text: &str,
        is_danger: bool,
        time_ms: u64,
        width: Option<f64>,
    ) -> Result<String, AppError> {
        let id = self.create_popup(text, is_danger, width).await?;

        let manager = Arc::clone(self);
        let popup_id = id.clone();
        let handle = tokio::spawn(async move {
            sleep(std::time::Duration::from_millis(time_ms)).await;
            manager.remove_popup(&popup_id).await;
        });

        if let Some(record) = self.popups.lock().await.get_mut(&id) {
            record.timer = Some(handle);
        } else {
            // dismissed before we could register the timer
            handle.abort();
        }

        Ok(id)
    }

    pub async fn is_live(&self, id: &str) -> bool {
        self.popups.lock().await.contains_key(id)
    }
}

fn build_overlay(
    id: &str,
    reason: &str,
    is_danger: bool,
    width: Option<f64>,
    dismiss: Listener,
) -> Result<Element, AppError> {
    let (right, width) = match width {
        Some(width) => (
            format!("{}%", (100.0 - width) / 2.0),
            format!("{width}%"),
        ),
        None => ("40%".to_string(), "20%".to_string()),
    };

    let button = create_element(
        "button",
        ElementConfig {
            classes: vec!["delete".to_string()],
            listeners: HashMap::from([("click".to_string(), dismiss)]),
            ..Default::default()
        },
    )?;

    let message = create_element(
        "span",
        ElementConfig {
            inner_text: Some(reason.to_string()),
            ..Default::default()
        },
    )?;

    let severity = if is_danger { "is-danger" } else { "is-primary" };
    let notification = create_element(
        "div",
        ElementConfig {
            classes: vec!["notification".to_string(), severity.to_string()],
            children: Some(vec![button, message]),
            ..Default::default()
        },
    )?;

    create_element(
        "div",
        ElementConfig {
            id: Some(id.to_string()),
            style: vec![
                ("position".to_string(), "fixed".to_string()),
                ("top".to_string(), "25px".to_string()),
                ("right".to_string(), right),
                ("width".to_string(), width),
                ("z-index".to_string(), "10000".to_string()),
            ],
            children: Some(vec![notification]),
            ..Default::default()
        },
    )
}
