//! # Element Builder
//!
//! Declarative construction of UI element trees from an [`ElementConfig`]
//! record. The record is immutable once built: every element retains its
//! originating configuration behind an `Arc` and can be recreated from it on
//! demand, optionally recursing into children. Mutating a built element
//! (text swaps, class toggles) never touches the retained configuration, so
//! recreation always reproduces the originally configured form.
//!
//! Exactly one of `inner_text`, `inner_html` and `children` may be set;
//! violating that is a configuration error caught before anything is built.

use std::{collections::HashMap, sync::Arc};

use crate::error::AppError;

/// Event callback attached to an element.
///
/// There is no browser event loop here, so listeners are plain callbacks
/// invoked through [`Element::fire`].
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Options record for [`create_element`]. Every field is independently
/// optional; an absent field applies nothing.
#[derive(Clone, Default)]
pub struct ElementConfig {
    pub classes: Vec<String>,
    pub style: Vec<(String, String)>,
    pub id: Option<String>,
    pub inner_text: Option<String>,
    pub inner_html: Option<String>,
    pub children: Option<Vec<Element>>,
    pub attributes: Vec<(String, String)>,
    pub listeners: HashMap<String, Listener>,
    pub title: Option<String>,
    pub access_key: Option<String>,
    pub autocapitalize: Option<String>,
    pub autofocus: Option<bool>,
    pub content_editable: Option<bool>,
    pub dir: Option<String>,
    pub draggable: Option<bool>,
    pub enter_key_hint: Option<String>,
    pub hidden: Option<bool>,
    pub inert: Option<bool>,
    pub input_mode: Option<String>,
    pub lang: Option<String>,
    pub popover: Option<String>,
    pub spellcheck: Option<bool>,
}

#[derive(Clone)]
pub enum Content {
    Empty,
    Text(String),
    Markup(String),
    Children(Vec<Element>),
}

#[derive(Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    listeners: HashMap<String, Listener>,
    content: Content,
    config: Arc<ElementConfig>,
}

/// Build one element from `tag` and an options record.
///
/// Fails with [`AppError::ExclusiveContent`] before constructing anything
/// when more than one of `inner_text`, `inner_html` and `children` is set.
pub fn create_element(tag: &str, config: ElementConfig) -> Result<Element, AppError> {
    let modes = [
        config.inner_text.is_some(),
        config.inner_html.is_some(),
        config.children.is_some(),
    ];
    if modes.iter().filter(|set| **set).count() > 1 {
        return Err(AppError::ExclusiveContent);
    }

    let content = if let Some(text) = &config.inner_text {
        Content::Text(text.clone())
    } else if let Some(markup) = &config.inner_html {
        Content::Markup(markup.clone())
    } else if let Some(children) = &config.children {
        Content::Children(children.clone())
    } else {
        Content::Empty
    };

    let mut attributes = config.attributes.clone();
    apply_flags(&config, &mut attributes);

    Ok(Element {
        tag: tag.to_string(),
        id: config.id.clone(),
        classes: config.classes.clone(),
        styles: config.style.clone(),
        attributes,
        listeners: config.listeners.clone(),
        content,
        config: Arc::new(config),
    })
}

/// Map of the fixed accessibility/editing flags onto plain attributes.
fn apply_flags(config: &ElementConfig, attributes: &mut Vec<(String, String)>) {
    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value {
            attributes.push((name.to_string(), value));
        }
    };

    push("title", config.title.clone());
    push("accesskey", config.access_key.clone());
    push("autocapitalize", config.autocapitalize.clone());
    push("autofocus", config.autofocus.map(|b| b.to_string()));
    push("contenteditable", config.content_editable.map(|b| b.to_string()));
    push("dir", config.dir.clone());
    push("draggable", config.draggable.map(|b| b.to_string()));
    push("enterkeyhint", config.enter_key_hint.clone());
    push("hidden", config.hidden.map(|b| b.to_string()));
    push("inert", config.inert.map(|b| b.to_string()));
    push("inputmode", config.input_mode.clone());
    push("lang", config.lang.clone());
    push("popover", config.popover.clone());
    push("spellcheck", config.spellcheck.map(|b| b.to_string()));
}

impl Element {
    /// Rebuild an equivalent, independent element from the retained
    /// configuration.
    ///
    /// With `deep`, children are recreated first (recursively) and the new
    /// element's configuration references the recreated children, so a
    /// second deep recreation operates on the replacements, not the
    /// originals.
    pub fn recreate(&self, deep: bool) -> Result<Element, AppError> {
        let mut config = (*self.config).clone();

        if deep {
            if let Some(children) = config.children.take() {
                let mut recreated = Vec::with_capacity(children.len());
                for child in &children {
                    recreated.push(child.recreate(true)?);
                }
                config.children = Some(recreated);
            }
        }

        create_element(&self.tag, config)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Element]> {
        match &self.content {
            Content::Children(children) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.content {
            Content::Children(children) => Some(children),
            _ => None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.content = Content::Text(text.to_string());
    }

    pub fn set_markup(&mut self, markup: &str) {
        self.content = Content::Markup(markup.to_string());
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn toggle_class(&mut self, class: &str) {
        match self.classes.iter().position(|c| c == class) {
            Some(index) => {
                self.classes.remove(index);
            }
            None => self.classes.push(class.to_string()),
        }
    }

    /// Append a child, converting existing literal content into a child node
    /// first so nothing is silently dropped.
    pub fn append_child(&mut self, child: Element) {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            Content::Empty => self.content = Content::Children(vec![child]),
            Content::Text(text) => {
                let text_node = text_span(text);
                self.content = Content::Children(vec![text_node, child]);
            }
            Content::Markup(markup) => {
                let markup_node = markup_div(markup);
                self.content = Content::Children(vec![markup_node, child]);
            }
        }
    }

    pub fn remove_children(&mut self) {
        self.content = Content::Empty;
    }

    /// Invoke the listener attached for `event`. Returns whether one was
    /// attached.
    pub fn fire(&self, event: &str) -> bool {
        match self.listeners.get(event) {
            Some(listener) => {
                listener();
                true
            }
            None => false,
        }
    }

    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.contains_key(event)
    }

    /// Render the element and its subtree as HTML.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.tag);

        if let Some(id) = &self.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&self.classes.join(" "))));
        }
        if !self.styles.is_empty() {
            let style: Vec<String> = self
                .styles
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            out.push_str(&format!(" style=\"{}\"", escape(&style.join("; "))));
        }
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        out.push('>');

        match &self.content {
            Content::Empty => {}
            Content::Text(text) => out.push_str(&escape(text)),
            Content::Markup(markup) => out.push_str(markup),
            Content::Children(children) => {
                for child in children {
                    out.push_str(&child.render());
                }
            }
        }

        out.push_str(&format!("</{}>", self.tag));
        out
    }
}

fn text_span(text: &str) -> Element {
    Element {
        tag: "span".to_string(),
        id: None,
        classes: Vec::new(),
        styles: Vec::new(),
        attributes: Vec::new(),
        listeners: HashMap::new(),
        content: Content::Text(text.to_string()),
        config: Arc::new(ElementConfig {
            inner_text: Some(text.to_string()),
            ..Default::default()
        }),
    }
}

fn markup_div(markup: &str) -> Element {
    Element {
        tag: "div".to_string(),
        id: None,
        classes: Vec::new(),
        styles: Vec::new(),
        attributes: Vec::new(),
        listeners: HashMap::new(),
        content: Content::Markup(markup.to_string()),
        config: Arc::new(ElementConfig {
            inner_html: Some(markup.to_string()),
            ..Default::default()
        }),
    }
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
