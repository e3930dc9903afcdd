//! # Document
//!
//! A lightweight element tree standing in for the page: a `body` root with
//! id lookup, node replacement and removal. Pages are assembled against this
//! tree and rendered to HTML with [`Document::render`].

use crate::element::{Content, Element};

pub struct Document {
    body: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: bare("body"),
        }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn append(&mut self, element: Element) {
        self.body.append_child(element);
    }

    /// Depth-first lookup by element id.
    pub fn get(&self, id: &str) -> Option<&Element> {
        find(&self.body, id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        find_mut(&mut self.body, id)
    }

    /// Detach the element with the given id. Returns whether one was found.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        remove_in(&mut self.body, id)
    }

    /// Swap the element with the given id for `replacement` in place.
    pub fn replace_by_id(&mut self, id: &str, replacement: Element) -> bool {
        let mut slot = Some(replacement);
        replace_in(&mut self.body, id, None, &mut slot)
    }

    /// The `script#id` selector form: replace only a `script` element
    /// carrying the given id.
    pub fn replace_script(&mut self, id: &str, replacement: Element) -> bool {
        let mut slot = Some(replacement);
        replace_in(&mut self.body, id, Some("script"), &mut slot)
    }

    pub fn remove_children(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.remove_children();
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        self.body.render()
    }
}

fn bare(tag: &str) -> Element {
    crate::element::create_element(
        tag,
        crate::element::ElementConfig {
            children: Some(Vec::new()),
            ..Default::default()
        },
    )
    // a children-only config has a single content mode and cannot fail
    .expect("bare element config is valid")
}

fn find<'a>(element: &'a Element, id: &str) -> Option<&'a Element> {
    if element.id() == Some(id) {
        return Some(element);
    }
    if let Content::Children(children) = element.content() {
        for child in children {
            if let Some(found) = find(child, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_mut<'a>(element: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    if element.id() == Some(id) {
        return Some(element);
    }
    if let Some(children) = element.children_mut() {
        for child in children {
            if let Some(found) = find_mut(child, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_in(element: &mut Element, id: &str) -> bool {
    if let Some(children) = element.children_mut() {
        if let Some(position) = children.iter().position(|c| c.id() == Some(id)) {
            children.remove(position);
            return true;
        }
        for child in children {
            if remove_in(child, id) {
                return true;
            }
        }
    }
    false
}

fn replace_in(
    element: &mut Element,
    id: &str,
    tag: Option<&str>,
    replacement: &mut Option<Element>,
) -> bool {
    if let Some(children) = element.children_mut() {
        let position = children
            .iter()
            .position(|c| c.id() == Some(id) && tag.is_none_or(|t| c.tag() == t));

        if let Some(position) = position {
            if let Some(new) = replacement.take() {
                children[position] = new;
                return true;
            }
        }

        for child in children {
            if replace_in(child, id, tag, replacement) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{create_element, ElementConfig};

    fn labeled(tag: &str, id: &str, text: &str) -> Element {
        create_element(
            tag,
            ElementConfig {
                id: Some(id.to_string()),
                inner_text: Some(text.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_append_and_get() {
        let mut document = Document::new();
        document.append(labeled("p", "greeting", "hi"));

        assert_eq!(document.get("greeting").unwrap().text(), Some("hi"));
        assert!(document.get("missing").is_none());
    }

    #[test]
    fn test_nested_lookup() {
        let inner = labeled("span", "inner", "deep");
        let outer = create_element(
            "div",
            ElementConfig {
                id: Some("outer".to_string()),
                children: Some(vec![inner]),
                ..Default::default()
            },
        )
        .unwrap();

        let mut document = Document::new();
        document.append(outer);

        assert_eq!(document.get("inner").unwrap().text(), Some("deep"));

        document.get_mut("inner").unwrap().set_text("changed");
        assert_eq!(document.get("inner").unwrap().text(), Some("changed"));
    }

    #[test]
    fn test_remove_by_id_is_guarded() {
        let mut document = Document::new();
        document.append(labeled("p", "gone", "x"));

        assert!(document.remove_by_id("gone"));
        assert!(!document.remove_by_id("gone"));
        assert!(document.get("gone").is_none());
    }

    #[test]
    fn test_replace_by_id() {
        let mut document = Document::new();
        document.append(labeled("div", "placeholder", "old"));

        assert!(document.replace_by_id("placeholder", labeled("div", "filled", "new")));
        assert!(document.get("placeholder").is_none());
        assert_eq!(document.get("filled").unwrap().text(), Some("new"));
    }

    #[test]
    fn test_replace_script_requires_script_tag() {
        let mut document = Document::new();
        document.append(labeled("div", "loader", "x"));

        assert!(!document.replace_script("loader", labeled("div", "new", "y")));

        let script = create_element(
            "script",
            ElementConfig {
                id: Some("loader".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        document.append(script);

        assert!(document.replace_script("loader", labeled("div", "new", "y")));
        assert_eq!(document.get("new").unwrap().text(), Some("y"));
    }

    #[test]
    fn test_remove_children() {
        let child = labeled("p", "child", "x");
        let parent = create_element(
            "div",
            ElementConfig {
                id: Some("parent".to_string()),
                children: Some(vec![child]),
                ..Default::default()
            },
        )
        .unwrap();

        let mut document = Document::new();
        document.append(parent);

        assert!(document.remove_children("parent"));
        assert!(document.get("child").is_none());
        assert!(!document.remove_children("nope"));
    }

    #[test]
    fn test_render() {
        let mut document = Document::new();
        document.append(labeled("p", "a", "one"));

        assert_eq!(document.render(), "<body><p id=\"a\">one</p></body>");
    }
}
