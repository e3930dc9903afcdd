//! # Fragment parsing
//!
//! Shared navbar/footer fragments arrive as raw HTML text. The browser's
//! `innerHTML` turned those into addressable nodes implicitly; here a small
//! forgiving parser does the same so the assembled document can look up
//! elements inside a spliced fragment by id.
//!
//! Scope is deliberately narrow: tags with quoted attributes, nesting, void
//! and self-closing elements, and text. Comments are skipped. Anything
//! malformed degrades to text instead of failing, which is how browsers
//! treat broken fragments.

use crate::element::{create_element, Element, ElementConfig};

const VOID_TAGS: [&str; 8] = ["br", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// Parse an HTML fragment into a list of elements.
///
/// Bare text runs become `span` elements so the tree stays uniform; pure
/// whitespace between tags is dropped.
pub fn parse_fragment(input: &str) -> Vec<Element> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    parser.parse_nodes(None)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn parse_nodes(&mut self, closing: Option<&str>) -> Vec<Element> {
        let mut nodes = Vec::new();

        while self.pos < self.input.len() {
            if self.starts_with("</") {
                if let Some(tag) = closing {
                    if self.peek_closing_tag() == Some(tag.to_string()) {
                        return nodes;
                    }
                }
                // stray close tag, skip it
                self.skip_past(b'>');
                continue;
            }

            if self.starts_with("<!--") {
                self.skip_comment();
                continue;
            }

            if self.starts_with("<") && self.tag_name_at(self.pos + 1).is_some() {
                if let Some(element) = self.parse_element() {
                    nodes.push(element);
                    continue;
                }
            }

            if let Some(text) = self.parse_text() {
                nodes.push(text);
            }
        }

        nodes
    }

    fn parse_element(&mut self) -> Option<Element> {
        self.pos += 1; // consume '<'
        let tag = self.tag_name_at(self.pos)?;
        self.pos += tag.len();

        let mut config = ElementConfig::default();
        let mut self_closed = false;

        loop {
            self.skip_whitespace();
            match self.current() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self_closed = true;
                    self.pos += 1;
                }
                Some(_) => {
                    let Some((name, value)) = self.parse_attribute() else {
                        self.skip_past(b'>');
                        break;
                    };
                    apply_attribute(&mut config, &name, value);
                }
            }
        }

        if !self_closed && !VOID_TAGS.contains(&tag.as_str()) {
            let children = self.parse_nodes(Some(&tag));
            self.consume_closing_tag(&tag);

            match children.len() {
                0 => {}
                // a lone text child collapses into literal text
                1 if children[0].tag() == "span" && children[0].id().is_none() => {
                    config.inner_text = children[0].text().map(str::to_string);
                    if config.inner_text.is_none() {
                        config.children = Some(children);
                    }
                }
                _ => config.children = Some(children),
            }
        }

        // the config carries at most one content mode, so this cannot fail
        create_element(&tag, config).ok()
    }

    fn parse_attribute(&mut self) -> Option<(String, String)> {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return None;
        }
        let name = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        if self.current() != Some(b'=') {
            return Some((name, String::new()));
        }
        self.pos += 1;

        let quote = match self.current() {
            Some(q @ (b'"' | b'\'')) => {
                self.pos += 1;
                Some(q)
            }
            _ => None,
        };

        let value_start = self.pos;
        while let Some(c) = self.current() {
            let done = match quote {
                Some(q) => c == q,
                None => c.is_ascii_whitespace() || c == b'>',
            };
            if done {
                break;
            }
            self.pos += 1;
        }
        let value = String::from_utf8_lossy(&self.input[value_start..self.pos]).into_owned();
        if quote.is_some() {
            self.pos += 1;
        }

        Some((name, value))
    }

    fn parse_text(&mut self) -> Option<Element> {
        let start = self.pos;
        while self.pos < self.input.len() && self.current() != Some(b'<') {
            self.pos += 1;
        }
        if self.pos == start {
            // lone '<' that opened nothing
            self.pos += 1;
            return None;
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        if text.trim().is_empty() {
            return None;
        }

        create_element(
            "span",
            ElementConfig {
                inner_text: Some(text.trim().to_string()),
                ..Default::default()
            },
        )
        .ok()
    }

    fn tag_name_at(&self, at: usize) -> Option<String> {
        let mut end = at;
        while end < self.input.len() {
            let c = self.input[end];
            if c.is_ascii_alphanumeric() || c == b'-' {
                end += 1;
            } else {
                break;
            }
        }
        if end == at {
            return None;
        }
        Some(String::from_utf8_lossy(&self.input[at..end]).to_lowercase())
    }

    fn peek_closing_tag(&self) -> Option<String> {
        self.tag_name_at(self.pos + 2)
    }

    fn consume_closing_tag(&mut self, tag: &str) {
        if self.starts_with("</") && self.peek_closing_tag() == Some(tag.to_string()) {
            self.skip_past(b'>');
        }
    }

    fn skip_comment(&mut self) {
        if let Some(end) = find_from(self.input, self.pos, b"-->") {
            self.pos = end + 3;
        } else {
            self.pos = self.input.len();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_past(&mut self, byte: u8) {
        while let Some(c) = self.current() {
            self.pos += 1;
            if c == byte {
                break;
            }
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix.as_bytes())
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn apply_attribute(config: &mut ElementConfig, name: &str, value: String) {
    match name {
        "id" => config.id = Some(value),
        "class" => {
            config.classes = value.split_whitespace().map(str::to_string).collect();
        }
        "style" => {
            config.style = value
                .split(';')
                .filter_map(|pair| {
                    let (name, value) = pair.split_once(':')?;
                    Some((name.trim().to_string(), value.trim().to_string()))
                })
                .collect();
        }
        _ => config.attributes.push((name.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element_with_text() {
        let nodes = parse_fragment("<p id=\"footer_frontend_p\">Frontend v{0}</p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag(), "p");
        assert_eq!(nodes[0].id(), Some("footer_frontend_p"));
        assert_eq!(nodes[0].text(), Some("Frontend v{0}"));
    }

    #[test]
    fn test_siblings() {
        let nodes = parse_fragment("<p id=\"a\">one</p><p id=\"b\">two</p>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id(), Some("a"));
        assert_eq!(nodes[1].id(), Some("b"));
    }

    #[test]
    fn test_nesting_and_classes() {
        let nodes =
            parse_fragment("<div class=\"navbar is-dark\"><a id=\"home\" href=\"/\">Home</a></div>");
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].has_class("navbar"));
        assert!(nodes[0].has_class("is-dark"));

        let children = nodes[0].children().unwrap();
        assert_eq!(children[0].id(), Some("home"));
        assert_eq!(children[0].attribute("href"), Some("/"));
        assert_eq!(children[0].text(), Some("Home"));
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_fragment("<br><img src=\"x.png\"/><p>after</p>");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].tag(), "br");
        assert_eq!(nodes[1].attribute("src"), Some("x.png"));
        assert_eq!(nodes[2].text(), Some("after"));
    }

    #[test]
    fn test_comment_and_whitespace_skipped() {
        let nodes = parse_fragment("  <!-- nav -->\n  <p>x</p>\n");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text(), Some("x"));
    }

    #[test]
    fn test_bare_text_becomes_span() {
        let nodes = parse_fragment("hello <b>bold</b>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].tag(), "span");
        assert_eq!(nodes[0].text(), Some("hello"));
        assert_eq!(nodes[1].tag(), "b");
    }

    #[test]
    fn test_style_attribute_split() {
        let nodes = parse_fragment("<div style=\"width: 20%; top: 25px\"></div>");
        assert_eq!(nodes[0].style("width"), Some("20%"));
        assert_eq!(nodes[0].style("top"), Some("25px"));
    }

    #[test]
    fn test_malformed_degrades_to_text() {
        let nodes = parse_fragment("a < b");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text(), Some("a"));
        assert_eq!(nodes[1].text(), Some("b"));
    }
}
