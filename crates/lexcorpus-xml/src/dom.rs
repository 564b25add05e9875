use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{Error, Result};

/// A minimal, read-only XML tree. `quick-xml` itself is a streaming
/// tokenizer; legislation documents are small enough (a handful of
/// megabytes at most) that materializing the whole tree once up front is
/// simpler than re-deriving state on every lookup, and it lets the dialect
/// parsers use `find`/`find_all` the way the original BeautifulSoup-based
/// parser does.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

impl Element {
    /// Parses a complete XML document into its root element.
    pub fn parse_document(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf).map_err(Error::Xml)? {
                Event::Eof => break,
                Event::Start(start) => {
                    let element = Element {
                        name: tag_name(start.name().as_ref()),
                        attrs: read_attrs(&start),
                        children: Vec::new(),
                    };
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = Element {
                        name: tag_name(start.name().as_ref()),
                        attrs: read_attrs(&start),
                        children: Vec::new(),
                    };
                    push_child(&mut stack, &mut root, Node::Element(element));
                }
                Event::End(_) => {
                    if let Some(finished) = stack.pop() {
                        push_child(&mut stack, &mut root, Node::Element(finished));
                    }
                }
                Event::Text(text) => {
                    let decoded = text.unescape().unwrap_or_default().into_owned();
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Text(decoded));
                    }
                }
                Event::CData(text) => {
                    let decoded = String::from_utf8_lossy(text.as_ref()).into_owned();
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Text(decoded));
                    }
                }
                _ => {}
            }
            buf.clear();
        }

        root.ok_or(Error::NoRootElement)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Depth-first search for the first descendant (including self's direct
    /// children, recursively) with the given tag name. Mirrors
    /// BeautifulSoup's `Tag.find`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.name == name {
                    return Some(el);
                }
                if let Some(found) = el.find(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendants with the given tag name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_all(name, &mut out);
        out
    }

    fn collect_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.name == name {
                    out.push(el);
                }
                el.collect_all(name, out);
            }
        }
    }

    /// Direct element children only, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenation of every descendant text node, space-joined and
    /// whitespace-collapsed. Skips the contents of `skip` tags entirely —
    /// used to keep list items out of a paragraph's own text when a
    /// Markdown-flavored rendering will render them separately.
    pub fn text_excluding(&self, skip: &[&str]) -> String {
        let mut parts = Vec::new();
        self.collect_text(skip, &mut parts);
        collapse_whitespace(&parts.join(" "))
    }

    pub fn text(&self) -> String {
        self.text_excluding(&[])
    }

    fn collect_text(&self, skip: &[&str], parts: &mut Vec<String>) {
        for child in &self.children {
            match child {
                Node::Text(t) => {
                    let cleaned = t.trim();
                    if !cleaned.is_empty() {
                        parts.push(cleaned.to_string());
                    }
                }
                Node::Element(el) => {
                    if skip.contains(&el.name.as_str()) {
                        continue;
                    }
                    el.collect_text(skip, parts);
                }
            }
        }
    }
}

fn push_child(stack: &mut Vec<Element>, root: &mut Option<Element>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if let Node::Element(el) = node {
                *root = Some(el);
            }
        }
    }
}

fn read_attrs(start: &quick_xml::events::BytesStart) -> BTreeMap<String, String> {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = tag_name(a.key.as_ref());
            let value = a.unescape_value().unwrap_or_default().into_owned();
            (key, value)
        })
        .collect()
}

/// Keeps the namespace prefix (`dc:identifier`, `ukm:Year`) verbatim rather
/// than resolving it, matching how the original parser matches on the
/// literal prefixed tag name.
fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attrs() {
        let xml = r#"<root xmlns:dc="x"><dc:identifier>ukpga/2006/46</dc:identifier><Body><P1 id="a"><P1para>Hello</P1para></P1></Body></root>"#;
        let root = Element::parse_document(xml).unwrap();
        assert_eq!(root.find("dc:identifier").unwrap().text(), "ukpga/2006/46");
        let p1 = root.find("P1").unwrap();
        assert_eq!(p1.attr("id"), Some("a"));
        assert_eq!(p1.find("P1para").unwrap().text(), "Hello");
    }

    #[test]
    fn find_all_returns_every_descendant_in_order() {
        let xml = r#"<root><P1 id="1"/><Body><P1 id="2"/></Body></root>"#;
        let root = Element::parse_document(xml).unwrap();
        let ids: Vec<&str> = root.find_all("P1").iter().filter_map(|el| el.attr("id")).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn text_collapses_internal_whitespace() {
        let xml = "<P1para>  The   company\n  is formed. </P1para>";
        let root = Element::parse_document(xml).unwrap();
        assert_eq!(root.text(), "The company is formed.");
    }

    #[test]
    fn text_excluding_skips_named_descendants() {
        let xml = r#"<P1para>Intro <UnorderedList><ListItem>skip me</ListItem></UnorderedList> outro</P1para>"#;
        let root = Element::parse_document(xml).unwrap();
        assert_eq!(root.text_excluding(&["UnorderedList"]), "Intro outro");
    }

    #[test]
    fn rejects_xml_with_no_root_element() {
        assert!(Element::parse_document("").is_err());
    }
}
