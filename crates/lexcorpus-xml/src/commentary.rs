use std::collections::BTreeMap;

use crate::dom::Element;
use crate::markdown;

/// An editorial annotation attached to one or more provisions, typically
/// citing the instrument that amended them (GLOSSARY: Commentary).
#[derive(Debug, Clone, PartialEq)]
pub struct Commentary {
    pub id: String,
    pub text: String,
}

/// Collects every `<Commentary>` element in the document into a map keyed
/// by its `id` attribute (§4.4). A `Commentary` with no `id` is dropped —
/// it can't be referenced by any provision's `Commentaryref`, so it carries
/// no information this model can use downstream.
pub fn collect_commentaries(root: &Element) -> BTreeMap<String, Commentary> {
    root.find_all("Commentary")
        .into_iter()
        .filter_map(|el| {
            let id = el.attr("id")?.to_string();
            let text = markdown::extract_text(el);
            Some((id.clone(), Commentary { id, text }))
        })
        .collect()
}

/// The ids a single provision element cites, read from any nested
/// `<Commentaryref ref="...">` elements.
pub fn referenced_ids(provision: &Element) -> Vec<String> {
    provision
        .find_all("Commentaryref")
        .into_iter()
        .filter_map(|el| el.attr("ref").map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_commentaries_keyed_by_id() {
        let xml = r#"
            <Body>
                <Commentary id="c1">Amended by SI 2020/1.</Commentary>
                <P1 id="s1"><Commentaryref ref="c1"/></P1>
            </Body>
        "#;
        let root = Element::parse_document(xml).unwrap();
        let map = collect_commentaries(&root);
        assert_eq!(map.len(), 1);
        assert_eq!(map["c1"].text, "Amended by SI 2020/1.");

        let section = root.find("P1").unwrap();
        assert_eq!(referenced_ids(section), vec!["c1".to_string()]);
    }

    #[test]
    fn commentary_without_id_is_dropped() {
        let xml = r#"<Body><Commentary>orphaned</Commentary></Body>"#;
        let root = Element::parse_document(xml).unwrap();
        assert!(collect_commentaries(&root).is_empty());
    }
}
