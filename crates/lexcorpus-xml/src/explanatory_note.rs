use lexcorpus_model::{DocumentId, ExplanatoryNote};

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::markdown;

/// Parses a parent document's explanatory-notes envelope: an ordered list
/// of `<Note>` elements, each carrying a breadcrumb `<Route>` of headings
/// and its own plain-text body (§3). `order` is assigned positionally —
/// the feed itself carries no explicit ordinal, only document order.
pub fn parse_explanatory_notes(xml: &str, parent_document_id: &DocumentId) -> Result<Vec<ExplanatoryNote>> {
    let root = Element::parse_document(xml)?;
    root.find_all("Note")
        .into_iter()
        .enumerate()
        .map(|(order, el)| parse_one(el, parent_document_id, order as u32))
        .collect()
}

fn parse_one(el: &Element, parent_document_id: &DocumentId, order: u32) -> Result<ExplanatoryNote> {
    let id_attr = el.attr("id").ok_or(Error::MissingField("id"))?;
    let id = parent_document_id.child(lexcorpus_model::ProvisionType::Section, id_attr);

    let route = el
        .find("Route")
        .map(|r| r.find_all("Heading").iter().map(|h| h.text()).collect())
        .unwrap_or_default();

    let note_type = el.attr("type").unwrap_or("general").to_string();
    let section_type = el.attr("sectionType").unwrap_or("section").to_string();
    let section_number = el.attr("sectionNumber").map(str::to_string);
    let text = el.find("Text").map(markdown::extract_text).unwrap_or_default();

    Ok(ExplanatoryNote {
        id,
        parent_document_id: parent_document_id.clone(),
        route,
        order,
        note_type,
        section_type,
        section_number,
        text,
    })
}
