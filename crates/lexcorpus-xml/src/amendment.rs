use lexcorpus_model::{Amendment, DocumentId};

use crate::dom::Element;
use crate::error::{Error, Result};

/// Parses the amendments feed for a single `(type, year)` combination: a
/// flat list of `<Amendment>` records, each citing the provision it changes
/// and (optionally) the provision that made the change. Shares the same
/// `Element`-tree walk as the legislation parser (§4.4) but the amendments
/// feed has no body/section structure of its own to extract.
pub fn parse_amendments(xml: &str, fallback_affecting_year: i32) -> Result<Vec<Amendment>> {
    let root = Element::parse_document(xml)?;
    root.find_all("Amendment")
        .into_iter()
        .map(|el| parse_one(el, fallback_affecting_year))
        .collect()
}

fn parse_one(el: &Element, fallback_affecting_year: i32) -> Result<Amendment> {
    let id_attr = el.attr("id").ok_or(Error::MissingField("id"))?;
    let id: DocumentId = id_attr.parse().map_err(|_| Error::UnresolvableId)?;

    let changed_document_id = el
        .find("AffectedProvisions")
        .and_then(|p| p.find("AffectedProvision"))
        .and_then(|p| p.attr("URI"))
        .and_then(parse_id_from_uri)
        .ok_or(Error::MissingField("AffectedProvision"))?;

    let changed_provision_url = el
        .find("AffectedProvisions")
        .and_then(|p| p.find("AffectedProvision"))
        .and_then(|p| p.attr("URI"))
        .map(str::to_string);

    let affecting_document_id = el
        .find("AffectingProvisions")
        .and_then(|p| p.find("AffectingProvision"))
        .and_then(|p| p.attr("URI"))
        .and_then(parse_id_from_uri);

    let affecting_provision_url = el
        .find("AffectingProvisions")
        .and_then(|p| p.find("AffectingProvision"))
        .and_then(|p| p.attr("URI"))
        .map(str::to_string);

    let type_of_effect = el.find("TypeOfEffect").map(|e| e.text()).unwrap_or_default();

    let affecting_year = el
        .find("AffectingYear")
        .map(|e| e.text())
        .and_then(|t| t.parse().ok())
        .or_else(|| affecting_document_id.as_ref().and_then(|id| id.parent_year().ok()))
        .unwrap_or(fallback_affecting_year);

    Ok(Amendment {
        id,
        changed_document_id,
        changed_provision_url,
        affecting_document_id,
        affecting_provision_url,
        type_of_effect,
        affecting_year,
    })
}

/// A provision URI like `.../id/ukpga/2006/46/section/1` resolves to the
/// `DocumentId` of its parent document — the amendment manifest's change
/// target is always a document id, never a provision-suffixed one (§4.9).
fn parse_id_from_uri(uri: &str) -> Option<DocumentId> {
    let tail = uri
        .trim()
        .trim_start_matches("http://www.legislation.gov.uk/id/")
        .trim_start_matches("https://www.legislation.gov.uk/id/");
    let id: DocumentId = tail.parse().ok()?;
    let (doc_type, year, number) = id.split_head().ok()?;
    Some(DocumentId::new(doc_type, year, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amendment_with_both_sides() {
        let xml = r#"<Legislation><Amendments>
            <Amendment id="amendment-1">
                <AffectedProvisions><AffectedProvision URI="http://www.legislation.gov.uk/id/ukpga/2006/46/section/1"/></AffectedProvisions>
                <AffectingProvisions><AffectingProvision URI="http://www.legislation.gov.uk/id/ukpga/2020/1/section/2"/></AffectingProvisions>
                <TypeOfEffect>words substituted</TypeOfEffect>
                <AffectingYear>2020</AffectingYear>
            </Amendment>
        </Amendments></Legislation>"#;
        let amendments = parse_amendments(xml, 2020).unwrap();
        assert_eq!(amendments.len(), 1);
        assert_eq!(amendments[0].changed_document_id.as_str(), "ukpga/2006/46");
        assert_eq!(amendments[0].affecting_document_id.as_ref().unwrap().as_str(), "ukpga/2020/1");
        assert_eq!(amendments[0].type_of_effect, "words substituted");
        assert_eq!(amendments[0].affecting_year, 2020);
    }

    #[test]
    fn falls_back_to_affecting_document_year_when_year_element_missing() {
        let xml = r#"<Legislation><Amendments>
            <Amendment id="amendment-2">
                <AffectedProvisions><AffectedProvision URI="http://www.legislation.gov.uk/id/ukpga/2006/46"/></AffectedProvisions>
                <AffectingProvisions><AffectingProvision URI="http://www.legislation.gov.uk/id/uksi/2021/5"/></AffectingProvisions>
                <TypeOfEffect>repealed</TypeOfEffect>
            </Amendment>
        </Amendments></Legislation>"#;
        let amendments = parse_amendments(xml, 1999).unwrap();
        assert_eq!(amendments[0].affecting_year, 2021);
    }

    #[test]
    fn missing_affected_provision_is_an_error() {
        let xml = r#"<Legislation><Amendments><Amendment id="amendment-3"><TypeOfEffect>repealed</TypeOfEffect></Amendment></Amendments></Legislation>"#;
        assert!(parse_amendments(xml, 2020).is_err());
    }
}
