use chrono::{NaiveDate, Utc};

use lexcorpus_model::{Category, DocType, Document, DocumentId, Extent, Provenance, Section};

use crate::body::{self, BodyShape};
use crate::commentary;
use crate::dom::Element;
use crate::error::{Error, Result};
use crate::markdown;
use crate::{eu, uk};

/// The outcome of parsing one legislation item's XML envelope: the parent
/// [`Document`] plus all of its citable [`Section`]s (§4.4).
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Document,
    pub sections: Vec<Section>,
}

/// Parses a single XML envelope. `fallback_id` is the id the caller already
/// derived from the item's canonical listing URL (§4.3); it's used only
/// when the document's own `dc:identifier` is missing or fails to parse —
/// the in-document value is preferred whenever it's present, since it's
/// closer to the source of truth than a URL the enumerator guessed at.
pub fn parse(xml: &str, fallback_id: &DocumentId, authority_base: &str) -> Result<ParsedDocument> {
    let root = Element::parse_document(xml)?;
    let metadata = root.find("Metadata").ok_or(Error::MissingField("Metadata"))?;

    let id = metadata
        .find("dc:identifier")
        .map(|el| el.text())
        .and_then(|text| parse_identifier(&text))
        .unwrap_or_else(|| fallback_id.clone());

    let (doc_type_tag, year, number) = id.split_head().map_err(|_| Error::UnresolvableId)?;
    let doc_type = DocType::from_tag(doc_type_tag);
    let number = number.to_string();

    let title = metadata.find("dc:title").map(markdown::extract_text).unwrap_or_default();
    let description = metadata
        .find("dc:description")
        .map(markdown::extract_text)
        .unwrap_or_default();

    let enactment_date = metadata
        .find("ukm:EnactmentDate")
        .and_then(|el| el.attr("Date"))
        .and_then(parse_date);

    let status = metadata
        .find("ukm:DocumentStatus")
        .and_then(|el| el.attr("Value"))
        .unwrap_or_default()
        .to_string();

    // §3 I5: category is derivable from type; an explicit tag that
    // disagrees is kept (the explicit value wins) but logged.
    let explicit_category = metadata
        .find("ukm:DocumentCategory")
        .and_then(|el| el.attr("Value"))
        .and_then(category_from_tag);
    let (category, conflicted) = match explicit_category {
        Some(explicit) => Document::reconcile_category(explicit, &doc_type),
        None => (doc_type.derived_category(), false),
    };
    if conflicted {
        tracing::warn!(id = %id, "explicit category disagrees with type-derived category, keeping explicit");
    }

    let document_extent = metadata
        .find("ukm:RestrictExtent")
        .and_then(|el| el.attr("Extent"))
        .map(Extent::parse_set)
        .unwrap_or_default();

    let commentaries = commentary::collect_commentaries(&root);

    // §4.4: dialect selection is a single deterministic predicate evaluated
    // once, before either parser runs — there is no scenario where both
    // run against the same document.
    let shape: &BodyShape = if is_eu_retained(&root) { &eu::SHAPE } else { &uk::SHAPE };
    let sections = body::parse_body(&root, &id, authority_base, &document_extent, &commentaries, shape);

    let document = Document {
        uri: id.canonical_uri(authority_base),
        id: id.clone(),
        title,
        description,
        enactment_date,
        category,
        doc_type,
        year,
        number,
        status,
        extent: document_extent,
        provision_count: sections.len() as u32,
        modified_date: Utc::now(),
        provenance: Some(Provenance::xml()),
    };

    if let Err(err) = document.check_type_consistency() {
        tracing::warn!(id = %document.id, %err, "document id disagrees with its own type field");
    }

    Ok(ParsedDocument { document, sections })
}

/// Whether this document uses the EU-retained dialect (§4.4's sole dialect
/// switch): presence of an `EURetained` element anywhere in the tree.
pub fn is_eu_retained(root: &Element) -> bool {
    root.find("EURetained").is_some()
}

fn parse_identifier(identifier: &str) -> Option<DocumentId> {
    identifier
        .trim()
        .trim_start_matches("http://www.legislation.gov.uk/id/")
        .trim_start_matches("https://www.legislation.gov.uk/id/")
        .parse()
        .ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn category_from_tag(tag: &str) -> Option<Category> {
    match tag {
        "primary" => Some(Category::Primary),
        "secondary" => Some(Category::Secondary),
        "european" | "eu" => Some(Category::European),
        "retained" => Some(Category::Retained),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_xml(identifier: &str, extra_body: &str) -> String {
        format!(
            r#"<Legislation>
                <Metadata>
                    <dc:identifier>http://www.legislation.gov.uk/id/{identifier}</dc:identifier>
                    <dc:title>Companies Act 2006</dc:title>
                    <dc:description>An Act to reform company law.</dc:description>
                    <ukm:EnactmentDate Date="2006-11-08"/>
                    <ukm:DocumentStatus Value="revised"/>
                    <ukm:DocumentCategory Value="primary"/>
                    <ukm:RestrictExtent Extent="E+W+S+N.I."/>
                </Metadata>
                {extra_body}
            </Legislation>"#
        )
    }

    #[test]
    fn parses_metadata_and_sections_for_uk_dialect() {
        let xml = sample_xml(
            "ukpga/2006/46",
            r#"<Body><Part RestrictExtent="E+W"><Pblock><P1 id="section-1">
                <Pnumber>1</Pnumber>
                <Title>Formation</Title>
                <P1para>The company is formed.</P1para>
            </P1></Pblock></Part></Body>"#,
        );
        let fallback = DocumentId::new("ukpga", 2006, "46");
        let parsed = parse(&xml, &fallback, "https://www.legislation.gov.uk").unwrap();

        assert_eq!(parsed.document.title, "Companies Act 2006");
        assert_eq!(parsed.document.year, 2006);
        assert_eq!(parsed.document.category, Category::Primary);
        assert_eq!(parsed.document.extent.len(), 4);
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.sections[0].extent, vec![Extent::England, Extent::Wales]);
    }

    #[test]
    fn eu_retained_marker_switches_to_article_dialect() {
        let xml = sample_xml(
            "eur/2006/46",
            r#"<EURetained/><Body><Article id="article-1">
                <Title>Scope</Title>
                <Paragraph>This Regulation applies to retained instruments.</Paragraph>
            </Article></Body>"#,
        );
        let fallback = DocumentId::new("eur", 2006, "46");
        let parsed = parse(&xml, &fallback, "https://www.legislation.gov.uk").unwrap();
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.document.doc_type, DocType::Eur);
        assert_eq!(parsed.sections[0].id.as_str(), "eur/2006/46/section/1");
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let xml = "<Legislation><Body/></Legislation>";
        let fallback = DocumentId::new("ukpga", 2006, "46");
        assert!(parse(xml, &fallback, "https://www.legislation.gov.uk").is_err());
    }

    #[test]
    fn falls_back_to_caller_supplied_id_when_identifier_missing() {
        let xml = r#"<Legislation><Metadata><dc:title>Untitled</dc:title></Metadata><Body/></Legislation>"#;
        let fallback = DocumentId::new("uksi", 2020, "5");
        let parsed = parse(xml, &fallback, "https://www.legislation.gov.uk").unwrap();
        assert_eq!(parsed.document.id.as_str(), "uksi/2020/5");
    }
}
