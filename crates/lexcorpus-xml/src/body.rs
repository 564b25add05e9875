use std::collections::BTreeMap;

use lexcorpus_model::{DocumentId, Extent, Provenance, ProvisionType, Section};

use crate::commentary::{self, Commentary};
use crate::dom::Element;
use crate::markdown;

/// Dialect-specific tag vocabulary for walking a document body into citable
/// [`Section`]s (§4.4). UK CLML documents number sections as `P1` elements
/// and schedules as `Schedule`; EU-retained instruments number articles as
/// `Article` and annexes as `Annex`. Everything else about the walk —
/// extent inheritance, commentary references, number derivation — is
/// shared between dialects.
pub struct BodyShape {
    pub section_container: &'static str,
    pub section_tag: &'static str,
    pub schedule_container: &'static str,
    pub schedule_tag: &'static str,
    pub extent_attr: &'static str,
    pub title_tag: &'static str,
}

/// Walks `root` into its citable sections and schedules, given the
/// document-level extent as the root of the extent-inheritance chain.
pub fn parse_body(
    root: &Element,
    doc_id: &DocumentId,
    authority_base: &str,
    document_extent: &[Extent],
    commentaries: &BTreeMap<String, Commentary>,
    shape: &BodyShape,
) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(container) = root.find(shape.section_container) {
        walk(
            container,
            doc_id,
            authority_base,
            document_extent,
            ProvisionType::Section,
            &mut sections,
            commentaries,
            shape,
        );
    }

    if let Some(container) = root.find(shape.schedule_container) {
        for schedule in container.child_elements().filter(|e| e.name == shape.schedule_tag) {
            if let Some(section) = build_provision(
                schedule,
                doc_id,
                authority_base,
                document_extent,
                ProvisionType::Schedule,
                commentaries,
                shape,
            ) {
                sections.push(section);
            }
        }
    }

    sections
}

/// Recursively walks a body/part subtree. A `Part`-level extent override
/// (§4.4: "every citable section/schedule inherits the nearest enclosing
/// Part's extent unless it overrides it") applies to every provision
/// beneath it until a deeper override replaces it.
fn walk(
    el: &Element,
    doc_id: &DocumentId,
    authority_base: &str,
    inherited_extent: &[Extent],
    provision_type: ProvisionType,
    out: &mut Vec<Section>,
    commentaries: &BTreeMap<String, Commentary>,
    shape: &BodyShape,
) {
    let extent = own_extent(el, shape).unwrap_or_else(|| inherited_extent.to_vec());
    for child in el.child_elements() {
        if child.name == shape.section_tag {
            if let Some(section) = build_provision(
                child,
                doc_id,
                authority_base,
                &extent,
                provision_type,
                commentaries,
                shape,
            ) {
                out.push(section);
            }
        } else {
            walk(
                child,
                doc_id,
                authority_base,
                &extent,
                provision_type,
                out,
                commentaries,
                shape,
            );
        }
    }
}

fn own_extent(el: &Element, shape: &BodyShape) -> Option<Vec<Extent>> {
    el.attr(shape.extent_attr).map(Extent::parse_set)
}

fn build_provision(
    el: &Element,
    doc_id: &DocumentId,
    authority_base: &str,
    extent: &[Extent],
    provision_type: ProvisionType,
    commentaries: &BTreeMap<String, Commentary>,
    shape: &BodyShape,
) -> Option<Section> {
    let number = provision_number(el)?;
    let title = el
        .find(shape.title_tag)
        .map(markdown::extract_text)
        .unwrap_or_default();
    let text = markdown::render_markdown(el);
    let id = doc_id.child(provision_type, &number);
    let commentary_refs: Vec<String> = commentary::referenced_ids(el)
        .into_iter()
        .filter(|cid| commentaries.contains_key(cid))
        .collect();

    Some(Section {
        id: id.clone(),
        uri: id.canonical_uri(authority_base),
        parent_document_id: doc_id.clone(),
        title,
        text,
        extent: extent.to_vec(),
        provision_type,
        number: Some(number),
        provenance: Some(Provenance::xml()),
        commentary_refs,
    })
}

/// A provision's citable number, derived from the trailing segment of its
/// `id` attribute (`section-12` → `12`, `schedule-1` → `1`) — the original
/// parser's fallback chain ends here because the `id` attribute is the one
/// field every dialect reliably sets, while display-number elements
/// (`Pnumber`, `Number`) carry human-facing labels that don't always match
/// (a schedule's `<Number>` text reads `"SCHEDULE 1"`, not `"1"`).
fn provision_number(el: &Element) -> Option<String> {
    el.attr("id").and_then(|id| id.rsplit('-').next()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uk;

    #[test]
    fn walks_sections_inheriting_part_extent() {
        let xml = r#"
            <Legislation>
                <Body>
                    <Part RestrictExtent="E+W">
                        <Pblock>
                            <P1 id="section-1">
                                <Pnumber>1</Pnumber>
                                <Title>Formation</Title>
                                <P1para>The company is formed.</P1para>
                            </P1>
                        </Pblock>
                    </Part>
                </Body>
            </Legislation>
        "#;
        let root = Element::parse_document(xml).unwrap();
        let doc_id = DocumentId::new("ukpga", 2006, "46");
        let sections = parse_body(&root, &doc_id, "https://www.legislation.gov.uk", &[], &BTreeMap::new(), &uk::SHAPE);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].number.as_deref(), Some("1"));
        assert_eq!(sections[0].title, "Formation");
        assert_eq!(sections[0].text, "The company is formed.");
        assert_eq!(sections[0].extent, vec![Extent::England, Extent::Wales]);
        assert_eq!(sections[0].id.as_str(), "ukpga/2006/46/section/1");
    }

    #[test]
    fn falls_back_to_number_derived_from_id_when_no_pnumber() {
        let xml = r#"<Legislation><Body><P1 id="section-7"><P1para>text</P1para></P1></Body></Legislation>"#;
        let root = Element::parse_document(xml).unwrap();
        let doc_id = DocumentId::new("ukpga", 2006, "46");
        let sections = parse_body(&root, &doc_id, "https://www.legislation.gov.uk", &[], &BTreeMap::new(), &uk::SHAPE);
        assert_eq!(sections[0].number.as_deref(), Some("7"));
    }

    #[test]
    fn schedules_are_collected_as_schedule_provisions() {
        let xml = r#"
            <Legislation>
                <Schedules>
                    <Schedule id="schedule-1">
                        <Number>SCHEDULE 1</Number>
                        <Title>Transitional Provisions</Title>
                        <Text>details</Text>
                    </Schedule>
                </Schedules>
            </Legislation>
        "#;
        let root = Element::parse_document(xml).unwrap();
        let doc_id = DocumentId::new("ukpga", 2006, "46");
        let sections = parse_body(&root, &doc_id, "https://www.legislation.gov.uk", &[], &BTreeMap::new(), &uk::SHAPE);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].provision_type, ProvisionType::Schedule);
        assert_eq!(sections[0].id.as_str(), "ukpga/2006/46/schedule/1");
    }

    #[test]
    fn commentary_refs_are_attached_when_known() {
        let xml = r#"
            <Legislation>
                <Body>
                    <P1 id="section-1">
                        <Pnumber>1</Pnumber>
                        <P1para>text <Commentaryref ref="c1"/></P1para>
                    </P1>
                </Body>
            </Legislation>
        "#;
        let root = Element::parse_document(xml).unwrap();
        let doc_id = DocumentId::new("ukpga", 2006, "46");
        let mut commentaries = BTreeMap::new();
        commentaries.insert(
            "c1".to_string(),
            Commentary {
                id: "c1".to_string(),
                text: "Amended".to_string(),
            },
        );
        let sections = parse_body(&root, &doc_id, "https://www.legislation.gov.uk", &[], &commentaries, &uk::SHAPE);
        assert_eq!(sections[0].commentary_refs, vec!["c1".to_string()]);
    }
}
