use crate::body::BodyShape;

/// Tag vocabulary for the EU-retained dialect, selected when an
/// `EURetained` marker element is present anywhere in the document (§4.4).
/// Articles stand in for sections, annexes for schedules.
pub const SHAPE: BodyShape = BodyShape {
    section_container: "Body",
    section_tag: "Article",
    schedule_container: "Annexes",
    schedule_tag: "Annex",
    extent_attr: "RestrictExtent",
    title_tag: "Title",
};
