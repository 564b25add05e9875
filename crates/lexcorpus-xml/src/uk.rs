use crate::body::BodyShape;

/// Tag vocabulary for the default (non-EU-retained) CLML dialect used by UK
/// primary and secondary legislation: sections are `P1` elements under
/// `Body`, schedules are `Schedule` elements under `Schedules`.
pub const SHAPE: BodyShape = BodyShape {
    section_container: "Body",
    section_tag: "P1",
    schedule_container: "Schedules",
    schedule_tag: "Schedule",
    extent_attr: "RestrictExtent",
    title_tag: "Title",
};
