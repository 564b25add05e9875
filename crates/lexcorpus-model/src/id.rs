use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;

/// A stable, content-addressable identifier of the form `<type>/<year>/<number>`,
/// with an optional `/section/<n>` or `/schedule/<n>` suffix.
///
/// Two equal `DocumentId`s denote the same logical document across every
/// collection. The normalized [`DocumentId::as_str`] form always omits the
/// authority host; [`DocumentId::canonical_uri`] reattaches it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("document id {0:?} must have at least <type>/<year>/<number>")]
    TooFewSegments(String),
    #[error("document id {0:?} has a non-numeric year segment")]
    NonNumericYear(String),
}

impl DocumentId {
    /// Builds an id from its required `type/year/number` segments.
    pub fn new(doc_type: &str, year: i32, number: &str) -> Self {
        Self(format!("{doc_type}/{year}/{number}"))
    }

    /// Builds a section-suffixed id, e.g. `ukpga/2006/46/section/1`.
    pub fn child(&self, provision: super::ProvisionType, number: &str) -> Self {
        Self(format!("{}/{}/{number}", self.0, provision.path_segment()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the id into its `(type, year, number)` head, ignoring any
    /// `/section/<n>` or `/schedule/<n>` suffix. See I2/§3: a Section's
    /// parent-type, parent-year, parent-number are derivable this way.
    pub fn split_head(&self) -> Result<(&str, i32, &str), IdError> {
        let mut parts = self.0.splitn(3, '/');
        let doc_type = parts
            .next()
            .ok_or_else(|| IdError::TooFewSegments(self.0.clone()))?;
        let year_str = parts
            .next()
            .ok_or_else(|| IdError::TooFewSegments(self.0.clone()))?;
        let rest = parts
            .next()
            .ok_or_else(|| IdError::TooFewSegments(self.0.clone()))?;
        let year: i32 = year_str
            .parse()
            .map_err(|_| IdError::NonNumericYear(self.0.clone()))?;
        // `rest` may itself contain a /section/<n> suffix; the number is the
        // leading segment up to the next '/'.
        let number = rest.split('/').next().unwrap_or(rest);
        Ok((doc_type, year, number))
    }

    pub fn parent_type(&self) -> Result<&str, IdError> {
        self.split_head().map(|(t, _, _)| t)
    }

    pub fn parent_year(&self) -> Result<i32, IdError> {
        self.split_head().map(|(_, y, _)| y)
    }

    pub fn parent_number(&self) -> Result<&str, IdError> {
        self.split_head().map(|(_, _, n)| n)
    }

    /// Prefixes the canonical authority URL, producing the normalized URI
    /// form used as `Document::uri` / `Section::uri`.
    pub fn canonical_uri(&self, authority_base: &str) -> String {
        format!("{}/id/{}", authority_base.trim_end_matches('/'), self.0)
    }

    /// The deterministic UUID used as the vector-store point key. Name-based
    /// (UUID v5) against a fixed namespace, so that re-ingesting the same
    /// logical document always derives the same key (I3).
    pub fn point_uuid(&self) -> uuid::Uuid {
        uuid::Uuid::new_v5(&POINT_NAMESPACE, self.0.as_bytes())
    }
}

/// Fixed namespace UUID for deriving point keys. Arbitrary but frozen: changing
/// it would silently break idempotency (P1) for every previously-ingested
/// document.
const POINT_NAMESPACE: uuid::Uuid = uuid::Uuid::from_bytes([
    0x6c, 0x65, 0x78, 0x63, 0x6f, 0x72, 0x70, 0x75, 0x73, 0x2d, 0x70, 0x6f, 0x69, 0x6e, 0x74, 0x00,
]);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({:?})", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.trim_matches('/').to_string());
        id.split_head()?; // validates shape eagerly
        Ok(id)
    }
}

impl JsonSchema for DocumentId {
    fn schema_name() -> String {
        "DocumentId".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

impl serde::Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_head_ignoring_section_suffix() {
        let id: DocumentId = "ukpga/2006/46/section/42".parse().unwrap();
        assert_eq!(id.parent_type().unwrap(), "ukpga");
        assert_eq!(id.parent_year().unwrap(), 2006);
        assert_eq!(id.parent_number().unwrap(), "46");
    }

    #[test]
    fn point_uuid_is_stable_across_instances() {
        let a: DocumentId = "ukpga/2006/46".parse().unwrap();
        let b = DocumentId::new("ukpga", 2006, "46");
        assert_eq!(a.point_uuid(), b.point_uuid());
    }

    #[test]
    fn rejects_too_few_segments() {
        assert!("ukpga/2006".parse::<DocumentId>().is_err());
    }

    #[test]
    fn canonical_uri_prefixes_authority() {
        let id = DocumentId::new("ukpga", 2006, "46");
        assert_eq!(
            id.canonical_uri("https://www.legislation.gov.uk/"),
            "https://www.legislation.gov.uk/id/ukpga/2006/46"
        );
    }
}
