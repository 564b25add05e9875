use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The closed enumeration of legislation types recognized by the authority
/// portal, each with a historical active year range. Only a representative
/// subset of the ~28 upstream tags is modeled explicitly; unrecognized tags
/// deserialize into [`DocType::Other`] rather than failing, since new types
/// are occasionally added upstream and this is not this crate's authority to
/// validate against.
///
/// `Serialize`/`Deserialize` are implemented by hand (below) rather than
/// derived, since mixing fixed variants with an open `Other(String)` fallback
/// isn't expressible with `#[serde(untagged)]` on a single variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocType {
    /// UK Public General Act.
    Ukpga,
    /// UK Local Act.
    Ukla,
    /// UK Statutory Instrument.
    Uksi,
    /// UK Church Instrument.
    Ukci,
    /// Act of the Scottish Parliament.
    Asp,
    /// Scottish Statutory Instrument.
    Ssi,
    /// Act of Senedd Cymru (Welsh Parliament).
    Asc,
    /// Welsh Statutory Instrument.
    Wsi,
    /// Act of the Northern Ireland Assembly.
    Nia,
    /// Northern Ireland Statutory Rule.
    Nisr,
    /// Northern Ireland Order in Council.
    Nisi,
    /// UK Church Measure.
    Ukcm,
    /// EU-derived / EU-retained instrument.
    Eur,
    /// EU decision, retained.
    Eudn,
    /// EU directive, retained.
    Eudr,
    /// Any recognized-but-unmodeled tag, carried verbatim.
    Other(String),
}

impl Serialize for DocType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(DocType::from_tag(&tag))
    }
}

impl JsonSchema for DocType {
    fn schema_name() -> String {
        "DocType".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        // The fixed tags plus the open `Other` escape hatch (§3) both
        // serialize as a bare lowercase string, so the schema is just
        // `String` rather than an enum of literals.
        String::json_schema(gen)
    }
}

impl DocType {
    /// The canonical lowercase path segment, as used in `DocumentId`.
    pub fn as_str(&self) -> &str {
        match self {
            DocType::Ukpga => "ukpga",
            DocType::Ukla => "ukla",
            DocType::Uksi => "uksi",
            DocType::Ukci => "ukci",
            DocType::Asp => "asp",
            DocType::Ssi => "ssi",
            DocType::Asc => "asc",
            DocType::Wsi => "wsi",
            DocType::Nia => "nia",
            DocType::Nisr => "nisr",
            DocType::Nisi => "nisi",
            DocType::Ukcm => "ukcm",
            DocType::Eur => "eur",
            DocType::Eudn => "eudn",
            DocType::Eudr => "eudr",
            DocType::Other(tag) => tag.as_str(),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ukpga" => DocType::Ukpga,
            "ukla" => DocType::Ukla,
            "uksi" => DocType::Uksi,
            "ukci" => DocType::Ukci,
            "asp" => DocType::Asp,
            "ssi" => DocType::Ssi,
            "asc" => DocType::Asc,
            "wsi" => DocType::Wsi,
            "nia" => DocType::Nia,
            "nisr" => DocType::Nisr,
            "nisi" => DocType::Nisi,
            "ukcm" => DocType::Ukcm,
            "eur" => DocType::Eur,
            "eudn" => DocType::Eudn,
            "eudr" => DocType::Eudr,
            other => DocType::Other(other.to_string()),
        }
    }

    /// The historical active year range for this type, inclusive. `None`
    /// upper bound means "still active". Used by the Source Enumerator
    /// (§4.3) to skip combinations outside a type's known lifetime.
    pub fn active_years(&self) -> (i32, Option<i32>) {
        match self {
            DocType::Ukpga => (1235, None),
            DocType::Ukla => (1797, None),
            DocType::Uksi => (1948, None),
            DocType::Ukci => (1966, None),
            DocType::Asp => (1999, None),
            DocType::Ssi => (1999, None),
            DocType::Asc => (2020, None),
            DocType::Wsi => (1999, None),
            DocType::Nia => (2000, None),
            DocType::Nisr => (2000, None),
            DocType::Nisi => (1972, None),
            DocType::Ukcm => (1920, None),
            DocType::Eur | DocType::Eudn | DocType::Eudr => (1952, Some(2020)),
            DocType::Other(_) => (1000, None),
        }
    }

    pub fn is_active_in(&self, year: i32) -> bool {
        let (from, to) = self.active_years();
        year >= from && to.map_or(true, |to| year <= to)
    }

    /// §3 I5: the category derivable from type via a fixed table.
    pub fn derived_category(&self) -> Category {
        match self {
            DocType::Ukpga | DocType::Ukla => Category::Primary,
            DocType::Asp | DocType::Asc | DocType::Nia => Category::Primary,
            DocType::Uksi
            | DocType::Ukci
            | DocType::Ssi
            | DocType::Wsi
            | DocType::Nisr
            | DocType::Nisi
            | DocType::Ukcm => Category::Secondary,
            DocType::Eur | DocType::Eudn | DocType::Eudr => Category::European,
            DocType::Other(_) => Category::Secondary,
        }
    }
}

/// §3: category of a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Primary,
    Secondary,
    European,
    Retained,
}

/// §3/§4.4: jurisdictional applicability, mapped from the compact extent
/// code (`E`, `W`, `S`, `N.I.`, or a `+`-joined combination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Extent {
    England,
    Wales,
    Scotland,
    NorthernIreland,
}

impl Extent {
    fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "E" => Some(Extent::England),
            "W" => Some(Extent::Wales),
            "S" => Some(Extent::Scotland),
            "N.I." | "NI" => Some(Extent::NorthernIreland),
            _ => None,
        }
    }

    /// Parses a compact extent code such as `E+W+S+N.I.` into its set of
    /// jurisdictions, sorted and deduplicated. `E+W+S+N.I.` is recognized as
    /// shorthand for the whole United Kingdom but still expands to all four
    /// values; callers that want the "United Kingdom" label should use
    /// [`describe_extent_set`].
    pub fn parse_set(code: &str) -> Vec<Extent> {
        let mut out: Vec<Extent> = code
            .split('+')
            .filter_map(Extent::from_code)
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Renders an extent set as a human label, collapsing the full four-nation
/// set to "United Kingdom" per §4.4.
pub fn describe_extent_set(extents: &[Extent]) -> String {
    let mut sorted = extents.to_vec();
    sorted.sort();
    sorted.dedup();
    if sorted
        == [
            Extent::England,
            Extent::Wales,
            Extent::Scotland,
            Extent::NorthernIreland,
        ]
    {
        return "United Kingdom".to_string();
    }
    sorted
        .iter()
        .map(|e| match e {
            Extent::England => "England",
            Extent::Wales => "Wales",
            Extent::Scotland => "Scotland",
            Extent::NorthernIreland => "Northern Ireland",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// §3: whether a [`crate::Section`] is a body section or a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionType {
    Section,
    Schedule,
}

impl ProvisionType {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ProvisionType::Section => "section",
            ProvisionType::Schedule => "schedule",
        }
    }
}
