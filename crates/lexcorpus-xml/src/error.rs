/// Error kinds raised while parsing a legislation item's XML envelope (§4.4,
/// §7). A parse failure here is always item-scoped — the caller (the
/// orchestrator's ingest stage) decides whether to fall back to the PDF
/// path or record the item as failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed XML")]
    Xml(#[from] quick_xml::Error),
    #[error("document has no root element")]
    NoRootElement,
    #[error("missing required field {0:?}")]
    MissingField(&'static str),
    #[error("could not derive a document id from the source URI")]
    UnresolvableId,
}

pub type Result<T> = std::result::Result<T, Error>;
