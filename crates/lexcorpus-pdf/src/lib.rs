//! PDF/OCR fallback path (C5): for items whose XML envelope has no usable
//! body, locates the resources page's PDF, runs it through an external OCR
//! extractor, and converts the result into the same `Document`/`Section`
//! shape the XML parser produces.

mod config;
mod error;
mod link;
mod ocr;
mod trigger;

pub use config::Config;
pub use error::{Error, Result};
pub use link::{extract_pdf_url, MIN_VALID_TEXT_LENGTH};
pub use ocr::{FallbackClient, OcrExtraction, OcrSection};
pub use trigger::needs_pdf_fallback;
