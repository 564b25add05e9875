use std::env;

/// §4.5/§6.7 PDF-fallback configuration, following the same `from_env`
/// convention as every other lexcorpus crate family.
#[derive(Debug, Clone)]
pub struct Config {
    pub ocr_endpoint: String,
    pub ocr_model: String,
    pub authority_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_endpoint: String::new(),
            ocr_model: "document-ocr-v1".to_string(),
            authority_base: "https://www.legislation.gov.uk".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            ocr_endpoint: env::var("LEXCORPUS_PDF_OCR_ENDPOINT").unwrap_or(default.ocr_endpoint),
            ocr_model: env::var("LEXCORPUS_PDF_OCR_MODEL").unwrap_or(default.ocr_model),
            authority_base: env::var("LEXCORPUS_AUTHORITY_BASE_URL").unwrap_or(default.authority_base),
        }
    }
}
