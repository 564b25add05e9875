//! CLML-style XML parser for legislation items (C4): selects between the UK
//! and EU-retained dialects and extracts a [`Document`](lexcorpus_model::Document)
//! plus its [`Section`](lexcorpus_model::Section)s from one item's XML
//! envelope.

mod amendment;
mod body;
mod commentary;
mod dom;
mod error;
mod eu;
mod explanatory_note;
mod markdown;
mod parse;
mod uk;

pub use amendment::parse_amendments;
pub use commentary::Commentary;
pub use dom::Element;
pub use error::{Error, Result};
pub use explanatory_note::parse_explanatory_notes;
pub use markdown::{extract_text, render_markdown};
pub use parse::{is_eu_retained, parse, ParsedDocument};
