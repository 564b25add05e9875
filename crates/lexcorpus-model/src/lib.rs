//! The normalized document model shared by every lexcorpus crate: typed ids,
//! the closed enumerations of §3, and the `Document`/`Section`/`Amendment`/
//! `ExplanatoryNote` entities themselves.

mod amendment;
mod document;
mod enums;
mod explanatory_note;
mod id;
mod provenance;
mod section;

pub use amendment::Amendment;
pub use document::Document;
pub use enums::{describe_extent_set, Category, DocType, Extent, ProvisionType};
pub use explanatory_note::ExplanatoryNote;
pub use id::{DocumentId, IdError};
pub use provenance::{Provenance, ProvenanceSource};
pub use section::Section;
