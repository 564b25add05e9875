//! Pure enumerator (C3): source-side URL discovery, split from any parsing
//! or upsert concern per SPEC_FULL.md's "long-lived iterators with side
//! effects" redesign flag. [`enumerate`] yields canonical item XML URLs for
//! a (doc-type × year) combination; it performs the listing-page HTTP calls
//! needed to discover those URLs but never fetches the item XML itself.

mod enumerate;
mod error;
mod listing;

pub use enumerate::enumerate;
pub use error::{Error, Result};
pub use listing::{ListingClient, ListingRequest};
