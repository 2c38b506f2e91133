//! Sharing domain - the visibility registry.
//!
//! A [`Share`] publishes one contact under a [`Visibility`] policy with
//! field-level allow and deny lists. [`filtered_fields`] is the single
//! projection used for previews and purchase snapshots alike.

mod field;
mod projection;
mod share;
mod token;
mod visibility;

pub use field::{default_visible_fields, parse_field_set, ContactField, FieldSet};
pub use projection::{filtered_fields, ContactFields, ContactSnapshot, Provenance, UNNAMED_CONTACT};
pub use share::{Share, ShareSettings, MAX_DESCRIPTION_CHARS};
pub use token::{deep_link, AccessToken};
pub use visibility::Visibility;
