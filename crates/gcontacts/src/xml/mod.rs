//! Atom XML in both directions.
//!
//! Most endpoints answer in JSON, but batch responses are XML;
//! [`parse_as_if_alt_json`] turns them into the same
//! [`Record`](crate::record::Record) shape. Create and update payloads are
//! built as [`Element`] trees by [`entry`].

pub mod entry;
mod parse;
mod write;

pub use parse::parse_as_if_alt_json;
pub use write::{Element, clean_text};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const GD_NS: &str = "http://schemas.google.com/g/2005";
pub const GCONTACT_NS: &str = "http://schemas.google.com/contact/2008";
pub const BATCH_NS: &str = "http://schemas.google.com/gdata/batch";

/// Category scheme identifying the entry kind.
pub const KIND_SCHEME: &str = "http://schemas.google.com/g/2005#kind";
pub const CONTACT_KIND: &str = "http://schemas.google.com/contact/2008#contact";
pub const GROUP_KIND: &str = "http://schemas.google.com/contact/2008#group";
