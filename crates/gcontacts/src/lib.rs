//! Client for the contacts and groups feeds.
//!
//! This crate reads the feeds in their JSON rendering and writes
//! create/update payloads in the provider's Atom XML dialect:
//!
//! - [`User`] - Entry point: listings, single-entity calls and batching
//! - [`Contact`] / [`Group`] - Entities with derived accessors and mutations
//! - [`ResultSet`] - One page of a feed with its paging counters
//! - [`Record`] - The generic parsed form of a feed object
//! - [`BatchQueue`] - Batched creates and updates with per-entry statuses
//! - [`Transport`] - The HTTP seam; [`ReqwestTransport`] by default
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   JSON feed    ┌──────────────┐   Record    ┌───────────────┐
//! │  Transport   │ ─────────────▶ │     Api      │ ──────────▶ │ Contact/Group │
//! └──────────────┘                └──────────────┘             └───────┬───────┘
//!        ▲                                ▲                            │ changes
//!        │        Atom XML (batch feed)   │                            ▼
//!        └────────────────────────────────┴──────────────────── xml::entry
//! ```
//!
//! Batch responses come back as XML even when everything else is JSON;
//! [`xml::parse_as_if_alt_json`] turns them into the same [`Record`] shape.
//!
//! # Example
//!
//! ```ignore
//! use gcontacts::{ContactChanges, Entity, ReqwestTransport, User};
//!
//! let mut user = User::new(ReqwestTransport::new(access_token)?);
//! let mut contact = user.get_contact("6b70f8bb0372c")?;
//! contact.send_update(Some(ContactChanges::new().given_name("Johnny")))?;
//! ```

pub mod api;
pub mod batch;
pub mod changes;
pub mod config;
pub mod contact;
pub mod entity;
pub mod error;
pub mod format;
pub mod group;
pub mod record;
pub mod result_set;
pub mod transport;
pub mod user;
pub mod xml;

#[cfg(test)]
mod fixtures;

pub use api::{Api, QueryParams};
pub use batch::{BATCH_SIZE, BatchCallback, BatchQueue, BatchStatus};
pub use changes::{ContactAttrs, ContactChanges, GroupAttrs};
pub use config::ApiConfig;
pub use contact::{Contact, PhotoData};
pub use entity::Entity;
pub use error::{ContactsError, ContactsErrorCode, ContactsResult};
pub use format::{Birthday, EntityAttrs, GroupMembership};
pub use group::Group;
pub use record::{Field, Record, Value};
pub use result_set::{ContactSet, GroupSet, ResultSet};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use user::User;

pub use gcontacts_core::{Clock, ManualClock, SystemClock};
