//! Entry point for one authenticated account.

use chrono::{DateTime, TimeZone};
use gcontacts_core::format_time_for_xml;
use tracing::info;

use crate::api::{Api, QueryParams, ensure_success, id_path};
use crate::batch::{self, BatchQueue, BatchStatus};
use crate::changes::{ContactAttrs, GroupAttrs};
use crate::contact::{CONTACTS_PATH, Contact};
use crate::error::ContactsResult;
use crate::group::{GROUPS_PATH, GROUPS_PROTOCOL_VERSION, Group};
use crate::result_set::{self, ContactSet, GroupSet};
use crate::transport::Transport;

/// The contacts and groups of the account behind a transport.
///
/// Listings are cached after the first call; the `reload_*` methods refetch
/// them.
#[derive(Debug)]
pub struct User {
    api: Api,
    contacts: Option<ContactSet>,
    groups: Option<GroupSet>,
    batch: BatchQueue,
}

impl User {
    /// Creates a user over an authenticated transport with the default
    /// configuration.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_api(Api::new(transport))
    }

    /// Creates a user over a configured client.
    pub fn from_api(api: Api) -> Self {
        Self {
            api,
            contacts: None,
            groups: None,
            batch: BatchQueue::new(),
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    /// One uncached page of contacts.
    pub fn get_contacts(&self, params: &QueryParams) -> ContactsResult<ContactSet> {
        result_set::fetch(&self.api, CONTACTS_PATH, params)
    }

    /// All contacts, fetched on first call and cached.
    pub fn contacts(&mut self) -> ContactsResult<&ContactSet> {
        if self.contacts.is_none() {
            return self.reload_contacts();
        }
        Ok(self.contacts.get_or_insert_with(ContactSet::empty))
    }

    /// Drops the cached contacts and fetches them again.
    pub fn reload_contacts(&mut self) -> ContactsResult<&ContactSet> {
        let set = self.get_contacts(&QueryParams::new())?;
        Ok(self.contacts.insert(set))
    }

    /// One uncached page of groups, requested with protocol version 2
    /// unless `params` sets `v`.
    pub fn get_groups(&self, params: &QueryParams) -> ContactsResult<GroupSet> {
        let mut params = params.clone();
        params.set_default("v", GROUPS_PROTOCOL_VERSION);
        result_set::fetch(&self.api, GROUPS_PATH, &params)
    }

    /// All groups, fetched on first call and cached.
    pub fn groups(&mut self) -> ContactsResult<&GroupSet> {
        if self.groups.is_none() {
            return self.reload_groups();
        }
        Ok(self.groups.get_or_insert_with(GroupSet::empty))
    }

    /// Drops the cached groups and fetches them again.
    pub fn reload_groups(&mut self) -> ContactsResult<&GroupSet> {
        let set = self.get_groups(&QueryParams::new())?;
        Ok(self.groups.insert(set))
    }

    /// Full-text search over contacts.
    pub fn query_contacts(&self, query: &str) -> ContactsResult<ContactSet> {
        self.get_contacts(&QueryParams::from([("q", query)]))
    }

    /// Contacts changed since `time`, deletions included.
    pub fn contacts_updated_min<Tz: TimeZone>(
        &self,
        time: &DateTime<Tz>,
    ) -> ContactsResult<ContactSet> {
        self.get_contacts(&QueryParams::from([(
            "updated-min",
            format_time_for_xml(time),
        )]))
    }

    /// Fetches a contact by id URL or bare id.
    pub fn get_contact(&self, id_or_url: &str) -> ContactsResult<Contact> {
        Contact::find(id_or_url, &self.api)
    }

    /// Creates a contact; see [`Contact::create`].
    pub fn create_contact(&self, attrs: &ContactAttrs) -> ContactsResult<Contact> {
        Contact::create(attrs, &self.api)
    }

    /// Deletes a contact by id URL. Without an etag the delete is
    /// unconditional.
    pub fn delete_contact(&self, id_url: &str, etag: Option<&str>) -> ContactsResult<()> {
        let response = self.api.delete(
            &id_path(id_url),
            &QueryParams::new(),
            &[("If-Match", etag.unwrap_or("*"))],
        )?;
        ensure_success(&response)?;
        info!(id = id_url, "deleted contact");
        Ok(())
    }

    /// Creates a group; see [`Group::create`].
    pub fn create_group(&self, attrs: &GroupAttrs) -> ContactsResult<Group> {
        Group::create(attrs, &self.api)
    }

    /// Queues a create or update; see [`BatchQueue::enqueue`].
    pub fn batch_create_or_update<F>(&mut self, contact: Contact, callback: F) -> ContactsResult<()>
    where
        F: FnOnce(Contact, Option<BatchStatus>) -> ContactsResult<()> + 'static,
    {
        self.batch.enqueue(&self.api, contact, callback)
    }

    /// Sends whatever is queued; see [`BatchQueue::flush`].
    pub fn send_batched_requests(&mut self) -> ContactsResult<()> {
        self.batch.flush(&self.api)
    }

    /// Sends `contacts` as one batch right away, retrying once on a server
    /// error.
    pub fn send_batch_with_retries(
        &self,
        contacts: &mut [Contact],
    ) -> ContactsResult<Vec<Option<BatchStatus>>> {
        batch::send_batch_with_retries(&self.api, contacts)
    }

    /// Sends `contacts` as one batch right away.
    pub fn send_batch_create_or_update(
        &self,
        contacts: &mut [Contact],
    ) -> ContactsResult<Vec<Option<BatchStatus>>> {
        batch::send_batch_create_or_update(&self.api, contacts)
    }

    /// Number of contacts queued for the next batch.
    pub fn pending_batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Body of the most recent queued batch request.
    pub fn last_batch_xml(&self) -> Option<&str> {
        self.batch.last_batch_xml()
    }
}
