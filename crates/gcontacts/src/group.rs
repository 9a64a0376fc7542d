//! Contact groups.

use tracing::info;

use crate::api::{ATOM_CONTENT_TYPE, Api, QueryParams, ensure_success};
use crate::changes::GroupAttrs;
use crate::entity::Entity;
use crate::error::{ContactsError, ContactsResult};
use crate::record::{Field, Record};
use crate::result_set::{self, ContactSet, ResultSet};
use crate::xml::entry;

/// Feed path groups are listed from and created at.
pub const GROUPS_PATH: &str = "groups/default/full";

/// Protocol version the groups listing defaults to. Version 3 of the feed
/// leaves system groups out.
pub const GROUPS_PROTOCOL_VERSION: &str = "2";

#[derive(Debug, Clone)]
pub struct Group {
    record: Record,
    api: Option<Api>,
    contacts: Option<ContactSet>,
}

impl Entity for Group {
    fn from_record(record: Record, api: Option<Api>) -> Self {
        Self {
            record,
            api,
            contacts: None,
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }
}

impl Group {
    /// Wraps a parsed entry without an API binding.
    pub fn new(record: Record) -> Self {
        Self::from_record(record, None)
    }

    /// The `gContact$systemGroup` element of built-in groups.
    pub fn system_group(&self) -> Option<&Record> {
        self.record.record(Field::SystemGroup.key())
    }

    /// Id of a built-in group, e.g. `Contacts` or `Friends`.
    pub fn system_group_id(&self) -> Option<&str> {
        self.system_group().and_then(|group| group.string("id"))
    }

    /// Contacts in this group, fetched once and cached.
    ///
    /// A group not bound to an API client has no contacts.
    pub fn contacts(&mut self, params: &QueryParams) -> ContactsResult<&ContactSet> {
        if self.contacts.is_none() {
            let set = self.fetch_contacts(params)?;
            self.contacts = Some(set);
        }
        Ok(self.contacts.get_or_insert_with(ResultSet::empty))
    }

    /// Refetches the contacts in this group.
    pub fn reload_contacts(&mut self, params: &QueryParams) -> ContactsResult<&ContactSet> {
        let set = self.fetch_contacts(params)?;
        Ok(self.contacts.insert(set))
    }

    fn fetch_contacts(&self, params: &QueryParams) -> ContactsResult<ContactSet> {
        let (Some(api), Some(id)) = (self.api.as_ref(), self.id()) else {
            return Ok(ResultSet::empty());
        };
        let params = params.clone().with("group", id);
        result_set::fetch(api, crate::contact::CONTACTS_PATH, &params)
    }

    /// Create entry for a group titled `attrs.title`.
    pub fn xml_for_create(attrs: &GroupAttrs) -> ContactsResult<String> {
        entry::group_create_entry(attrs).to_xml()
    }

    /// Creates a group and returns it as stored by the provider.
    pub fn create(attrs: &GroupAttrs, api: &Api) -> ContactsResult<Group> {
        let xml = Self::xml_for_create(attrs)?;
        let response = api.post(
            GROUPS_PATH,
            &xml,
            &QueryParams::new(),
            &[("Content-Type", ATOM_CONTENT_TYPE)],
        )?;
        ensure_success(&response)?;
        let record = Record::entry_from_json(&response.text())?;
        let group = Self::from_record(record, Some(api.clone()));
        info!(id = ?group.id(), title = %attrs.title, "created group");
        Ok(group)
    }

    /// Deletes the group, guarded by its etag.
    pub fn delete(&self) -> ContactsResult<()> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| ContactsError::configuration("group is not bound to an API client"))?;
        let path = self
            .id_path()
            .ok_or_else(|| ContactsError::configuration("cannot delete a group without an id"))?;
        let response = api.delete(
            &path,
            &QueryParams::new(),
            &[("If-Match", self.etag().unwrap_or("*"))],
        )?;
        ensure_success(&response)?;
        info!(id = ?self.id(), "deleted group");
        Ok(())
    }
}
