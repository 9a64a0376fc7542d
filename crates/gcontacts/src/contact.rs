//! A single contact.

use gcontacts_core::{Clock, SystemClock, format_time_for_xml};
use tracing::{debug, info};

use crate::api::{ATOM_CONTENT_TYPE, Api, QueryParams, ensure_success, id_path};
use crate::changes::{ContactAttrs, ContactChanges};
use crate::entity::Entity;
use crate::error::{ContactsError, ContactsResult, classify_status};
use crate::format::{
    Birthday, EntityAttrs, GroupMembership, NameValue, format_address, format_entity,
    format_phone_number,
};
use crate::group::Group;
use crate::record::{Field, Record};
use crate::transport::HttpResponse;
use crate::xml::Element;
use crate::xml::entry::{self, EntryMeta};

/// Feed path contacts are listed from and created at.
pub const CONTACTS_PATH: &str = "contacts/default/full";

pub const PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#photo";
pub const EDIT_PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#edit-photo";
const LEGACY_EDIT_PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#edit_photo";

/// A contact photo with the metadata needed to cache it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData {
    pub data: Vec<u8>,
    /// Photo etag without surrounding quotes.
    pub etag: String,
    pub content_type: Option<String>,
}

/// A contact entry, its API binding, and changes not yet sent.
#[derive(Debug, Clone)]
pub struct Contact {
    record: Record,
    api: Option<Api>,
    changes: ContactChanges,
}

impl Entity for Contact {
    fn from_record(record: Record, api: Option<Api>) -> Self {
        Self {
            record,
            api,
            changes: ContactChanges::default(),
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }
}

impl Contact {
    /// Wraps a parsed entry without an API binding.
    pub fn new(record: Record) -> Self {
        Self::from_record(record, None)
    }

    /// The client this contact was loaded through, if any.
    pub fn api(&self) -> Option<&Api> {
        self.api.as_ref()
    }

    fn require_api(&self) -> ContactsResult<&Api> {
        self.api
            .as_ref()
            .ok_or_else(|| ContactsError::configuration("contact is not bound to an API client"))
    }

    // Links and photo

    /// The `alternate` link (the contact's web page).
    pub fn alternate_link(&self) -> Option<&str> {
        self.link_with_rel("alternate")
    }

    /// The whole photo link, with its `href` and, once a photo is set, its etag.
    pub fn photo_link_entry(&self) -> Option<&Record> {
        self.link_entry(PHOTO_REL)
    }

    /// URL of the photo resource. Present even when no photo is set.
    pub fn photo_link(&self) -> Option<&str> {
        self.link_with_rel(PHOTO_REL)
    }

    /// URL to upload a photo to.
    pub fn edit_photo_link(&self) -> Option<&str> {
        self.link_with_rel(EDIT_PHOTO_REL)
            .or_else(|| self.link_with_rel(LEGACY_EDIT_PHOTO_REL))
    }

    /// Raw photo bytes.
    ///
    /// `None` without a photo link, without an API binding, or when the
    /// provider answers 4xx. Server errors and transport failures are
    /// returned as errors.
    pub fn photo(&self) -> ContactsResult<Option<Vec<u8>>> {
        let (Some(api), Some(link)) = (self.api.as_ref(), self.photo_link()) else {
            return Ok(None);
        };
        Ok(fetch_photo(api, link)?.map(|response| response.body))
    }

    /// Photo bytes with etag and content type.
    ///
    /// The photo link only carries an etag when a photo is set, so a link
    /// without one yields `None` without a request.
    pub fn photo_with_metadata(&self) -> ContactsResult<Option<PhotoData>> {
        let Some(api) = self.api.as_ref() else {
            return Ok(None);
        };
        let Some(link) = self.photo_link_entry() else {
            return Ok(None);
        };
        let (Some(href), Some(etag)) = (link.string("href"), link.string(Field::Etag.key()))
        else {
            return Ok(None);
        };
        Ok(fetch_photo(api, href)?.map(|response| PhotoData {
            content_type: response.header("content-type").map(str::to_string),
            data: response.body,
            etag: etag.trim_matches('"').to_string(),
        }))
    }

    // Simple lists

    /// Phone numbers as displayed, in feed order.
    pub fn phone_numbers(&self) -> Vec<&str> {
        self.record
            .sequence(Field::PhoneNumber.key())
            .iter()
            .filter_map(Record::text)
            .collect()
    }

    /// Email addresses in feed order.
    pub fn emails(&self) -> Vec<&str> {
        self.record
            .sequence(Field::Email.key())
            .iter()
            .filter_map(|email| email.string("address"))
            .collect()
    }

    /// The address flagged `primary="true"`, if any.
    pub fn primary_email(&self) -> Option<&str> {
        self.record
            .sequence(Field::Email.key())
            .iter()
            .find(|email| email.string("primary") == Some("true"))
            .and_then(|email| email.string("address"))
    }

    /// Instant messaging addresses, whatever the protocol.
    pub fn ims(&self) -> Vec<&str> {
        self.record
            .sequence(Field::Im.key())
            .iter()
            .filter_map(|im| im.string("address"))
            .collect()
    }

    // Names

    /// `self[level1][level2]["$t"]`.
    pub fn nested_text(&self, level1: &str, level2: &str) -> Option<&str> {
        self.record.nested_text(level1, level2)
    }

    fn name_part(&self, field: Field) -> NameValue {
        NameValue::from_value(
            self.record
                .record(Field::Name.key())
                .and_then(|name| name.get(field.key())),
        )
    }

    /// Given name, without its phonetic reading.
    pub fn given_name(&self) -> Option<String> {
        self.name_part(Field::GivenName).value
    }

    /// Phonetic reading of the given name.
    pub fn given_name_yomi(&self) -> Option<String> {
        self.name_part(Field::GivenName).yomi
    }

    pub fn additional_name(&self) -> Option<String> {
        self.name_part(Field::AdditionalName).value
    }

    pub fn additional_name_yomi(&self) -> Option<String> {
        self.name_part(Field::AdditionalName).yomi
    }

    pub fn family_name(&self) -> Option<String> {
        self.name_part(Field::FamilyName).value
    }

    pub fn family_name_yomi(&self) -> Option<String> {
        self.name_part(Field::FamilyName).yomi
    }

    /// The full name as stored by the provider.
    pub fn full_name(&self) -> Option<&str> {
        self.nested_text(Field::Name.key(), Field::FullName.key())
    }

    pub fn name_prefix(&self) -> Option<String> {
        self.name_part(Field::NamePrefix).value
    }

    pub fn name_suffix(&self) -> Option<String> {
        self.name_part(Field::NameSuffix).value
    }

    // Other derived fields

    /// Birthday from `gContact$birthday`, with or without a year.
    pub fn birthday(&self) -> Option<Birthday> {
        self.record
            .record(Field::Birthday.key())
            .and_then(|birthday| birthday.string("when"))
            .and_then(Birthday::parse)
    }

    /// Raw `gContact$relation` entries.
    pub fn relations(&self) -> &[Record] {
        self.record.sequence(Field::Relation.key())
    }

    /// The first relation with `rel="spouse"`.
    pub fn spouse(&self) -> Option<&str> {
        self.relations()
            .iter()
            .find(|relation| relation.string("rel") == Some("spouse"))
            .and_then(Record::text)
    }

    /// Structured postal addresses, flattened.
    pub fn addresses(&self) -> Vec<EntityAttrs> {
        self.format_all(Field::StructuredPostalAddress, format_address)
    }

    pub fn organizations(&self) -> Vec<EntityAttrs> {
        self.format_all(Field::Organization, |raw| format_entity(raw, None, None))
    }

    /// Websites, keyed by `href` with their `rel`.
    pub fn websites(&self) -> Vec<EntityAttrs> {
        self.format_all(Field::Website, |raw| format_entity(raw, None, None))
    }

    pub fn phone_numbers_full(&self) -> Vec<EntityAttrs> {
        self.format_all(Field::PhoneNumber, format_phone_number)
    }

    /// Emails with rel, label and primary flag.
    pub fn emails_full(&self) -> Vec<EntityAttrs> {
        self.format_all(Field::Email, |raw| format_entity(raw, None, None))
    }

    fn format_all(&self, field: Field, format: impl Fn(&Record) -> EntityAttrs) -> Vec<EntityAttrs> {
        self.record.sequence(field.key()).iter().map(format).collect()
    }

    /// Every group membership, deleted ones included.
    pub fn group_membership_info(&self) -> Vec<GroupMembership> {
        self.record
            .sequence(Field::GroupMembershipInfo.key())
            .iter()
            .filter_map(GroupMembership::from_record)
            .collect()
    }

    /// Hrefs of the groups this contact belongs to.
    pub fn group_memberships(&self) -> Vec<String> {
        self.memberships(false)
    }

    /// Hrefs of the groups this contact was removed from.
    pub fn deleted_group_memberships(&self) -> Vec<String> {
        self.memberships(true)
    }

    fn memberships(&self, deleted: bool) -> Vec<String> {
        self.group_membership_info()
            .into_iter()
            .filter(|membership| membership.deleted == deleted)
            .map(|membership| membership.href)
            .collect()
    }

    // Change tracking

    /// Current state of every writable field.
    pub fn formatted_attrs(&self) -> ContactAttrs {
        ContactAttrs {
            name_prefix: self.name_prefix(),
            given_name: self.given_name(),
            additional_name: self.additional_name(),
            family_name: self.family_name(),
            name_suffix: self.name_suffix(),
            content: self.content().map(str::to_string),
            emails: self.emails_full(),
            phone_numbers: self.phone_numbers_full(),
            addresses: self.addresses(),
            organizations: self.organizations(),
            websites: self.websites(),
            group_memberships: self.group_memberships(),
            deleted_group_memberships: self.deleted_group_memberships(),
        }
    }

    /// `changes` applied over the current state.
    pub fn attrs_for_update(&self, changes: &ContactChanges) -> ContactAttrs {
        changes.apply_to(self.formatted_attrs())
    }

    /// Pending changes applied over the current state.
    pub fn attrs_with_changes(&self) -> ContactAttrs {
        self.attrs_for_update(&self.changes)
    }

    /// Records changes to send with the next update.
    pub fn prep_changes(&mut self, changes: ContactChanges) {
        self.changes.merge(changes);
    }

    /// Changes queued by [`prep_changes`](Self::prep_changes) and not yet sent.
    pub fn prepped_changes(&self) -> &ContactChanges {
        &self.changes
    }

    /// Prepares adding this contact to `group`.
    pub fn prep_add_to_group(&mut self, group: &Group) {
        let Some(group_id) = group.id() else {
            return;
        };
        let attrs = self.attrs_with_changes();
        let mut memberships = attrs.group_memberships;
        if !memberships.iter().any(|href| href == group_id) {
            memberships.push(group_id.to_string());
        }
        let deleted: Vec<String> = attrs
            .deleted_group_memberships
            .into_iter()
            .filter(|href| href != group_id)
            .collect();
        self.prep_changes(
            ContactChanges::new()
                .group_memberships(memberships)
                .deleted_group_memberships(deleted),
        );
    }

    /// Replaces the entry data and drops pending changes.
    pub fn reload_from_data(&mut self, record: Record) {
        self.record = record;
        self.changes = ContactChanges::default();
    }

    // XML payloads

    /// Standalone create entry for `attrs`.
    pub fn xml_for_create(attrs: &ContactAttrs) -> ContactsResult<String> {
        entry::contact_create_entry(attrs, None).to_xml()
    }

    /// Full entry replacing this contact with its pending changes applied.
    pub fn xml_for_update(&self) -> ContactsResult<String> {
        self.update_element(None).to_xml()
    }

    /// Create entry tagged for a batch feed.
    ///
    /// The fragment uses the `batch:` prefix without declaring it; it is only
    /// well-formed once wrapped by [`batch::batch_xml`](crate::batch::batch_xml).
    pub fn batch_create_xml(&self, batch_id: usize) -> ContactsResult<String> {
        entry::contact_create_entry(&self.attrs_with_changes(), Some(batch_id)).to_xml()
    }

    /// Update entry tagged for a batch feed. Like
    /// [`batch_create_xml`](Self::batch_create_xml), it relies on the feed
    /// to declare the `batch:` prefix.
    pub fn batch_update_xml(&self, batch_id: usize) -> ContactsResult<String> {
        self.update_element(Some(batch_id)).to_xml()
    }

    /// Create entry without an id, update entry otherwise. A fragment for
    /// [`batch::batch_xml`](crate::batch::batch_xml), not a document.
    pub fn batch_create_or_update_xml(&self, batch_id: usize) -> ContactsResult<String> {
        self.batch_element(batch_id).to_xml()
    }

    pub(crate) fn batch_element(&self, batch_id: usize) -> Element {
        if self.id().is_some() {
            self.update_element(Some(batch_id))
        } else {
            entry::contact_create_entry(&self.attrs_with_changes(), Some(batch_id))
        }
    }

    fn update_element(&self, batch_id: Option<usize>) -> Element {
        let updated = match self.api.as_ref() {
            Some(api) => api.now_for_xml(),
            None => format_time_for_xml(&SystemClock.now()),
        };
        let meta = EntryMeta {
            id: self.id().unwrap_or_default(),
            etag: self.etag(),
            updated: &updated,
        };
        entry::contact_update_entry(meta, &self.attrs_with_changes(), batch_id)
    }

    // Server operations

    /// Creates a contact and returns it as stored by the provider.
    pub fn create(attrs: &ContactAttrs, api: &Api) -> ContactsResult<Contact> {
        let xml = Self::xml_for_create(attrs)?;
        let response = api.post(
            CONTACTS_PATH,
            &xml,
            &QueryParams::new(),
            &[("Content-Type", ATOM_CONTENT_TYPE)],
        )?;
        ensure_success(&response)?;
        let record = Record::entry_from_json(&response.text())?;
        let contact = Self::from_record(record, Some(api.clone()));
        info!(id = ?contact.id(), "created contact");
        Ok(contact)
    }

    /// Fetches a contact by id URL or bare id.
    pub fn find(id_or_url: &str, api: &Api) -> ContactsResult<Contact> {
        let path = if id_or_url.contains("://") {
            id_path(id_or_url)
        } else {
            format!("{}/{}", CONTACTS_PATH, id_or_url)
        };
        let response = api.get(&path, &QueryParams::new(), &[])?;
        ensure_success(&response)?;
        let record = Record::entry_from_json(&response.text())?;
        Ok(Self::from_record(record, Some(api.clone())))
    }

    /// Creates the contact if it has no id yet, otherwise sends pending
    /// changes.
    pub fn create_or_update(&mut self) -> ContactsResult<()> {
        if self.id().is_some() {
            return self.send_update(None);
        }
        let api = self.require_api()?.clone();
        let created = Self::create(&self.attrs_with_changes(), &api)?;
        self.reload_from_data(created.record);
        Ok(())
    }

    /// Sends pending changes, plus `changes` if given, as a full update.
    ///
    /// Does nothing when no change is pending. On success the contact is
    /// refreshed from the response.
    pub fn send_update(&mut self, changes: Option<ContactChanges>) -> ContactsResult<()> {
        if let Some(changes) = changes {
            self.prep_changes(changes);
        }
        if self.changes.is_empty() {
            debug!(id = ?self.id(), "no pending changes");
            return Ok(());
        }

        let api = self.require_api()?;
        let path = self
            .id_path()
            .ok_or_else(|| ContactsError::configuration("cannot update a contact without an id"))?;
        let xml = self.xml_for_update()?;
        let etag = self.etag().unwrap_or("*");
        let response = api.put(
            &path,
            &xml,
            &QueryParams::new(),
            &[("If-Match", etag), ("Content-Type", ATOM_CONTENT_TYPE)],
        )?;
        ensure_success(&response)?;
        let record = Record::entry_from_json(&response.text())?;
        info!(id = ?self.id(), "updated contact");
        self.reload_from_data(record);
        Ok(())
    }

    /// Deletes the contact, guarded by its etag.
    pub fn delete(&self) -> ContactsResult<()> {
        let api = self.require_api()?;
        let path = self
            .id_path()
            .ok_or_else(|| ContactsError::configuration("cannot delete a contact without an id"))?;
        let response = api.delete(
            &path,
            &QueryParams::new(),
            &[("If-Match", self.etag().unwrap_or("*"))],
        )?;
        ensure_success(&response)?;
        info!(id = ?self.id(), "deleted contact");
        Ok(())
    }
}

/// GETs a photo. 4xx means no photo; 5xx and transport failures are errors.
fn fetch_photo(api: &Api, url: &str) -> ContactsResult<Option<HttpResponse>> {
    let is_client_error = |status: Option<u16>| matches!(status, Some(400..=499));
    match api.fetch_absolute(url) {
        Ok(response) if is_client_error(response.status()) => Ok(None),
        Ok(response) => match response.status() {
            Some(status) if classify_status(status).is_some() => Err(ContactsError::from_status(
                status,
                format!("photo request failed for {}", url),
            )),
            _ => Ok(Some(response)),
        },
        Err(err) if is_client_error(err.status()) => Ok(None),
        Err(err) => {
            let message = err.message.clone();
            let error = match err.status() {
                Some(status) => ContactsError::from_status(status, message),
                None => ContactsError::network(message),
            };
            Err(error.with_source(err))
        }
    }
}
