//! Batched contact creates and updates.
//!
//! Contacts are queued with a completion callback and sent together as one
//! batch feed, either when the queue reaches [`BATCH_SIZE`] or on an
//! explicit [`BatchQueue::flush`]. Each entry of the request is tagged with
//! its position in the batch, and the provider echoes that position back
//! next to a per-entry status.
//!
//! A batch that fails as a whole with a server error is sent once more
//! after [`ApiConfig::batch_retry_delay`](crate::ApiConfig::batch_retry_delay).

use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{ATOM_CONTENT_TYPE, Api, QueryParams, ensure_success};
use crate::contact::{CONTACTS_PATH, Contact};
use crate::error::{ContactsError, ContactsResult};
use crate::record::{Field, Record};
use crate::xml::{entry, parse_as_if_alt_json};

/// Number of queued contacts that triggers a flush.
pub const BATCH_SIZE: usize = 100;

/// Per-entry outcome reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatus {
    pub code: u16,
    pub reason: String,
}

impl BatchStatus {
    /// Creates a status from the `batch:status` code and reason.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// True for `200` and `201`, the statuses that carry the stored entry.
    pub fn is_success(&self) -> bool {
        matches!(self.code, 200 | 201)
    }

    fn from_record(status: &Record) -> Option<Self> {
        let code = status.string("code")?.trim().parse().ok()?;
        let reason = status.string("reason").unwrap_or_default();
        Some(Self::new(code, reason))
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

/// Called once per queued contact after its batch was sent, with the
/// contact (refreshed on success) and its status. The status is `None` when
/// the response has no entry for the contact.
pub type BatchCallback = Box<dyn FnOnce(Contact, Option<BatchStatus>) -> ContactsResult<()>>;

/// Batch feed for `contacts`, entries tagged with their index.
pub fn batch_xml(contacts: &[Contact]) -> ContactsResult<String> {
    let entries = contacts
        .iter()
        .enumerate()
        .map(|(index, contact)| contact.batch_element(index));
    entry::batch_feed(entries).to_xml()
}

/// Sends one batch of creates and updates.
///
/// Returns one status per contact, in input order. Contacts reported with
/// `200` or `201` are refreshed from the returned entry.
pub fn send_batch_create_or_update(
    api: &Api,
    contacts: &mut [Contact],
) -> ContactsResult<Vec<Option<BatchStatus>>> {
    let xml = batch_xml(contacts)?;
    send_batch(api, &xml, contacts)
}

/// [`send_batch_create_or_update`], retried once on a server error.
pub fn send_batch_with_retries(
    api: &Api,
    contacts: &mut [Contact],
) -> ContactsResult<Vec<Option<BatchStatus>>> {
    let xml = batch_xml(contacts)?;
    retry_once(api, || send_batch(api, &xml, contacts))
}

fn retry_once<T>(api: &Api, mut send: impl FnMut() -> ContactsResult<T>) -> ContactsResult<T> {
    match send() {
        Err(err) if err.is_transient() => {
            let delay = api.config().batch_retry_delay();
            warn!(
                error = %err,
                delay_secs = delay.as_secs(),
                "batch request failed, retrying once"
            );
            api.sleep(delay);
            send()
        }
        result => result,
    }
}

fn send_batch(
    api: &Api,
    xml: &str,
    contacts: &mut [Contact],
) -> ContactsResult<Vec<Option<BatchStatus>>> {
    info!(batch_size = contacts.len(), "sending contacts batch");
    let path = format!("{}/batch", CONTACTS_PATH);
    let response = api.post(
        &path,
        xml,
        &QueryParams::from([("alt", "")]),
        &[("Content-Type", ATOM_CONTENT_TYPE)],
    )?;
    ensure_success(&response)?;

    let parsed = parse_as_if_alt_json(&response.text())?;
    let feed = parsed
        .record(Field::Feed.key())
        .ok_or_else(|| ContactsError::invalid_response("batch response has no feed"))?;

    let mut statuses = vec![None; contacts.len()];
    for entry in feed.sequence(Field::Entry.key()) {
        let Some(index) = entry
            .field_text(Field::BatchId.key())
            .and_then(|id| id.trim().parse::<usize>().ok())
        else {
            warn!("batch response entry without a usable batch id");
            continue;
        };
        let Some(slot) = statuses.get_mut(index) else {
            warn!(index, "batch response entry for an unknown position");
            continue;
        };
        let Some(status) = entry
            .record(Field::BatchStatus.key())
            .and_then(BatchStatus::from_record)
        else {
            warn!(index, "batch response entry without a status");
            continue;
        };

        if status.is_success() {
            let mut data = entry.clone();
            for key in [Field::BatchId, Field::BatchStatus, Field::BatchOperation] {
                data.remove(key.key());
            }
            contacts[index].reload_from_data(data);
        } else {
            debug!(index, status = %status, "batch entry failed");
        }
        *slot = Some(status);
    }
    Ok(statuses)
}

/// Contacts waiting to be sent in the next batch.
#[derive(Default)]
pub struct BatchQueue {
    pending: Vec<(Contact, BatchCallback)>,
    last_batch_xml: Option<String>,
}

impl fmt::Debug for BatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchQueue")
            .field("pending", &self.pending.len())
            .field("last_batch_xml", &self.last_batch_xml.is_some())
            .finish()
    }
}

impl BatchQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Body of the most recent batch request.
    pub fn last_batch_xml(&self) -> Option<&str> {
        self.last_batch_xml.as_deref()
    }

    /// Queues a create (contact without id) or update, flushing when the
    /// queue reaches [`BATCH_SIZE`].
    pub fn enqueue<F>(&mut self, api: &Api, contact: Contact, callback: F) -> ContactsResult<()>
    where
        F: FnOnce(Contact, Option<BatchStatus>) -> ContactsResult<()> + 'static,
    {
        self.pending.push((contact, Box::new(callback)));
        if self.pending.len() >= BATCH_SIZE {
            self.flush(api)?;
        }
        Ok(())
    }

    /// Sends every queued contact and runs the callbacks in queue order.
    ///
    /// The queue is empty afterwards whatever the outcome. The first
    /// callback error stops dispatch and is returned.
    pub fn flush(&mut self, api: &Api) -> ContactsResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let (mut contacts, callbacks): (Vec<Contact>, Vec<BatchCallback>) =
            std::mem::take(&mut self.pending).into_iter().unzip();

        let xml = batch_xml(&contacts)?;
        self.last_batch_xml = Some(xml.clone());
        let statuses = retry_once(api, || send_batch(api, &xml, &mut contacts))?;

        for ((contact, callback), status) in contacts.into_iter().zip(callbacks).zip(statuses) {
            callback(contact, status)?;
        }
        Ok(())
    }
}
