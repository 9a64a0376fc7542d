//! One page of a contacts or groups feed.

use tracing::debug;

use crate::api::{Api, QueryParams, ensure_success};
use crate::contact::Contact;
use crate::entity::Entity;
use crate::error::ContactsResult;
use crate::group::Group;
use crate::record::{Field, Record, Value};

/// A page of entities with the feed's paging counters.
#[derive(Debug, Clone)]
pub struct ResultSet<T> {
    pub total_results: i64,
    /// 1-based index of the first item of this page.
    pub start_index: i64,
    pub items_per_page: i64,
    items: Vec<T>,
}

pub type ContactSet = ResultSet<Contact>;
pub type GroupSet = ResultSet<Group>;

impl<T> ResultSet<T> {
    /// A set with no items and zeroed counters.
    ///
    /// [`has_more`](Self::has_more) is true for this set, as it is for any
    /// feed without paging counters.
    pub fn empty() -> Self {
        Self {
            total_results: 0,
            start_index: 0,
            items_per_page: 0,
            items: Vec::new(),
        }
    }

    /// True if a further page may hold results for the same query.
    ///
    /// Computed as `start_index - 1 + items_per_page <= total_results`, so
    /// zeroed counters (an empty set, or a body without `feed`) also report
    /// more. Paginate until a page comes back empty, not only until this
    /// turns false.
    pub fn has_more(&self) -> bool {
        self.start_index - 1 + self.items_per_page <= self.total_results
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity> ResultSet<T> {
    /// Parses a JSON feed body. A body without `feed` or `entry` gives an
    /// empty set.
    pub fn from_body(body: &str, api: Option<&Api>) -> ContactsResult<Self> {
        let parsed = Record::parse_json(body)?;
        Ok(Self::from_parsed(parsed, api))
    }

    /// Builds the set from an already parsed document.
    pub fn from_parsed(mut parsed: Record, api: Option<&Api>) -> Self {
        let Some(Value::Record(mut feed)) = parsed.remove(Field::Feed.key()) else {
            return Self::empty();
        };
        let entries = match feed.remove(Field::Entry.key()) {
            Some(Value::Sequence(entries)) => entries,
            Some(Value::Record(entry)) => vec![entry],
            _ => Vec::new(),
        };
        Self {
            total_results: feed.integer_text(Field::TotalResults.key()).unwrap_or(0),
            start_index: feed.integer_text(Field::StartIndex.key()).unwrap_or(0),
            items_per_page: feed.integer_text(Field::ItemsPerPage.key()).unwrap_or(0),
            items: entries
                .into_iter()
                .map(|entry| T::from_record(entry, api.cloned()))
                .collect(),
        }
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// GETs one page of a feed, defaulting `max-results` from the config.
pub(crate) fn fetch<T: Entity>(
    api: &Api,
    path: &str,
    params: &QueryParams,
) -> ContactsResult<ResultSet<T>> {
    let mut params = params.clone();
    params.set_default("max-results", api.config().default_max_results.to_string());
    let response = api.get(path, &params, &[])?;
    ensure_success(&response)?;
    let set = ResultSet::from_body(&response.text(), Some(api))?;
    debug!(
        path,
        total = set.total_results,
        count = set.len(),
        "fetched feed page"
    );
    Ok(set)
}
