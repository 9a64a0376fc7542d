//! Accessors shared by contacts and groups.

use chrono::{DateTime, FixedOffset};

use crate::api::{self, Api};
use crate::record::{Field, Record};

/// A feed entry wrapped with behavior.
///
/// Every accessor tolerates missing fields and returns `None` or an empty
/// collection.
pub trait Entity {
    /// Wraps a parsed entry.
    fn from_record(record: Record, api: Option<Api>) -> Self
    where
        Self: Sized;

    /// The underlying entry.
    fn record(&self) -> &Record;

    /// Canonical id URL.
    fn id(&self) -> Option<&str> {
        self.record().field_text(Field::Id.key())
    }

    /// Version token for conditional update and delete.
    fn etag(&self) -> Option<&str> {
        self.record().string(Field::Etag.key())
    }

    fn title(&self) -> Option<&str> {
        self.record().field_text(Field::Title.key())
    }

    fn content(&self) -> Option<&str> {
        self.record().field_text(Field::Content.key())
    }

    fn updated(&self) -> Option<DateTime<FixedOffset>> {
        let updated = self.record().field_text(Field::Updated.key())?;
        DateTime::parse_from_rfc3339(updated).ok()
    }

    fn categories(&self) -> &[Record] {
        self.record().sequence(Field::Category.key())
    }

    /// Hrefs of every link.
    fn links(&self) -> Vec<&str> {
        self.record()
            .sequence(Field::Link.key())
            .iter()
            .filter_map(|link| link.string("href"))
            .collect()
    }

    /// The first link with the given `rel`.
    fn link_entry(&self, rel: &str) -> Option<&Record> {
        self.record()
            .sequence(Field::Link.key())
            .iter()
            .find(|link| link.string("rel") == Some(rel))
    }

    fn link_with_rel(&self, rel: &str) -> Option<&str> {
        self.link_entry(rel).and_then(|link| link.string("href"))
    }

    fn self_link(&self) -> Option<&str> {
        self.link_with_rel("self")
    }

    fn edit_link(&self) -> Option<&str> {
        self.link_with_rel("edit")
    }

    /// True when the entry is a deletion marker.
    fn deleted(&self) -> bool {
        self.record().contains_key(Field::Deleted.key())
    }

    /// Path used to modify this entry, see [`api::id_path`].
    fn id_path(&self) -> Option<String> {
        self.id().map(api::id_path)
    }
}
