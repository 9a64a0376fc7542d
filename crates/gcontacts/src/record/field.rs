//! Known field keys of the contacts feed.
//!
//! Keys use the feed's JSON naming: the XML namespace prefix is joined to the
//! local name with `$` (`gd:email` becomes `gd$email`).

/// Key under which an element's direct text is stored.
pub const TEXT_KEY: &str = "$t";

/// A field of a feed, entry, or entry sub-element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Feed,
    Entry,
    Id,
    Etag,
    Title,
    Content,
    Updated,
    Category,
    Link,
    Author,
    Deleted,
    TotalResults,
    StartIndex,
    ItemsPerPage,
    Name,
    GivenName,
    FamilyName,
    FullName,
    AdditionalName,
    NamePrefix,
    NameSuffix,
    Email,
    PhoneNumber,
    Im,
    Organization,
    StructuredPostalAddress,
    GroupMembershipInfo,
    Relation,
    Website,
    Birthday,
    SystemGroup,
    When,
    Where,
    Reminder,
    BatchId,
    BatchStatus,
    BatchOperation,
}

impl Field {
    /// Elements that may occur any number of times inside their parent.
    ///
    /// These are always stored as sequences, even when a document holds a
    /// single occurrence.
    pub const REPEATABLE: &'static [Field] = &[
        Field::Entry,
        Field::Author,
        Field::Link,
        Field::Category,
        Field::Email,
        Field::PhoneNumber,
        Field::Im,
        Field::Organization,
        Field::StructuredPostalAddress,
        Field::GroupMembershipInfo,
        Field::Relation,
        Field::Website,
        Field::When,
        Field::Where,
        Field::Reminder,
    ];

    const ALL: &'static [Field] = &[
        Field::Feed,
        Field::Entry,
        Field::Id,
        Field::Etag,
        Field::Title,
        Field::Content,
        Field::Updated,
        Field::Category,
        Field::Link,
        Field::Author,
        Field::Deleted,
        Field::TotalResults,
        Field::StartIndex,
        Field::ItemsPerPage,
        Field::Name,
        Field::GivenName,
        Field::FamilyName,
        Field::FullName,
        Field::AdditionalName,
        Field::NamePrefix,
        Field::NameSuffix,
        Field::Email,
        Field::PhoneNumber,
        Field::Im,
        Field::Organization,
        Field::StructuredPostalAddress,
        Field::GroupMembershipInfo,
        Field::Relation,
        Field::Website,
        Field::Birthday,
        Field::SystemGroup,
        Field::When,
        Field::Where,
        Field::Reminder,
        Field::BatchId,
        Field::BatchStatus,
        Field::BatchOperation,
    ];

    /// The raw key used in the feed.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Entry => "entry",
            Self::Id => "id",
            Self::Etag => "gd$etag",
            Self::Title => "title",
            Self::Content => "content",
            Self::Updated => "updated",
            Self::Category => "category",
            Self::Link => "link",
            Self::Author => "author",
            Self::Deleted => "gd$deleted",
            Self::TotalResults => "openSearch$totalResults",
            Self::StartIndex => "openSearch$startIndex",
            Self::ItemsPerPage => "openSearch$itemsPerPage",
            Self::Name => "gd$name",
            Self::GivenName => "gd$givenName",
            Self::FamilyName => "gd$familyName",
            Self::FullName => "gd$fullName",
            Self::AdditionalName => "gd$additionalName",
            Self::NamePrefix => "gd$namePrefix",
            Self::NameSuffix => "gd$nameSuffix",
            Self::Email => "gd$email",
            Self::PhoneNumber => "gd$phoneNumber",
            Self::Im => "gd$im",
            Self::Organization => "gd$organization",
            Self::StructuredPostalAddress => "gd$structuredPostalAddress",
            Self::GroupMembershipInfo => "gContact$groupMembershipInfo",
            Self::Relation => "gContact$relation",
            Self::Website => "gContact$website",
            Self::Birthday => "gContact$birthday",
            Self::SystemGroup => "gContact$systemGroup",
            Self::When => "gd$when",
            Self::Where => "gd$where",
            Self::Reminder => "gd$reminder",
            Self::BatchId => "batch$id",
            Self::BatchStatus => "batch$status",
            Self::BatchOperation => "batch$operation",
        }
    }

    /// Looks up a field by its raw key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }

    /// Returns true if the element may occur more than once.
    pub fn is_repeatable(&self) -> bool {
        Self::REPEATABLE.contains(self)
    }
}

/// Returns true if `key` names a repeatable element.
pub fn is_repeatable_key(key: &str) -> bool {
    Field::from_key(key).is_some_and(|field| field.is_repeatable())
}
