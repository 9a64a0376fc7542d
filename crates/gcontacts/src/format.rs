//! Flattening of repeatable entry sub-elements into attribute maps.
//!
//! Emails, phone numbers, addresses, organizations and websites all arrive
//! as records with a `rel`, a `primary` flag and a mix of attributes and
//! `gd$` child elements. [`EntityAttrs`] is the flat form used both for
//! reading and for building create/update payloads.

use std::collections::BTreeMap;

use crate::record::{Record, TEXT_KEY, Value};

/// Prefix of provider-defined `rel` values.
pub const REL_PREFIX: &str = "http://schemas.google.com/g/2005#";

/// Default `rel` for addresses.
pub const DEFAULT_ADDRESS_REL: &str = "work";

const ADDRESS_KEYS: [&str; 4] = ["street", "city", "region", "postcode"];

/// One formatted email, phone number, address, organization or website.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityAttrs {
    /// Relation with the provider URL prefix stripped, e.g. `work`.
    pub rel: Option<String>,
    pub primary: bool,
    /// Remaining sub-fields by snake_case name. A key may be present with no
    /// value (addresses always carry `street`, `city`, `region` and
    /// `postcode`).
    pub fields: BTreeMap<String, Option<String>>,
}

impl EntityAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// An email address entry.
    pub fn email(address: impl Into<String>) -> Self {
        Self::new().with_field("address", address)
    }

    /// A phone number entry.
    pub fn phone(number: impl Into<String>) -> Self {
        Self::new().with_field("number", number)
    }

    /// A website entry.
    pub fn website(href: impl Into<String>) -> Self {
        Self::new().with_field("href", href)
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), Some(value.into()));
        self
    }

    /// Value of a sub-field, if present and set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|value| value.as_deref())
    }

    pub fn rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }
}

/// Formats one raw element.
///
/// `primary` is true only for the literal `"true"` (or a JSON `true`). `rel`
/// loses its provider prefix and falls back to `default_rel`. When
/// `text_key` is given the element text is stored under it. Every other key
/// loses a leading `gd$`, is converted to snake_case and is unwrapped from
/// its `$t` wrapper; a wrapped value that also carries `yomi` adds a
/// `{key}_yomi` entry.
pub fn format_entity(raw: &Record, default_rel: Option<&str>, text_key: Option<&str>) -> EntityAttrs {
    let mut formatted = EntityAttrs {
        primary: match raw.get("primary") {
            Some(Value::String(s)) => s == "true",
            Some(Value::Bool(b)) => *b,
            _ => false,
        },
        rel: raw
            .string("rel")
            .map(|rel| rel.replace(REL_PREFIX, ""))
            .or_else(|| default_rel.map(str::to_string)),
        fields: BTreeMap::new(),
    };

    if let Some(text_key) = text_key {
        formatted
            .fields
            .insert(text_key.to_string(), raw.text().map(str::to_string));
    }

    for (key, value) in raw.iter() {
        if matches!(key, "primary" | "rel") || (key == TEXT_KEY && text_key.is_some()) {
            continue;
        }
        let name = snake_case(key.strip_prefix("gd$").unwrap_or(key));
        match value {
            Value::Record(inner) => {
                let text = inner
                    .get(TEXT_KEY)
                    .and_then(Value::scalar_text);
                if let Some(yomi) = inner.get("yomi").and_then(Value::scalar_text) {
                    formatted.fields.insert(format!("{}_yomi", name), Some(yomi));
                }
                formatted.fields.insert(name, text);
            }
            Value::Sequence(_) => {}
            scalar => {
                formatted.fields.insert(name, scalar.scalar_text());
            }
        }
    }

    formatted
}

/// Formats a structured postal address.
///
/// The `rel` defaults to `work`; `street`, `city`, `region` and `postcode`
/// are always present; `country` prefers non-blank text over the `code`
/// attribute; `formatted_address` is dropped.
pub fn format_address(raw: &Record) -> EntityAttrs {
    let mut formatted = format_entity(raw, Some(DEFAULT_ADDRESS_REL), None);
    formatted.fields.remove("formatted_address");
    for key in ADDRESS_KEYS {
        formatted.fields.entry(key.to_string()).or_insert(None);
    }
    formatted
        .fields
        .insert("country".to_string(), format_country(raw.record("gd$country")));
    formatted
}

/// Country name text, else its `code` attribute.
pub fn format_country(country: Option<&Record>) -> Option<String> {
    let country = country?;
    match country.text() {
        Some(text) if !text.trim().is_empty() => Some(text.to_string()),
        _ => country.string("code").map(str::to_string),
    }
}

/// Formats a phone number; the element text becomes `number`.
pub fn format_phone_number(raw: &Record) -> EntityAttrs {
    format_entity(raw, None, Some("number"))
}

/// A birthday whose year may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthday {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl Birthday {
    /// Parses `YYYY-MM-DD` or `--MM-DD`.
    pub fn parse(when: &str) -> Option<Self> {
        let mut parts = when.split('-').rev();
        let day = parts.next()?.trim().parse().ok()?;
        let month = parts.next()?.trim().parse().ok()?;
        let year = match parts.next().map(str::trim) {
            None | Some("") => None,
            Some(year) => Some(year.parse().ok()?),
        };
        Some(Self { year, month, day })
    }
}

/// One `gContact$groupMembershipInfo` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub deleted: bool,
    pub href: String,
}

impl GroupMembership {
    pub fn from_record(raw: &Record) -> Option<Self> {
        let href = raw.string("href")?.to_string();
        let deleted = match raw.get("deleted") {
            Some(Value::String(s)) => s == "true",
            Some(Value::Bool(b)) => *b,
            _ => false,
        };
        Some(Self { deleted, href })
    }
}

/// A name part with its optional phonetic variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValue {
    pub value: Option<String>,
    pub yomi: Option<String>,
}

impl NameValue {
    /// A plain string has no phonetic variant; a record yields its `$t` and
    /// `yomi`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Record(inner)) => Self {
                value: inner.text().map(str::to_string),
                yomi: inner.get("yomi").and_then(Value::scalar_text),
            },
            Some(other) => Self {
                value: other.scalar_text(),
                yomi: None,
            },
            None => Self::default(),
        }
    }
}

/// `orgName` to `org_name`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

/// `org_name` to `orgName`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn formats_email() {
        let raw = record(json!({
            "rel": "http://schemas.google.com/g/2005#work",
            "primary": "true",
            "address": "john@example.com",
        }));
        let email = format_entity(&raw, None, None);
        assert_eq!(email.rel(), Some("work"));
        assert!(email.primary);
        assert_eq!(email.get("address"), Some("john@example.com"));
        assert_eq!(email.fields.len(), 1);
    }

    #[test]
    fn primary_defaults_to_false() {
        let raw = record(json!({ "address": "a@b.c", "primary": "false" }));
        assert!(!format_entity(&raw, None, None).primary);
        let raw = record(json!({ "address": "a@b.c" }));
        let email = format_entity(&raw, None, None);
        assert!(!email.primary);
        assert_eq!(email.rel(), None);
    }

    #[test]
    fn formats_phone_number_text() {
        let raw = record(json!({
            "rel": "http://schemas.google.com/g/2005#mobile",
            "$t": "(123) 334-5158",
            "uri": "tel:+1-123-334-5158",
        }));
        let phone = format_phone_number(&raw);
        assert_eq!(phone.rel(), Some("mobile"));
        assert_eq!(phone.get("number"), Some("(123) 334-5158"));
        assert_eq!(phone.get("uri"), Some("tel:+1-123-334-5158"));
        assert!(!phone.fields.contains_key("$t"));
    }

    #[test]
    fn formats_organization_with_yomi() {
        let raw = record(json!({
            "rel": "http://schemas.google.com/g/2005#other",
            "gd$orgName": { "$t": "Example, Inc", "yomi": "Ekusanpuru" },
            "gd$orgTitle": { "$t": "Manager" },
        }));
        let org = format_entity(&raw, None, None);
        assert_eq!(org.rel(), Some("other"));
        assert_eq!(org.get("org_name"), Some("Example, Inc"));
        assert_eq!(org.get("org_name_yomi"), Some("Ekusanpuru"));
        assert_eq!(org.get("org_title"), Some("Manager"));
    }

    #[test]
    fn formats_address_with_guaranteed_keys() {
        let raw = record(json!({
            "gd$formattedAddress": { "$t": "2345 Long Dr. #232\nSomwhere\nIL\n12345\nUnited States" },
            "gd$street": { "$t": "2345 Long Dr. #232" },
            "gd$country": { "$t": "United States", "code": "US" },
        }));
        let address = format_address(&raw);
        assert_eq!(address.rel(), Some("work"));
        assert!(!address.primary);
        assert_eq!(address.get("street"), Some("2345 Long Dr. #232"));
        assert_eq!(address.get("country"), Some("United States"));
        for key in ["city", "region", "postcode"] {
            assert_eq!(address.fields.get(key), Some(&None), "{key}");
        }
        assert!(!address.fields.contains_key("formatted_address"));
    }

    #[test]
    fn country_resolution() {
        let country = |value: serde_json::Value| format_country(Some(&record(value)));
        assert_eq!(country(json!({ "$t": "Canada" })).as_deref(), Some("Canada"));
        assert_eq!(
            country(json!({ "$t": "Canada", "code": "CA" })).as_deref(),
            Some("Canada")
        );
        assert_eq!(country(json!({ "$t": " ", "code": "CA" })).as_deref(), Some("CA"));
        assert_eq!(country(json!({ "code": "CA" })).as_deref(), Some("CA"));
        assert_eq!(country(json!({})), None);
        assert_eq!(format_country(None), None);
    }

    #[test]
    fn parses_birthdays() {
        assert_eq!(
            Birthday::parse("1988-05-12"),
            Some(Birthday { year: Some(1988), month: 5, day: 12 })
        );
        assert_eq!(
            Birthday::parse("--05-12"),
            Some(Birthday { year: None, month: 5, day: 12 })
        );
        assert_eq!(Birthday::parse("garbage"), None);
    }

    #[test]
    fn group_membership_flags() {
        let active = record(json!({ "deleted": "false", "href": "http://groups/1" }));
        let deleted = record(json!({ "deleted": "true", "href": "http://groups/2" }));
        assert_eq!(
            GroupMembership::from_record(&active),
            Some(GroupMembership { deleted: false, href: "http://groups/1".into() })
        );
        assert!(GroupMembership::from_record(&deleted).unwrap().deleted);
        assert_eq!(GroupMembership::from_record(&Record::new()), None);
    }

    #[test]
    fn name_value_variants() {
        let plain = Value::from("John");
        assert_eq!(
            NameValue::from_value(Some(&plain)),
            NameValue { value: Some("John".into()), yomi: None }
        );
        let phonetic = Value::Record(Record::text_only("John").with("yomi", "Jon"));
        assert_eq!(
            NameValue::from_value(Some(&phonetic)),
            NameValue { value: Some("John".into()), yomi: Some("Jon".into()) }
        );
        let only_yomi = Value::Record(Record::new().with("yomi", "Jon"));
        assert_eq!(NameValue::from_value(Some(&only_yomi)).value, None);
        assert_eq!(NameValue::from_value(None), NameValue::default());
    }

    #[test]
    fn case_conversion() {
        assert_eq!(snake_case("orgName"), "org_name");
        assert_eq!(snake_case("formattedAddress"), "formatted_address");
        assert_eq!(snake_case("address"), "address");
        assert_eq!(camel_case("org_name"), "orgName");
        assert_eq!(camel_case("postcode"), "postcode");
        assert_eq!(camel_case("mail_class"), "mailClass");
    }
}
