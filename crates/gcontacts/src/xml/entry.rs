//! Builders for contact and group create/update payloads.

use crate::changes::{ContactAttrs, GroupAttrs};
use crate::format::{DEFAULT_ADDRESS_REL, EntityAttrs, REL_PREFIX, camel_case};

use super::{
    ATOM_NS, BATCH_NS, CONTACT_KIND, Element, GCONTACT_NS, GD_NS, GROUP_KIND, KIND_SCHEME,
};

const DEFAULT_REL: &str = "other";

/// Address sub-elements written first, in this order.
const ADDRESS_ORDER: [&str; 5] = ["city", "street", "region", "postcode", "country"];
/// Address sub-fields that are attributes rather than child elements.
const ADDRESS_ATTRIBUTES: [&str; 3] = ["label", "mail_class", "usage"];
const ORGANIZATION_ORDER: [&str; 2] = ["org_name", "org_title"];

/// Operation requested for one entry of a batch feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Insert,
    Update,
}

impl BatchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

/// Identity of an existing entry being updated.
#[derive(Debug, Clone, Copy)]
pub struct EntryMeta<'a> {
    pub id: &'a str,
    pub etag: Option<&'a str>,
    /// Pre-formatted `updated` timestamp.
    pub updated: &'a str,
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn prefixed_rel(rel: &str) -> String {
    if rel.contains("://") {
        rel.to_string()
    } else {
        format!("{}{}", REL_PREFIX, rel)
    }
}

/// `rel` attribute value: the entity's own, else `default` unless a label
/// stands in for it.
fn rel_value(entity: &EntityAttrs, default: &str) -> Option<String> {
    match entity.rel() {
        Some(rel) if !rel.trim().is_empty() => Some(rel.to_string()),
        _ if entity.get("label").is_some() => None,
        _ => Some(default.to_string()),
    }
}

fn with_rel_and_primary(element: Element, rel: Option<String>, primary: bool) -> Element {
    let element = match rel {
        Some(rel) => element.attr("rel", rel),
        None => element,
    };
    element.attr("primary", bool_str(primary))
}

/// Remaining fields, as camelCase attributes.
fn extra_attributes(mut element: Element, entity: &EntityAttrs, skip: &[&str]) -> Element {
    for (key, value) in &entity.fields {
        if skip.contains(&key.as_str()) {
            continue;
        }
        element = element.attr_opt(camel_case(key), value.as_deref());
    }
    element
}

fn email_element(email: &EntityAttrs) -> Element {
    let rel = rel_value(email, DEFAULT_REL).map(|rel| prefixed_rel(&rel));
    let element = with_rel_and_primary(Element::new("gd:email"), rel, email.primary)
        .attr_opt("address", email.get("address"));
    extra_attributes(element, email, &["address"])
}

fn phone_element(phone: &EntityAttrs) -> Element {
    let rel = rel_value(phone, DEFAULT_REL).map(|rel| prefixed_rel(&rel));
    let element = with_rel_and_primary(Element::new("gd:phoneNumber"), rel, phone.primary);
    extra_attributes(element, phone, &["number"]).text(phone.get("number").unwrap_or_default())
}

fn address_element(address: &EntityAttrs) -> Element {
    let rel = rel_value(address, DEFAULT_ADDRESS_REL).map(|rel| prefixed_rel(&rel));
    let mut element = with_rel_and_primary(
        Element::new("gd:structuredPostalAddress"),
        rel,
        address.primary,
    );
    for key in ADDRESS_ATTRIBUTES {
        element = element.attr_opt(camel_case(key), address.get(key));
    }
    for key in ADDRESS_ORDER {
        element = element.text_child(&format!("gd:{}", camel_case(key)), address.get(key));
    }
    for (key, value) in &address.fields {
        if ADDRESS_ORDER.contains(&key.as_str()) || ADDRESS_ATTRIBUTES.contains(&key.as_str()) {
            continue;
        }
        element = element.text_child(&format!("gd:{}", camel_case(key)), value.as_deref());
    }
    element
}

fn organization_element(org: &EntityAttrs) -> Element {
    let rel = rel_value(org, DEFAULT_REL).map(|rel| prefixed_rel(&rel));
    let mut element = with_rel_and_primary(Element::new("gd:organization"), rel, org.primary)
        .attr_opt("label", org.get("label"));

    let child = |key: &str| -> Option<Element> {
        let value = org.get(key).filter(|v| !v.trim().is_empty())?;
        Some(
            Element::new(format!("gd:{}", camel_case(key)))
                .attr_opt("yomi", org.get(&format!("{}_yomi", key)))
                .text(value),
        )
    };

    element = element.children(ORGANIZATION_ORDER.iter().filter_map(|key| child(*key)));
    let others: Vec<Element> = org
        .fields
        .keys()
        .filter(|key| {
            !ORGANIZATION_ORDER.contains(&key.as_str())
                && key.as_str() != "label"
                && !key.ends_with("_yomi")
        })
        .filter_map(|key| child(key.as_str()))
        .collect();
    element.children(others)
}

fn website_element(website: &EntityAttrs) -> Element {
    let rel = rel_value(website, DEFAULT_REL);
    let element = with_rel_and_primary(Element::new("gContact:website"), rel, website.primary)
        .attr_opt("href", website.get("href"));
    extra_attributes(element, website, &["href"])
}

fn name_element(attrs: &ContactAttrs) -> Option<Element> {
    let parts = [
        ("gd:namePrefix", &attrs.name_prefix),
        ("gd:givenName", &attrs.given_name),
        ("gd:additionalName", &attrs.additional_name),
        ("gd:familyName", &attrs.family_name),
        ("gd:nameSuffix", &attrs.name_suffix),
    ];
    let name = parts
        .iter()
        .fold(Element::new("gd:name"), |name, (tag, value)| {
            name.text_child(tag, value.as_deref())
        });
    (!name.child_elements().is_empty()).then_some(name)
}

/// Contact fields shared by create and update payloads. `atom` is the
/// prefix used for Atom elements (`"atom:"` or `""`).
fn contact_fields(attrs: &ContactAttrs, atom: &str) -> Vec<Element> {
    let mut fields = Vec::new();
    fields.extend(name_element(attrs));
    if let Some(content) = attrs.content.as_deref().filter(|c| !c.trim().is_empty()) {
        fields.push(
            Element::new(format!("{}content", atom))
                .attr("type", "text")
                .text(content),
        );
    }
    fields.extend(attrs.emails.iter().map(email_element));
    fields.extend(attrs.phone_numbers.iter().map(phone_element));
    fields.extend(attrs.addresses.iter().map(address_element));
    fields.extend(attrs.organizations.iter().map(organization_element));
    fields.extend(attrs.websites.iter().map(website_element));
    fields.extend(attrs.group_memberships.iter().map(|href| {
        Element::new("gContact:groupMembershipInfo")
            .attr("deleted", "false")
            .attr("href", href)
    }));
    fields.extend(attrs.deleted_group_memberships.iter().map(|href| {
        Element::new("gContact:groupMembershipInfo")
            .attr("deleted", "true")
            .attr("href", href)
    }));
    fields
}

fn batch_elements(batch_id: usize, operation: BatchOperation) -> [Element; 2] {
    [
        Element::new("batch:id").text(batch_id.to_string()),
        Element::new("batch:operation").attr("type", operation.as_str()),
    ]
}

fn kind_category(name: &str, term: &str) -> Element {
    Element::new(name)
        .attr("scheme", KIND_SCHEME)
        .attr("term", term)
}

/// `<atom:entry>` creating a contact, optionally tagged for a batch.
pub fn contact_create_entry(attrs: &ContactAttrs, batch_id: Option<usize>) -> Element {
    let mut entry = Element::new("atom:entry")
        .attr("xmlns:atom", ATOM_NS)
        .attr("xmlns:gd", GD_NS)
        .attr("xmlns:gContact", GCONTACT_NS)
        .child(kind_category("atom:category", CONTACT_KIND));
    if let Some(batch_id) = batch_id {
        entry = entry.children(batch_elements(batch_id, BatchOperation::Insert));
    }
    entry.children(contact_fields(attrs, "atom:"))
}

/// Full `<entry>` replacing an existing contact, optionally tagged for a
/// batch.
pub fn contact_update_entry(
    meta: EntryMeta<'_>,
    attrs: &ContactAttrs,
    batch_id: Option<usize>,
) -> Element {
    let mut entry = Element::new("entry")
        .attr("xmlns", ATOM_NS)
        .attr("xmlns:gd", GD_NS)
        .attr("xmlns:gContact", GCONTACT_NS)
        .attr_opt("gd:etag", meta.etag);
    if let Some(batch_id) = batch_id {
        entry = entry.children(batch_elements(batch_id, BatchOperation::Update));
    }
    entry
        .child(Element::new("id").text(meta.id))
        .child(Element::new("updated").text(meta.updated))
        .child(kind_category("category", CONTACT_KIND))
        .children(contact_fields(attrs, ""))
}

/// `<feed>` envelope wrapping batch entries.
pub fn batch_feed(entries: impl IntoIterator<Item = Element>) -> Element {
    Element::new("feed")
        .attr("xmlns", ATOM_NS)
        .attr("xmlns:gContact", GCONTACT_NS)
        .attr("xmlns:gd", GD_NS)
        .attr("xmlns:batch", BATCH_NS)
        .children(entries)
}

/// `<atom:entry>` creating a group.
pub fn group_create_entry(attrs: &GroupAttrs) -> Element {
    Element::new("atom:entry")
        .attr("xmlns:gd", GD_NS)
        .attr("xmlns:atom", ATOM_NS)
        .child(kind_category("atom:category", GROUP_KIND))
        .child(
            Element::new("atom:title")
                .attr("type", "text")
                .text(&attrs.title),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_as_if_alt_json;

    fn xml(element: &Element) -> String {
        element.to_xml().unwrap()
    }

    #[test]
    fn create_escapes_names_and_replaces_vertical_tab() {
        let attrs = ContactAttrs {
            given_name: Some("<Jo&hn>".into()),
            family_name: Some("Vertical Tab Replaced With Newline:\u{0B}".into()),
            ..Default::default()
        };
        let out = xml(&contact_create_entry(&attrs, None));
        assert!(out.contains("<gd:givenName>&lt;Jo&amp;hn&gt;</gd:givenName>"));
        assert!(out.contains("<gd:familyName>Vertical Tab Replaced With Newline:\n</gd:familyName>"));
        assert!(!out.contains('\u{0B}'));
    }

    #[test]
    fn name_block_keeps_only_non_blank_parts() {
        let attrs = ContactAttrs {
            name_prefix: Some(" ".into()),
            given_name: Some("John".into()),
            ..Default::default()
        };
        let out = xml(&contact_create_entry(&attrs, None));
        assert!(out.contains("<gd:name><gd:givenName>John</gd:givenName></gd:name>"));
        assert!(!out.contains("namePrefix"));

        let out = xml(&contact_create_entry(&ContactAttrs::default(), None));
        assert!(!out.contains("gd:name"));
        assert!(!out.contains("atom:content"));
    }

    #[test]
    fn create_entry_layout() {
        let attrs = ContactAttrs {
            content: Some("Notes".into()),
            emails: vec![EntityAttrs::email("john@example.com")
                .with_rel("work")
                .with_primary(true)],
            phone_numbers: vec![EntityAttrs::phone("555-1234").with_rel("mobile")],
            websites: vec![EntityAttrs::website("http://example.com").with_rel("blog")],
            group_memberships: vec!["http://groups/6".into()],
            deleted_group_memberships: vec!["http://groups/7".into()],
            ..Default::default()
        };
        let out = xml(&contact_create_entry(&attrs, None));
        assert!(out.starts_with(
            r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005" xmlns:gContact="http://schemas.google.com/contact/2008"><atom:category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/contact/2008#contact"/>"#
        ));
        assert!(out.contains(r#"<atom:content type="text">Notes</atom:content>"#));
        assert!(out.contains(
            r#"<gd:email rel="http://schemas.google.com/g/2005#work" primary="true" address="john@example.com"/>"#
        ));
        assert!(out.contains(
            r#"<gd:phoneNumber rel="http://schemas.google.com/g/2005#mobile" primary="false">555-1234</gd:phoneNumber>"#
        ));
        assert!(out.contains(
            r#"<gContact:website rel="blog" primary="false" href="http://example.com"/>"#
        ));
        assert!(out.contains(
            r#"<gContact:groupMembershipInfo deleted="false" href="http://groups/6"/>"#
        ));
        assert!(out.contains(
            r#"<gContact:groupMembershipInfo deleted="true" href="http://groups/7"/>"#
        ));
    }

    #[test]
    fn label_replaces_default_rel() {
        let email = EntityAttrs::email("a@b.c").with_field("label", "Personal");
        let out = xml(&email_element(&email));
        assert_eq!(
            out,
            r#"<gd:email primary="false" address="a@b.c" label="Personal"/>"#
        );
    }

    #[test]
    fn address_children_in_order() {
        let address = EntityAttrs::new()
            .with_field("street", "1 Main St")
            .with_field("country", "United States")
            .with_field("city", "Springfield")
            .with_field("neighborhood", "Downtown");
        let out = xml(&address_element(&address));
        insta::assert_snapshot!(out, @r#"<gd:structuredPostalAddress rel="http://schemas.google.com/g/2005#work" primary="false"><gd:city>Springfield</gd:city><gd:street>1 Main St</gd:street><gd:country>United States</gd:country><gd:neighborhood>Downtown</gd:neighborhood></gd:structuredPostalAddress>"#);
    }

    #[test]
    fn organization_yomi_becomes_attribute() {
        let org = EntityAttrs::new()
            .with_field("org_title", "Manager")
            .with_field("org_name", "Example")
            .with_field("org_name_yomi", "Ekusanpuru")
            .with_field("org_department", "Sales");
        let out = xml(&organization_element(&org));
        assert_eq!(
            out,
            concat!(
                r#"<gd:organization rel="http://schemas.google.com/g/2005#other" primary="false">"#,
                r#"<gd:orgName yomi="Ekusanpuru">Example</gd:orgName>"#,
                r#"<gd:orgTitle>Manager</gd:orgTitle>"#,
                r#"<gd:orgDepartment>Sales</gd:orgDepartment>"#,
                r#"</gd:organization>"#
            )
        );
    }

    #[test]
    fn update_entry_carries_identity() {
        let attrs = ContactAttrs {
            given_name: Some("John".into()),
            ..Default::default()
        };
        let meta = EntryMeta {
            id: "http://www.google.com/m8/feeds/contacts/test%40gmail.com/base/6b70f8bb0372c",
            etag: Some("\"SXk6cDdXKit7I2A9Wh9VFUgORgE.\""),
            updated: "2014-09-01T16:25:34.010Z",
        };
        let out = xml(&contact_update_entry(meta, &attrs, Some(3)));
        assert!(out.starts_with(
            r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005" xmlns:gContact="http://schemas.google.com/contact/2008" gd:etag="&quot;SXk6cDdXKit7I2A9Wh9VFUgORgE.&quot;"><batch:id>3</batch:id><batch:operation type="update"/><id>"#
        ));
        assert!(out.contains("<updated>2014-09-01T16:25:34.010Z</updated>"));
        assert!(out.contains(r#"<category scheme="http://schemas.google.com/g/2005#kind""#));
    }

    #[test]
    fn batch_feed_is_parseable() {
        let entries = vec![
            contact_create_entry(&ContactAttrs::default(), Some(0)),
            contact_create_entry(&ContactAttrs::default(), Some(1)),
        ];
        let out = xml(&batch_feed(entries));
        assert!(out.starts_with(
            r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gContact="http://schemas.google.com/contact/2008" xmlns:gd="http://schemas.google.com/g/2005" xmlns:batch="http://schemas.google.com/gdata/batch">"#
        ));
        let parsed = parse_as_if_alt_json(&out).unwrap();
        let entries = parsed.record("feed").unwrap().sequence("atom$entry");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].field_text("batch$id"), Some("1"));
    }

    #[test]
    fn group_entry() {
        let out = xml(&group_create_entry(&GroupAttrs::new("Friends & Family")));
        insta::assert_snapshot!(out, @r#"<atom:entry xmlns:gd="http://schemas.google.com/g/2005" xmlns:atom="http://www.w3.org/2005/Atom"><atom:category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/contact/2008#group"/><atom:title type="text">Friends &amp; Family</atom:title></atom:entry>"#);
    }
}
