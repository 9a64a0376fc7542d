//! Reads an Atom XML document into the same record shape the JSON feed uses.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::{ContactsError, ContactsResult};
use crate::record::{Record, TEXT_KEY, Value, is_repeatable_key};

/// Element being read, with its children grouped by key in order of first
/// appearance.
struct Frame {
    key: String,
    record: Record,
    children: Vec<(String, Vec<Record>)>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> ContactsResult<Self> {
        let key = json_key(start.name().as_ref());
        let mut record = Record::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                ContactsError::invalid_response(format!("malformed attribute in <{}>: {}", key, e))
            })?;
            let name = attr.key.as_ref();
            if name == b"xmlns" || name.starts_with(b"xmlns:") {
                continue;
            }
            let value = attr.unescape_value().map_err(|e| {
                ContactsError::invalid_response(format!("malformed attribute in <{}>: {}", key, e))
            })?;
            record.insert(json_key(name), value.trim().to_string());
        }
        Ok(Self {
            key,
            record,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() && !self.record.contains_key(TEXT_KEY) {
            self.record.insert(TEXT_KEY, text.to_string());
        }
    }

    fn push_child(&mut self, key: String, child: Record) {
        match self.children.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(child),
            None => self.children.push((key, vec![child])),
        }
    }

    fn close(self) -> (String, Record) {
        let mut record = self.record;
        for (key, mut group) in self.children {
            let value = if group.len() == 1 && !is_repeatable_key(&key) {
                group.pop().map(Value::Record)
            } else {
                Some(Value::Sequence(group))
            };
            if let Some(value) = value {
                record.insert(key, value);
            }
        }
        (self.key, record)
    }
}

/// Converts a qualified XML name to a record key: `gd:email` becomes
/// `gd$email`, unprefixed names are kept.
fn json_key(name: &[u8]) -> String {
    String::from_utf8_lossy(name).replacen(':', "$", 1)
}

/// Parses `xml` as if the provider had been asked for `alt=json`.
///
/// The result holds the root element under its key, e.g. `{"feed": {...}}`.
/// Attributes become sibling keys, the first non-blank text becomes `$t`,
/// and child elements are grouped by key: known-repeatable keys and keys
/// that occur more than once become sequences.
pub fn parse_as_if_alt_json(xml: &str) -> ContactsResult<Record> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Record)> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            ContactsError::invalid_response(format!(
                "malformed XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;
        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (key, record) = Frame::open(&start)?.close();
                attach(&mut stack, &mut root, key, record);
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    let (key, record) = frame.close();
                    attach(&mut stack, &mut root, key, record);
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| {
                        ContactsError::invalid_response(format!("malformed text: {}", e))
                    })?;
                    frame.push_text(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.push_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ContactsError::invalid_response(
            "unexpected end of XML document",
        ));
    }
    let (key, record) =
        root.ok_or_else(|| ContactsError::invalid_response("XML document has no root element"))?;
    trace!(root = %key, "parsed XML document");
    Ok(Record::new().with(key, record))
}

fn attach(stack: &mut [Frame], root: &mut Option<(String, Record)>, key: String, record: Record) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(key, record),
        None => {
            if root.is_none() {
                *root = Some((key, record));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContactsErrorCode;

    const BATCH_RESPONSE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns='http://www.w3.org/2005/Atom' xmlns:batch='http://schemas.google.com/gdata/batch' xmlns:gd='http://schemas.google.com/g/2005'>
  <id>https://www.google.com/m8/feeds/contacts/default/full/batch/1</id>
  <entry gd:etag='"abc"'>
    <batch:id>0</batch:id>
    <batch:operation type='insert'/>
    <batch:status code='201' reason='Created'/>
    <gd:name>
      <gd:givenName>John</gd:givenName>
      <gd:familyName>Doe</gd:familyName>
    </gd:name>
    <gd:email rel='http://schemas.google.com/g/2005#work' primary='true' address='john@example.com'/>
  </entry>
</feed>"#;

    #[test]
    fn parses_batch_response_shape() {
        let parsed = parse_as_if_alt_json(BATCH_RESPONSE).unwrap();
        let feed = parsed.record("feed").unwrap();
        assert_eq!(
            feed.field_text("id"),
            Some("https://www.google.com/m8/feeds/contacts/default/full/batch/1")
        );
        assert!(!feed.contains_key("xmlns"));
        assert!(!feed.contains_key("xmlns$batch"));

        let entries = feed.sequence("entry");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.string("gd$etag"), Some("\"abc\""));
        assert_eq!(entry.field_text("batch$id"), Some("0"));
        let status = entry.record("batch$status").unwrap();
        assert_eq!(status.string("code"), Some("201"));
        assert_eq!(status.string("reason"), Some("Created"));
        assert_eq!(
            entry.record("batch$operation").and_then(|op| op.string("type")),
            Some("insert")
        );
        assert_eq!(entry.nested_text("gd$name", "gd$givenName"), Some("John"));

        let emails = entry.sequence("gd$email");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].string("address"), Some("john@example.com"));
    }

    #[test]
    fn repeated_unknown_elements_become_sequences() {
        let parsed = parse_as_if_alt_json("<root><item>a</item><item>b</item><single>c</single></root>")
            .unwrap();
        let root = parsed.record("root").unwrap();
        let items = root.sequence("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text(), Some("b"));
        assert_eq!(root.field_text("single"), Some("c"));
        assert!(root.get("single").and_then(Value::as_sequence).is_none());
    }

    #[test]
    fn known_repeatable_single_element_is_sequence() {
        let parsed = parse_as_if_alt_json(
            "<entry xmlns:gd='http://schemas.google.com/g/2005'><gd:phoneNumber rel='mobile'>555</gd:phoneNumber></entry>",
        )
        .unwrap();
        let phones = parsed.record("entry").unwrap().sequence("gd$phoneNumber");
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0].text(), Some("555"));
        assert_eq!(phones[0].string("rel"), Some("mobile"));
    }

    #[test]
    fn first_non_blank_text_wins_and_is_trimmed() {
        let parsed =
            parse_as_if_alt_json("<note>  first &amp; more <br/> second </note>").unwrap();
        assert_eq!(parsed.record("note").unwrap().text(), Some("first & more"));
    }

    #[test]
    fn cdata_is_text() {
        let parsed = parse_as_if_alt_json("<content><![CDATA[<b>bold</b>]]></content>").unwrap();
        assert_eq!(parsed.record("content").unwrap().text(), Some("<b>bold</b>"));
    }

    #[test]
    fn malformed_xml_is_invalid_response() {
        let err = parse_as_if_alt_json("<feed><entry></feed>").unwrap_err();
        assert_eq!(err.code(), ContactsErrorCode::InvalidResponse);

        let err = parse_as_if_alt_json("").unwrap_err();
        assert_eq!(err.code(), ContactsErrorCode::InvalidResponse);
    }
}
