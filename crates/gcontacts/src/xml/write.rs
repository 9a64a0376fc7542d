//! A small element tree serialized with `quick_xml`.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ContactsError, ContactsResult};

/// Normalizes free text before it is escaped: vertical tabs, which XML 1.0
/// forbids, become newlines.
pub fn clean_text(text: &str) -> String {
    text.replace('\u{0B}', "\n")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// An XML element with ordered attributes.
///
/// Attribute values and text go through [`clean_text`] and are escaped on
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element. `name` may carry a namespace prefix,
    /// e.g. `gd:email`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an attribute. Attributes are written in the order added.
    pub fn attr(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.attributes
            .push((name.into(), clean_text(value.as_ref())));
        self
    }

    /// Adds the attribute unless `value` is missing or blank.
    pub fn attr_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) if !is_blank(value) => self.attr(name, value),
            _ => self,
        }
    }

    /// Sets the text content, replacing any previous text.
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.text = Some(clean_text(text.as_ref()));
        self
    }

    /// Appends a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child elements in order.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Adds a `<name>text</name>` child unless `text` is missing or blank.
    pub fn text_child(self, name: &str, text: Option<&str>) -> Self {
        match text {
            Some(text) if !is_blank(text) => self.child(Element::new(name).text(text)),
            _ => self,
        }
    }

    /// Value of the attribute `name`, after text cleanup.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    /// Serializes the element without an XML declaration.
    pub fn to_xml(&self) -> ContactsResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| {
            ContactsError::internal(format!("generated XML is not UTF-8: {}", e)).with_source(e)
        })
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> ContactsResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        if let Some(ref text) = self.text {
            emit(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ContactsResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ContactsError::internal(format!("failed to write XML: {}", e)))
}
