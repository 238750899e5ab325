//! XML rendering for collections, and reading XML documents into hash tables.
//!
//! Each entry becomes an element named after its key (sanitized into a valid
//! XML name), or `item` for entries without a key. Nested containers nest
//! elements; scalars become escaped text content.
//!
//! Reading goes the other way through `quick-xml`: the children of the payload
//! element become string-keyed entries, elements with children of their own
//! become nested tables and leaf elements keep their text as bytes. For SOAP
//! style documents the payload is the first element whose local name ends in
//! `Request` (or, failing that, `Response`); otherwise it is the root.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CollectionError, Result};
use crate::hash_map::HashTable;
use crate::types::{Value, TYPE_BYTES, TYPE_HASH_TABLE, TYPE_STRING};

/// Render `value` as the element `element`.
pub fn value_to_xml(value: &Value<'_>, element: &str, indent: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, element, indent, 0);
    out
}

pub(crate) fn write_value(out: &mut String, value: &Value<'_>, element: &str, indent: bool, depth: usize) {
    match value {
        Value::Vector(vector) => {
            let children: Vec<(Option<String>, &Value<'_>)> = vector
                .iter()
                .map(|(_, node)| (node.key().map(|key| key.to_string()), node.value()))
                .collect();
            write_children(out, element, &children, indent, depth);
        }
        Value::HashTable(table) => {
            let children: Vec<(Option<String>, &Value<'_>)> = table
                .iter()
                .map(|node| (Some(node.key().to_string()), node.value()))
                .collect();
            write_children(out, element, &children, indent, depth);
        }
        Value::Null => {
            let tag = element_name(element);
            pad(out, indent, depth);
            out.push_str(&format!("<{}></{}>", tag, tag));
        }
        scalar => {
            let tag = element_name(element);
            pad(out, indent, depth);
            out.push_str(&format!("<{}>{}</{}>", tag, escape(&scalar.to_string()), tag));
        }
    }
}

pub(crate) fn write_children(
    out: &mut String,
    element: &str,
    children: &[(Option<String>, &Value<'_>)],
    indent: bool,
    depth: usize,
) {
    let tag = element_name(element);
    pad(out, indent, depth);
    out.push('<');
    out.push_str(&tag);
    out.push('>');
    for (key, value) in children {
        if indent {
            out.push('\n');
        }
        write_value(out, value, key.as_deref().unwrap_or("item"), indent, depth + 1);
    }
    if indent && !children.is_empty() {
        out.push('\n');
        pad(out, indent, depth);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn pad(out: &mut String, indent: bool, depth: usize) {
    if indent {
        for _ in 0..depth {
            out.push_str("  ");
        }
    }
}

/// Turn arbitrary key text into a valid XML element name.
pub fn element_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let valid_start = name
        .chars()
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_');
    if !valid_start {
        name.insert(0, '_');
    }
    name
}

/// Escape text content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Element tree built while reading a document.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// First element in document order, this one included, whose name ends
    /// with `suffix`.
    fn find(&self, suffix: &str) -> Option<&XmlElement> {
        if self.name.ends_with(suffix) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(suffix))
    }

    fn to_table(&self) -> Result<HashTable<'static>> {
        let mut table = HashTable::new(&TYPE_STRING, 0);
        for child in &self.children {
            let key = Value::from(child.name.clone());
            if child.children.is_empty() {
                let text = Value::from(child.text.clone().into_bytes());
                table.add_entry(key, text, Some(&TYPE_BYTES))?;
            } else {
                table.add_entry(key, Value::from(child.to_table()?), Some(&TYPE_HASH_TABLE))?;
            }
        }
        Ok(table)
    }
}

/// Parse an XML document into a string-keyed hash table.
///
/// Input must start (after whitespace) with markup. Mismatched or unclosed
/// tags are reported with the offset the reader had reached. Repeated sibling
/// elements replace earlier ones.
pub fn parse_hash_table(text: &str) -> Result<HashTable<'static>> {
    let root = read_tree(text).map_err(|e| {
        log::debug!("XML parse failed: {}", e);
        e
    })?;
    let payload = root
        .find("Request")
        .or_else(|| root.find("Response"))
        .unwrap_or(&root);
    log::trace!("reading XML payload element <{}>", payload.name);
    payload.to_table()
}

fn read_tree(text: &str) -> Result<XmlElement> {
    let start = text.len() - text.trim_start().len();
    if !text[start..].starts_with('<') {
        return Err(CollectionError::xml(start, "expected an XML element"));
    }

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut open: Vec<XmlElement> = Vec::new();
    loop {
        let at = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| CollectionError::xml(reader.buffer_position(), e.to_string()))?;
        let closed = match event {
            Event::Start(start) => {
                open.push(XmlElement::open(&start));
                None
            }
            Event::Empty(start) => Some(XmlElement::open(&start)),
            Event::End(_) => Some(
                open.pop()
                    .ok_or_else(|| CollectionError::xml(at, "closing tag without an open element"))?,
            ),
            Event::Text(content) => {
                let content = content
                    .unescape()
                    .map_err(|e| CollectionError::xml(at, e.to_string()))?;
                if let Some(element) = open.last_mut() {
                    element.text.push_str(&content);
                }
                None
            }
            Event::CData(content) => {
                if let Some(element) = open.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
                None
            }
            Event::Eof => {
                return Err(CollectionError::xml(at, "document ended before the root element closed"));
            }
            _ => None,
        };
        if let Some(element) = closed {
            match open.last_mut() {
                Some(parent) => parent.children.push(element),
                None => return Ok(element),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(value_to_xml(&Value::from("a<b"), "name", false), "<name>a&lt;b</name>");
        assert_eq!(value_to_xml(&Value::Null, "root", false), "<root></root>");
        assert_eq!(value_to_xml(&Value::I32(7), "n", true), "<n>7</n>");
    }

    #[test]
    fn test_element_names() {
        assert_eq!(element_name("key1"), "key1");
        assert_eq!(element_name("my key"), "my_key");
        assert_eq!(element_name("4"), "_4");
        assert_eq!(element_name(""), "_");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a&b\"c'"), "a&amp;b&quot;c&apos;");
    }

    fn bytes(text: &str) -> Value<'static> {
        Value::from(text.as_bytes().to_vec())
    }

    #[test]
    fn test_parse_nested_elements() -> Result<()> {
        let table = parse_hash_table(
            "<?xml version=\"1.0\"?>\n<root>\n  <a>1</a>\n  <b>\n    <c>x &amp; y</c>\n    <d/>\n  </b>\n</root>",
        )?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_value(&"a".into()), Some(&bytes("1")));
        assert_eq!(table.get_entry(&"a".into()).map(|n| n.value_type()), Some(&TYPE_BYTES));

        let nested = table
            .get_value(&"b".into())
            .and_then(Value::as_hash_table)
            .expect("b is a nested table");
        assert_eq!(nested.get_value(&"c".into()), Some(&bytes("x & y")));
        assert_eq!(nested.get_value(&"d".into()), Some(&bytes("")));
        Ok(())
    }

    #[test]
    fn test_self_closing_children() -> Result<()> {
        let table = parse_hash_table("<r><empty/><also></also><cdata><![CDATA[<raw>]]></cdata></r>")?;
        assert_eq!(table.get_value(&"empty".into()), Some(&bytes("")));
        assert_eq!(table.get_value(&"also".into()), Some(&bytes("")));
        assert_eq!(table.get_value(&"cdata".into()), Some(&bytes("<raw>")));

        assert!(parse_hash_table("<lonely/>")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_soap_payload() -> Result<()> {
        let request = r#"<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <m:GetPriceRequest xmlns:m="https://example.org/stock">
      <m:Item>Apples</m:Item>
      <m:Quantity>3</m:Quantity>
    </m:GetPriceRequest>
  </soap:Body>
</soap:Envelope>"#;
        let table = parse_hash_table(request)?;
        let keys: Vec<&str> = table.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(table.get_value(&"Item".into()), Some(&bytes("Apples")));
        assert_eq!(table.get_value(&"Quantity".into()), Some(&bytes("3")));

        let response = request
            .replace("GetPriceRequest", "GetPriceResponse")
            .replace("Item", "Price");
        let table = parse_hash_table(&response)?;
        assert_eq!(table.get_value(&"Price".into()), Some(&bytes("Apples")));
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_hash_table("  plain text").unwrap_err();
        assert!(matches!(err, CollectionError::Xml { .. }));
        assert_eq!(err.position(), Some(2));

        assert!(matches!(
            parse_hash_table("<a><b></a>"),
            Err(CollectionError::Xml { .. })
        ));
        assert!(matches!(
            parse_hash_table("<a><b>text</b>"),
            Err(CollectionError::Xml { .. })
        ));
    }
}
