//! XML to generic tree conversion.
//!
//! Upstream Atom feeds are turned into a [`serde_json::Value`] tree before normalization, using
//! the following conventions:
//!
//! - each element becomes a key in its parent object
//! - attributes are keyed with an `@` prefix (`@term`, `@href`)
//! - an element with attributes or children and also text keeps the text under `$text`
//! - an element holding only text collapses to a string
//! - an element that repeats under the same parent collapses to an array, in document order
//!
//! The last rule is the source of the singular-versus-array shape variance that
//! [`crate::paper`] has to tolerate: a feed with one author yields an object, a feed with two
//! yields an array.
//!
//! # Examples
//!
//! ```
//! use paperboard::xml::to_tree;
//!
//! let tree = to_tree(r#"<feed><entry><link href="a"/><link href="b"/></entry></feed>"#).unwrap();
//! assert_eq!(tree["feed"]["entry"]["link"][1]["@href"], "b");
//! ```

use quick_xml::{events::Event, name::QName, Reader};

use super::*;

/// Key under which the text of a mixed element is stored.
pub const TEXT_KEY: &str = "$text";

/// Prefix used for attribute keys.
pub const ATTRIBUTE_PREFIX: &str = "@";

/// One open element while walking the document.
struct Frame {
  /// Local name of the element
  tag:      String,
  /// Attributes and children collected so far
  children: Map<String, Value>,
  /// Concatenated text content
  text:     String,
}

impl Frame {
  /// Opens a frame for an element, collecting its attributes.
  fn open(tag: String, attributes: quick_xml::events::attributes::Attributes) -> Result<Self> {
    let mut children = Map::new();
    for attr in attributes {
      let attr = attr.map_err(|e| PaperboardError::Xml(e.to_string()))?;
      let key = local_name(attr.key);
      // Namespace declarations carry no paper data.
      if key == "xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
        continue;
      }
      let value = attr.unescape_value().map_err(|e| PaperboardError::Xml(e.to_string()))?;
      children.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value.into_owned()));
    }
    Ok(Self { tag, children, text: String::new() })
  }

  /// Closes the frame, producing the value stored in the parent.
  fn close(mut self) -> (String, Value) {
    let text = self.text.trim();
    let value = if self.children.is_empty() {
      Value::String(text.to_string())
    } else {
      if !text.is_empty() {
        self.children.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
      }
      Value::Object(self.children)
    };
    (self.tag, value)
  }

  /// Adds a child value, collapsing repeated tags into arrays.
  fn push_child(&mut self, tag: String, value: Value) {
    match self.children.get_mut(&tag) {
      Some(Value::Array(existing)) => existing.push(value),
      Some(existing) => {
        let first = existing.take();
        *existing = Value::Array(vec![first, value]);
      },
      None => {
        self.children.insert(tag, value);
      },
    }
  }
}

/// Strips any namespace prefix from a qualified name.
fn local_name(name: QName) -> String {
  String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

/// Converts an XML document into a generic tree.
///
/// The returned value is an object holding the root element, e.g. `{"feed": {...}}`. Element
/// names are stored without namespace prefixes, so `<arxiv:primary_category>` becomes
/// `primary_category`.
///
/// # Errors
///
/// Returns [`PaperboardError::Xml`] when the document is not well formed.
pub fn to_tree(xml: &str) -> Result<Value> {
  let mut reader = Reader::from_str(xml);
  let mut stack: Vec<Frame> = vec![Frame {
    tag:      String::new(),
    children: Map::new(),
    text:     String::new(),
  }];

  loop {
    let event = reader.read_event().map_err(|e| {
      PaperboardError::Xml(format!("at position {}: {e}", reader.buffer_position()))
    })?;
    match event {
      Event::Start(e) => stack.push(Frame::open(local_name(e.name()), e.attributes())?),
      Event::Empty(e) => {
        let (tag, value) = Frame::open(local_name(e.name()), e.attributes())?.close();
        if let Some(parent) = stack.last_mut() {
          parent.push_child(tag, value);
        }
      },
      Event::Text(e) => {
        let text = e.unescape().map_err(|e| PaperboardError::Xml(e.to_string()))?;
        if let Some(frame) = stack.last_mut() {
          frame.text.push_str(&text);
        }
      },
      Event::CData(e) =>
        if let Some(frame) = stack.last_mut() {
          frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
        },
      Event::End(_) => {
        if stack.len() < 2 {
          return Err(PaperboardError::Xml("unbalanced closing tag".into()));
        }
        if let Some(frame) = stack.pop() {
          let (tag, value) = frame.close();
          if let Some(parent) = stack.last_mut() {
            parent.push_child(tag, value);
          }
        }
      },
      Event::Eof => break,
      _ => (),
    }
  }

  if stack.len() != 1 {
    return Err(PaperboardError::Xml("unexpected end of document".into()));
  }
  let root = stack.pop().map(|frame| frame.children).unwrap_or_default();
  Ok(Value::Object(root))
}
