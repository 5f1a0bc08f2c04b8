use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::document::{Element, Node};
use crate::error::Gpx2SceneError;

type Result<T> = std::result::Result<T, Gpx2SceneError>;

/// Deepest element nesting accepted. The tree is walked and dropped recursively.
pub const MAX_DEPTH: usize = 1024;

/// Parse an XML string into an owned element tree rooted at the document element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Gpx2SceneError::ContentOutsideRoot);
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(Gpx2SceneError::TooDeep { limit: MAX_DEPTH });
                }
                stack.push(start_element(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                let element = start_element(&e, &reader)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or(Gpx2SceneError::ContentOutsideRoot)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                push_text(&mut stack, raw)?;
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                push_text(&mut stack, s)?;
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(ch) = resolve_entity(&e) {
                    push_text(&mut stack, ch.encode_utf8(&mut [0; 4]))?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Gpx2SceneError::XmlParse(e)),
            // Declarations, comments, processing instructions and DOCTYPE carry no track data
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(Gpx2SceneError::UnclosedElement { name: open.name });
    }

    root.ok_or(Gpx2SceneError::MissingRoot)
}

/// Build an element (without children) from a start or empty tag.
fn start_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element> {
    let name = std::str::from_utf8(e.local_name().as_ref())
        .unwrap_or_default()
        .to_string();
    let mut element = Element::new(name);

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| Gpx2SceneError::XmlParse(e.into()))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .unwrap_or_default()
            .to_string();
        let val = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        element.attributes.push((key, val));
    }

    Ok(element)
}

/// Attach a finished element to its parent, or make it the document root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(Gpx2SceneError::ContentOutsideRoot),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Gpx2SceneError::ContentOutsideRoot);
    };

    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
    Ok(())
}

/// Resolve character references (&#60; &#x3C;) and the predefined XML entities.
fn resolve_entity(e: &BytesRef<'_>) -> Option<char> {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        return Some(ch);
    }
    match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None, // Unknown entity, skip
    }
}
