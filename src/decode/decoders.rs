//! Decoder implementations

use super::types::{DecoderFormat, PayloadDecoder};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Nesting limit for XML documents
const MAX_XML_DEPTH: usize = 256;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Create a new JSON decoder
    pub fn new() -> Self {
        Self
    }
}

impl PayloadDecoder for JsonDecoder {
    fn format(&self) -> DecoderFormat {
        DecoderFormat::Json
    }

    fn decode(&self, body: &str) -> Result<Value> {
        Ok(serde_json::from_str(body)?)
    }
}

// ============================================================================
// XML Decoder
// ============================================================================

/// XML decoder producing the usual "XML as dictionaries" shape.
///
/// - The document becomes `{root_name: value}`
/// - Attributes become `@name` keys, mixed text becomes `#text`
/// - Repeated sibling elements collapse into an array
/// - Text-only elements become strings (never numbers)
/// - Empty or self-closing elements without attributes become `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl XmlDecoder {
    /// Create a new XML decoder
    pub fn new() -> Self {
        Self
    }
}

impl PayloadDecoder for XmlDecoder {
    fn format(&self) -> DecoderFormat {
        DecoderFormat::Xml
    }

    fn decode(&self, body: &str) -> Result<Value> {
        xml_to_json(body)
    }
}

fn xml_to_json(xml: &str) -> Result<Value> {
    let mut reader = XmlReader::new(xml.trim_start_matches('\u{feff}'));

    reader.skip_misc()?;
    if reader.at_end() {
        return Err(Error::xml("Empty XML document"));
    }

    let (name, value) = reader.element(0)?;

    reader.skip_misc()?;
    if !reader.at_end() {
        return Err(Error::xml(format!(
            "Unexpected content after root element <{name}> at offset {}",
            reader.pos
        )));
    }

    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(Value::Object(doc))
}

/// Cursor over an XML document
struct XmlReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> XmlReader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn starts_with(&self, token: &str) -> bool {
        self.rest().starts_with(token)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(Error::xml(format!(
                "Expected '{token}' at offset {}",
                self.pos
            )))
        }
    }

    /// Advance past `terminator`, returning the text before it
    fn take_until(&mut self, terminator: &str, what: &str) -> Result<&'a str> {
        let rest = self.rest();
        match rest.find(terminator) {
            Some(idx) => {
                self.pos += idx + terminator.len();
                Ok(&rest[..idx])
            }
            None => Err(Error::xml(format!("Unterminated {what}"))),
        }
    }

    /// Skip whitespace, declarations, comments and processing instructions
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<!--") {
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<!") {
                self.take_until(">", "declaration")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '=' | '<'))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(Error::xml(format!("Expected a name at offset {}", self.pos)));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Parse one element starting at `<`, returning its name and value
    fn element(&mut self, depth: usize) -> Result<(String, Value)> {
        if depth > MAX_XML_DEPTH {
            return Err(Error::xml("XML document nested too deeply"));
        }

        self.expect("<")?;
        let name = self.name()?.to_string();
        let mut fields = Map::new();

        let self_closing = loop {
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if self.starts_with(">") {
                self.pos += 1;
                break false;
            }
            if self.at_end() {
                return Err(Error::xml(format!("Unterminated start tag <{name}>")));
            }

            let attr = self.name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = if self.starts_with("\"") {
                "\""
            } else if self.starts_with("'") {
                "'"
            } else {
                return Err(Error::xml(format!(
                    "Unquoted value for attribute '{attr}' on <{name}>"
                )));
            };
            self.pos += 1;
            let raw = self.take_until(quote, "attribute value")?;
            fields.insert(format!("@{attr}"), Value::String(decode_entities(raw)));
        };

        if self_closing {
            let value = if fields.is_empty() {
                Value::Null
            } else {
                Value::Object(fields)
            };
            return Ok((name, value));
        }

        let has_attributes = !fields.is_empty();
        let mut has_children = false;
        let mut text = String::new();

        loop {
            if self.at_end() {
                return Err(Error::xml(format!("Unclosed element <{name}>")));
            }

            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                if closing != name {
                    return Err(Error::xml(format!(
                        "Mismatched closing tag: expected </{name}>, found </{closing}>"
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            } else if self.starts_with("<!--") {
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.take_until("]]>", "CDATA section")?);
            } else if self.starts_with("<?") {
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("<") {
                let (child, value) = self.element(depth + 1)?;
                has_children = true;
                insert_child(&mut fields, child, value);
            } else {
                let rest = self.rest();
                let end = rest.find('<').unwrap_or(rest.len());
                text.push_str(&decode_entities(&rest[..end]));
                self.pos += end;
            }
        }

        let text = text.trim();
        let value = if !has_attributes && !has_children {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            if !text.is_empty() {
                fields.insert("#text".to_string(), Value::String(text.to_string()));
            }
            Value::Object(fields)
        };

        Ok((name, value))
    }
}

/// Add a child element, turning repeats into an array.
///
/// Element values are never arrays themselves, so an existing array always
/// means an earlier repeat.
fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

/// Replace predefined and numeric character references
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        let decoded = tail
            .find(';')
            .filter(|end| *end <= 12)
            .and_then(|end| resolve_entity(&tail[1..end]).map(|c| (c, end + 1)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
