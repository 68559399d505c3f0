//! S3 XML deserialization: parsing response bodies into Rust types.
//!
//! This module provides the [`S3Deserialize`] trait and its implementations
//! for the response documents the client consumes. Unknown elements are
//! skipped, so newer services adding fields do not break parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::XmlError;
use crate::types::{ErrorDocument, InitiateMultipartUploadResult, ListBucketResult, ListedObject};

/// Trait for deserializing S3 types from XML.
///
/// The root element has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize S3 XML into a typed value.
///
/// Finds the root element and delegates to the type's `S3Deserialize`
/// implementation.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
///
/// # Examples
///
/// ```
/// use unistore_s3_xml::{ErrorDocument, from_xml};
///
/// let doc: ErrorDocument = from_xml(b"<Error><Code>NoSuchKey</Code></Error>").unwrap();
/// assert_eq!(doc.code, "NoSuchKey");
/// ```
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    // Text is not trimmed: keys may carry significant whitespace next to
    // entity references, which arrive as separate events.
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_string()));
            }
            _ => {}
        }
    }
}

/// Name of the root element of `xml`, if it has one.
///
/// Used to tell an `<Error>` document apart from the expected result in
/// bodies of successful responses.
#[must_use]
pub fn root_element_name(xml: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(xml);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => {
                return String::from_utf8(e.name().as_ref().to_vec()).ok();
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

fn tag_name(name: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(name)
        .map(ToOwned::to_owned)
        .map_err(|e| XmlError::ParseError(e.to_string()))
}

/// Read the text content of the current element and consume its end tag.
///
/// Entity and character references arrive as separate events and are
/// resolved in place.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::CData(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?
                {
                    text.push(ch);
                    continue;
                }
                let name = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                    .ok_or_else(|| XmlError::ParseError(format!("unknown entity &{name};")))?;
                text.push_str(resolved);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

/// Parse a u64 from XML text.
fn parse_u64(s: &str) -> Result<u64, XmlError> {
    s.parse::<u64>()
        .map_err(|e| XmlError::ParseError(format!("invalid u64 '{s}': {e}")))
}

/// Parse an ISO 8601 timestamp from XML text.
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, XmlError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            // S3 format: 2006-02-03T16:45:09.000Z
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| XmlError::ParseError(format!("invalid timestamp '{s}': {e}")))
}

// ---------------------------------------------------------------------------
// S3Deserialize implementations
// ---------------------------------------------------------------------------

impl S3Deserialize for ListBucketResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut result = ListBucketResult::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match tag_name(e.name().as_ref())?.as_str() {
                    "IsTruncated" => {
                        result.is_truncated = Some(parse_bool(&read_text_content(reader)?)?);
                    }
                    "NextContinuationToken" => {
                        result.next_continuation_token = Some(read_text_content(reader)?);
                    }
                    "KeyCount" => result.key_count = Some(parse_u64(&read_text_content(reader)?)?),
                    "Contents" => result.contents.push(ListedObject::deserialize_xml(reader)?),
                    "CommonPrefixes" => {
                        if let Some(prefix) = read_common_prefix(reader)? {
                            result.common_prefixes.push(prefix);
                        }
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in ListBucketResult".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(result)
    }
}

fn read_common_prefix(reader: &mut Reader<&[u8]>) -> Result<Option<String>, XmlError> {
    let mut prefix = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match tag_name(e.name().as_ref())?.as_str() {
                "Prefix" => prefix = Some(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(_) => return Ok(prefix),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF in CommonPrefixes".to_string(),
                ));
            }
            _ => {}
        }
    }
}

impl S3Deserialize for ListedObject {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;
        let mut object = ListedObject::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match tag_name(e.name().as_ref())?.as_str() {
                    "Key" => key = Some(read_text_content(reader)?),
                    // Some S3-compatible services emit the lowercase form.
                    "Size" | "size" => object.size = parse_u64(&read_text_content(reader)?)?,
                    "ETag" => object.etag = Some(read_text_content(reader)?),
                    "LastModified" => {
                        object.last_modified = Some(parse_timestamp(&read_text_content(reader)?)?);
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Contents".to_string(),
                    ));
                }
                _ => {}
            }
        }

        object.key = key.ok_or_else(|| XmlError::MissingElement("Key".to_string()))?;
        Ok(object)
    }
}

impl S3Deserialize for InitiateMultipartUploadResult {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut bucket = String::new();
        let mut key = String::new();
        let mut upload_id = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match tag_name(e.name().as_ref())?.as_str() {
                    "Bucket" => bucket = read_text_content(reader)?,
                    "Key" => key = read_text_content(reader)?,
                    "UploadId" => upload_id = Some(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in InitiateMultipartUploadResult".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(InitiateMultipartUploadResult {
            bucket,
            key,
            upload_id: upload_id.ok_or_else(|| XmlError::MissingElement("UploadId".to_string()))?,
        })
    }
}

impl S3Deserialize for ErrorDocument {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut doc = ErrorDocument::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match tag_name(e.name().as_ref())?.as_str() {
                    "Code" => doc.code = read_text_content(reader)?,
                    "Message" => doc.message = read_text_content(reader)?,
                    "Resource" => doc.resource = Some(read_text_content(reader)?),
                    "RequestId" => doc.request_id = Some(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Error".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(doc)
    }
}
