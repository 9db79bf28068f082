//! Streaming XMLTV guide parser
//!
//! Parses a programme-oriented XMLTV document into a lazy, finite,
//! non-restartable iterator of [`XmltvProgramme`] records. The reader pulls
//! one event at a time, so peak memory stays proportional to a single
//! `<programme>` element rather than the whole document.
//!
//! Failure policy: elements missing `channel`, `start`, or `stop`, and
//! elements whose timestamps do not parse, are skipped without being
//! yielded. An XML-level error ends the iteration, so a totally garbled
//! document produces an empty sequence rather than an error. Only gzip
//! corruption, handled in [`decode_guide`], is fatal.

use std::collections::HashMap;

use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::errors::SourceError;
use crate::models::XmltvProgramme;
use crate::utils::DecompressionService;
use crate::utils::time::parse_xmltv_timestamp;

/// Unwrap an optional gzip envelope and decode the document text.
///
/// Decompression failure propagates; the payload is unusable as a whole.
/// Text decoding is lossy by design - a stray invalid byte must not take
/// down the rest of the guide.
pub fn decode_guide(bytes: &[u8]) -> Result<String, SourceError> {
    let data = DecompressionService::decompress(Bytes::copy_from_slice(bytes)).map_err(|e| {
        SourceError::Decompression {
            message: e.to_string(),
        }
    })?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Stream-parse XMLTV text into programme records.
///
/// The returned iterator is lazy and single-pass; each yielded record is
/// immediately eligible for reclamation once consumed.
pub fn parse_programmes(content: &str) -> ProgrammeIter<'_> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    ProgrammeIter {
        reader,
        current: None,
        text: String::new(),
        done: false,
    }
}

/// Lazy iterator over `<programme>` elements of one XMLTV document
pub struct ProgrammeIter<'a> {
    reader: Reader<&'a [u8]>,
    current: Option<PendingProgramme>,
    text: String,
    done: bool,
}

/// Partially-assembled programme while its element is still open
struct PendingProgramme {
    channel: String,
    start: String,
    stop: String,
    title: Option<String>,
    description: Option<String>,
}

impl PendingProgramme {
    fn from_attributes(element: &BytesStart) -> Self {
        let attrs = parse_attributes(element);
        PendingProgramme {
            channel: attrs.get("channel").cloned().unwrap_or_default(),
            start: attrs.get("start").cloned().unwrap_or_default(),
            stop: attrs.get("stop").cloned().unwrap_or_default(),
            title: None,
            description: None,
        }
    }

    /// Validate and convert into a yielded record; `None` means skip
    fn finish(self) -> Option<XmltvProgramme> {
        if self.channel.is_empty() || self.start.is_empty() || self.stop.is_empty() {
            return None;
        }
        let start_utc = parse_xmltv_timestamp(&self.start)?;
        let stop_utc = parse_xmltv_timestamp(&self.stop)?;
        if start_utc >= stop_utc {
            return None;
        }
        Some(XmltvProgramme {
            tvg_id: self.channel,
            start_utc,
            stop_utc,
            title: self.title,
            description: self.description,
        })
    }
}

impl Iterator for ProgrammeIter<'_> {
    type Item = XmltvProgramme;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    if e.name().as_ref() == b"programme" {
                        self.current = Some(PendingProgramme::from_attributes(e));
                    }
                    self.text.clear();
                }

                Ok(Event::End(ref e)) => {
                    let finished = match e.name().as_ref() {
                        b"title" => {
                            if let Some(p) = self.current.as_mut() {
                                let text = self.text.trim();
                                if !text.is_empty() {
                                    p.title = Some(text.to_string());
                                }
                            }
                            None
                        }
                        b"desc" => {
                            if let Some(p) = self.current.as_mut() {
                                let text = self.text.trim();
                                if !text.is_empty() {
                                    p.description = Some(text.to_string());
                                }
                            }
                            None
                        }
                        b"programme" => self.current.take().and_then(PendingProgramme::finish),
                        _ => None,
                    };
                    self.text.clear();

                    if let Some(programme) = finished {
                        return Some(programme);
                    }
                }

                // A self-closing <programme/> has no children but may still
                // carry a valid airing window.
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"programme" {
                        if let Some(programme) = PendingProgramme::from_attributes(e).finish() {
                            return Some(programme);
                        }
                    }
                }

                Ok(Event::Text(e)) => {
                    if let Ok(text) = std::str::from_utf8(&e) {
                        self.text.push_str(text);
                    }
                }

                Ok(Event::CData(e)) => {
                    if let Ok(text) = std::str::from_utf8(&e) {
                        self.text.push_str(text);
                    }
                }

                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }

                Err(e) => {
                    // The rest of the document is unreadable; whatever was
                    // yielded so far stands.
                    debug!("XMLTV parsing stopped: {e}");
                    self.done = true;
                    return None;
                }

                _ => {}
            }
        }
    }
}

fn parse_attributes(element: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
    attrs
}
