//! Pipe-delimited line encoding for records
//!
//! One record per line. Fields are separated by `|`, list fields join their
//! elements with `,`, and an absent optional value is an empty field. A
//! backslash escapes `\`, `|`, `,` and line breaks inside field text, so any
//! string survives a round trip.

use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::core::entity::Entity;

/// Date format used on disk
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FIELD_SEP: char = '|';
const LIST_SEP: char = ',';
const ESCAPE: char = '\\';

/// A record that can be written to and read back from a single line
pub trait Record: Entity + Clone + Sized {
    /// Encode as one line without a trailing newline
    fn encode(&self) -> String;

    /// Decode a line produced by [`Record::encode`]
    fn decode(line: &str) -> Result<Self, CodecError>;
}

/// Errors raised while decoding a line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unknown variant tag '{0}'")]
    UnknownTag(String),

    #[error("field {index} ({name}): cannot parse '{value}'")]
    InvalidField {
        index: usize,
        name: &'static str,
        value: String,
    },

    #[error("line ends with a dangling escape")]
    DanglingEscape,
}

/// Escape a single value for storage inside a field
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            FIELD_SEP => out.push_str("\\|"),
            LIST_SEP => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`]
pub fn unescape(raw: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => return Err(CodecError::DanglingEscape),
        }
    }
    Ok(out)
}

/// Split on `sep` wherever it is not preceded by an escape.
/// The pieces keep their escapes.
fn split_unescaped(raw: &str, sep: char) -> Result<Vec<&str>, CodecError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == sep {
            parts.push(&raw[start..i]);
            start = i + c.len_utf8();
        }
    }
    if escaped {
        return Err(CodecError::DanglingEscape);
    }
    parts.push(&raw[start..]);
    Ok(parts)
}

/// Builds an encoded line field by field
#[derive(Debug, Default)]
pub struct RecordWriter {
    fields: Vec<String>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, value: &str) -> Self {
        self.fields.push(escape(value));
        self
    }

    pub fn opt(self, value: Option<&str>) -> Self {
        self.text(value.unwrap_or(""))
    }

    pub fn list(mut self, values: &[String]) -> Self {
        let joined = values
            .iter()
            .map(|v| escape(v))
            .collect::<Vec<_>>()
            .join(",");
        self.fields.push(joined);
        self
    }

    /// Any value whose `Display` output parses back through `FromStr`
    pub fn value<T: Display>(mut self, value: T) -> Self {
        self.fields.push(escape(&value.to_string()));
        self
    }

    pub fn date(self, value: NaiveDate) -> Self {
        self.text(&value.format(DATE_FORMAT).to_string())
    }

    pub fn opt_date(self, value: Option<NaiveDate>) -> Self {
        match value {
            Some(date) => self.date(date),
            None => self.text(""),
        }
    }

    pub fn finish(self) -> String {
        self.fields.join("|")
    }
}

/// Reads fields from a line in order
#[derive(Debug)]
pub struct RecordReader<'a> {
    fields: Vec<&'a str>,
    cursor: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(line: &'a str) -> Result<Self, CodecError> {
        Ok(Self {
            fields: split_unescaped(line, FIELD_SEP)?,
            cursor: 0,
        })
    }

    fn next_raw(&mut self) -> Result<(usize, &'a str), CodecError> {
        let index = self.cursor;
        let raw = self
            .fields
            .get(index)
            .copied()
            .ok_or(CodecError::FieldCount {
                expected: index + 1,
                found: self.fields.len(),
            })?;
        self.cursor += 1;
        Ok((index, raw))
    }

    pub fn text(&mut self) -> Result<String, CodecError> {
        let (_, raw) = self.next_raw()?;
        unescape(raw)
    }

    pub fn opt(&mut self) -> Result<Option<String>, CodecError> {
        let value = self.text()?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    pub fn list(&mut self) -> Result<Vec<String>, CodecError> {
        let (_, raw) = self.next_raw()?;
        split_unescaped(raw, LIST_SEP)?
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .map(unescape)
            .collect()
    }

    pub fn value<T: FromStr>(&mut self, name: &'static str) -> Result<T, CodecError> {
        let (index, raw) = self.next_raw()?;
        let text = unescape(raw)?;
        text.parse().map_err(|_| CodecError::InvalidField {
            index,
            name,
            value: text,
        })
    }

    pub fn date(&mut self, name: &'static str) -> Result<NaiveDate, CodecError> {
        let (index, raw) = self.next_raw()?;
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| CodecError::InvalidField {
            index,
            name,
            value: raw.to_string(),
        })
    }

    pub fn opt_date(&mut self, name: &'static str) -> Result<Option<NaiveDate>, CodecError> {
        let (index, raw) = self.next_raw()?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| CodecError::InvalidField {
                index,
                name,
                value: raw.to_string(),
            })
    }

    /// Fail if fields remain unread
    pub fn finish(self) -> Result<(), CodecError> {
        if self.cursor != self.fields.len() {
            return Err(CodecError::FieldCount {
                expected: self.cursor,
                found: self.fields.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        for value in ["plain", "a|b", "x,y", "back\\slash", "two\nlines", "", "\\|,"] {
            assert_eq!(unescape(&escape(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_writer_reader_fields() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        let line = RecordWriter::new()
            .text("A|B")
            .opt(None)
            .list(&["x,1".to_string(), "y".to_string()])
            .value(2.5f64)
            .date(date)
            .opt_date(None)
            .value(true)
            .finish();

        let mut reader = RecordReader::new(&line).unwrap();
        assert_eq!(reader.text().unwrap(), "A|B");
        assert_eq!(reader.opt().unwrap(), None);
        assert_eq!(reader.list().unwrap(), vec!["x,1", "y"]);
        assert_eq!(reader.value::<f64>("amount").unwrap(), 2.5);
        assert_eq!(reader.date("date").unwrap(), date);
        assert_eq!(reader.opt_date("returned").unwrap(), None);
        assert!(reader.value::<bool>("flag").unwrap());
        reader.finish().unwrap();
    }

    #[test]
    fn test_empty_list_field() {
        let line = RecordWriter::new().text("id").list(&[]).finish();
        let mut reader = RecordReader::new(&line).unwrap();
        reader.text().unwrap();
        assert!(reader.list().unwrap().is_empty());
    }

    #[test]
    fn test_float_precision_survives() {
        let salary = 85_000.123_456_789_f64;
        let line = RecordWriter::new().value(salary).finish();
        let mut reader = RecordReader::new(&line).unwrap();
        assert_eq!(reader.value::<f64>("salary").unwrap(), salary);
    }

    #[test]
    fn test_missing_and_extra_fields() {
        let mut reader = RecordReader::new("a|b").unwrap();
        reader.text().unwrap();
        reader.text().unwrap();
        assert_eq!(
            reader.text().unwrap_err(),
            CodecError::FieldCount {
                expected: 3,
                found: 2
            }
        );

        let mut reader = RecordReader::new("a|b").unwrap();
        reader.text().unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_invalid_number() {
        let mut reader = RecordReader::new("abc").unwrap();
        assert!(matches!(
            reader.value::<f64>("salary"),
            Err(CodecError::InvalidField { name: "salary", .. })
        ));
    }

    #[test]
    fn test_dangling_escape() {
        assert_eq!(
            RecordReader::new("abc\\").unwrap_err(),
            CodecError::DanglingEscape
        );
    }
}
