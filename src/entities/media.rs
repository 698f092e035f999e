//! Media item entity type: books, magazines and DVDs

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// Late fee charged per day for a book; other formats scale from it
pub const BASE_LATE_FEE_PER_DAY: f64 = 1.0;

/// Media format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Book,
    Magazine,
    Dvd,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Book => "BOOK",
            MediaType::Magazine => "MAGAZINE",
            MediaType::Dvd => "DVD",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields that only exist for one format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "UPPERCASE")]
pub enum MediaDetails {
    Book {
        author: String,
        isbn: String,
        pages: u32,
        publisher: String,
    },
    Magazine {
        issue_number: u32,
        publisher: String,
        publication_date: NaiveDate,
    },
    Dvd {
        director: String,
        duration_minutes: u32,
        genre: String,
        release_year: i32,
    },
}

impl MediaDetails {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaDetails::Book { .. } => MediaType::Book,
            MediaDetails::Magazine { .. } => MediaType::Magazine,
            MediaDetails::Dvd { .. } => MediaType::Dvd,
        }
    }
}

/// An item in the library catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique identifier
    pub id: String,

    pub title: String,

    pub available: bool,

    /// Member holding the item; set exactly when not available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_by: Option<String>,

    #[serde(flatten)]
    pub details: MediaDetails,
}

impl MediaItem {
    pub fn new(id: &str, title: &str, details: MediaDetails) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            available: true,
            borrowed_by: None,
            details,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.details.media_type()
    }

    /// Per-day late fee for this format
    pub fn late_fee_rate(&self) -> f64 {
        match self.details {
            MediaDetails::Book { .. } => BASE_LATE_FEE_PER_DAY,
            MediaDetails::Magazine { .. } => BASE_LATE_FEE_PER_DAY * 0.5,
            MediaDetails::Dvd { .. } => BASE_LATE_FEE_PER_DAY * 2.0,
        }
    }

    pub fn late_fee(&self, days_late: i64) -> f64 {
        self.late_fee_rate() * days_late.max(0) as f64
    }

    pub fn author(&self) -> Option<&str> {
        match &self.details {
            MediaDetails::Book { author, .. } => Some(author),
            _ => None,
        }
    }

    pub fn isbn(&self) -> Option<&str> {
        match &self.details {
            MediaDetails::Book { isbn, .. } => Some(isbn),
            _ => None,
        }
    }

    pub fn check_out(&mut self, user_id: &str) {
        self.available = false;
        self.borrowed_by = Some(user_id.to_string());
    }

    pub fn check_in(&mut self) {
        self.available = true;
        self.borrowed_by = None;
    }

    /// Format-specific one-line description
    pub fn detail_summary(&self) -> String {
        match &self.details {
            MediaDetails::Book {
                author,
                isbn,
                pages,
                publisher,
            } => format!("by {author}, ISBN {isbn}, {pages} pages, {publisher}"),
            MediaDetails::Magazine {
                issue_number,
                publisher,
                publication_date,
            } => format!("issue {issue_number}, {publisher}, {publication_date}"),
            MediaDetails::Dvd {
                director,
                duration_minutes,
                genre,
                release_year,
            } => format!("dir. {director}, {duration_minutes} min, {genre}, {release_year}"),
        }
    }
}

impl Entity for MediaItem {
    const KIND: EntityKind = EntityKind::Media;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        let state = match &self.borrowed_by {
            Some(user) => format!("borrowed by {user}"),
            None => "available".to_string(),
        };
        format!(
            "{} [{}] {} ({}) {}",
            self.id,
            self.media_type(),
            self.title,
            self.detail_summary(),
            state
        )
    }
}

impl Record for MediaItem {
    fn encode(&self) -> String {
        let w = RecordWriter::new()
            .text(&self.id)
            .text(&self.title)
            .text(self.media_type().as_str())
            .value(self.available)
            .opt(self.borrowed_by.as_deref());
        let w = match &self.details {
            MediaDetails::Book {
                author,
                isbn,
                pages,
                publisher,
            } => w.text(author).text(isbn).value(pages).text(publisher),
            MediaDetails::Magazine {
                issue_number,
                publisher,
                publication_date,
            } => w.value(issue_number).text(publisher).date(*publication_date),
            MediaDetails::Dvd {
                director,
                duration_minutes,
                genre,
                release_year,
            } => w
                .text(director)
                .value(duration_minutes)
                .text(genre)
                .value(release_year),
        };
        w.finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let id = r.text()?;
        let title = r.text()?;
        let tag = r.text()?;
        let available = r.value("available")?;
        let borrowed_by = r.opt()?;
        let details = match tag.as_str() {
            "BOOK" => MediaDetails::Book {
                author: r.text()?,
                isbn: r.text()?,
                pages: r.value("pages")?,
                publisher: r.text()?,
            },
            "MAGAZINE" => MediaDetails::Magazine {
                issue_number: r.value("issue_number")?,
                publisher: r.text()?,
                publication_date: r.date("publication_date")?,
            },
            "DVD" => MediaDetails::Dvd {
                director: r.text()?,
                duration_minutes: r.value("duration_minutes")?,
                genre: r.text()?,
                release_year: r.value("release_year")?,
            },
            _ => return Err(CodecError::UnknownTag(tag)),
        };
        r.finish()?;

        Ok(MediaItem {
            id,
            title,
            available,
            borrowed_by,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dvd() -> MediaItem {
        MediaItem::new(
            "M003",
            "The Deep, Part 2",
            MediaDetails::Dvd {
                director: "R. Vance".into(),
                duration_minutes: 112,
                genre: "Documentary".into(),
                release_year: 2019,
            },
        )
    }

    #[test]
    fn test_roundtrip_every_format() {
        let book = MediaItem::new(
            "M001",
            "Tides | Currents",
            MediaDetails::Book {
                author: "L. Ortiz".into(),
                isbn: "978-0-00-000001-1".into(),
                pages: 412,
                publisher: "Harbor\\Press".into(),
            },
        );
        let magazine = MediaItem::new(
            "M002",
            "Ocean Monthly",
            MediaDetails::Magazine {
                issue_number: 88,
                publisher: "Blue Media".into(),
                publication_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            },
        );
        let mut borrowed = dvd();
        borrowed.check_out("U005");

        for item in [book, magazine, dvd(), borrowed] {
            assert_eq!(MediaItem::decode(&item.encode()).unwrap(), item);
        }
    }

    #[test]
    fn test_late_fee_rates() {
        let item = dvd();
        assert_eq!(item.late_fee_rate(), 2.0);
        assert_eq!(item.late_fee(6), 12.0);
        assert_eq!(item.late_fee(-3), 0.0);
    }

    #[test]
    fn test_check_out_and_in() {
        let mut item = dvd();
        item.check_out("U005");
        assert!(!item.available);
        assert_eq!(item.borrowed_by.as_deref(), Some("U005"));
        item.check_in();
        assert!(item.available);
        assert!(item.borrowed_by.is_none());
    }
}
