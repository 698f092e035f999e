//! Loan transaction entity type

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// Loan period used when none is configured
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;

/// One loan of a media item to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: String,

    pub user_id: String,

    pub media_id: String,

    pub borrow_date: NaiveDate,

    pub due_date: NaiveDate,

    /// Set once the item comes back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,

    pub late_fee: f64,
}

impl Transaction {
    /// Open a loan starting on `borrow_date`
    pub fn open(
        id: &str,
        user_id: &str,
        media_id: &str,
        borrow_date: NaiveDate,
        loan_period_days: u32,
    ) -> Self {
        let due_date = borrow_date
            .checked_add_days(Days::new(u64::from(loan_period_days)))
            .unwrap_or(NaiveDate::MAX);
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            media_id: media_id.to_string(),
            borrow_date,
            due_date,
            return_date: None,
            late_fee: 0.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn is_open_for(&self, user_id: &str, media_id: &str) -> bool {
        !self.is_completed() && self.user_id == user_id && self.media_id == media_id
    }

    /// Days past due as of the return date, or `today` while still open
    pub fn days_late(&self, today: NaiveDate) -> i64 {
        let compare = self.return_date.unwrap_or(today);
        (compare - self.due_date).num_days().max(0)
    }

    /// Open and past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && today > self.due_date
    }
}

impl Entity for Transaction {
    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        let state = match self.return_date {
            Some(returned) => format!("returned {returned}, fee {:.2}", self.late_fee),
            None => "open".to_string(),
        };
        format!(
            "{} {} borrowed {} on {}, due {} ({})",
            self.id, self.user_id, self.media_id, self.borrow_date, self.due_date, state
        )
    }
}

impl Record for Transaction {
    fn encode(&self) -> String {
        RecordWriter::new()
            .text(&self.id)
            .text(&self.user_id)
            .text(&self.media_id)
            .date(self.borrow_date)
            .date(self.due_date)
            .opt_date(self.return_date)
            .value(self.late_fee)
            .finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let transaction = Transaction {
            id: r.text()?,
            user_id: r.text()?,
            media_id: r.text()?,
            borrow_date: r.date("borrow_date")?,
            due_date: r.date("due_date")?,
            return_date: r.opt_date("return_date")?,
            late_fee: r.value("late_fee")?,
        };
        r.finish()?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date_uses_loan_period() {
        let t = Transaction::open("T001", "U005", "M003", date(2024, 2, 20), 14);
        assert_eq!(t.due_date, date(2024, 3, 5));
    }

    #[test]
    fn test_roundtrip_open_and_closed() {
        let mut t = Transaction::open("T001", "U005", "M003", date(2024, 2, 20), 14);
        assert_eq!(Transaction::decode(&t.encode()).unwrap(), t);

        t.return_date = Some(date(2024, 3, 11));
        t.late_fee = 12.0;
        assert_eq!(Transaction::decode(&t.encode()).unwrap(), t);
    }

    #[test]
    fn test_days_late_and_overdue() {
        let mut t = Transaction::open("T001", "U005", "M003", date(2024, 1, 1), 14);
        assert_eq!(t.days_late(date(2024, 1, 10)), 0);
        assert!(!t.is_overdue(date(2024, 1, 15)));
        assert!(t.is_overdue(date(2024, 1, 16)));
        assert_eq!(t.days_late(date(2024, 1, 21)), 6);

        t.return_date = Some(date(2024, 1, 17));
        assert_eq!(t.days_late(date(2024, 12, 31)), 2);
        assert!(!t.is_overdue(date(2024, 12, 31)));
        assert!(!t.is_open_for("U005", "M003"));
    }
}
