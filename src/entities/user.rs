//! Library user entity type: members and librarians

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// Fields that only exist for one kind of user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "UPPERCASE")]
pub enum UserRole {
    Member {
        membership_date: NaiveDate,
        /// Media currently on loan to this member
        borrowed_items: Vec<String>,
        /// Outstanding late fees
        fines: f64,
    },
    Librarian {
        employee_id: String,
        position: String,
        hire_date: NaiveDate,
    },
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member { .. } => "MEMBER",
            UserRole::Librarian { .. } => "LIBRARIAN",
        }
    }
}

/// A registered library user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,

    pub name: String,

    pub email: String,

    pub phone: String,

    #[serde(flatten)]
    pub role: UserRole,
}

impl User {
    pub fn member(id: &str, name: &str, email: &str, phone: &str, joined: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            role: UserRole::Member {
                membership_date: joined,
                borrowed_items: Vec::new(),
                fines: 0.0,
            },
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self.role, UserRole::Member { .. })
    }

    /// Outstanding fines; librarians never owe anything
    pub fn fines(&self) -> f64 {
        match &self.role {
            UserRole::Member { fines, .. } => *fines,
            UserRole::Librarian { .. } => 0.0,
        }
    }

    pub fn borrowed_items(&self) -> &[String] {
        match &self.role {
            UserRole::Member { borrowed_items, .. } => borrowed_items,
            UserRole::Librarian { .. } => &[],
        }
    }

    /// Members without outstanding fines may borrow
    pub fn can_borrow(&self) -> bool {
        self.is_member() && self.fines() == 0.0
    }

    pub fn borrowed_items_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.role {
            UserRole::Member { borrowed_items, .. } => Some(borrowed_items),
            UserRole::Librarian { .. } => None,
        }
    }

    pub fn add_fine(&mut self, amount: f64) {
        if let UserRole::Member { fines, .. } = &mut self.role {
            *fines += amount;
        }
    }

    /// Reduce fines by `amount`, never below zero
    pub fn pay_fine(&mut self, amount: f64) {
        if let UserRole::Member { fines, .. } = &mut self.role {
            *fines = (*fines - amount).max(0.0);
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        match &self.role {
            UserRole::Member {
                borrowed_items,
                fines,
                ..
            } => format!(
                "{} {} [MEMBER] {} item(s) on loan, fines {:.2}",
                self.id,
                self.name,
                borrowed_items.len(),
                fines
            ),
            UserRole::Librarian {
                employee_id,
                position,
                ..
            } => format!(
                "{} {} [LIBRARIAN] {} ({})",
                self.id, self.name, position, employee_id
            ),
        }
    }
}

impl Record for User {
    fn encode(&self) -> String {
        let w = RecordWriter::new()
            .text(&self.id)
            .text(&self.name)
            .text(&self.email)
            .text(&self.phone)
            .text(self.role.as_str());
        let w = match &self.role {
            UserRole::Member {
                membership_date,
                borrowed_items,
                fines,
            } => w.date(*membership_date).list(borrowed_items).value(fines),
            UserRole::Librarian {
                employee_id,
                position,
                hire_date,
            } => w.text(employee_id).text(position).date(*hire_date),
        };
        w.finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let id = r.text()?;
        let name = r.text()?;
        let email = r.text()?;
        let phone = r.text()?;
        let tag = r.text()?;
        let role = match tag.as_str() {
            "MEMBER" => UserRole::Member {
                membership_date: r.date("membership_date")?,
                borrowed_items: r.list()?,
                fines: r.value("fines")?,
            },
            "LIBRARIAN" => UserRole::Librarian {
                employee_id: r.text()?,
                position: r.text()?,
                hire_date: r.date("hire_date")?,
            },
            _ => return Err(CodecError::UnknownTag(tag)),
        };
        r.finish()?;

        Ok(User {
            id,
            name,
            email,
            phone,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_roundtrip_both_roles() {
        let mut member = User::member("U001", "Kim, J.", "kim@example.org", "555", date(2023, 2, 1));
        member.borrowed_items_mut().unwrap().push("M003".into());
        member.add_fine(2.5);
        assert_eq!(User::decode(&member.encode()).unwrap(), member);

        let librarian = User {
            id: "U002".into(),
            name: "Pat".into(),
            email: "pat@example.org".into(),
            phone: "".into(),
            role: UserRole::Librarian {
                employee_id: "L-17".into(),
                position: "Head | Circulation".into(),
                hire_date: date(2010, 8, 9),
            },
        };
        assert_eq!(User::decode(&librarian.encode()).unwrap(), librarian);
    }

    #[test]
    fn test_fines() {
        let mut member = User::member("U001", "Kim", "k@x", "1", date(2023, 2, 1));
        assert!(member.can_borrow());
        member.add_fine(12.0);
        assert!(!member.can_borrow());
        member.pay_fine(5.0);
        assert_eq!(member.fines(), 7.0);
        member.pay_fine(100.0);
        assert_eq!(member.fines(), 0.0);
        assert!(member.can_borrow());
    }

    #[test]
    fn test_librarian_cannot_borrow() {
        let librarian = User {
            id: "U002".into(),
            name: "Pat".into(),
            email: "p@x".into(),
            phone: "2".into(),
            role: UserRole::Librarian {
                employee_id: "L1".into(),
                position: "Clerk".into(),
                hire_date: date(2010, 8, 9),
            },
        };
        assert!(!librarian.can_borrow());
        assert!(librarian.borrowed_items().is_empty());
    }
}
