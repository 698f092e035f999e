//! Employee entity type with its three role variants

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// Scientists leading more projects than this are overloaded
pub const SCIENTIST_PROJECT_LIMIT: usize = 3;

/// Technicians handling more equipment than this are overloaded
pub const TECHNICIAN_EQUIPMENT_LIMIT: usize = 5;

/// Role family of an employee
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    Manager,
    Scientist,
    Technician,
}

impl RoleType {
    /// Id prefix for employees of this role
    pub fn prefix(&self) -> &'static str {
        match self {
            RoleType::Manager => "M",
            RoleType::Scientist => "S",
            RoleType::Technician => "T",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Manager => "MANAGER",
            RoleType::Scientist => "SCIENTIST",
            RoleType::Technician => "TECHNICIAN",
        }
    }

    pub fn all() -> &'static [RoleType] {
        &[RoleType::Manager, RoleType::Scientist, RoleType::Technician]
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANAGER" => Ok(RoleType::Manager),
            "SCIENTIST" => Ok(RoleType::Scientist),
            "TECHNICIAN" => Ok(RoleType::Technician),
            _ => Err(format!("unknown role type: {s}")),
        }
    }
}

/// Fields that only exist for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role_type", rename_all = "UPPERCASE")]
pub enum RoleDetails {
    Manager {
        /// Largest amount this manager may approve
        budget_authority: f64,
        /// Ids of the employees on this manager's team
        team: Vec<String>,
    },
    Scientist {
        specialization: String,
        /// Ids of the projects this scientist leads
        projects: Vec<String>,
    },
    Technician {
        certifications: String,
        /// Ids of the equipment assigned to this technician
        equipment: Vec<String>,
    },
}

impl RoleDetails {
    pub fn role_type(&self) -> RoleType {
        match self {
            RoleDetails::Manager { .. } => RoleType::Manager,
            RoleDetails::Scientist { .. } => RoleType::Scientist,
            RoleDetails::Technician { .. } => RoleType::Technician,
        }
    }
}

/// A staff member of the organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier
    pub id: String,

    pub name: String,

    pub email: String,

    pub phone: String,

    /// Department this employee belongs to
    pub department_id: String,

    /// Job title
    pub role: String,

    pub salary: f64,

    pub hire_date: NaiveDate,

    /// Role-specific fields
    #[serde(flatten)]
    pub details: RoleDetails,
}

impl Employee {
    pub fn role_type(&self) -> RoleType {
        self.details.role_type()
    }

    /// Whole years between the hire date and `today`
    pub fn years_of_service(&self, today: NaiveDate) -> u32 {
        completed_years(self.hire_date, today)
    }

    /// Managers may approve amounts up to their budget authority
    pub fn can_approve_budget(&self, amount: f64) -> bool {
        match &self.details {
            RoleDetails::Manager {
                budget_authority, ..
            } => amount <= *budget_authority,
            _ => false,
        }
    }

    pub fn is_overloaded(&self) -> bool {
        match &self.details {
            RoleDetails::Scientist { projects, .. } => projects.len() > SCIENTIST_PROJECT_LIMIT,
            RoleDetails::Technician { equipment, .. } => {
                equipment.len() > TECHNICIAN_EQUIPMENT_LIMIT
            }
            RoleDetails::Manager { .. } => false,
        }
    }

    /// Case-insensitive substring match against a technician's certifications
    pub fn has_certification(&self, cert: &str) -> bool {
        match &self.details {
            RoleDetails::Technician { certifications, .. } => certifications
                .to_lowercase()
                .contains(&cert.to_lowercase()),
            _ => false,
        }
    }

    /// The id list this role maintains, if any
    pub fn linked_ids(&self) -> &[String] {
        match &self.details {
            RoleDetails::Manager { team, .. } => team,
            RoleDetails::Scientist { projects, .. } => projects,
            RoleDetails::Technician { equipment, .. } => equipment,
        }
    }

    pub fn team_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.details {
            RoleDetails::Manager { team, .. } => Some(team),
            _ => None,
        }
    }

    pub fn projects_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.details {
            RoleDetails::Scientist { projects, .. } => Some(projects),
            _ => None,
        }
    }

    pub fn equipment_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.details {
            RoleDetails::Technician { equipment, .. } => Some(equipment),
            _ => None,
        }
    }

    /// Short description of the role-specific fields
    pub fn role_summary(&self) -> String {
        match &self.details {
            RoleDetails::Manager {
                budget_authority,
                team,
            } => format!(
                "budget authority {:.2}, team of {}",
                budget_authority,
                team.len()
            ),
            RoleDetails::Scientist {
                specialization,
                projects,
            } => format!("{}, {} project(s)", specialization, projects.len()),
            RoleDetails::Technician {
                certifications,
                equipment,
            } => format!("{}, {} item(s)", certifications, equipment.len()),
        }
    }
}

/// Whole years from `start` to `end`, zero when `end` is earlier
pub(crate) fn completed_years(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        format!(
            "{} {} [{}] {} in {} ({:.2})",
            self.id,
            self.name,
            self.role_type(),
            self.role,
            self.department_id,
            self.salary
        )
    }
}

impl Record for Employee {
    fn encode(&self) -> String {
        let w = RecordWriter::new()
            .text(&self.id)
            .text(&self.name)
            .text(&self.email)
            .text(&self.phone)
            .text(&self.department_id)
            .text(&self.role)
            .value(self.salary)
            .date(self.hire_date)
            .text(self.role_type().as_str());
        let w = match &self.details {
            RoleDetails::Manager {
                budget_authority,
                team,
            } => w.value(budget_authority).list(team),
            RoleDetails::Scientist {
                specialization,
                projects,
            } => w.text(specialization).list(projects),
            RoleDetails::Technician {
                certifications,
                equipment,
            } => w.text(certifications).list(equipment),
        };
        w.finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let id = r.text()?;
        let name = r.text()?;
        let email = r.text()?;
        let phone = r.text()?;
        let department_id = r.text()?;
        let role = r.text()?;
        let salary = r.value("salary")?;
        let hire_date = r.date("hire_date")?;
        let tag = r.text()?;
        let details = match tag.parse::<RoleType>() {
            Ok(RoleType::Manager) => RoleDetails::Manager {
                budget_authority: r.value("budget_authority")?,
                team: r.list()?,
            },
            Ok(RoleType::Scientist) => RoleDetails::Scientist {
                specialization: r.text()?,
                projects: r.list()?,
            },
            Ok(RoleType::Technician) => RoleDetails::Technician {
                certifications: r.text()?,
                equipment: r.list()?,
            },
            Err(_) => return Err(CodecError::UnknownTag(tag)),
        };
        r.finish()?;

        Ok(Employee {
            id,
            name,
            email,
            phone,
            department_id,
            role,
            salary,
            hire_date,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(details: RoleDetails) -> Employee {
        Employee {
            id: "X001".into(),
            name: "Ada, Countess|Lovelace".into(),
            email: "ada@example.org".into(),
            phone: "555-0100".into(),
            department_id: "D001".into(),
            role: "Lead".into(),
            salary: 91_250.75,
            hire_date: date(2015, 6, 1),
            details,
        }
    }

    #[test]
    fn test_roundtrip_every_role() {
        let variants = [
            RoleDetails::Manager {
                budget_authority: 250_000.0,
                team: vec!["S001".into(), "T002".into()],
            },
            RoleDetails::Scientist {
                specialization: "Marine biology, coral".into(),
                projects: vec![],
            },
            RoleDetails::Technician {
                certifications: "ROV\nDiving".into(),
                equipment: vec!["E010".into()],
            },
        ];
        for details in variants {
            let original = employee(details);
            let decoded = Employee::decode(&original.encode()).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_decode_unknown_tag() {
        let line = "X001|A|a@b|1|D001|Lead|10|2020-01-01|JANITOR|x|";
        assert_eq!(
            Employee::decode(line).unwrap_err(),
            CodecError::UnknownTag("JANITOR".into())
        );
    }

    #[test]
    fn test_years_of_service() {
        let e = employee(RoleDetails::Scientist {
            specialization: "x".into(),
            projects: vec![],
        });
        assert_eq!(e.years_of_service(date(2025, 5, 31)), 9);
        assert_eq!(e.years_of_service(date(2025, 6, 1)), 10);
        assert_eq!(e.years_of_service(date(2010, 1, 1)), 0);
    }

    #[test]
    fn test_role_derived_values() {
        let manager = employee(RoleDetails::Manager {
            budget_authority: 1000.0,
            team: vec![],
        });
        assert!(manager.can_approve_budget(1000.0));
        assert!(!manager.can_approve_budget(1000.01));

        let scientist = employee(RoleDetails::Scientist {
            specialization: "x".into(),
            projects: (1..=4).map(|i| format!("P00{i}")).collect(),
        });
        assert!(scientist.is_overloaded());
        assert!(!scientist.can_approve_budget(1.0));

        let technician = employee(RoleDetails::Technician {
            certifications: "ROV Pilot, Diving".into(),
            equipment: vec!["E001".into()],
        });
        assert!(technician.has_certification("rov"));
        assert!(!technician.is_overloaded());
    }

    #[test]
    fn test_role_prefixes() {
        let prefixes: Vec<&str> = RoleType::all().iter().map(|r| r.prefix()).collect();
        assert_eq!(prefixes, vec!["M", "S", "T"]);
        assert_eq!("scientist".parse::<RoleType>().unwrap(), RoleType::Scientist);
    }
}
