//! Project entity type

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Suspended,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "SUSPENDED" => Ok(ProjectStatus::Suspended),
            _ => Err(format!("unknown project status: {s}")),
        }
    }
}

/// A research project led by a scientist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: String,

    pub name: String,

    pub description: String,

    /// Owning department
    pub department_id: String,

    /// Scientist leading the project
    pub lead_scientist_id: String,

    pub budget: f64,

    pub start_date: NaiveDate,

    /// Planned end, never before the start
    pub end_date: NaiveDate,

    pub status: ProjectStatus,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Whole calendar months from start to end
    pub fn duration_months(&self) -> u32 {
        let mut months = (self.end_date.year() - self.start_date.year()) * 12
            + self.end_date.month() as i32
            - self.start_date.month() as i32;
        if self.end_date.day() < self.start_date.day() {
            months -= 1;
        }
        u32::try_from(months).unwrap_or(0)
    }

    /// Days until the end date, zero once completed or past
    pub fn remaining_days(&self, today: NaiveDate) -> i64 {
        if self.status == ProjectStatus::Completed {
            return 0;
        }
        (self.end_date - today).num_days().max(0)
    }

    /// Still active after its end date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && today > self.end_date
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        format!(
            "{} {} [{}] led by {} in {}, {} to {}",
            self.id,
            self.name,
            self.status,
            self.lead_scientist_id,
            self.department_id,
            self.start_date,
            self.end_date
        )
    }
}

impl Record for Project {
    fn encode(&self) -> String {
        RecordWriter::new()
            .text(&self.id)
            .text(&self.name)
            .text(&self.description)
            .text(&self.department_id)
            .text(&self.lead_scientist_id)
            .value(self.budget)
            .date(self.start_date)
            .date(self.end_date)
            .text(self.status.as_str())
            .finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let project = Project {
            id: r.text()?,
            name: r.text()?,
            description: r.text()?,
            department_id: r.text()?,
            lead_scientist_id: r.text()?,
            budget: r.value("budget")?,
            start_date: r.date("start_date")?,
            end_date: r.date("end_date")?,
            status: r.value("status")?,
        };
        r.finish()?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project {
            id: "P001".into(),
            name: "Reef Survey".into(),
            description: "Map bleaching | track recovery".into(),
            department_id: "D001".into(),
            lead_scientist_id: "S001".into(),
            budget: 250_000.0,
            start_date: date(2024, 1, 15),
            end_date: date(2025, 3, 14),
            status: ProjectStatus::Active,
        }
    }

    #[test]
    fn test_roundtrip() {
        let mut p = project();
        assert_eq!(Project::decode(&p.encode()).unwrap(), p);
        p.status = ProjectStatus::Suspended;
        assert_eq!(Project::decode(&p.encode()).unwrap(), p);
    }

    #[test]
    fn test_duration_counts_whole_months() {
        let p = project();
        assert_eq!(p.duration_months(), 13);
    }

    #[test]
    fn test_overdue_and_remaining() {
        let mut p = project();
        assert!(!p.is_overdue(date(2025, 3, 14)));
        assert!(p.is_overdue(date(2025, 3, 15)));
        assert_eq!(p.remaining_days(date(2025, 3, 4)), 10);
        assert_eq!(p.remaining_days(date(2026, 1, 1)), 0);

        p.status = ProjectStatus::Completed;
        assert!(!p.is_overdue(date(2026, 1, 1)));
        assert_eq!(p.remaining_days(date(2025, 1, 1)), 0);
    }
}
