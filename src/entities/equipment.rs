//! Equipment entity type

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};
use crate::entities::employee::completed_years;

/// Lifecycle status of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    #[default]
    Available,
    InUse,
    Maintenance,
    Retired,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "AVAILABLE",
            EquipmentStatus::InUse => "IN_USE",
            EquipmentStatus::Maintenance => "MAINTENANCE",
            EquipmentStatus::Retired => "RETIRED",
        }
    }

    pub fn all() -> &'static [EquipmentStatus] {
        &[
            EquipmentStatus::Available,
            EquipmentStatus::InUse,
            EquipmentStatus::Maintenance,
            EquipmentStatus::Retired,
        ]
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "AVAILABLE" => Ok(EquipmentStatus::Available),
            "IN_USE" => Ok(EquipmentStatus::InUse),
            "MAINTENANCE" => Ok(EquipmentStatus::Maintenance),
            "RETIRED" => Ok(EquipmentStatus::Retired),
            _ => Err(format!("unknown equipment status: {s}")),
        }
    }
}

/// A piece of equipment owned by a department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier
    pub id: String,

    pub name: String,

    pub equipment_type: String,

    pub serial_number: String,

    /// Owning department
    pub department_id: String,

    /// Technician currently holding the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    pub purchase_date: NaiveDate,

    pub status: EquipmentStatus,
}

impl Equipment {
    pub fn is_available(&self) -> bool {
        self.status == EquipmentStatus::Available
    }

    pub fn is_in_use(&self) -> bool {
        self.status == EquipmentStatus::InUse
    }

    /// Whole years since purchase
    pub fn age_years(&self, today: NaiveDate) -> u32 {
        completed_years(self.purchase_date, today)
    }

    pub fn assign(&mut self, technician_id: &str) {
        self.assigned_to = Some(technician_id.to_string());
        self.status = EquipmentStatus::InUse;
    }

    pub fn unassign(&mut self) {
        self.assigned_to = None;
        self.status = EquipmentStatus::Available;
    }

    /// Keeps the assignment so the holder gets the item back afterwards
    pub fn send_to_maintenance(&mut self) {
        self.status = EquipmentStatus::Maintenance;
    }

    pub fn return_from_maintenance(&mut self) {
        self.status = if self.assigned_to.is_some() {
            EquipmentStatus::InUse
        } else {
            EquipmentStatus::Available
        };
    }

    pub fn retire(&mut self) {
        self.status = EquipmentStatus::Retired;
        self.assigned_to = None;
    }

    /// IN_USE iff assigned, except that MAINTENANCE may keep its holder
    pub fn assignment_consistent(&self) -> bool {
        match self.status {
            EquipmentStatus::InUse => self.assigned_to.is_some(),
            EquipmentStatus::Maintenance => true,
            EquipmentStatus::Available | EquipmentStatus::Retired => self.assigned_to.is_none(),
        }
    }
}

impl Entity for Equipment {
    const KIND: EntityKind = EntityKind::Equipment;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        let holder = match &self.assigned_to {
            Some(tech) => format!(" held by {tech}"),
            None => String::new(),
        };
        format!(
            "{} {} ({}, s/n {}) [{}]{}",
            self.id, self.name, self.equipment_type, self.serial_number, self.status, holder
        )
    }
}

impl Record for Equipment {
    fn encode(&self) -> String {
        RecordWriter::new()
            .text(&self.id)
            .text(&self.name)
            .text(&self.equipment_type)
            .text(&self.serial_number)
            .text(&self.department_id)
            .opt(self.assigned_to.as_deref())
            .date(self.purchase_date)
            .text(self.status.as_str())
            .finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let equipment = Equipment {
            id: r.text()?,
            name: r.text()?,
            equipment_type: r.text()?,
            serial_number: r.text()?,
            department_id: r.text()?,
            assigned_to: r.opt()?,
            purchase_date: r.date("purchase_date")?,
            status: r.value("status")?,
        };
        r.finish()?;
        Ok(equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment() -> Equipment {
        Equipment {
            id: "E010".into(),
            name: "Sonar Array".into(),
            equipment_type: "Acoustic".into(),
            serial_number: "SN-44|B".into(),
            department_id: "D002".into(),
            assigned_to: None,
            purchase_date: NaiveDate::from_ymd_opt(2019, 9, 30).unwrap(),
            status: EquipmentStatus::Available,
        }
    }

    #[test]
    fn test_roundtrip() {
        let mut e = equipment();
        assert_eq!(Equipment::decode(&e.encode()).unwrap(), e);
        e.assign("T007");
        assert_eq!(Equipment::decode(&e.encode()).unwrap(), e);
    }

    #[test]
    fn test_lifecycle_keeps_assignment_invariant() {
        let mut e = equipment();
        e.assign("T007");
        assert!(e.is_in_use());
        assert!(e.assignment_consistent());

        e.send_to_maintenance();
        assert_eq!(e.assigned_to.as_deref(), Some("T007"));
        e.return_from_maintenance();
        assert_eq!(e.status, EquipmentStatus::InUse);

        e.unassign();
        e.send_to_maintenance();
        e.return_from_maintenance();
        assert!(e.is_available());

        e.assign("T001");
        e.retire();
        assert_eq!(e.status, EquipmentStatus::Retired);
        assert!(e.assigned_to.is_none());
        assert!(e.assignment_consistent());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in_use".parse::<EquipmentStatus>(), Ok(EquipmentStatus::InUse));
        assert_eq!("in-use".parse::<EquipmentStatus>(), Ok(EquipmentStatus::InUse));
        assert!("broken".parse::<EquipmentStatus>().is_err());
    }

    #[test]
    fn test_age() {
        let e = equipment();
        assert_eq!(e.age_years(NaiveDate::from_ymd_opt(2024, 9, 29).unwrap()), 4);
    }
}
