//! Department entity type

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::store::{CodecError, Record, RecordReader, RecordWriter};

/// An organizational unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier
    pub id: String,

    pub name: String,

    /// Geographic region
    pub region: String,

    /// Remaining budget
    pub budget: f64,

    /// Manager heading this department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,

    /// Number of employees whose department is this one
    pub employee_count: u32,
}

impl Department {
    pub fn new(id: &str, name: &str, region: &str, budget: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            budget,
            manager_id: None,
            employee_count: 0,
        }
    }

    pub fn has_budget_available(&self, amount: f64) -> bool {
        amount <= self.budget
    }

    /// Take `amount` out of the budget; false when it does not cover it
    pub fn allocate_budget(&mut self, amount: f64) -> bool {
        if self.has_budget_available(amount) {
            self.budget -= amount;
            return true;
        }
        false
    }

    /// Increase the budget; non-positive amounts are ignored
    pub fn add_budget(&mut self, amount: f64) {
        if amount > 0.0 {
            self.budget += amount;
        }
    }

    pub fn increment_employee_count(&mut self) {
        self.employee_count = self.employee_count.saturating_add(1);
    }

    /// Floors at zero
    pub fn decrement_employee_count(&mut self) {
        self.employee_count = self.employee_count.saturating_sub(1);
    }
}

impl Entity for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_line(&self) -> String {
        format!(
            "{} {} ({}) budget {:.2}, {} employee(s), manager {}",
            self.id,
            self.name,
            self.region,
            self.budget,
            self.employee_count,
            self.manager_id.as_deref().unwrap_or("none")
        )
    }
}

impl Record for Department {
    fn encode(&self) -> String {
        RecordWriter::new()
            .text(&self.id)
            .text(&self.name)
            .text(&self.region)
            .value(self.budget)
            .opt(self.manager_id.as_deref())
            .value(self.employee_count)
            .finish()
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        let mut r = RecordReader::new(line)?;
        let department = Department {
            id: r.text()?,
            name: r.text()?,
            region: r.text()?,
            budget: r.value("budget")?,
            manager_id: r.opt()?,
            employee_count: r.value("employee_count")?,
        };
        r.finish()?;
        Ok(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut dept = Department::new("D001", "Marine Research", "North, Coast", 1_500_000.5);
        assert_eq!(Department::decode(&dept.encode()).unwrap(), dept);

        dept.manager_id = Some("M001".into());
        dept.employee_count = 12;
        assert_eq!(Department::decode(&dept.encode()).unwrap(), dept);
    }

    #[test]
    fn test_budget_operations() {
        let mut dept = Department::new("D001", "Ops", "South", 100.0);
        assert!(dept.allocate_budget(60.0));
        assert!(!dept.allocate_budget(60.0));
        assert_eq!(dept.budget, 40.0);

        dept.add_budget(-5.0);
        assert_eq!(dept.budget, 40.0);
        dept.add_budget(10.0);
        assert_eq!(dept.budget, 50.0);
    }

    #[test]
    fn test_employee_count_floors_at_zero() {
        let mut dept = Department::new("D001", "Ops", "South", 0.0);
        dept.decrement_employee_count();
        assert_eq!(dept.employee_count, 0);
        dept.increment_employee_count();
        assert_eq!(dept.employee_count, 1);
    }
}
