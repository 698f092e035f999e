//! Organization facade: employees, departments, projects and equipment

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::entity::{push_unique, remove_id, same_id};
use crate::core::error::{ensure_non_negative, ensure_present, Result, TroveError};
use crate::core::identity::EntityKind;
use crate::core::query::{
    binary_search, cmp_f64, cmp_ignore_case, contains_ignore_case, linear_search, quick_sort,
    then_by, SortAlgorithm, SortOrder,
};
use crate::core::store::Store;
use crate::entities::{
    Department, Employee, Equipment, EquipmentStatus, Project, ProjectStatus, RoleDetails,
    RoleType,
};

use super::{ensure_new_id, find, generate_id, index_of, locate, IdMatch, Inconsistency};

/// Organization ids compare case-insensitively
const IDS: IdMatch = IdMatch::IgnoreCase;

/// Fields for a new department; the id is generated when absent
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub id: Option<String>,
    pub name: String,
    pub region: String,
    pub budget: f64,
}

/// Fields shared by every new employee; the id is generated when absent
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department_id: String,
    pub role: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
}

/// Fields for a new project; the id is generated when absent
#[derive(Debug, Clone)]
pub struct NewProject {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub department_id: String,
    pub lead_scientist_id: String,
    pub budget: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Fields for a new equipment item; the id is generated when absent
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub id: Option<String>,
    pub name: String,
    pub equipment_type: String,
    pub serial_number: String,
    pub department_id: String,
    pub purchase_date: NaiveDate,
}

/// Summary figures for the whole organization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgStatistics {
    pub employees: usize,
    pub managers: usize,
    pub scientists: usize,
    pub technicians: usize,
    pub total_payroll: f64,
    pub average_salary: f64,
    pub departments: usize,
    pub total_department_budget: f64,
    pub projects: usize,
    pub active_projects: usize,
    pub equipment: usize,
    pub equipment_available: usize,
    pub equipment_in_use: usize,
    pub equipment_in_maintenance: usize,
    pub equipment_retired: usize,
}

/// Every collection of the organization
#[derive(Debug, Clone, Default)]
struct OrgState {
    employees: Vec<Employee>,
    departments: Vec<Department>,
    projects: Vec<Project>,
    equipment: Vec<Equipment>,
}

/// Owns the organization's records and keeps them consistent
pub struct Organization<S: Store> {
    store: S,
    state: OrgState,
}

impl<S: Store> Organization<S> {
    /// Load every collection from `store`
    pub fn open(store: S) -> Result<Self> {
        let state = OrgState {
            employees: store.load_all()?,
            departments: store.load_all()?,
            projects: store.load_all()?,
            equipment: store.load_all()?,
        };
        info!(
            employees = state.employees.len(),
            departments = state.departments.len(),
            projects = state.projects.len(),
            equipment = state.equipment.len(),
            "organization loaded"
        );
        Ok(Self { store, state })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Persist the touched kinds of `next`, then make it current
    fn commit(&mut self, next: OrgState, dirty: &[EntityKind]) -> Result<()> {
        for kind in dirty {
            match kind {
                EntityKind::Employee => self.store.save_all(&next.employees)?,
                EntityKind::Department => self.store.save_all(&next.departments)?,
                EntityKind::Project => self.store.save_all(&next.projects)?,
                EntityKind::Equipment => self.store.save_all(&next.equipment)?,
                other => debug!(kind = %other, "not an organization collection"),
            }
        }
        self.state = next;
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn employees(&self) -> &[Employee] {
        &self.state.employees
    }

    pub fn departments(&self) -> &[Department] {
        &self.state.departments
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    pub fn equipment(&self) -> &[Equipment] {
        &self.state.equipment
    }

    /// Linear lookup by id
    pub fn find_employee(&self, id: &str) -> Result<&Employee> {
        find(&self.state.employees, id, IDS)
    }

    pub fn find_department(&self, id: &str) -> Result<&Department> {
        find(&self.state.departments, id, IDS)
    }

    pub fn find_project(&self, id: &str) -> Result<&Project> {
        find(&self.state.projects, id, IDS)
    }

    pub fn find_equipment(&self, id: &str) -> Result<&Equipment> {
        find(&self.state.equipment, id, IDS)
    }

    // ==================== Departments ====================

    pub fn add_department(&mut self, new: NewDepartment) -> Result<Department> {
        let id = match new.id {
            Some(id) => id,
            None => generate_id(&self.state.departments, "D", IDS)?,
        };
        ensure_new_id(&self.state.departments, &id, IDS)?;
        ensure_present("name", &new.name)?;
        ensure_non_negative("budget", new.budget)?;

        let department = Department::new(&id, &new.name, &new.region, new.budget);
        let mut next = self.state.clone();
        next.departments.push(department.clone());
        self.commit(next, &[EntityKind::Department])?;

        info!(id = %department.id, name = %department.name, "department added");
        Ok(department)
    }

    /// Remove a department nothing refers to any more
    pub fn remove_department(&mut self, id: &str) -> Result<Department> {
        let index = locate(&self.state.departments, id, IDS)?;
        let dept_id = self.state.departments[index].id.clone();

        let employees = self
            .state
            .employees
            .iter()
            .filter(|e| same_id(&e.department_id, &dept_id))
            .count();
        let projects = self
            .state
            .projects
            .iter()
            .filter(|p| same_id(&p.department_id, &dept_id))
            .count();
        let equipment = self
            .state
            .equipment
            .iter()
            .filter(|e| same_id(&e.department_id, &dept_id))
            .count();
        if employees + projects + equipment > 0 {
            return Err(TroveError::precondition(
                "remove department",
                format!(
                    "{dept_id} still has {employees} employee(s), {projects} project(s) and {equipment} equipment item(s)"
                ),
            ));
        }

        let mut next = self.state.clone();
        let removed = next.departments.remove(index);
        self.commit(next, &[EntityKind::Department])?;

        info!(id = %removed.id, "department removed");
        Ok(removed)
    }

    /// Make `manager_id`, a manager working in the department, its head
    pub fn assign_department_manager(&mut self, dept_id: &str, manager_id: &str) -> Result<Department> {
        let d = locate(&self.state.departments, dept_id, IDS)?;
        let e = locate(&self.state.employees, manager_id, IDS)?;
        let manager = &self.state.employees[e];
        let department = &self.state.departments[d];

        if manager.role_type() != RoleType::Manager {
            return Err(TroveError::precondition(
                "assign department manager",
                format!("{} is a {}, not a manager", manager.id, manager.role_type()),
            ));
        }
        if !same_id(&manager.department_id, &department.id) {
            return Err(TroveError::precondition(
                "assign department manager",
                format!("{} works in {}, not {}", manager.id, manager.department_id, department.id),
            ));
        }

        let manager_id = manager.id.clone();
        let mut next = self.state.clone();
        next.departments[d].manager_id = Some(manager_id.clone());
        let updated = next.departments[d].clone();
        self.commit(next, &[EntityKind::Department])?;

        info!(department = %updated.id, manager = %manager_id, "department manager assigned");
        Ok(updated)
    }

    /// Take `amount` out of a department's budget
    pub fn allocate_budget(&mut self, dept_id: &str, amount: f64) -> Result<Department> {
        ensure_non_negative("amount", amount)?;
        let d = locate(&self.state.departments, dept_id, IDS)?;

        let mut next = self.state.clone();
        if !next.departments[d].allocate_budget(amount) {
            return Err(TroveError::precondition(
                "allocate budget",
                format!(
                    "{:.2} exceeds the remaining {:.2} of {}",
                    amount, next.departments[d].budget, next.departments[d].id
                ),
            ));
        }
        let updated = next.departments[d].clone();
        self.commit(next, &[EntityKind::Department])?;

        info!(department = %updated.id, amount, remaining = updated.budget, "budget allocated");
        Ok(updated)
    }

    /// Add `amount` to a department's budget
    pub fn add_budget(&mut self, dept_id: &str, amount: f64) -> Result<Department> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TroveError::invalid("amount", "must be greater than zero"));
        }
        let d = locate(&self.state.departments, dept_id, IDS)?;

        let mut next = self.state.clone();
        next.departments[d].add_budget(amount);
        let updated = next.departments[d].clone();
        self.commit(next, &[EntityKind::Department])?;

        info!(department = %updated.id, amount, budget = updated.budget, "budget added");
        Ok(updated)
    }

    pub fn departments_by_region(&self, region: &str) -> Vec<&Department> {
        linear_search(&self.state.departments, |d| d.region.eq_ignore_ascii_case(region))
    }

    // ==================== Employees ====================

    pub fn add_manager(&mut self, new: NewEmployee, budget_authority: f64) -> Result<Employee> {
        ensure_non_negative("budget_authority", budget_authority)?;
        self.insert_employee(
            new,
            RoleDetails::Manager {
                budget_authority,
                team: Vec::new(),
            },
        )
    }

    pub fn add_scientist(&mut self, new: NewEmployee, specialization: &str) -> Result<Employee> {
        self.insert_employee(
            new,
            RoleDetails::Scientist {
                specialization: specialization.to_string(),
                projects: Vec::new(),
            },
        )
    }

    pub fn add_technician(&mut self, new: NewEmployee, certifications: &str) -> Result<Employee> {
        self.insert_employee(
            new,
            RoleDetails::Technician {
                certifications: certifications.to_string(),
                equipment: Vec::new(),
            },
        )
    }

    fn insert_employee(&mut self, new: NewEmployee, details: RoleDetails) -> Result<Employee> {
        let id = match new.id {
            Some(id) => id,
            None => self.generate_next_employee_id(details.role_type())?,
        };
        ensure_new_id(&self.state.employees, &id, IDS)?;
        ensure_present("name", &new.name)?;
        ensure_non_negative("salary", new.salary)?;
        let d = locate(&self.state.departments, &new.department_id, IDS)?;

        let mut next = self.state.clone();
        next.departments[d].increment_employee_count();
        let employee = Employee {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            department_id: next.departments[d].id.clone(),
            role: new.role,
            salary: new.salary,
            hire_date: new.hire_date,
            details,
        };
        next.employees.push(employee.clone());
        self.commit(next, &[EntityKind::Employee, EntityKind::Department])?;

        info!(
            id = %employee.id,
            role = %employee.role_type(),
            department = %employee.department_id,
            "employee added"
        );
        Ok(employee)
    }

    /// Remove an employee who no longer heads, leads or holds anything
    pub fn remove_employee(&mut self, id: &str) -> Result<Employee> {
        let index = locate(&self.state.employees, id, IDS)?;
        let emp_id = self.state.employees[index].id.clone();

        if let Some(dept) = self
            .state
            .departments
            .iter()
            .find(|d| d.manager_id.as_deref().is_some_and(|m| same_id(m, &emp_id)))
        {
            return Err(TroveError::precondition(
                "remove employee",
                format!("{emp_id} manages department {}", dept.id),
            ));
        }
        if let Some(project) = self
            .state
            .projects
            .iter()
            .find(|p| p.is_active() && same_id(&p.lead_scientist_id, &emp_id))
        {
            return Err(TroveError::precondition(
                "remove employee",
                format!("{emp_id} leads active project {}", project.id),
            ));
        }
        if let Some(item) = self
            .state
            .equipment
            .iter()
            .find(|e| e.assigned_to.as_deref().is_some_and(|t| same_id(t, &emp_id)))
        {
            return Err(TroveError::precondition(
                "remove employee",
                format!("{emp_id} still holds equipment {}", item.id),
            ));
        }

        let mut next = self.state.clone();
        let removed = next.employees.remove(index);
        if let Some(d) = index_of(&next.departments, &removed.department_id, IDS) {
            next.departments[d].decrement_employee_count();
        }
        for employee in next.employees.iter_mut() {
            if let Some(team) = employee.team_mut() {
                team.retain(|member| !same_id(member, &removed.id));
            }
        }
        self.commit(next, &[EntityKind::Employee, EntityKind::Department])?;

        info!(id = %removed.id, department = %removed.department_id, "employee removed");
        Ok(removed)
    }

    pub fn update_salary(&mut self, id: &str, salary: f64) -> Result<Employee> {
        ensure_non_negative("salary", salary)?;
        let index = locate(&self.state.employees, id, IDS)?;

        let mut next = self.state.clone();
        let previous = next.employees[index].salary;
        next.employees[index].salary = salary;
        let updated = next.employees[index].clone();
        self.commit(next, &[EntityKind::Employee])?;

        info!(id = %updated.id, previous, salary, "salary updated");
        Ok(updated)
    }

    /// Move an employee to another department, carrying the headcount along
    pub fn transfer_employee(&mut self, id: &str, dept_id: &str) -> Result<Employee> {
        let e = locate(&self.state.employees, id, IDS)?;
        let to = locate(&self.state.departments, dept_id, IDS)?;
        let employee = &self.state.employees[e];

        if same_id(&employee.department_id, &self.state.departments[to].id) {
            return Ok(employee.clone());
        }
        if let Some(dept) = self.state.departments.iter().find(|d| {
            d.manager_id
                .as_deref()
                .is_some_and(|m| same_id(m, &employee.id))
        }) {
            return Err(TroveError::precondition(
                "transfer employee",
                format!("{} manages department {}", employee.id, dept.id),
            ));
        }

        let mut next = self.state.clone();
        if let Some(from) = index_of(&next.departments, &employee.department_id, IDS) {
            next.departments[from].decrement_employee_count();
        }
        next.departments[to].increment_employee_count();
        next.employees[e].department_id = next.departments[to].id.clone();
        let updated = next.employees[e].clone();
        self.commit(next, &[EntityKind::Employee, EntityKind::Department])?;

        info!(id = %updated.id, department = %updated.department_id, "employee transferred");
        Ok(updated)
    }

    /// Put `member_id` on a manager's team
    pub fn add_team_member(&mut self, manager_id: &str, member_id: &str) -> Result<Employee> {
        let m = self.require_manager(manager_id, "add team member")?;
        let e = locate(&self.state.employees, member_id, IDS)?;
        if m == e {
            return Err(TroveError::invalid("member", "a manager cannot join their own team"));
        }

        let member = self.state.employees[e].id.clone();
        let mut next = self.state.clone();
        let added = next.employees[m]
            .team_mut()
            .is_some_and(|team| push_unique(team, &member));
        let updated = next.employees[m].clone();
        if added {
            self.commit(next, &[EntityKind::Employee])?;
            info!(manager = %updated.id, member = %member, "team member added");
        }
        Ok(updated)
    }

    pub fn remove_team_member(&mut self, manager_id: &str, member_id: &str) -> Result<Employee> {
        let m = self.require_manager(manager_id, "remove team member")?;

        let mut next = self.state.clone();
        let removed = next.employees[m].team_mut().is_some_and(|team| {
            let before = team.len();
            team.retain(|id| !same_id(id, member_id));
            team.len() != before
        });
        if !removed {
            return Err(TroveError::precondition(
                "remove team member",
                format!("{member_id} is not on {}'s team", next.employees[m].id),
            ));
        }
        let updated = next.employees[m].clone();
        self.commit(next, &[EntityKind::Employee])?;

        info!(manager = %updated.id, member = %member_id, "team member removed");
        Ok(updated)
    }

    fn require_manager(&self, id: &str, action: &'static str) -> Result<usize> {
        let index = locate(&self.state.employees, id, IDS)?;
        let employee = &self.state.employees[index];
        if employee.role_type() != RoleType::Manager {
            return Err(TroveError::precondition(
                action,
                format!("{} is a {}, not a manager", employee.id, employee.role_type()),
            ));
        }
        Ok(index)
    }

    /// Next free id for a role, e.g. `S011` after `S010`
    pub fn generate_next_employee_id(&self, role: RoleType) -> Result<String> {
        generate_id(&self.state.employees, role.prefix(), IDS)
    }

    /// Binary search over a copy sorted by id
    pub fn binary_search_employee(&self, id: &str) -> Option<&Employee> {
        let refs: Vec<&Employee> = self.state.employees.iter().collect();
        let sorted = quick_sort(&refs, |a, b| cmp_ignore_case(&a.id, &b.id));
        binary_search(&sorted, |e| e.id.to_lowercase(), &id.to_lowercase()).copied()
    }

    /// Case-insensitive substring match on the name
    pub fn search_employees_by_name(&self, fragment: &str) -> Vec<&Employee> {
        linear_search(&self.state.employees, |e| contains_ignore_case(&e.name, fragment))
    }

    pub fn employees_in_department(&self, dept_id: &str) -> Vec<&Employee> {
        linear_search(&self.state.employees, |e| same_id(&e.department_id, dept_id))
    }

    pub fn employees_by_role(&self, role: RoleType) -> Vec<&Employee> {
        linear_search(&self.state.employees, |e| e.role_type() == role)
    }

    /// Employees earning between `min` and `max`, both inclusive
    pub fn employees_by_salary_range(&self, min: f64, max: f64) -> Result<Vec<&Employee>> {
        if min > max {
            return Err(TroveError::invalid(
                "salary range",
                format!("minimum {min} is above maximum {max}"),
            ));
        }
        Ok(linear_search(&self.state.employees, |e| {
            e.salary >= min && e.salary <= max
        }))
    }

    /// Case-insensitive name order; equal names fall back to id order
    pub fn sort_employees_by_name(&self, algorithm: SortAlgorithm, order: SortOrder) -> Vec<&Employee> {
        let refs: Vec<&Employee> = self.state.employees.iter().collect();
        algorithm.sort(
            &refs,
            then_by(
                |a: &&Employee, b: &&Employee| order.apply(cmp_ignore_case(&a.name, &b.name)),
                by_id,
            ),
        )
    }

    pub fn sort_employees_by_id(&self, algorithm: SortAlgorithm, order: SortOrder) -> Vec<&Employee> {
        let refs: Vec<&Employee> = self.state.employees.iter().collect();
        algorithm.sort(&refs, |a, b| order.apply(by_id(a, b)))
    }

    /// Salary order; equal salaries fall back to id order
    pub fn sort_employees_by_salary(&self, algorithm: SortAlgorithm, order: SortOrder) -> Vec<&Employee> {
        let refs: Vec<&Employee> = self.state.employees.iter().collect();
        algorithm.sort(
            &refs,
            then_by(
                |a: &&Employee, b: &&Employee| order.apply(cmp_f64(a.salary, b.salary)),
                by_id,
            ),
        )
    }

    // ==================== Projects ====================

    pub fn add_project(&mut self, new: NewProject) -> Result<Project> {
        let id = match new.id {
            Some(id) => id,
            None => generate_id(&self.state.projects, "P", IDS)?,
        };
        ensure_new_id(&self.state.projects, &id, IDS)?;
        ensure_present("name", &new.name)?;
        ensure_non_negative("budget", new.budget)?;
        if new.end_date < new.start_date {
            return Err(TroveError::invalid(
                "end_date",
                format!("{} is before the start date {}", new.end_date, new.start_date),
            ));
        }
        let d = locate(&self.state.departments, &new.department_id, IDS)?;
        let s = self.require_scientist(&new.lead_scientist_id, "add project")?;

        let mut next = self.state.clone();
        let project = Project {
            id,
            name: new.name,
            description: new.description,
            department_id: next.departments[d].id.clone(),
            lead_scientist_id: next.employees[s].id.clone(),
            budget: new.budget,
            start_date: new.start_date,
            end_date: new.end_date,
            status: ProjectStatus::Active,
        };
        if let Some(projects) = next.employees[s].projects_mut() {
            push_unique(projects, &project.id);
        }
        next.projects.push(project.clone());
        self.commit(next, &[EntityKind::Project, EntityKind::Employee])?;

        info!(id = %project.id, lead = %project.lead_scientist_id, "project added");
        Ok(project)
    }

    fn require_scientist(&self, id: &str, action: &'static str) -> Result<usize> {
        let index = locate(&self.state.employees, id, IDS)?;
        let employee = &self.state.employees[index];
        if employee.role_type() != RoleType::Scientist {
            return Err(TroveError::precondition(
                action,
                format!("{} is a {}, not a scientist", employee.id, employee.role_type()),
            ));
        }
        Ok(index)
    }

    pub fn complete_project(&mut self, id: &str) -> Result<Project> {
        self.change_project_status(id, "complete project", ProjectStatus::Completed)
    }

    pub fn suspend_project(&mut self, id: &str) -> Result<Project> {
        self.change_project_status(id, "suspend project", ProjectStatus::Suspended)
    }

    /// Resume a suspended project; its lead must still be on staff
    pub fn reactivate_project(&mut self, id: &str) -> Result<Project> {
        let index = locate(&self.state.projects, id, IDS)?;
        let lead = self.state.projects[index].lead_scientist_id.clone();
        self.require_scientist(&lead, "reactivate project")?;
        self.change_project_status(id, "reactivate project", ProjectStatus::Active)
    }

    fn change_project_status(
        &mut self,
        id: &str,
        action: &'static str,
        target: ProjectStatus,
    ) -> Result<Project> {
        let index = locate(&self.state.projects, id, IDS)?;
        let current = self.state.projects[index].status;
        let allowed = match target {
            ProjectStatus::Completed => current != ProjectStatus::Completed,
            ProjectStatus::Suspended => current == ProjectStatus::Active,
            ProjectStatus::Active => current == ProjectStatus::Suspended,
        };
        if !allowed {
            return Err(TroveError::precondition(
                action,
                format!("project {} is {}", self.state.projects[index].id, current),
            ));
        }

        let mut next = self.state.clone();
        next.projects[index].status = target;
        let updated = next.projects[index].clone();
        self.commit(next, &[EntityKind::Project])?;

        info!(id = %updated.id, from = %current, to = %target, "project status changed");
        Ok(updated)
    }

    pub fn remove_project(&mut self, id: &str) -> Result<Project> {
        let index = locate(&self.state.projects, id, IDS)?;

        let mut next = self.state.clone();
        let removed = next.projects.remove(index);
        if let Some(s) = index_of(&next.employees, &removed.lead_scientist_id, IDS) {
            if let Some(projects) = next.employees[s].projects_mut() {
                remove_id(projects, &removed.id);
            }
        }
        self.commit(next, &[EntityKind::Project, EntityKind::Employee])?;

        info!(id = %removed.id, "project removed");
        Ok(removed)
    }

    pub fn projects_by_status(&self, status: ProjectStatus) -> Vec<&Project> {
        linear_search(&self.state.projects, |p| p.status == status)
    }

    pub fn projects_in_department(&self, dept_id: &str) -> Vec<&Project> {
        linear_search(&self.state.projects, |p| same_id(&p.department_id, dept_id))
    }

    // ==================== Equipment ====================

    pub fn add_equipment(&mut self, new: NewEquipment) -> Result<Equipment> {
        let id = match new.id {
            Some(id) => id,
            None => generate_id(&self.state.equipment, "E", IDS)?,
        };
        ensure_new_id(&self.state.equipment, &id, IDS)?;
        ensure_present("name", &new.name)?;
        let d = locate(&self.state.departments, &new.department_id, IDS)?;

        let mut next = self.state.clone();
        let item = Equipment {
            id,
            name: new.name,
            equipment_type: new.equipment_type,
            serial_number: new.serial_number,
            department_id: next.departments[d].id.clone(),
            assigned_to: None,
            purchase_date: new.purchase_date,
            status: EquipmentStatus::Available,
        };
        next.equipment.push(item.clone());
        self.commit(next, &[EntityKind::Equipment])?;

        info!(id = %item.id, kind = %item.equipment_type, "equipment added");
        Ok(item)
    }

    /// Hand an available item to a technician
    pub fn assign_equipment(&mut self, equipment_id: &str, technician_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        let t = locate(&self.state.employees, technician_id, IDS)?;
        let technician = &self.state.employees[t];
        if technician.role_type() != RoleType::Technician {
            return Err(TroveError::precondition(
                "assign equipment",
                format!("{} is a {}, not a technician", technician.id, technician.role_type()),
            ));
        }
        if !self.state.equipment[q].is_available() {
            return Err(TroveError::NotAvailable {
                kind: EntityKind::Equipment,
                id: self.state.equipment[q].id.clone(),
            });
        }

        let mut next = self.state.clone();
        let tech_id = next.employees[t].id.clone();
        next.equipment[q].assign(&tech_id);
        let item = next.equipment[q].clone();
        if let Some(list) = next.employees[t].equipment_mut() {
            push_unique(list, &item.id);
        }
        self.commit(next, &[EntityKind::Equipment, EntityKind::Employee])?;

        info!(equipment = %item.id, technician = %tech_id, "equipment assigned");
        Ok(item)
    }

    /// Take an in-use item back from its technician
    pub fn unassign_equipment(&mut self, equipment_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        let item = &self.state.equipment[q];
        if !item.is_in_use() {
            return Err(TroveError::precondition(
                "unassign equipment",
                format!("{} is {}", item.id, item.status),
            ));
        }

        let mut next = self.state.clone();
        Self::drop_holder(&mut next, q);
        next.equipment[q].unassign();
        let updated = next.equipment[q].clone();
        self.commit(next, &[EntityKind::Equipment, EntityKind::Employee])?;

        info!(equipment = %updated.id, "equipment unassigned");
        Ok(updated)
    }

    /// Remove an item from its holder's equipment list
    fn drop_holder(next: &mut OrgState, q: usize) {
        let Some(holder) = next.equipment[q].assigned_to.clone() else {
            return;
        };
        let item_id = next.equipment[q].id.clone();
        if let Some(t) = index_of(&next.employees, &holder, IDS) {
            if let Some(list) = next.employees[t].equipment_mut() {
                list.retain(|id| !same_id(id, &item_id));
            }
        }
    }

    pub fn send_to_maintenance(&mut self, equipment_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        let item = &self.state.equipment[q];
        if !matches!(item.status, EquipmentStatus::Available | EquipmentStatus::InUse) {
            return Err(TroveError::precondition(
                "send to maintenance",
                format!("{} is {}", item.id, item.status),
            ));
        }

        let mut next = self.state.clone();
        next.equipment[q].send_to_maintenance();
        let updated = next.equipment[q].clone();
        self.commit(next, &[EntityKind::Equipment])?;

        info!(equipment = %updated.id, "equipment sent to maintenance");
        Ok(updated)
    }

    /// Back to IN_USE when still assigned, else AVAILABLE
    pub fn return_from_maintenance(&mut self, equipment_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        let item = &self.state.equipment[q];
        if item.status != EquipmentStatus::Maintenance {
            return Err(TroveError::precondition(
                "return from maintenance",
                format!("{} is {}", item.id, item.status),
            ));
        }

        let mut next = self.state.clone();
        next.equipment[q].return_from_maintenance();
        let updated = next.equipment[q].clone();
        self.commit(next, &[EntityKind::Equipment])?;

        info!(equipment = %updated.id, status = %updated.status, "equipment back from maintenance");
        Ok(updated)
    }

    pub fn retire_equipment(&mut self, equipment_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        if self.state.equipment[q].status == EquipmentStatus::Retired {
            return Err(TroveError::precondition(
                "retire equipment",
                format!("{} is already retired", self.state.equipment[q].id),
            ));
        }

        let mut next = self.state.clone();
        Self::drop_holder(&mut next, q);
        next.equipment[q].retire();
        let updated = next.equipment[q].clone();
        self.commit(next, &[EntityKind::Equipment, EntityKind::Employee])?;

        info!(equipment = %updated.id, "equipment retired");
        Ok(updated)
    }

    /// Delete an item that is not in use
    pub fn remove_equipment(&mut self, equipment_id: &str) -> Result<Equipment> {
        let q = locate(&self.state.equipment, equipment_id, IDS)?;
        if self.state.equipment[q].is_in_use() {
            return Err(TroveError::precondition(
                "remove equipment",
                format!(
                    "{} is in use by {}",
                    self.state.equipment[q].id,
                    self.state.equipment[q].assigned_to.as_deref().unwrap_or("?")
                ),
            ));
        }

        let mut next = self.state.clone();
        Self::drop_holder(&mut next, q);
        let removed = next.equipment.remove(q);
        self.commit(next, &[EntityKind::Equipment, EntityKind::Employee])?;

        info!(equipment = %removed.id, "equipment removed");
        Ok(removed)
    }

    pub fn equipment_by_status(&self, status: EquipmentStatus) -> Vec<&Equipment> {
        linear_search(&self.state.equipment, |e| e.status == status)
    }

    pub fn equipment_by_type(&self, equipment_type: &str) -> Vec<&Equipment> {
        linear_search(&self.state.equipment, |e| {
            e.equipment_type.eq_ignore_ascii_case(equipment_type)
        })
    }

    // ==================== Reporting ====================

    pub fn statistics(&self) -> OrgStatistics {
        let employees = &self.state.employees;
        let count_role = |role: RoleType| employees.iter().filter(|e| e.role_type() == role).count();
        let total_payroll: f64 = employees.iter().map(|e| e.salary).sum();
        let count_status =
            |status: EquipmentStatus| self.state.equipment.iter().filter(|e| e.status == status).count();

        OrgStatistics {
            employees: employees.len(),
            managers: count_role(RoleType::Manager),
            scientists: count_role(RoleType::Scientist),
            technicians: count_role(RoleType::Technician),
            total_payroll,
            average_salary: if employees.is_empty() {
                0.0
            } else {
                total_payroll / employees.len() as f64
            },
            departments: self.state.departments.len(),
            total_department_budget: self.state.departments.iter().map(|d| d.budget).sum(),
            projects: self.state.projects.len(),
            active_projects: self.state.projects.iter().filter(|p| p.is_active()).count(),
            equipment: self.state.equipment.len(),
            equipment_available: count_status(EquipmentStatus::Available),
            equipment_in_use: count_status(EquipmentStatus::InUse),
            equipment_in_maintenance: count_status(EquipmentStatus::Maintenance),
            equipment_retired: count_status(EquipmentStatus::Retired),
        }
    }

    /// Report every drift between denormalized fields and the records they mirror
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let state = &self.state;
        let mut found = Vec::new();
        let employee = |id: &str| index_of(&state.employees, id, IDS).map(|i| &state.employees[i]);

        for dept in &state.departments {
            let actual = state
                .employees
                .iter()
                .filter(|e| same_id(&e.department_id, &dept.id))
                .count();
            if actual != dept.employee_count as usize {
                found.push(Inconsistency::new(
                    EntityKind::Department,
                    &dept.id,
                    format!("employee_count is {} but {} employee(s) reference it", dept.employee_count, actual),
                ));
            }
            if let Some(ref manager_id) = dept.manager_id {
                match employee(manager_id.as_str()) {
                    Some(m) if m.role_type() == RoleType::Manager => {}
                    Some(_) => found.push(Inconsistency::new(
                        EntityKind::Department,
                        &dept.id,
                        format!("manager {manager_id} is not a manager"),
                    )),
                    None => found.push(Inconsistency::new(
                        EntityKind::Department,
                        &dept.id,
                        format!("manager {manager_id} does not exist"),
                    )),
                }
            }
        }

        for emp in &state.employees {
            if index_of(&state.departments, &emp.department_id, IDS).is_none() {
                found.push(Inconsistency::new(
                    EntityKind::Employee,
                    &emp.id,
                    format!("department {} does not exist", emp.department_id),
                ));
            }
            match &emp.details {
                RoleDetails::Manager { team, .. } => {
                    for member in team.iter().filter(|m| employee(m.as_str()).is_none()) {
                        found.push(Inconsistency::new(
                            EntityKind::Employee,
                            &emp.id,
                            format!("team member {member} does not exist"),
                        ));
                    }
                }
                RoleDetails::Scientist { projects, .. } => {
                    for pid in projects {
                        let led = index_of(&state.projects, pid, IDS)
                            .map(|i| &state.projects[i])
                            .is_some_and(|p| same_id(&p.lead_scientist_id, &emp.id));
                        if !led {
                            found.push(Inconsistency::new(
                                EntityKind::Employee,
                                &emp.id,
                                format!("lists project {pid} it does not lead"),
                            ));
                        }
                    }
                }
                RoleDetails::Technician { equipment, .. } => {
                    for eid in equipment {
                        let held = index_of(&state.equipment, eid, IDS)
                            .map(|i| &state.equipment[i])
                            .is_some_and(|e| e.assigned_to.as_deref().is_some_and(|t| same_id(t, &emp.id)));
                        if !held {
                            found.push(Inconsistency::new(
                                EntityKind::Employee,
                                &emp.id,
                                format!("lists equipment {eid} not assigned to it"),
                            ));
                        }
                    }
                }
            }
        }

        for project in &state.projects {
            if index_of(&state.departments, &project.department_id, IDS).is_none() {
                found.push(Inconsistency::new(
                    EntityKind::Project,
                    &project.id,
                    format!("department {} does not exist", project.department_id),
                ));
            }
            match employee(project.lead_scientist_id.as_str()) {
                Some(lead) => {
                    let listed = lead.role_type() == RoleType::Scientist
                        && lead.linked_ids().iter().any(|p| same_id(p, &project.id));
                    if !listed {
                        found.push(Inconsistency::new(
                            EntityKind::Project,
                            &project.id,
                            format!("lead {} does not list this project", lead.id),
                        ));
                    }
                }
                None if project.is_active() => found.push(Inconsistency::new(
                    EntityKind::Project,
                    &project.id,
                    format!("lead scientist {} does not exist", project.lead_scientist_id),
                )),
                None => {}
            }
        }

        for item in &state.equipment {
            if index_of(&state.departments, &item.department_id, IDS).is_none() {
                found.push(Inconsistency::new(
                    EntityKind::Equipment,
                    &item.id,
                    format!("department {} does not exist", item.department_id),
                ));
            }
            if !item.assignment_consistent() {
                found.push(Inconsistency::new(
                    EntityKind::Equipment,
                    &item.id,
                    format!("status {} does not match assignment {:?}", item.status, item.assigned_to),
                ));
            }
            if let Some(ref holder) = item.assigned_to {
                let listed = employee(holder.as_str()).is_some_and(|t| {
                    t.role_type() == RoleType::Technician
                        && t.linked_ids().iter().any(|e| same_id(e, &item.id))
                });
                if !listed {
                    found.push(Inconsistency::new(
                        EntityKind::Equipment,
                        &item.id,
                        format!("holder {holder} is not a technician listing this item"),
                    ));
                }
            }
        }

        debug!(issues = found.len(), "organization consistency check complete");
        found
    }
}

fn by_id(a: &&Employee, b: &&Employee) -> std::cmp::Ordering {
    cmp_ignore_case(&a.id, &b.id)
}
