//! `trove org emp` command - Employee management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{date_or_today, money, parse_date, print_structured, Session};
use crate::cli::table::{print_fields, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::core::entity::Entity;
use crate::core::query::{SortAlgorithm, SortOrder};
use crate::core::TroveError;
use crate::entities::{Department, Employee, RoleDetails, RoleType};
use crate::facade::NewEmployee;

#[derive(Subcommand, Debug)]
pub enum EmpCommands {
    /// Hire an employee
    Add(AddArgs),

    /// List employees with filtering
    List(ListArgs),

    /// Show an employee's details
    Show(IdArg),

    /// Remove an employee who heads, leads and holds nothing
    Remove(IdArg),

    /// Find employees by name fragment
    Search(SearchArgs),

    /// List employees in sorted order
    Sort(SortArgs),

    /// Print the id the next employee of a role would get
    NextId(NextIdArgs),

    /// Change an employee's salary
    Salary(SalaryArgs),

    /// Move an employee to another department
    Transfer(TransferArgs),

    /// Manage a manager's team
    #[command(subcommand)]
    Team(TeamCommands),
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Put an employee on a manager's team
    Add(TeamArgs),

    /// Take an employee off a manager's team
    Remove(TeamArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Full name
    pub name: Option<String>,

    /// Role of the new employee
    #[arg(long, short = 'r', value_enum)]
    pub role: Option<RoleType>,

    /// Department id
    #[arg(long, short = 'd')]
    pub dept: Option<String>,

    /// Annual salary
    #[arg(long, short = 's')]
    pub salary: Option<f64>,

    /// Job title (default: the role name)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Explicit id (default: next free id for the role)
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    /// Hire date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub hired: Option<NaiveDate>,

    /// Largest amount a manager may approve
    #[arg(long, default_value_t = 0.0)]
    pub authority: f64,

    /// Scientist's field of research
    #[arg(long, default_value = "")]
    pub specialization: String,

    /// Technician's certifications
    #[arg(long, default_value = "")]
    pub certifications: String,

    /// Prompt for the fields not given on the command line
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only employees of this department
    #[arg(long, short = 'd')]
    pub dept: Option<String>,

    /// Only employees of this role
    #[arg(long, short = 'r', value_enum)]
    pub role: Option<RoleType>,

    /// Minimum salary (inclusive)
    #[arg(long)]
    pub min_salary: Option<f64>,

    /// Maximum salary (inclusive)
    #[arg(long)]
    pub max_salary: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Employee id (case-insensitive)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Name fragment (case-insensitive)
    pub query: String,
}

/// Sort key
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Name,
    Id,
    Salary,
}

#[derive(clap::Args, Debug)]
pub struct SortArgs {
    /// Field to sort by
    #[arg(long, short = 'b', value_enum, default_value = "name")]
    pub by: SortKey,

    /// Sorting algorithm
    #[arg(long, value_enum, default_value = "quick")]
    pub algorithm: SortAlgorithm,

    /// Reverse the order
    #[arg(long)]
    pub desc: bool,
}

#[derive(clap::Args, Debug)]
pub struct NextIdArgs {
    #[arg(value_enum)]
    pub role: RoleType,
}

#[derive(clap::Args, Debug)]
pub struct SalaryArgs {
    pub id: String,

    /// New annual salary
    pub salary: f64,
}

#[derive(clap::Args, Debug)]
pub struct TransferArgs {
    pub id: String,

    /// Target department id
    pub dept: String,
}

#[derive(clap::Args, Debug)]
pub struct TeamArgs {
    /// Manager id
    pub manager: String,

    /// Employee id
    pub member: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("role", "ROLE", 11),
    ColumnDef::new("title", "TITLE", 24),
    ColumnDef::new("dept", "DEPT", 6),
    ColumnDef::new("salary", "SALARY", 12),
    ColumnDef::new("hired", "HIRED", 10),
];

pub fn run(cmd: EmpCommands, session: &Session) -> Result<()> {
    match cmd {
        EmpCommands::Add(args) => run_add(args, session),
        EmpCommands::List(args) => run_list(args, session),
        EmpCommands::Show(args) => run_show(args, session),
        EmpCommands::Remove(args) => {
            let removed = session.organization()?.remove_employee(&args.id)?;
            session.report(&removed, &removed.id, format!("Removed employee {} ({})", removed.id, removed.name))
        }
        EmpCommands::Search(args) => {
            let org = session.organization()?;
            output_employees(org.search_employees_by_name(&args.query), session)
        }
        EmpCommands::Sort(args) => run_sort(args, session),
        EmpCommands::NextId(args) => {
            println!("{}", session.organization()?.generate_next_employee_id(args.role)?);
            Ok(())
        }
        EmpCommands::Salary(args) => {
            let emp = session.organization()?.update_salary(&args.id, args.salary)?;
            session.report(&emp, &emp.id, format!("Salary of {} is now {}", emp.id, money(emp.salary)))
        }
        EmpCommands::Transfer(args) => {
            let emp = session.organization()?.transfer_employee(&args.id, &args.dept)?;
            session.report(&emp, &emp.id, format!("Moved {} to {}", emp.id, emp.department_id))
        }
        EmpCommands::Team(TeamCommands::Add(args)) => {
            let manager = session.organization()?.add_team_member(&args.manager, &args.member)?;
            session.report(&manager, &manager.id, format!("{} joined the team of {}", args.member, manager.id))
        }
        EmpCommands::Team(TeamCommands::Remove(args)) => {
            let manager = session
                .organization()?
                .remove_team_member(&args.manager, &args.member)?;
            session.report(&manager, &manager.id, format!("{} left the team of {}", args.member, manager.id))
        }
    }
}

fn run_add(mut args: AddArgs, session: &Session) -> Result<()> {
    let mut org = session.organization()?;
    if args.interactive {
        prompt_missing(&mut args, org.departments())?;
    }
    let (Some(name), Some(role), Some(dept), Some(salary)) =
        (args.name, args.role, args.dept, args.salary)
    else {
        return Err(miette::miette!(
            help = "pass NAME --role --dept --salary, or use --interactive",
            "missing employee fields"
        ));
    };

    let new = NewEmployee {
        id: args.id,
        name,
        email: args.email,
        phone: args.phone,
        department_id: dept,
        role: args.title.unwrap_or_else(|| role.to_string()),
        salary,
        hire_date: date_or_today(args.hired),
    };
    let emp = match role {
        RoleType::Manager => org.add_manager(new, args.authority)?,
        RoleType::Scientist => org.add_scientist(new, &args.specialization)?,
        RoleType::Technician => org.add_technician(new, &args.certifications)?,
    };
    session.report(&emp, &emp.id, format!("Hired {} as {} ({})", emp.name, emp.role_type(), emp.id))
}

fn prompt_missing(args: &mut AddArgs, departments: &[Department]) -> Result<()> {
    let theme = ColorfulTheme::default();

    if args.name.is_none() {
        let name: String = Input::with_theme(&theme)
            .with_prompt("Name")
            .interact_text()
            .into_diagnostic()?;
        args.name = Some(name);
    }
    if args.role.is_none() {
        let roles = RoleType::all();
        let labels: Vec<&str> = roles.iter().map(RoleType::as_str).collect();
        let pick = Select::with_theme(&theme)
            .with_prompt("Role")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        args.role = Some(roles[pick]);
    }
    if args.dept.is_none() {
        if departments.is_empty() {
            return Err(miette::miette!("no departments yet; add one with `trove org dept add`"));
        }
        let labels: Vec<String> = departments
            .iter()
            .map(|d| format!("{} {}", d.id, d.name))
            .collect();
        let pick = Select::with_theme(&theme)
            .with_prompt("Department")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        args.dept = Some(departments[pick].id.clone());
    }
    if args.salary.is_none() {
        let salary: f64 = Input::with_theme(&theme)
            .with_prompt("Salary")
            .interact_text()
            .into_diagnostic()?;
        args.salary = Some(salary);
    }

    match args.role {
        Some(RoleType::Manager) if args.authority == 0.0 => {
            args.authority = Input::with_theme(&theme)
                .with_prompt("Budget authority")
                .default(0.0)
                .interact_text()
                .into_diagnostic()?;
        }
        Some(RoleType::Scientist) if args.specialization.is_empty() => {
            args.specialization = Input::with_theme(&theme)
                .with_prompt("Specialization")
                .allow_empty(true)
                .interact_text()
                .into_diagnostic()?;
        }
        Some(RoleType::Technician) if args.certifications.is_empty() => {
            args.certifications = Input::with_theme(&theme)
                .with_prompt("Certifications")
                .allow_empty(true)
                .interact_text()
                .into_diagnostic()?;
        }
        _ => {}
    }
    Ok(())
}

fn run_list(args: ListArgs, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let mut emps: Vec<&Employee> = match (args.min_salary, args.max_salary) {
        (None, None) => org.employees().iter().collect(),
        (min, max) => org.employees_by_salary_range(min.unwrap_or(0.0), max.unwrap_or(f64::MAX))?,
    };
    if let Some(ref dept) = args.dept {
        let in_dept = org.employees_in_department(dept);
        emps.retain(|e| in_dept.iter().any(|d| d.id == e.id));
    }
    if let Some(role) = args.role {
        let with_role = org.employees_by_role(role);
        emps.retain(|e| with_role.iter().any(|r| r.id == e.id));
    }
    output_employees(emps, session)
}

fn run_show(args: IdArg, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let emp = org
        .binary_search_employee(&args.id)
        .ok_or_else(|| TroveError::not_found(Employee::KIND, &args.id))?;
    if print_structured(emp, session.format)? {
        return Ok(());
    }

    let (detail_label, detail, links_label) = match &emp.details {
        RoleDetails::Manager { budget_authority, .. } => ("Authority", money(*budget_authority), "Team"),
        RoleDetails::Scientist { specialization, .. } => ("Specialization", specialization.clone(), "Projects"),
        RoleDetails::Technician { certifications, .. } => ("Certifications", certifications.clone(), "Equipment"),
    };
    print_fields(
        &format!("{} {}", emp.id, emp.name),
        &[
            ("Role", emp.role_type().to_string()),
            ("Title", emp.role.clone()),
            ("Department", emp.department_id.clone()),
            ("Email", emp.email.clone()),
            ("Phone", emp.phone.clone()),
            ("Salary", money(emp.salary)),
            ("Hired", emp.hire_date.to_string()),
            (detail_label, detail),
            (links_label, emp.linked_ids().join(", ")),
        ],
    );
    Ok(())
}

fn run_sort(args: SortArgs, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let order = SortOrder::from_descending(args.desc);
    let sorted = match args.by {
        SortKey::Name => org.sort_employees_by_name(args.algorithm, order),
        SortKey::Id => org.sort_employees_by_id(args.algorithm, order),
        SortKey::Salary => org.sort_employees_by_salary(args.algorithm, order),
    };
    output_employees(sorted, session)
}

fn output_employees(emps: Vec<&Employee>, session: &Session) -> Result<()> {
    if print_structured(&emps, session.format)? {
        return Ok(());
    }
    let rows = emps.iter().map(|e| {
        TableRow::new(e.id.clone())
            .cell("id", CellValue::Id(e.id.clone()))
            .cell("name", CellValue::Text(e.name.clone()))
            .cell("role", CellValue::Status(e.role_type().to_string()))
            .cell("title", CellValue::Text(e.role.clone()))
            .cell("dept", CellValue::Id(e.department_id.clone()))
            .cell("salary", CellValue::Money(e.salary))
            .cell("hired", CellValue::Date(e.hire_date))
    });
    TableFormatter::new(COLUMNS, "employee").output(rows, session.list_format())
}
