//! `trove org dept` command - Department management

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{money, print_structured, Session};
use crate::cli::table::{print_fields, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::entities::Department;
use crate::facade::NewDepartment;

#[derive(Subcommand, Debug)]
pub enum DeptCommands {
    /// Create a department
    Add(AddArgs),

    /// List departments
    List(ListArgs),

    /// Show a department with its staff and projects
    Show(IdArg),

    /// Remove a department without staff, projects or equipment
    Remove(IdArg),

    /// Make a manager head of a department
    SetManager(SetManagerArgs),

    /// Spend from a department's remaining budget
    Allocate(AmountArgs),

    /// Increase a department's budget
    Fund(AmountArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Department name
    pub name: String,

    /// Explicit id (default: next free D-number)
    #[arg(long)]
    pub id: Option<String>,

    /// Region the department operates in
    #[arg(long, short = 'r', default_value = "")]
    pub region: String,

    /// Initial budget
    #[arg(long, short = 'b', default_value_t = 0.0)]
    pub budget: f64,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only departments in this region (case-insensitive)
    #[arg(long, short = 'r')]
    pub region: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Department id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetManagerArgs {
    /// Department id
    pub dept: String,

    /// Employee id of a manager
    pub manager: String,
}

#[derive(clap::Args, Debug)]
pub struct AmountArgs {
    /// Department id
    pub dept: String,

    /// Amount of money
    pub amount: f64,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("region", "REGION", 16),
    ColumnDef::new("budget", "BUDGET", 14),
    ColumnDef::new("manager", "MANAGER", 9),
    ColumnDef::new("staff", "STAFF", 6),
];

pub fn run(cmd: DeptCommands, session: &Session) -> Result<()> {
    match cmd {
        DeptCommands::Add(args) => run_add(args, session),
        DeptCommands::List(args) => run_list(args, session),
        DeptCommands::Show(args) => run_show(args, session),
        DeptCommands::Remove(args) => {
            let removed = session.organization()?.remove_department(&args.id)?;
            session.report(&removed, &removed.id, format!("Removed department {}", removed.id))
        }
        DeptCommands::SetManager(args) => {
            let dept = session
                .organization()?
                .assign_department_manager(&args.dept, &args.manager)?;
            session.report(
                &dept,
                &dept.id,
                format!("{} now manages {}", args.manager, dept.name),
            )
        }
        DeptCommands::Allocate(args) => {
            let dept = session.organization()?.allocate_budget(&args.dept, args.amount)?;
            session.report(
                &dept,
                &dept.id,
                format!("Allocated {} from {} (remaining {})", money(args.amount), dept.id, money(dept.budget)),
            )
        }
        DeptCommands::Fund(args) => {
            let dept = session.organization()?.add_budget(&args.dept, args.amount)?;
            session.report(
                &dept,
                &dept.id,
                format!("Budget of {} is now {}", dept.id, money(dept.budget)),
            )
        }
    }
}

fn run_add(args: AddArgs, session: &Session) -> Result<()> {
    let dept = session.organization()?.add_department(NewDepartment {
        id: args.id,
        name: args.name,
        region: args.region,
        budget: args.budget,
    })?;
    session.report(&dept, &dept.id, format!("Created department {} ({})", dept.id, dept.name))
}

fn run_list(args: ListArgs, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let depts: Vec<&Department> = match args.region {
        Some(ref region) => org.departments_by_region(region),
        None => org.departments().iter().collect(),
    };
    if print_structured(&depts, session.format)? {
        return Ok(());
    }

    let rows = depts.iter().map(|d| {
        TableRow::new(d.id.clone())
            .cell("id", CellValue::Id(d.id.clone()))
            .cell("name", CellValue::Text(d.name.clone()))
            .cell("region", CellValue::Text(d.region.clone()))
            .cell("budget", CellValue::Money(d.budget))
            .cell("manager", CellValue::optional_id(d.manager_id.as_deref()))
            .cell("staff", CellValue::Number(i64::from(d.employee_count)))
    });
    TableFormatter::new(COLUMNS, "department").output(rows, session.list_format())
}

fn run_show(args: IdArg, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let dept = org.find_department(&args.id)?;
    if print_structured(dept, session.format)? {
        return Ok(());
    }

    let staff: Vec<String> = org
        .employees_in_department(&dept.id)
        .iter()
        .map(|e| format!("{} {}", e.id, e.name))
        .collect();
    let projects: Vec<String> = org
        .projects_in_department(&dept.id)
        .iter()
        .map(|p| format!("{} {} [{}]", p.id, p.name, p.status))
        .collect();

    print_fields(
        &format!("{} {}", dept.id, dept.name),
        &[
            ("Region", dept.region.clone()),
            ("Budget", money(dept.budget)),
            ("Manager", dept.manager_id.clone().unwrap_or_default()),
            ("Headcount", dept.employee_count.to_string()),
            ("Staff", staff.join(", ")),
            ("Projects", projects.join(", ")),
        ],
    );
    Ok(())
}
