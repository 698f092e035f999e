//! `trove org project` command - Research projects

use chrono::NaiveDate;
use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{date_or_today, parse_date, print_structured, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::entities::{Project, ProjectStatus};
use crate::facade::NewProject;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Start a project led by a scientist
    Add(AddArgs),

    /// List projects
    List(ListArgs),

    /// Mark a project completed
    Complete(IdArg),

    /// Put a project on hold
    Suspend(IdArg),

    /// Resume a suspended project
    Reactivate(IdArg),

    /// Delete a project and unlink it from its lead
    Remove(IdArg),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Project name
    pub name: String,

    /// Owning department id
    #[arg(long, short = 'd')]
    pub dept: String,

    /// Lead scientist id
    #[arg(long, short = 'l')]
    pub lead: String,

    #[arg(long, short = 'b', default_value_t = 0.0)]
    pub budget: f64,

    /// Planned end date
    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Start date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Explicit id (default: next free P-number)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's', value_enum)]
    pub status: Option<ProjectStatus>,

    /// Only projects of this department
    #[arg(long, short = 'd')]
    pub dept: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Project id
    pub id: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("dept", "DEPT", 6),
    ColumnDef::new("lead", "LEAD", 6),
    ColumnDef::new("budget", "BUDGET", 12),
    ColumnDef::new("start", "START", 10),
    ColumnDef::new("end", "END", 10),
];

pub fn run(cmd: ProjectCommands, session: &Session) -> Result<()> {
    match cmd {
        ProjectCommands::Add(args) => run_add(args, session),
        ProjectCommands::List(args) => run_list(args, session),
        ProjectCommands::Complete(args) => {
            let project = session.organization()?.complete_project(&args.id)?;
            report_status(&project, session)
        }
        ProjectCommands::Suspend(args) => {
            let project = session.organization()?.suspend_project(&args.id)?;
            report_status(&project, session)
        }
        ProjectCommands::Reactivate(args) => {
            let project = session.organization()?.reactivate_project(&args.id)?;
            report_status(&project, session)
        }
        ProjectCommands::Remove(args) => {
            let removed = session.organization()?.remove_project(&args.id)?;
            session.report(&removed, &removed.id, format!("Removed project {}", removed.id))
        }
    }
}

fn run_add(args: AddArgs, session: &Session) -> Result<()> {
    let project = session.organization()?.add_project(NewProject {
        id: args.id,
        name: args.name,
        description: args.description,
        department_id: args.dept,
        lead_scientist_id: args.lead,
        budget: args.budget,
        start_date: date_or_today(args.start),
        end_date: args.end,
    })?;
    session.report(
        &project,
        &project.id,
        format!("Started project {} led by {}", project.id, project.lead_scientist_id),
    )
}

fn run_list(args: ListArgs, session: &Session) -> Result<()> {
    let org = session.organization()?;
    let mut projects: Vec<&Project> = match args.status {
        Some(status) => org.projects_by_status(status),
        None => org.projects().iter().collect(),
    };
    if let Some(ref dept) = args.dept {
        let in_dept = org.projects_in_department(dept);
        projects.retain(|p| in_dept.iter().any(|d| d.id == p.id));
    }
    if print_structured(&projects, session.format)? {
        return Ok(());
    }

    let rows = projects.iter().map(|p| {
        TableRow::new(p.id.clone())
            .cell("id", CellValue::Id(p.id.clone()))
            .cell("name", CellValue::Text(p.name.clone()))
            .cell("status", CellValue::Status(p.status.to_string()))
            .cell("dept", CellValue::Id(p.department_id.clone()))
            .cell("lead", CellValue::Id(p.lead_scientist_id.clone()))
            .cell("budget", CellValue::Money(p.budget))
            .cell("start", CellValue::Date(p.start_date))
            .cell("end", CellValue::Date(p.end_date))
    });
    TableFormatter::new(COLUMNS, "project").output(rows, session.list_format())
}

fn report_status(project: &Project, session: &Session) -> Result<()> {
    session.report(project, &project.id, format!("Project {} is now {}", project.id, project.status))
}
