//! `trove org` command - Organization records

pub mod dept;
pub mod emp;
pub mod equip;
pub mod project;

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{money, print_structured, report_inconsistencies, Session};
use crate::cli::GlobalOpts;
use crate::facade::seed_organization;

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// Departments, budgets and managers
    #[command(subcommand)]
    Dept(dept::DeptCommands),

    /// Employees of every role
    #[command(subcommand)]
    Emp(emp::EmpCommands),

    /// Research projects
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Equipment and its assignments
    #[command(subcommand)]
    Equip(equip::EquipCommands),

    /// Headcount, payroll and equipment figures
    Stats,

    /// Verify cached counts and cross-references
    Check,

    /// Load the sample organization into an empty data directory
    Seed,
}

pub fn run(cmd: OrgCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        OrgCommands::Dept(cmd) => dept::run(cmd, &session),
        OrgCommands::Emp(cmd) => emp::run(cmd, &session),
        OrgCommands::Project(cmd) => project::run(cmd, &session),
        OrgCommands::Equip(cmd) => equip::run(cmd, &session),
        OrgCommands::Stats => run_stats(&session),
        OrgCommands::Check => report_inconsistencies(&session.organization()?.check_consistency(), &session),
        OrgCommands::Seed => run_seed(&session),
    }
}

fn run_stats(session: &Session) -> Result<()> {
    let stats = session.organization()?.statistics();
    if print_structured(&stats, session.format)? {
        return Ok(());
    }

    println!("{}", style("Organization").bold());
    println!(
        "  Employees:   {} ({} managers, {} scientists, {} technicians)",
        style(stats.employees).cyan(),
        stats.managers,
        stats.scientists,
        stats.technicians
    );
    println!(
        "  Payroll:     {} (average {})",
        money(stats.total_payroll),
        money(stats.average_salary)
    );
    println!(
        "  Departments: {} (budget {})",
        style(stats.departments).cyan(),
        money(stats.total_department_budget)
    );
    println!(
        "  Projects:    {} ({} active)",
        style(stats.projects).cyan(),
        stats.active_projects
    );
    println!(
        "  Equipment:   {} ({} available, {} in use, {} in maintenance, {} retired)",
        style(stats.equipment).cyan(),
        stats.equipment_available,
        stats.equipment_in_use,
        stats.equipment_in_maintenance,
        stats.equipment_retired
    );
    Ok(())
}

fn run_seed(session: &Session) -> Result<()> {
    let mut org = session.organization()?;
    let counts = seed_organization(&mut org)?;
    for (kind, count) in counts {
        session.success(format!("seeded {} {}", count, kind.collection()));
    }
    Ok(())
}
