//! `trove org equip` command - Equipment and assignments

use chrono::NaiveDate;
use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{date_or_today, parse_date, print_structured, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::entities::{Equipment, EquipmentStatus};
use crate::facade::NewEquipment;

#[derive(Subcommand, Debug)]
pub enum EquipCommands {
    /// Register a piece of equipment
    Add(AddArgs),

    /// List equipment
    List(ListArgs),

    /// Hand available equipment to a technician
    Assign(AssignArgs),

    /// Take equipment back from its technician
    Unassign(IdArg),

    /// Send equipment to maintenance
    Maintain(IdArg),

    /// Bring equipment back from maintenance
    Restore(IdArg),

    /// Retire equipment for good
    Retire(IdArg),

    /// Delete an unassigned equipment record
    Remove(IdArg),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Equipment name
    pub name: String,

    /// Owning department id
    #[arg(long, short = 'd')]
    pub dept: String,

    /// Kind of equipment, e.g. Microscope
    #[arg(long = "type", short = 't', default_value = "")]
    pub equipment_type: String,

    #[arg(long, default_value = "")]
    pub serial: String,

    /// Purchase date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub purchased: Option<NaiveDate>,

    /// Explicit id (default: next free E-number)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's', value_enum)]
    pub status: Option<EquipmentStatus>,

    /// Only equipment of this type (case-insensitive)
    #[arg(long = "type", short = 't')]
    pub equipment_type: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Equipment id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    /// Equipment id
    pub equipment: String,

    /// Technician id
    pub technician: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 26),
    ColumnDef::new("type", "TYPE", 16),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("dept", "DEPT", 6),
    ColumnDef::new("holder", "HOLDER", 8),
    ColumnDef::new("serial", "SERIAL", 14),
];

pub fn run(cmd: EquipCommands, session: &Session) -> Result<()> {
    let mut org = session.organization()?;
    let (item, message) = match cmd {
        EquipCommands::Add(args) => {
            let item = org.add_equipment(NewEquipment {
                id: args.id,
                name: args.name,
                equipment_type: args.equipment_type,
                serial_number: args.serial,
                department_id: args.dept,
                purchase_date: date_or_today(args.purchased),
            })?;
            let message = format!("Registered {} ({})", item.id, item.name);
            (item, message)
        }
        EquipCommands::List(args) => {
            let items: Vec<&Equipment> = match (args.status, args.equipment_type) {
                (Some(status), Some(kind)) => org
                    .equipment_by_type(&kind)
                    .into_iter()
                    .filter(|e| e.status == status)
                    .collect(),
                (Some(status), None) => org.equipment_by_status(status),
                (None, Some(kind)) => org.equipment_by_type(&kind),
                (None, None) => org.equipment().iter().collect(),
            };
            return output_equipment(&items, session);
        }
        EquipCommands::Assign(args) => {
            let item = org.assign_equipment(&args.equipment, &args.technician)?;
            let message = format!("Assigned {} to {}", item.id, args.technician);
            (item, message)
        }
        EquipCommands::Unassign(args) => {
            let item = org.unassign_equipment(&args.id)?;
            let message = format!("{} is available again", item.id);
            (item, message)
        }
        EquipCommands::Maintain(args) => {
            let item = org.send_to_maintenance(&args.id)?;
            let message = format!("{} sent to maintenance", item.id);
            (item, message)
        }
        EquipCommands::Restore(args) => {
            let item = org.return_from_maintenance(&args.id)?;
            let message = format!("{} back from maintenance ({})", item.id, item.status);
            (item, message)
        }
        EquipCommands::Retire(args) => {
            let item = org.retire_equipment(&args.id)?;
            let message = format!("Retired {}", item.id);
            (item, message)
        }
        EquipCommands::Remove(args) => {
            let item = org.remove_equipment(&args.id)?;
            let message = format!("Removed {}", item.id);
            (item, message)
        }
    };
    session.report(&item, &item.id, message)
}

fn output_equipment(items: &[&Equipment], session: &Session) -> Result<()> {
    if print_structured(items, session.format)? {
        return Ok(());
    }
    let rows = items.iter().map(|e| {
        TableRow::new(e.id.clone())
            .cell("id", CellValue::Id(e.id.clone()))
            .cell("name", CellValue::Text(e.name.clone()))
            .cell("type", CellValue::Text(e.equipment_type.clone()))
            .cell("status", CellValue::Status(e.status.to_string()))
            .cell("dept", CellValue::Id(e.department_id.clone()))
            .cell("holder", CellValue::optional_id(e.assigned_to.as_deref()))
            .cell("serial", CellValue::Text(e.serial_number.clone()))
    });
    TableFormatter::new(COLUMNS, "equipment item").output(rows, session.list_format())
}
