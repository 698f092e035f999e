//! `trove lib member|librarian|users` - Library users

use chrono::NaiveDate;
use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{date_or_today, parse_date, print_structured, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::entities::{User, UserRole};
use crate::facade::NewUser;

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Register a member who may borrow
    Add(MemberAddArgs),
}

#[derive(Subcommand, Debug)]
pub enum LibrarianCommands {
    /// Register a librarian
    Add(LibrarianAddArgs),
}

/// Contact fields shared by every user
#[derive(clap::Args, Debug)]
pub struct ContactArgs {
    /// Full name
    pub name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    /// Explicit id (default: next free U-number)
    #[arg(long)]
    pub id: Option<String>,
}

impl From<ContactArgs> for NewUser {
    fn from(args: ContactArgs) -> Self {
        NewUser {
            id: args.id,
            name: args.name,
            email: args.email,
            phone: args.phone,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct MemberAddArgs {
    #[command(flatten)]
    pub contact: ContactArgs,

    /// Membership start (default: today)
    #[arg(long, value_parser = parse_date)]
    pub joined: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct LibrarianAddArgs {
    #[command(flatten)]
    pub contact: ContactArgs,

    /// Staff number of the librarian
    #[arg(long)]
    pub employee_id: String,

    #[arg(long, default_value = "Librarian")]
    pub position: String,

    /// Hire date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub hired: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct UsersArgs {
    /// Only members
    #[arg(long, short = 'm')]
    pub members: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("type", "TYPE", 10),
    ColumnDef::new("email", "EMAIL", 30),
    ColumnDef::new("loans", "LOANS", 20),
    ColumnDef::new("fines", "FINES", 10),
];

pub fn run_member(cmd: MemberCommands, session: &Session) -> Result<()> {
    match cmd {
        MemberCommands::Add(args) => {
            let user = session
                .library()?
                .register_member(args.contact.into(), date_or_today(args.joined))?;
            session.report(&user, &user.id, format!("Registered member {} ({})", user.id, user.name))
        }
    }
}

pub fn run_librarian(cmd: LibrarianCommands, session: &Session) -> Result<()> {
    match cmd {
        LibrarianCommands::Add(args) => {
            let user = session.library()?.register_librarian(
                args.contact.into(),
                &args.employee_id,
                &args.position,
                date_or_today(args.hired),
            )?;
            session.report(&user, &user.id, format!("Registered librarian {} ({})", user.id, user.name))
        }
    }
}

pub fn run_list(args: UsersArgs, session: &Session) -> Result<()> {
    let lib = session.library()?;
    let users: Vec<&User> = if args.members {
        lib.members()
    } else {
        lib.users().iter().collect()
    };
    if print_structured(&users, session.format)? {
        return Ok(());
    }

    let rows = users.iter().map(|u| {
        let row = TableRow::new(u.id.clone())
            .cell("id", CellValue::Id(u.id.clone()))
            .cell("name", CellValue::Text(u.name.clone()))
            .cell("type", CellValue::Status(u.role.as_str().to_string()))
            .cell("email", CellValue::Text(u.email.clone()));
        match u.role {
            UserRole::Member { .. } => row
                .cell("loans", CellValue::Tags(u.borrowed_items().to_vec()))
                .cell("fines", CellValue::Money(u.fines())),
            UserRole::Librarian { .. } => row,
        }
    });
    TableFormatter::new(COLUMNS, "user").output(rows, session.list_format())
}
