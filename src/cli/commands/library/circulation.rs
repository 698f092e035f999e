//! `trove lib borrow|return|pay|loans|overdue` - Circulation

use chrono::NaiveDate;
use console::style;
use miette::Result;

use crate::cli::helpers::{date_or_today, money, parse_date, print_structured, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::entities::Transaction;

#[derive(clap::Args, Debug)]
pub struct LoanArgs {
    /// User id
    pub user: String,

    /// Media id
    pub media: String,

    /// Date of the loan or return (default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct PayArgs {
    /// Member id
    pub user: String,

    pub amount: f64,
}

#[derive(clap::Args, Debug)]
pub struct LoansArgs {
    /// User id
    pub user: String,

    /// Include returned loans
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct OverdueArgs {
    /// Reference date (default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

const LOAN_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("user", "USER", 6),
    ColumnDef::new("media", "MEDIA", 6),
    ColumnDef::new("borrowed", "BORROWED", 10),
    ColumnDef::new("due", "DUE", 10),
    ColumnDef::new("returned", "RETURNED", 10),
    ColumnDef::new("fee", "FEE", 9),
];

const OVERDUE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("user", "USER", 6),
    ColumnDef::new("media", "MEDIA", 6),
    ColumnDef::new("due", "DUE", 10),
    ColumnDef::new("late", "DAYS LATE", 9),
    ColumnDef::new("fee", "FEE SO FAR", 10),
];

pub fn run_borrow(args: LoanArgs, session: &Session) -> Result<()> {
    let loan = session
        .library()?
        .borrow(&args.user, &args.media, date_or_today(args.date))?;
    session.report(
        &loan,
        &loan.id,
        format!("{} lent {} to {}, due {}", loan.id, loan.media_id, loan.user_id, loan.due_date),
    )
}

pub fn run_return(args: LoanArgs, session: &Session) -> Result<()> {
    let loan = session
        .library()?
        .return_item(&args.user, &args.media, date_or_today(args.date))?;
    let message = if loan.late_fee > 0.0 {
        format!(
            "{} returned late, fee {}",
            loan.media_id,
            style(money(loan.late_fee)).yellow()
        )
    } else {
        format!("{} returned on time", loan.media_id)
    };
    session.report(&loan, &loan.id, message)
}

pub fn run_pay(args: PayArgs, session: &Session) -> Result<()> {
    let user = session.library()?.pay_fine(&args.user, args.amount)?;
    session.report(
        &user,
        &user.id,
        format!("{} paid {}, still owes {}", user.id, money(args.amount), money(user.fines())),
    )
}

pub fn run_loans(args: LoansArgs, session: &Session) -> Result<()> {
    let lib = session.library()?;
    let loans: Vec<&Transaction> = if args.all {
        let user = lib.find_user(&args.user)?;
        lib.transactions().iter().filter(|t| t.user_id == user.id).collect()
    } else {
        lib.loans_of(&args.user)?
    };
    if print_structured(&loans, session.format)? {
        return Ok(());
    }

    let rows = loans.into_iter().map(loan_row);
    TableFormatter::new(LOAN_COLUMNS, "loan").output(rows, session.list_format())
}

pub fn run_overdue(args: OverdueArgs, session: &Session) -> Result<()> {
    let overdue = session.library()?.overdue(date_or_today(args.date));
    if print_structured(&overdue, session.format)? {
        return Ok(());
    }

    let rows = overdue.iter().map(|o| {
        let t = &o.transaction;
        TableRow::new(t.id.clone())
            .cell("id", CellValue::Id(t.id.clone()))
            .cell("user", CellValue::Id(t.user_id.clone()))
            .cell("media", CellValue::Id(t.media_id.clone()))
            .cell("due", CellValue::Date(t.due_date))
            .cell("late", CellValue::Number(o.days_late))
            .cell("fee", CellValue::Money(o.accrued_fee))
    });
    TableFormatter::new(OVERDUE_COLUMNS, "overdue loan").output(rows, session.list_format())
}

fn loan_row(t: &Transaction) -> TableRow {
    TableRow::new(t.id.clone())
        .cell("id", CellValue::Id(t.id.clone()))
        .cell("user", CellValue::Id(t.user_id.clone()))
        .cell("media", CellValue::Id(t.media_id.clone()))
        .cell("borrowed", CellValue::Date(t.borrow_date))
        .cell("due", CellValue::Date(t.due_date))
        .cell(
            "returned",
            t.return_date.map_or(CellValue::Empty, CellValue::Date),
        )
        .cell("fee", CellValue::Money(t.late_fee))
}
