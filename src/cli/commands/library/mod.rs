//! `trove lib` command - Library records and circulation

pub mod circulation;
pub mod media;
pub mod users;

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{money, print_structured, report_inconsistencies, Session};
use crate::cli::GlobalOpts;
use crate::facade::seed_library;

#[derive(Subcommand, Debug)]
pub enum LibCommands {
    /// Register library members
    #[command(subcommand)]
    Member(users::MemberCommands),

    /// Register librarians
    #[command(subcommand)]
    Librarian(users::LibrarianCommands),

    /// List users
    Users(users::UsersArgs),

    /// Catalog of books, magazines and DVDs
    #[command(subcommand)]
    Media(media::MediaCommands),

    /// Lend a media item to a member
    Borrow(circulation::LoanArgs),

    /// Take back a borrowed item, charging late fees
    Return(circulation::LoanArgs),

    /// Pay towards a member's fines
    Pay(circulation::PayArgs),

    /// Show a user's open loans, or every loan with --all
    Loans(circulation::LoansArgs),

    /// List open loans past their due date
    Overdue(circulation::OverdueArgs),

    /// Catalog and circulation figures
    Stats,

    /// Verify availability flags and loan references
    Check,

    /// Load the sample library into an empty data directory
    Seed,
}

pub fn run(cmd: LibCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        LibCommands::Member(cmd) => users::run_member(cmd, &session),
        LibCommands::Librarian(cmd) => users::run_librarian(cmd, &session),
        LibCommands::Users(args) => users::run_list(args, &session),
        LibCommands::Media(cmd) => media::run(cmd, &session),
        LibCommands::Borrow(args) => circulation::run_borrow(args, &session),
        LibCommands::Return(args) => circulation::run_return(args, &session),
        LibCommands::Pay(args) => circulation::run_pay(args, &session),
        LibCommands::Loans(args) => circulation::run_loans(args, &session),
        LibCommands::Overdue(args) => circulation::run_overdue(args, &session),
        LibCommands::Stats => run_stats(&session),
        LibCommands::Check => report_inconsistencies(&session.library()?.check_consistency(), &session),
        LibCommands::Seed => run_seed(&session),
    }
}

fn run_stats(session: &Session) -> Result<()> {
    let lib = session.library()?;
    let stats = lib.statistics();
    if print_structured(&stats, session.format)? {
        return Ok(());
    }

    println!("{}", style("Library").bold());
    println!(
        "  Media:        {} ({} available, {} borrowed)",
        style(stats.media).cyan(),
        stats.available,
        stats.borrowed
    );
    println!(
        "  Users:        {} ({} members)",
        style(stats.users).cyan(),
        stats.members
    );
    println!(
        "  Loans:        {} open of {} total",
        style(stats.active_loans).cyan(),
        stats.transactions
    );
    println!("  Fines owed:   {}", money(stats.outstanding_fines));
    println!("  Loan period:  {} days", lib.loan_period_days());
    Ok(())
}

fn run_seed(session: &Session) -> Result<()> {
    let mut lib = session.library()?;
    let counts = seed_library(&mut lib)?;
    for (kind, count) in counts {
        session.success(format!("seeded {} {}", count, kind.collection()));
    }
    Ok(())
}
