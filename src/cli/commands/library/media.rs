//! `trove lib media` command - Catalog management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use miette::Result;

use crate::cli::helpers::{parse_date, print_structured, Session};
use crate::cli::table::{print_fields, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::core::query::SortAlgorithm;
use crate::entities::MediaItem;
use crate::facade::{NewBook, NewDvd, NewMagazine};

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Add a book to the catalog
    AddBook(BookArgs),

    /// Add a magazine issue to the catalog
    AddMagazine(MagazineArgs),

    /// Add a DVD to the catalog
    AddDvd(DvdArgs),

    /// List the catalog
    List(ListArgs),

    /// Show one item
    Show(IdArg),

    /// Remove an item that is not on loan
    Remove(IdArg),

    /// Find items by title, author or ISBN
    Search(SearchArgs),

    /// List the catalog in sorted order
    Sort(SortArgs),
}

#[derive(clap::Args, Debug)]
pub struct BookArgs {
    pub title: String,

    #[arg(long, short = 'a')]
    pub author: String,

    #[arg(long, default_value = "")]
    pub isbn: String,

    #[arg(long, default_value_t = 0)]
    pub pages: u32,

    #[arg(long, default_value = "")]
    pub publisher: String,

    /// Explicit id (default: next free M-number)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MagazineArgs {
    pub title: String,

    #[arg(long)]
    pub issue: u32,

    #[arg(long, default_value = "")]
    pub publisher: String,

    #[arg(long, value_parser = parse_date)]
    pub published: NaiveDate,

    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DvdArgs {
    pub title: String,

    #[arg(long, default_value = "")]
    pub director: String,

    /// Running time in minutes
    #[arg(long, default_value_t = 0)]
    pub minutes: u32,

    #[arg(long, default_value = "")]
    pub genre: String,

    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only items on the shelf
    #[arg(long, conflicts_with = "borrowed")]
    pub available: bool,

    /// Only items out on loan
    #[arg(long)]
    pub borrowed: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Media id (exact)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Title fragment (case-insensitive)
    #[arg(long, short = 't', group = "query")]
    pub title: Option<String>,

    /// Author fragment (case-insensitive, books only)
    #[arg(long, short = 'a', group = "query")]
    pub author: Option<String>,

    /// Exact ISBN
    #[arg(long, group = "query")]
    pub isbn: Option<String>,
}

/// Sort key
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Title,
    /// Available items first, otherwise in catalog order
    Availability,
}

#[derive(clap::Args, Debug)]
pub struct SortArgs {
    #[arg(long, short = 'b', value_enum, default_value = "title")]
    pub by: SortKey,

    /// Sorting algorithm for titles
    #[arg(long, value_enum, default_value = "quick")]
    pub algorithm: SortAlgorithm,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("type", "TYPE", 9),
    ColumnDef::new("title", "TITLE", 34),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("holder", "HOLDER", 8),
    ColumnDef::new("details", "DETAILS", 50),
];

pub fn run(cmd: MediaCommands, session: &Session) -> Result<()> {
    match cmd {
        MediaCommands::AddBook(args) => {
            let item = session.library()?.add_book(NewBook {
                id: args.id,
                title: args.title,
                author: args.author,
                isbn: args.isbn,
                pages: args.pages,
                publisher: args.publisher,
            })?;
            report_added(&item, session)
        }
        MediaCommands::AddMagazine(args) => {
            let item = session.library()?.add_magazine(NewMagazine {
                id: args.id,
                title: args.title,
                issue_number: args.issue,
                publisher: args.publisher,
                publication_date: args.published,
            })?;
            report_added(&item, session)
        }
        MediaCommands::AddDvd(args) => {
            let item = session.library()?.add_dvd(NewDvd {
                id: args.id,
                title: args.title,
                director: args.director,
                duration_minutes: args.minutes,
                genre: args.genre,
                release_year: args.year,
            })?;
            report_added(&item, session)
        }
        MediaCommands::List(args) => {
            let lib = session.library()?;
            let items: Vec<&MediaItem> = if args.available {
                lib.available_media()
            } else if args.borrowed {
                lib.borrowed_media()
            } else {
                lib.media().iter().collect()
            };
            output_media(&items, session)
        }
        MediaCommands::Show(args) => run_show(args, session),
        MediaCommands::Remove(args) => {
            let removed = session.library()?.remove_media(&args.id)?;
            session.report(&removed, &removed.id, format!("Removed {} ({})", removed.id, removed.title))
        }
        MediaCommands::Search(args) => {
            let lib = session.library()?;
            let items: Vec<&MediaItem> = match (args.title, args.author, args.isbn) {
                (Some(title), _, _) => lib.search_by_title(&title),
                (_, Some(author), _) => lib.search_by_author(&author),
                (_, _, Some(isbn)) => lib.find_by_isbn(&isbn).into_iter().collect(),
                (None, None, None) => lib.media().iter().collect(),
            };
            output_media(&items, session)
        }
        MediaCommands::Sort(args) => {
            let lib = session.library()?;
            let items = match args.by {
                SortKey::Title => lib.sort_by_title(args.algorithm),
                SortKey::Availability => lib.sort_by_availability(),
            };
            output_media(&items, session)
        }
    }
}

fn report_added(item: &MediaItem, session: &Session) -> Result<()> {
    session.report(
        item,
        &item.id,
        format!("Added {} {} ({})", item.media_type(), item.id, item.title),
    )
}

fn run_show(args: IdArg, session: &Session) -> Result<()> {
    let lib = session.library()?;
    let item = lib.find_media(&args.id)?;
    if print_structured(item, session.format)? {
        return Ok(());
    }
    print_fields(
        &format!("{} {}", item.id, item.title),
        &[
            ("Type", item.media_type().to_string()),
            ("Status", availability(item).to_string()),
            ("Borrowed by", item.borrowed_by.clone().unwrap_or_default()),
            ("Late fee/day", format!("{:.2}", item.late_fee_rate())),
            ("Details", item.detail_summary()),
        ],
    );
    Ok(())
}

fn availability(item: &MediaItem) -> &'static str {
    if item.available {
        "AVAILABLE"
    } else {
        "BORROWED"
    }
}

fn output_media(items: &[&MediaItem], session: &Session) -> Result<()> {
    if print_structured(items, session.format)? {
        return Ok(());
    }
    let rows = items.iter().map(|m| {
        TableRow::new(m.id.clone())
            .cell("id", CellValue::Id(m.id.clone()))
            .cell("type", CellValue::Text(m.media_type().to_string()))
            .cell("title", CellValue::Text(m.title.clone()))
            .cell("status", CellValue::Status(availability(m).to_string()))
            .cell("holder", CellValue::optional_id(m.borrowed_by.as_deref()))
            .cell("details", CellValue::Text(m.detail_summary()))
    });
    TableFormatter::new(COLUMNS, "media item").output(rows, session.list_format())
}
