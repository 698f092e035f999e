//! Shared helper functions for CLI commands
//!
//! Opening the configured store, resolving the output format and printing
//! structured output are the same for every command, so they live here.

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::codec::DATE_FORMAT;
use crate::core::store::{AnyStore, Backend};
use crate::core::{Config, Workspace};
use crate::facade::{Inconsistency, Library, Organization};

/// Resolved configuration for one invocation
pub struct Session {
    pub config: Config,
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Session {
    /// Merge config layers with the command-line flags, which win
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = Workspace::discover().ok();
        let config = Config::load_with(workspace.as_ref(), |key| std::env::var(key).ok())?;

        let backend = global.backend.unwrap_or_else(|| config.backend());
        let data_dir = match global.data_dir {
            Some(ref dir) => dir.clone(),
            None => config.data_dir(workspace.as_ref())?,
        };
        let format = match global.format {
            OutputFormat::Auto => config
                .default_format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        };

        debug!(backend = %backend, data_dir = %data_dir.display(), "session opened");
        Ok(Self {
            config,
            backend,
            data_dir,
            format,
            quiet: global.quiet,
        })
    }

    pub fn store(&self) -> Result<AnyStore> {
        Ok(AnyStore::open(self.backend, &self.data_dir)?)
    }

    pub fn organization(&self) -> Result<Organization<AnyStore>> {
        Ok(Organization::open(self.store()?)?)
    }

    pub fn library(&self) -> Result<Library<AnyStore>> {
        Ok(Library::with_loan_period(
            self.store()?,
            self.config.loan_period_days(),
        )?)
    }

    /// Format for listings: `auto` means aligned columns
    pub fn list_format(&self) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => OutputFormat::Tsv,
            f => f,
        }
    }

    /// Print a confirmation line unless `--quiet`
    pub fn success(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    /// Print a record after a mutation, honoring structured formats
    pub fn report<T: Serialize>(&self, record: &T, id: &str, message: impl std::fmt::Display) -> Result<()> {
        if self.format == OutputFormat::Id {
            println!("{id}");
        } else if !print_structured(record, self.format)? {
            self.success(message);
        }
        Ok(())
    }
}

/// Print `value` as JSON or YAML; false when `format` is neither
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print consistency findings; any finding makes the command fail
pub fn report_inconsistencies(issues: &[Inconsistency], session: &Session) -> Result<()> {
    if !print_structured(issues, session.format)? {
        for issue in issues {
            println!("{} {}", style("✗").red(), issue);
        }
    }
    if issues.is_empty() {
        session.success("all records consistent");
        Ok(())
    } else {
        Err(miette::miette!("{} inconsistency(ies) found", issues.len()))
    }
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| format!("'{value}' is not a date in YYYY-MM-DD form"))
}

/// The given date, else today in local time
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Counts characters, so multi-byte text never splits inside a code point.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Format money with two decimals
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ünïcödé text", 7), "Ünïc...");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-20"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 20).unwrap())
        );
        assert!(parse_date("20/02/2024").is_err());
    }

    #[test]
    fn test_date_or_today_prefers_given_date() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_or_today(Some(day)), day);
    }

    #[test]
    fn test_money() {
        assert_eq!(money(12.0), "12.00");
        assert_eq!(money(0.5), "0.50");
    }
}
