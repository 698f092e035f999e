//! Trove: record keeping for a research organization and its library
//!
//! Two facades own the records and keep their cross-references honest:
//! [`facade::Organization`] for employees, departments, projects and
//! equipment, and [`facade::Library`] for users, media and loans. Both
//! mirror every change to a [`core::Store`], either pipe-delimited text
//! files or an embedded SQLite database.

pub mod cli;
pub mod core;
pub mod entities;
pub mod facade;
