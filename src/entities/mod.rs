//! Entity type definitions
//!
//! Trove keeps the following record types:
//!
//! **Organization:**
//! - [`Employee`] - Staff with Manager, Scientist or Technician details
//! - [`Department`] - Organizational units with budget and headcount
//! - [`Project`] - Research projects led by a scientist
//! - [`Equipment`] - Department equipment handled by technicians
//!
//! **Library:**
//! - [`User`] - Members and librarians
//! - [`MediaItem`] - Books, magazines and DVDs
//! - [`Transaction`] - Loans of media items to members

pub mod department;
pub mod employee;
pub mod equipment;
pub mod media;
pub mod project;
pub mod transaction;
pub mod user;

pub use department::Department;
pub use employee::{Employee, RoleDetails, RoleType};
pub use equipment::{Equipment, EquipmentStatus};
pub use media::{MediaDetails, MediaItem, MediaType};
pub use project::{Project, ProjectStatus};
pub use transaction::Transaction;
pub use user::{User, UserRole};
