//! Data models for the school directory.
//!
//! - `Timetable`, `TimetableNode`: the bundled zone -> school -> grade ->
//!   section -> subject lookup table
//! - `ZoneDirectory`: zone -> school reference data for the staff cascade
//! - `StaffRecord`, `Role`: personnel records returned by the remote endpoint

pub mod staff;
pub mod timetable;
pub mod zones;

pub use staff::{Role, StaffRecord};
pub use timetable::{Timetable, TimetableNode};
pub use zones::ZoneDirectory;
