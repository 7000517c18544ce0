//! Domain models.

pub mod attendance;
pub mod event;
pub mod id;
pub mod report;
pub mod user;

pub use attendance::{AttendanceRecord, AttendanceType};
pub use event::{Event, EventStatus};
pub use id::RecordId;
pub use report::{DateRange, Report, ReportKind};
pub use user::{User, UserRole};
