//! Studio scheduling domain models.
//!
//! Provides the core data types for the weekly class grid: clock
//! primitives, placed class entries, historic observations, the instructor
//! roster, and the schedule container.
//!
//! # Domain Mappings
//!
//! | studio-schedule | Generic scheduling |
//! |-----------------|--------------------|
//! | ScheduledClassEntry | Assignment |
//! | Instructor | Resource (labor) |
//! | Location studios | Resource (capacity) |
//! | Bucket | Time unit |
//! | Schedule | Solution |

mod entry;
mod historic;
mod roster;
mod schedule;
mod time;

pub use entry::{normalize_name, EntryFlags, Instructor, ScheduledClassEntry};
pub use historic::{HistoricClassRecord, ScoreRecord};
pub use roster::{InstructorTier, Roster};
pub use schedule::{Schedule, Violation, ViolationType};
pub use time::{
    available_start_times, is_time_restricted, occupied_buckets, ClassDuration, ClockTime, Shift,
    Weekday, BUCKET_MINUTES, DAY_END, DAY_START,
};
