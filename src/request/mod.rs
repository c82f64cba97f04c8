pub mod payload;
pub mod validation;

pub use payload::{DateMode, ExamScheduleRequest, ManualSlot, ScheduleOptions, SeatingRequest};
pub use validation::{validate_halls, validate_rosters, validate_schedule_request};
