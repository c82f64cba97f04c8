pub mod backtrack;
pub mod column;
pub mod grid;
pub mod invigilation;
pub mod plan;
pub mod queue;
pub mod seating;
pub mod timetable;
pub mod types;

pub use plan::{generate_arrangement, generate_exam_schedule, seat_slot};
pub use seating::SeatAllocator;
pub use types::{
    Candidate, Desk, Exam, ExamDate, ExamSchedule, HallAssignment, HallGrid, HallLayout,
    HallSeating, ScheduleEntry, ScheduleSummary, SeatPos, SeatingPlan, SeatingSummary, Shift,
    TimetabledExam,
};
