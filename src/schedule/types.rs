use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

/// One exam candidate, fixed once the roster has been expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub roll_no: i64,
    pub class_name: String,
    pub sequence_position: u32,
    pub is_late_entry: bool,
}

/// Dimensions of one hall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallLayout {
    pub rows: usize,
    pub columns: usize,
    pub desk_capacity: usize,
}

impl HallLayout {
    pub fn new(rows: usize, columns: usize, desk_capacity: usize) -> Self {
        Self {
            rows,
            columns,
            desk_capacity,
        }
    }

    /// Seat count, or `None` when the dimensions overflow `usize`.
    pub fn checked_capacity(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.columns)?
            .checked_mul(self.desk_capacity)
    }

    /// Seat count, saturating at `usize::MAX`. Halls are validated with
    /// [`HallLayout::checked_capacity`] before any grid is built.
    pub fn capacity(&self) -> usize {
        self.checked_capacity().unwrap_or(usize::MAX)
    }
}

/// Position of a single seat inside a hall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatPos {
    pub row: usize,
    pub col: usize,
    pub seat: usize,
}

impl SeatPos {
    pub fn new(row: usize, col: usize, seat: usize) -> Self {
        Self { row, col, seat }
    }
}

/// A desk: fixed number of seats, each empty or taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Desk {
    pub seats: Vec<Option<Candidate>>,
}

impl Desk {
    pub fn occupied(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }
}

/// Final seating grid of one hall, indexed `desks[row][col].seats[seat]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallGrid {
    pub rows: usize,
    pub columns: usize,
    pub desk_capacity: usize,
    pub desks: Vec<Vec<Desk>>,
}

impl HallGrid {
    pub fn empty(layout: HallLayout) -> Self {
        let desks = (0..layout.rows)
            .map(|_| {
                (0..layout.columns)
                    .map(|_| Desk {
                        seats: vec![None; layout.desk_capacity],
                    })
                    .collect()
            })
            .collect();
        Self {
            rows: layout.rows,
            columns: layout.columns,
            desk_capacity: layout.desk_capacity,
            desks,
        }
    }

    pub fn layout(&self) -> HallLayout {
        HallLayout::new(self.rows, self.columns, self.desk_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.layout().capacity()
    }

    pub fn occupied(&self) -> usize {
        self.desks.iter().flatten().map(Desk::occupied).sum()
    }

    pub fn seat(&self, pos: SeatPos) -> Option<&Candidate> {
        self.desks
            .get(pos.row)
            .and_then(|r| r.get(pos.col))
            .and_then(|d| d.seats.get(pos.seat))
            .and_then(|s| s.as_ref())
    }

    /// Seated candidates in row-major, desk-major, seat order.
    pub fn candidates(&self) -> impl Iterator<Item = (SeatPos, &Candidate)> + '_ {
        self.desks.iter().enumerate().flat_map(|(row, desks)| {
            desks.iter().enumerate().flat_map(move |(col, desk)| {
                desk.seats.iter().enumerate().filter_map(move |(seat, c)| {
                    c.as_ref().map(|c| (SeatPos::new(row, col, seat), c))
                })
            })
        })
    }
}

/// Seating result for one hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallSeating {
    pub hall_name: String,
    pub capacity: usize,
    pub occupied: usize,
    pub seating: HallGrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingSummary {
    pub total_candidates: usize,
    pub total_capacity: usize,
    pub halls_used: usize,
}

/// Result of a plain (non-timetabled) seating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingPlan {
    pub halls: Vec<HallSeating>,
    pub summary: SeatingSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Evening,
}

impl Shift {
    /// Shifts run on a day holding `exams_per_day` sittings (1 or 2).
    pub fn for_exams_per_day(exams_per_day: u8) -> Option<&'static [Shift]> {
        const SINGLE: &[Shift] = &[Shift::Morning];
        const DOUBLE: &[Shift] = &[Shift::Morning, Shift::Evening];
        match exams_per_day {
            1 => Some(SINGLE),
            2 => Some(DOUBLE),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Morning => write!(f, "Morning"),
            Shift::Evening => write!(f, "Evening"),
        }
    }
}

/// Exam date; `Unassigned` marks an exam that no date could be found for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExamDate {
    Scheduled(NaiveDate),
    Unassigned,
}

pub const UNASSIGNED_LABEL: &str = "Not Assigned";

impl ExamDate {
    pub fn is_assigned(&self) -> bool {
        matches!(self, ExamDate::Scheduled(_))
    }
}

impl fmt::Display for ExamDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamDate::Scheduled(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ExamDate::Unassigned => write!(f, "{}", UNASSIGNED_LABEL),
        }
    }
}

impl Serialize for ExamDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One (class, subject) sitting awaiting a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub class_name: String,
    pub subject_name: String,
    pub difficulty: u32,
}

/// An exam with its date and shift decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetabledExam {
    #[serde(flatten)]
    pub exam: Exam,
    pub date: ExamDate,
    pub shift: Shift,
}

impl TimetabledExam {
    pub fn slot(&self) -> (ExamDate, Shift) {
        (self.date, self.shift)
    }
}

/// Invigilators placed in one hall for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallAssignment {
    pub hall_name: String,
    pub invigilators: Vec<String>,
    pub occupied: usize,
}

/// Denormalized schedule row: one exam with its slot, hall and staffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub date: ExamDate,
    pub shift: Shift,
    pub class_name: String,
    pub subject_name: String,
    pub difficulty: u32,
    pub hall_name: Option<String>,
    pub hall_occupied: usize,
    pub invigilators: Vec<String>,
    pub exam_classes_in_slot: Vec<String>,
    pub seating_arrangement: Vec<HallSeating>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub total_exams: usize,
    pub total_days: usize,
    pub halls_used: usize,
    pub teachers_assigned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamSchedule {
    pub exam_schedule: Vec<ScheduleEntry>,
    pub summary: ScheduleSummary,
}
