use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::parser::{ClassRoster, ClassSubjects, Hall, Teacher};
use crate::schedule::Shift;

/// Body of a plain seating request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatingRequest {
    #[serde(default)]
    pub classes: Vec<ClassRoster>,
    #[serde(default)]
    pub halls: Vec<Hall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    Manual,
    #[default]
    Auto,
}

/// A manually chosen date and shift for one exam; either may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualSlot {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub shift: Option<Shift>,
}

fn default_exams_per_day() -> u8 {
    1
}

fn default_invigilators_per_hall() -> usize {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub date_mode: DateMode,
    /// Keyed by `"{class}_{subject}"`.
    #[serde(default)]
    pub manual_dates: HashMap<String, ManualSlot>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_exams_per_day")]
    pub exams_per_day: u8,
    #[serde(default = "default_invigilators_per_hall")]
    pub invigilators_per_hall: usize,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            date_mode: DateMode::default(),
            manual_dates: HashMap::new(),
            start_date: None,
            end_date: None,
            exams_per_day: default_exams_per_day(),
            invigilators_per_hall: default_invigilators_per_hall(),
        }
    }
}

/// Body of a full exam-schedule request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamScheduleRequest {
    #[serde(default)]
    pub classes: Vec<ClassRoster>,
    #[serde(default)]
    pub halls: Vec<Hall>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub class_subjects: Vec<ClassSubjects>,
    #[serde(flatten)]
    pub options: ScheduleOptions,
}
