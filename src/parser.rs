use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, PlannerError};
use crate::schedule::{Candidate, HallLayout};

/// A class roster: a contiguous roll-number range with withdrawals removed
/// and late entries appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRoster {
    pub name: String,
    #[serde(alias = "start_roll")]
    pub start_id: i64,
    #[serde(alias = "end_roll")]
    pub end_id: i64,
    /// Comma-separated withdrawn roll numbers.
    #[serde(default, alias = "tc")]
    pub excluded: String,
    /// Comma-separated late-entry roll numbers.
    #[serde(default, alias = "leet")]
    pub late_entries: String,
}

impl ClassRoster {
    /// Number of roll numbers in `start_id..=end_id`, or `None` when the
    /// range is reversed or too wide to count.
    pub fn span(&self) -> Option<usize> {
        let width = self.end_id.checked_sub(self.start_id)?.checked_add(1)?;
        usize::try_from(width).ok()
    }

    /// Candidates this roster expands to, computed without expanding it.
    pub fn candidate_count(&self) -> Result<usize, PlannerError> {
        let span = self.span().ok_or_else(|| {
            PlannerError::invalid(format!(
                "class {}: roll range {}..={} is not countable",
                self.name, self.start_id, self.end_id
            ))
        })?;
        let excluded: HashSet<i64> = parse_id_list(&self.excluded)?
            .into_iter()
            .filter(|id| (self.start_id..=self.end_id).contains(id))
            .collect();
        Ok(span - excluded.len() + parse_id_list(&self.late_entries)?.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    #[serde(alias = "students_per_desk")]
    pub desk_capacity: usize,
}

impl Hall {
    pub fn layout(&self) -> HallLayout {
        HallLayout::new(self.rows, self.columns, self.desk_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.layout().capacity()
    }
}

/// Summed seat count of `halls`, rejecting dimensions that overflow.
pub fn total_capacity(halls: &[Hall]) -> Result<usize, PlannerError> {
    halls.iter().try_fold(0usize, |total, hall| {
        hall.layout()
            .checked_capacity()
            .and_then(|seats| total.checked_add(seats))
            .ok_or_else(|| PlannerError::invalid(format!("hall {} has too many seats", hall.name)))
    })
}

/// Summed candidate count of `rosters`, computed without expanding them.
pub fn total_candidates(rosters: &[ClassRoster]) -> Result<usize, PlannerError> {
    rosters.iter().try_fold(0usize, |total, roster| {
        let count = roster.candidate_count()?;
        total
            .checked_add(count)
            .ok_or_else(|| PlannerError::invalid("too many candidates to count"))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    /// Higher is harder; harder subjects are timetabled first.
    pub difficulty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSubjects {
    pub class_name: String,
    pub subjects: Vec<Subject>,
}

/// Parses a comma-separated list of roll numbers; blank entries are skipped.
pub fn parse_id_list(value: &str) -> Result<Vec<i64>, PlannerError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| PlannerError::invalid(format!("invalid roll number {:?}", part)))
        })
        .collect()
}

/// Expands one roster into candidates, in roll order then late entries.
pub fn roster_candidates(roster: &ClassRoster) -> Result<Vec<Candidate>, PlannerError> {
    if roster.name.trim().is_empty() {
        return Err(PlannerError::invalid("class name is required"));
    }
    if roster.start_id > roster.end_id {
        return Err(PlannerError::invalid(format!(
            "class {}: start roll {} is after end roll {}",
            roster.name, roster.start_id, roster.end_id
        )));
    }

    let excluded: HashSet<i64> = parse_id_list(&roster.excluded)?.into_iter().collect();
    let late = parse_id_list(&roster.late_entries)?;

    let mut candidates = Vec::new();
    let mut position = 0u32;
    for roll_no in roster.start_id..=roster.end_id {
        if excluded.contains(&roll_no) {
            continue;
        }
        candidates.push(Candidate {
            roll_no,
            class_name: roster.name.clone(),
            sequence_position: position,
            is_late_entry: false,
        });
        position += 1;
    }

    for roll_no in late {
        if candidates.iter().any(|c| c.roll_no == roll_no) {
            return Err(PlannerError::invalid(format!(
                "class {}: late entry {} is already on the roster",
                roster.name, roll_no
            )));
        }
        candidates.push(Candidate {
            roll_no,
            class_name: roster.name.clone(),
            sequence_position: position,
            is_late_entry: true,
        });
        position += 1;
    }

    Ok(candidates)
}

/// Expands every roster, keeping roster order.
pub fn build_candidates(rosters: &[ClassRoster]) -> Result<Vec<Candidate>, PlannerError> {
    let mut all = Vec::new();
    for roster in rosters {
        all.extend(roster_candidates(roster)?);
    }
    Ok(all)
}

fn read_records<T, R>(reader: R) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Reads rosters from CSV with header `name,start_id,end_id,excluded,late_entries`.
pub fn read_rosters<R: Read>(reader: R) -> Result<Vec<ClassRoster>, LoadError> {
    read_records(reader)
}

/// Reads halls from CSV with header `name,rows,columns,desk_capacity`.
pub fn read_halls<R: Read>(reader: R) -> Result<Vec<Hall>, LoadError> {
    read_records(reader)
}

/// Reads teachers from CSV with header `name,subject`.
pub fn read_teachers<R: Read>(reader: R) -> Result<Vec<Teacher>, LoadError> {
    read_records(reader)
}

pub fn load_rosters<P: AsRef<Path>>(path: P) -> Result<Vec<ClassRoster>, LoadError> {
    read_rosters(std::fs::File::open(path)?)
}

pub fn load_halls<P: AsRef<Path>>(path: P) -> Result<Vec<Hall>, LoadError> {
    read_halls(std::fs::File::open(path)?)
}

pub fn load_teachers<P: AsRef<Path>>(path: P) -> Result<Vec<Teacher>, LoadError> {
    read_teachers(std::fs::File::open(path)?)
}
