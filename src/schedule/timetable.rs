use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::types::{Exam, ExamDate, Shift, TimetabledExam};
use crate::error::PlannerError;
use crate::parser::ClassSubjects;
use crate::request::ManualSlot;

/// Expands class/subject descriptors into exams, hardest first.
///
/// The sort is stable, so exams of equal difficulty keep their input order.
pub fn collect_exams(class_subjects: &[ClassSubjects]) -> Vec<Exam> {
    let mut exams: Vec<Exam> = class_subjects
        .iter()
        .flat_map(|cs| {
            cs.subjects.iter().map(move |subject| Exam {
                class_name: cs.class_name.clone(),
                subject_name: subject.name.clone(),
                difficulty: subject.difficulty,
            })
        })
        .collect();
    exams.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
    exams
}

/// Key under which a manual date/shift is looked up.
pub fn manual_key(exam: &Exam) -> String {
    format!("{}_{}", exam.class_name, exam.subject_name)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, PlannerError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        PlannerError::invalid(format!("invalid date {:?}, expected YYYY-MM-DD", value))
    })
}

/// Takes each exam's date and shift from the manual map.
///
/// A missing date becomes [`ExamDate::Unassigned`]; a missing shift means Morning.
pub fn assign_manual(
    exams: &[Exam],
    manual_dates: &HashMap<String, ManualSlot>,
) -> Result<Vec<TimetabledExam>, PlannerError> {
    let mut timetabled = Vec::with_capacity(exams.len());
    let mut booked: HashSet<(ExamDate, Shift, &str)> = HashSet::new();
    for exam in exams {
        let entry = manual_dates.get(&manual_key(exam));
        let date = match entry.and_then(|e| e.date.as_deref()).filter(|d| !d.trim().is_empty()) {
            Some(raw) => ExamDate::Scheduled(parse_date(raw)?),
            None => {
                warn!(
                    class = %exam.class_name,
                    subject = %exam.subject_name,
                    "no manual date given"
                );
                ExamDate::Unassigned
            }
        };
        let shift = entry.and_then(|e| e.shift).unwrap_or(Shift::Morning);
        if date.is_assigned() && !booked.insert((date, shift, exam.class_name.as_str())) {
            warn!(
                class = %exam.class_name,
                subject = %exam.subject_name,
                %date,
                %shift,
                "class already sits another exam in this slot"
            );
        }
        timetabled.push(TimetabledExam {
            exam: exam.clone(),
            date,
            shift,
        });
    }
    Ok(timetabled)
}

/// Packs exams into consecutive slots between `start` and `end` (inclusive).
///
/// Each slot takes, in list order, the next exam of every class that has
/// not yet sat in it. Exams left over when the range runs out are returned
/// as unassigned Morning sittings.
pub fn assign_auto(
    exams: &[Exam],
    start: NaiveDate,
    end: NaiveDate,
    exams_per_day: u8,
) -> Result<Vec<TimetabledExam>, PlannerError> {
    let shifts = Shift::for_exams_per_day(exams_per_day).ok_or_else(|| {
        PlannerError::invalid(format!("exams per day must be 1 or 2, got {}", exams_per_day))
    })?;
    if start > end {
        return Err(PlannerError::invalid(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let class_total = exams
        .iter()
        .map(|e| e.class_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut remaining: Vec<Exam> = exams.to_vec();
    let mut timetabled = Vec::with_capacity(exams.len());
    let mut date = Some(start);
    let mut shift_idx = 0;

    while let Some(day) = date.filter(|d| *d <= end) {
        if remaining.is_empty() {
            break;
        }
        let shift = shifts[shift_idx];
        let mut in_slot: HashSet<String> = HashSet::new();

        let mut i = 0;
        while i < remaining.len() {
            if in_slot.contains(&remaining[i].class_name) {
                i += 1;
                continue;
            }
            let exam = remaining.remove(i);
            in_slot.insert(exam.class_name.clone());
            timetabled.push(TimetabledExam {
                exam,
                date: ExamDate::Scheduled(day),
                shift,
            });
            if in_slot.len() >= class_total {
                break;
            }
        }
        debug!(date = %day, %shift, exams = in_slot.len(), "slot packed");

        shift_idx += 1;
        if shift_idx >= shifts.len() {
            shift_idx = 0;
            date = day.succ_opt();
        }
    }

    if !remaining.is_empty() {
        warn!(unassigned = remaining.len(), %start, %end, "date range too short for all exams");
    }
    timetabled.extend(remaining.into_iter().map(|exam| TimetabledExam {
        exam,
        date: ExamDate::Unassigned,
        shift: Shift::Morning,
    }));

    Ok(timetabled)
}
