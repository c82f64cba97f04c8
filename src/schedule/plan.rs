use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument};

use super::invigilation::assign_invigilators;
use super::seating::SeatAllocator;
use super::timetable::{assign_auto, assign_manual, collect_exams, parse_date};
use super::types::{
    Candidate, ExamDate, ExamSchedule, HallSeating, ScheduleEntry, ScheduleSummary, SeatingPlan,
    SeatingSummary, Shift, TimetabledExam,
};
use crate::config::EngineConfig;
use crate::error::PlannerError;
use crate::parser::{build_candidates, total_candidates, total_capacity, ClassRoster, Hall};
use crate::request::{
    validate_halls, validate_rosters, validate_schedule_request, DateMode, ExamScheduleRequest,
};

/// Label used to tag errors and log events for one slot.
pub fn slot_label(date: ExamDate, shift: Shift) -> String {
    format!("{} {}", date, shift)
}

/// Counts the candidates of `rosters` against the seats of `halls` before
/// anything is expanded. Returns the candidate count.
fn check_capacity(rosters: &[ClassRoster], halls: &[Hall]) -> Result<usize, PlannerError> {
    let capacity = total_capacity(halls)?;
    let candidates = total_candidates(rosters)?;
    if candidates > capacity {
        return Err(PlannerError::CapacityExceeded {
            candidates,
            capacity,
            slot: None,
        });
    }
    Ok(candidates)
}

/// Shuffles `pool` and pours it into `halls` in order, one allocation per hall.
///
/// Halls after the pool runs dry are left out of the result.
fn fill_halls<R: Rng + ?Sized>(
    mut pool: Vec<Candidate>,
    halls: &[Hall],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Vec<HallSeating>, PlannerError> {
    pool.shuffle(rng);
    let allocator = SeatAllocator::new(config);
    let mut seated = Vec::new();
    let mut rest: &[Candidate] = &pool;

    for hall in halls {
        if rest.is_empty() {
            break;
        }
        let take = rest.len().min(hall.capacity());
        let (group, tail) = rest.split_at(take);
        let grid = allocator.allocate(&hall.name, group, hall.layout(), rng)?;
        seated.push(HallSeating {
            hall_name: hall.name.clone(),
            capacity: hall.capacity(),
            occupied: grid.occupied(),
            seating: grid,
        });
        rest = tail;
    }

    Ok(seated)
}

/// Seats every rostered candidate across the given halls.
#[instrument(skip_all, fields(classes = classes.len(), halls = halls.len()))]
pub fn generate_arrangement<R: Rng + ?Sized>(
    classes: &[ClassRoster],
    halls: &[Hall],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<SeatingPlan, PlannerError> {
    validate_rosters(classes, &config.limits)?;
    validate_halls(halls, &config.limits)?;

    let capacity = total_capacity(halls)?;
    if check_capacity(classes, halls)? == 0 {
        return Err(PlannerError::invalid("no candidates to seat, check the class rosters"));
    }

    let candidates = build_candidates(classes)?;
    let total_candidates = candidates.len();
    let seated = fill_halls(candidates, halls, config, rng)?;
    info!(
        total_candidates,
        total_capacity = capacity,
        halls_used = seated.len(),
        "seating plan ready"
    );

    Ok(SeatingPlan {
        summary: SeatingSummary {
            total_candidates,
            total_capacity: capacity,
            halls_used: seated.len(),
        },
        halls: seated,
    })
}

/// Combined seating for every class examined in one slot.
pub fn seat_slot<R: Rng + ?Sized>(
    exam_classes: &[String],
    rosters: &[ClassRoster],
    halls: &[Hall],
    config: &EngineConfig,
    rng: &mut R,
    label: &str,
) -> Result<Vec<HallSeating>, PlannerError> {
    let slot_rosters: Vec<ClassRoster> = rosters
        .iter()
        .filter(|r| exam_classes.iter().any(|c| *c == r.name))
        .cloned()
        .collect();
    check_capacity(&slot_rosters, halls).map_err(|e| e.in_slot(label))?;
    let pool = build_candidates(&slot_rosters)?;
    info!(slot = label, classes = exam_classes.len(), candidates = pool.len(), "seating slot");

    fill_halls(pool, halls, config, rng).map_err(|e| e.in_slot(label))
}

/// Full timetable: dates, combined seating per slot and invigilators.
#[instrument(skip_all, fields(mode = ?request.options.date_mode))]
pub fn generate_exam_schedule<R: Rng + ?Sized>(
    request: &ExamScheduleRequest,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<ExamSchedule, PlannerError> {
    validate_schedule_request(request, &config.limits)?;
    let options = &request.options;

    let exams = collect_exams(&request.class_subjects);
    let timetabled = match options.date_mode {
        DateMode::Manual => assign_manual(&exams, &options.manual_dates)?,
        DateMode::Auto => {
            let start = required_date(options.start_date.as_deref(), "start date")?;
            let end = required_date(options.end_date.as_deref(), "end date")?;
            assign_auto(&exams, start, end, options.exams_per_day)?
        }
    };

    let mut slots: BTreeMap<(ExamDate, Shift), Vec<&TimetabledExam>> = BTreeMap::new();
    for exam in &timetabled {
        slots.entry(exam.slot()).or_default().push(exam);
    }

    let mut entries = Vec::with_capacity(timetabled.len());
    let mut halls_used: HashSet<String> = HashSet::new();
    let mut teachers_assigned: HashSet<String> = HashSet::new();

    for ((date, shift), slot_exams) in &slots {
        let mut exam_classes: Vec<String> = Vec::new();
        for exam in slot_exams {
            if !exam_classes.contains(&exam.exam.class_name) {
                exam_classes.push(exam.exam.class_name.clone());
            }
        }

        if !date.is_assigned() {
            entries.extend(slot_exams.iter().map(|exam| ScheduleEntry {
                date: *date,
                shift: *shift,
                class_name: exam.exam.class_name.clone(),
                subject_name: exam.exam.subject_name.clone(),
                difficulty: exam.exam.difficulty,
                hall_name: None,
                hall_occupied: 0,
                invigilators: Vec::new(),
                exam_classes_in_slot: Vec::new(),
                seating_arrangement: Vec::new(),
            }));
            continue;
        }

        let label = slot_label(*date, *shift);
        let seating = seat_slot(
            &exam_classes,
            &request.classes,
            &request.halls,
            config,
            rng,
            &label,
        )?;

        let subjects: HashSet<&str> = slot_exams
            .iter()
            .map(|e| e.exam.subject_name.as_str())
            .collect();
        let assignments = assign_invigilators(
            &subjects,
            &request.teachers,
            &seating,
            options.invigilators_per_hall,
        );
        for assignment in &assignments {
            halls_used.insert(assignment.hall_name.clone());
            teachers_assigned.extend(assignment.invigilators.iter().cloned());
        }

        for exam in slot_exams {
            let hall = seating
                .iter()
                .find(|h| {
                    h.seating
                        .candidates()
                        .any(|(_, c)| c.class_name == exam.exam.class_name)
                })
                .or_else(|| seating.iter().find(|h| h.occupied > 0));
            let assignment =
                hall.and_then(|h| assignments.iter().find(|a| a.hall_name == h.hall_name));

            entries.push(ScheduleEntry {
                date: *date,
                shift: *shift,
                class_name: exam.exam.class_name.clone(),
                subject_name: exam.exam.subject_name.clone(),
                difficulty: exam.exam.difficulty,
                hall_name: hall.map(|h| h.hall_name.clone()),
                hall_occupied: hall.map_or(0, |h| h.occupied),
                invigilators: assignment.map(|a| a.invigilators.clone()).unwrap_or_default(),
                exam_classes_in_slot: exam_classes.clone(),
                seating_arrangement: seating.clone(),
            });
        }
    }

    let total_days = timetabled
        .iter()
        .filter(|t| t.date.is_assigned())
        .map(|t| t.date)
        .collect::<HashSet<_>>()
        .len();

    info!(exams = entries.len(), days = total_days, slots = slots.len(), "exam schedule ready");

    Ok(ExamSchedule {
        summary: ScheduleSummary {
            total_exams: timetabled.len(),
            total_days,
            halls_used: halls_used.len(),
            teachers_assigned: teachers_assigned.len(),
        },
        exam_schedule: entries,
    })
}

fn required_date(value: Option<&str>, what: &str) -> Result<NaiveDate, PlannerError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(v),
        _ => Err(PlannerError::invalid(format!("{} is required in auto mode", what))),
    }
}
