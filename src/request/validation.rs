use std::collections::HashSet;

use super::payload::{DateMode, ExamScheduleRequest};
use crate::config::InputLimits;
use crate::error::PlannerError;
use crate::parser::{ClassRoster, ClassSubjects, Hall, Teacher};

pub fn validate_rosters(classes: &[ClassRoster], limits: &InputLimits) -> Result<(), PlannerError> {
    if classes.is_empty() {
        return Err(PlannerError::invalid("at least one class is required"));
    }
    let mut names = HashSet::new();
    for class in classes {
        if class.name.trim().is_empty() {
            return Err(PlannerError::invalid("class name is required"));
        }
        if !names.insert(class.name.as_str()) {
            return Err(PlannerError::invalid(format!("class {} is listed twice", class.name)));
        }
        if class.start_id > class.end_id {
            return Err(PlannerError::invalid(format!(
                "class {}: start roll {} is after end roll {}",
                class.name, class.start_id, class.end_id
            )));
        }
        let size = class.candidate_count()?;
        if size > limits.max_roster_size {
            return Err(PlannerError::invalid(format!(
                "class {} has {} candidates, the limit is {}",
                class.name, size, limits.max_roster_size
            )));
        }
    }
    Ok(())
}

pub fn validate_halls(halls: &[Hall], limits: &InputLimits) -> Result<(), PlannerError> {
    if halls.is_empty() {
        return Err(PlannerError::invalid("at least one hall is required"));
    }
    let mut names = HashSet::new();
    for hall in halls {
        if hall.name.trim().is_empty() {
            return Err(PlannerError::invalid("hall name is required"));
        }
        if !names.insert(hall.name.as_str()) {
            return Err(PlannerError::invalid(format!("hall {} is listed twice", hall.name)));
        }
        if hall.rows == 0 || hall.columns == 0 || hall.desk_capacity == 0 {
            return Err(PlannerError::invalid(format!(
                "hall {} needs at least 1 row, 1 column and 1 seat per desk",
                hall.name
            )));
        }
        match hall.layout().checked_capacity() {
            Some(seats) if seats <= limits.max_hall_seats => {}
            _ => {
                return Err(PlannerError::invalid(format!(
                    "hall {} declares {}x{}x{} seats, the limit is {}",
                    hall.name, hall.rows, hall.columns, hall.desk_capacity, limits.max_hall_seats
                )))
            }
        }
    }
    Ok(())
}

fn validate_teachers(teachers: &[Teacher]) -> Result<(), PlannerError> {
    if teachers.is_empty() {
        return Err(PlannerError::invalid("at least one teacher is required"));
    }
    let mut names = HashSet::new();
    for teacher in teachers {
        if teacher.name.trim().is_empty() {
            return Err(PlannerError::invalid("teacher name is required"));
        }
        if teacher.subject.trim().is_empty() {
            return Err(PlannerError::invalid(format!("teacher {} has no subject", teacher.name)));
        }
        if !names.insert(teacher.name.as_str()) {
            return Err(PlannerError::invalid(format!("teacher {} is listed twice", teacher.name)));
        }
    }
    Ok(())
}

fn validate_class_subjects(
    class_subjects: &[ClassSubjects],
    classes: &[ClassRoster],
) -> Result<(), PlannerError> {
    if class_subjects.is_empty() {
        return Err(PlannerError::invalid("at least one class subject list is required"));
    }
    let rostered: HashSet<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    for cs in class_subjects {
        if !rostered.contains(cs.class_name.as_str()) {
            return Err(PlannerError::invalid(format!(
                "subjects given for class {} which has no roster",
                cs.class_name
            )));
        }
        let mut seen = HashSet::new();
        for subject in &cs.subjects {
            if subject.name.trim().is_empty() {
                return Err(PlannerError::invalid(format!(
                    "class {} has a subject without a name",
                    cs.class_name
                )));
            }
            if subject.difficulty == 0 {
                return Err(PlannerError::invalid(format!(
                    "class {} subject {}: difficulty must be a positive integer",
                    cs.class_name, subject.name
                )));
            }
            if !seen.insert(subject.name.as_str()) {
                return Err(PlannerError::invalid(format!(
                    "class {} lists subject {} twice",
                    cs.class_name, subject.name
                )));
            }
        }
    }
    Ok(())
}

pub fn validate_schedule_request(
    req: &ExamScheduleRequest,
    limits: &InputLimits,
) -> Result<(), PlannerError> {
    validate_rosters(&req.classes, limits)?;
    validate_halls(&req.halls, limits)?;
    validate_teachers(&req.teachers)?;
    validate_class_subjects(&req.class_subjects, &req.classes)?;

    let options = &req.options;
    if options.date_mode == DateMode::Auto {
        if options.start_date.as_deref().map_or(true, |d| d.trim().is_empty())
            || options.end_date.as_deref().map_or(true, |d| d.trim().is_empty())
        {
            return Err(PlannerError::invalid("start and end dates are required in auto mode"));
        }
        if options.exams_per_day != 1 && options.exams_per_day != 2 {
            return Err(PlannerError::invalid(format!(
                "exams per day must be 1 or 2, got {}",
                options.exams_per_day
            )));
        }
    }
    Ok(())
}
