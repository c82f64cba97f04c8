use std::collections::HashSet;

use tracing::debug;

use super::types::{HallAssignment, HallSeating};
use crate::parser::Teacher;

/// Staffs the occupied halls of one slot.
///
/// Teachers of any subject examined in the slot are left out. The rest are
/// handed out in input order, up to `per_hall` per hall, so nobody is in two
/// halls of the same slot. When teachers run out the later halls just get
/// fewer (possibly zero) invigilators.
pub fn assign_invigilators(
    slot_subjects: &HashSet<&str>,
    teachers: &[Teacher],
    seating: &[HallSeating],
    per_hall: usize,
) -> Vec<HallAssignment> {
    let mut eligible = teachers
        .iter()
        .filter(|t| !slot_subjects.contains(t.subject.as_str()))
        .map(|t| t.name.clone());

    let assignments: Vec<HallAssignment> = seating
        .iter()
        .filter(|hall| hall.occupied > 0)
        .map(|hall| HallAssignment {
            hall_name: hall.hall_name.clone(),
            invigilators: eligible.by_ref().take(per_hall).collect(),
            occupied: hall.occupied,
        })
        .collect();

    debug!(
        halls = assignments.len(),
        staffed = assignments.iter().map(|a| a.invigilators.len()).sum::<usize>(),
        "invigilators assigned"
    );
    assignments
}
