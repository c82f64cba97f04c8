use thiserror::Error;

/// Errors produced by the planning engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("not enough capacity{}: candidates={candidates}, capacity={capacity}", slot_suffix(.slot))]
    CapacityExceeded {
        candidates: usize,
        capacity: usize,
        slot: Option<String>,
    },

    #[error("could not place {unplaced} candidates in {hall}{} while keeping every seating rule", slot_suffix(.slot))]
    PlacementInfeasible {
        hall: String,
        slot: Option<String>,
        unplaced: usize,
        backtracking_attempted: bool,
    },
}

fn slot_suffix(slot: &Option<String>) -> String {
    slot.as_deref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default()
}

impl PlannerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PlannerError::InputValidation(message.into())
    }

    /// Tags capacity and placement errors with the exam slot they came from.
    pub fn in_slot(self, label: &str) -> Self {
        match self {
            PlannerError::CapacityExceeded {
                candidates,
                capacity,
                ..
            } => PlannerError::CapacityExceeded {
                candidates,
                capacity,
                slot: Some(label.to_string()),
            },
            PlannerError::PlacementInfeasible {
                hall,
                unplaced,
                backtracking_attempted,
                ..
            } => PlannerError::PlacementInfeasible {
                hall,
                slot: Some(label.to_string()),
                unplaced,
                backtracking_attempted,
            },
            other => other,
        }
    }

    /// Suggestions shown alongside a failed placement.
    pub fn remediation_hints(&self) -> Vec<&'static str> {
        match self {
            PlannerError::PlacementInfeasible { .. } => vec![
                "Add more examination halls",
                "Increase seats per desk if the desks are large enough",
                "Increase the number of rows or columns",
                "Use 1 seat per desk for maximum flexibility",
                "Spread candidates across more halls; smaller groups per hall work better",
            ],
            PlannerError::CapacityExceeded { .. } => vec![
                "Add more examination halls",
                "Increase the number of rows, columns or seats per desk",
            ],
            PlannerError::InputValidation(_) => Vec::new(),
        }
    }
}

/// Errors raised while loading inputs from files or the environment.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("invalid value for {key}: {value:?}")]
    Config { key: String, value: String },
}
