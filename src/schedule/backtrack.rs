use super::grid::{SeatMap, Seated};
use super::types::SeatPos;

/// How a backtracking run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktrackOutcome {
    /// Every residual candidate was seated.
    Completed,
    /// The search space was exhausted without a full placement.
    Exhausted,
    /// The step budget ran out first.
    BudgetSpent,
}

/// Exhaustive placement of a small residual into the free seats of a grid.
///
/// Candidates are placed one at a time into the first legal free seat; on a
/// dead end the most recent placement is undone and the next seat is tried.
/// The search keeps an explicit stack of chosen seats instead of recursing.
/// On failure the grid is left exactly as it was handed in.
#[derive(Debug, Clone, Copy)]
pub struct BacktrackingCompleter {
    step_budget: u64,
}

impl BacktrackingCompleter {
    pub fn new(step_budget: u64) -> Self {
        Self { step_budget }
    }

    pub fn complete(&self, map: &mut SeatMap, residual: &[Seated]) -> BacktrackOutcome {
        let free: Vec<SeatPos> = map.free_positions();
        let mut used = vec![false; free.len()];
        // chosen[i] is the index into `free` holding residual[i]
        let mut chosen: Vec<usize> = Vec::with_capacity(residual.len());
        let mut resume_at = 0;
        let mut steps: u64 = 0;

        loop {
            let depth = chosen.len();
            if depth == residual.len() {
                return BacktrackOutcome::Completed;
            }

            let next = residual[depth];
            let mut found = None;
            for p in resume_at..free.len() {
                if used[p] {
                    continue;
                }
                steps += 1;
                if steps > self.step_budget {
                    Self::unwind(map, &free, &chosen);
                    return BacktrackOutcome::BudgetSpent;
                }
                if map.can_place(free[p], next.class) {
                    found = Some(p);
                    break;
                }
            }

            match found {
                Some(p) => {
                    map.place(free[p], next);
                    used[p] = true;
                    chosen.push(p);
                    resume_at = 0;
                }
                None => match chosen.pop() {
                    Some(p) => {
                        map.clear(free[p]);
                        used[p] = false;
                        resume_at = p + 1;
                    }
                    None => return BacktrackOutcome::Exhausted,
                },
            }
        }
    }

    fn unwind(map: &mut SeatMap, free: &[SeatPos], chosen: &[usize]) {
        for &p in chosen.iter().rev() {
            map.clear(free[p]);
        }
    }
}
