use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::backtrack::{BacktrackOutcome, BacktrackingCompleter};
use super::column::best_column;
use super::grid::{SeatMap, Seated};
use super::queue::{ClassIndex, ClassQueue};
use super::types::{Candidate, HallGrid, HallLayout, SeatPos};
use crate::config::{EngineConfig, PlacementStrategy};
use crate::error::PlannerError;

/// Places candidates of one hall so that no desk holds two candidates of
/// the same class and touching seats of neighbouring desks differ in class.
#[derive(Debug, Clone, Copy)]
pub struct SeatAllocator<'a> {
    config: &'a EngineConfig,
}

impl<'a> SeatAllocator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Seats every candidate in `hall` or reports how many could not be seated.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        hall: &str,
        candidates: &[Candidate],
        layout: HallLayout,
        rng: &mut R,
    ) -> Result<HallGrid, PlannerError> {
        if layout.rows == 0 || layout.columns == 0 || layout.desk_capacity == 0 {
            return Err(PlannerError::invalid(format!(
                "hall {} must have at least 1 row, 1 column and 1 seat per desk",
                hall
            )));
        }
        let capacity = match layout.checked_capacity() {
            Some(seats) if seats <= self.config.limits.max_hall_seats => seats,
            _ => {
                return Err(PlannerError::invalid(format!(
                    "hall {} has more than {} seats",
                    hall, self.config.limits.max_hall_seats
                )))
            }
        };
        if candidates.len() > capacity {
            return Err(PlannerError::CapacityExceeded {
                candidates: candidates.len(),
                capacity,
                slot: None,
            });
        }

        let classes = ClassIndex::build(candidates.iter().map(|c| c.class_name.as_str()));
        if classes.class_count() <= 1 {
            return Ok(sequential_fill(candidates, layout));
        }

        let total = candidates.len();
        let mut attempt = 0;
        let (mut map, queues) = loop {
            attempt += 1;
            debug!(hall, attempt, candidates = total, "allocation attempt");
            let (map, queues) = self.run_attempt(&classes, layout, rng);
            debug!(hall, attempt, placed = map.placed(), "attempt finished");

            if map.placed() == total || attempt >= self.config.max_attempts {
                break (map, queues);
            }
            warn!(hall, attempt, placed = map.placed(), total, "placement incomplete, retrying");
        };

        if map.placed() < total {
            let residual: Vec<Seated> = queues
                .iter()
                .enumerate()
                .flat_map(|(class, queue)| {
                    queue
                        .remaining_members()
                        .into_iter()
                        .map(move |candidate| Seated { candidate, class })
                })
                .collect();

            if residual.len() > self.config.backtrack_limit {
                warn!(
                    hall,
                    unplaced = residual.len(),
                    limit = self.config.backtrack_limit,
                    "too many unplaced candidates, skipping backtracking"
                );
                return Err(infeasible(hall, residual.len(), false));
            }

            let completer = BacktrackingCompleter::new(self.config.backtrack_step_budget);
            match completer.complete(&mut map, &residual) {
                BacktrackOutcome::Completed => {
                    info!(
                        hall,
                        recovered = residual.len(),
                        "backtracking placed remaining candidates"
                    );
                }
                outcome => {
                    warn!(hall, unplaced = residual.len(), ?outcome, "backtracking failed");
                    return Err(infeasible(hall, residual.len(), true));
                }
            }
        }

        info!(hall, placed = map.placed(), total, attempts = attempt, "hall seated");
        Ok(map.into_hall_grid(candidates))
    }

    /// One full randomized pass over a fresh grid.
    fn run_attempt<R: Rng + ?Sized>(
        &self,
        classes: &ClassIndex,
        layout: HallLayout,
        rng: &mut R,
    ) -> (SeatMap, Vec<ClassQueue>) {
        let mut map = SeatMap::new(layout);
        let mut queues = classes.queues(rng);
        let total = classes.class_of.len();

        for row in 0..layout.rows {
            if map.placed() >= total {
                break;
            }
            let mut row_classes: Vec<usize> = (0..classes.class_count())
                .filter(|&c| !queues[c].is_empty())
                .collect();
            row_classes.shuffle(rng);

            match self.config.strategy {
                PlacementStrategy::SeatScan => {
                    self.seat_scan_row(&mut map, &mut queues, &row_classes, row, total)
                }
                PlacementStrategy::ColumnScore => {
                    self.column_score_row(&mut map, &mut queues, &row_classes, row, total)
                }
            }
        }

        (map, queues)
    }

    fn seat_scan_row(
        &self,
        map: &mut SeatMap,
        queues: &mut [ClassQueue],
        row_classes: &[usize],
        row: usize,
        total: usize,
    ) {
        let layout = map.layout();
        for col in 0..layout.columns {
            for seat in 0..layout.desk_capacity {
                if map.placed() >= total {
                    return;
                }
                let pos = SeatPos::new(row, col, seat);
                let last = map.last_column_class(row, col);

                let mut preferred: Vec<usize> = row_classes
                    .iter()
                    .copied()
                    .filter(|&c| !queues[c].is_empty() && Some(c) != last)
                    .collect();
                if preferred.is_empty() {
                    preferred = row_classes
                        .iter()
                        .copied()
                        .filter(|&c| !queues[c].is_empty())
                        .collect();
                }

                let lookahead = Some(self.config.lookahead);
                let placed = preferred
                    .iter()
                    .any(|&c| self.try_class(map, &mut queues[c], c, pos, lookahead));
                if !placed {
                    self.scan_all_classes(map, queues, pos);
                }
            }
        }
    }

    fn column_score_row(
        &self,
        map: &mut SeatMap,
        queues: &mut [ClassQueue],
        row_classes: &[usize],
        row: usize,
        total: usize,
    ) {
        let layout = map.layout();
        loop {
            let mut progressed = false;
            for &c in row_classes {
                if queues[c].is_empty() || map.placed() >= total {
                    continue;
                }
                let Some(col) = best_column(map, row, c) else {
                    return;
                };
                for seat in 0..layout.desk_capacity {
                    let pos = SeatPos::new(row, col, seat);
                    if map.is_free(pos)
                        && self.try_class(map, &mut queues[c], c, pos, Some(self.config.lookahead))
                    {
                        progressed = true;
                        break;
                    }
                }
            }
            if !progressed {
                break;
            }
        }

        for col in 0..layout.columns {
            for seat in 0..layout.desk_capacity {
                let pos = SeatPos::new(row, col, seat);
                if map.placed() >= total {
                    return;
                }
                if map.is_free(pos) {
                    self.scan_all_classes(map, queues, pos);
                }
            }
        }
    }

    /// Last resort for a seat: every queued candidate of every class.
    fn scan_all_classes(&self, map: &mut SeatMap, queues: &mut [ClassQueue], pos: SeatPos) -> bool {
        queues
            .iter_mut()
            .enumerate()
            .any(|(c, queue)| self.try_class(map, queue, c, pos, None))
    }

    /// Seats the first of (up to `limit`) queued candidates of `class` that fits `pos`.
    fn try_class(
        &self,
        map: &mut SeatMap,
        queue: &mut ClassQueue,
        class: usize,
        pos: SeatPos,
        limit: Option<usize>,
    ) -> bool {
        let fit = queue
            .pending()
            .take(limit.unwrap_or(usize::MAX))
            .find(|_| map.can_place(pos, class))
            .map(|(slot, _)| slot);

        match fit {
            Some(slot) => {
                let candidate = queue.take(slot);
                map.place(pos, Seated { candidate, class });
                true
            }
            None => false,
        }
    }
}

fn infeasible(hall: &str, unplaced: usize, backtracking_attempted: bool) -> PlannerError {
    PlannerError::PlacementInfeasible {
        hall: hall.to_string(),
        slot: None,
        unplaced,
        backtracking_attempted,
    }
}

/// Single-class input: nothing can conflict, fill seats in input order.
fn sequential_fill(candidates: &[Candidate], layout: HallLayout) -> HallGrid {
    let mut map = SeatMap::new(layout);
    let positions: Vec<SeatPos> = map.positions().take(candidates.len()).collect();
    for (candidate, pos) in positions.into_iter().enumerate() {
        map.place(pos, Seated { candidate, class: 0 });
    }
    map.into_hall_grid(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn class_of(name: &str, ids: std::ops::Range<i64>) -> Vec<Candidate> {
        ids.enumerate()
            .map(|(i, roll_no)| Candidate {
                roll_no,
                class_name: name.to_string(),
                sequence_position: i as u32,
                is_late_entry: false,
            })
            .collect()
    }

    fn assert_rules_hold(grid: &HallGrid) {
        for row in &grid.desks {
            for (col, desk) in row.iter().enumerate() {
                let classes: Vec<&str> = desk
                    .seats
                    .iter()
                    .flatten()
                    .map(|c| c.class_name.as_str())
                    .collect();
                let distinct: HashSet<&str> = classes.iter().copied().collect();
                assert_eq!(classes.len(), distinct.len(), "desk shares a class");

                if col + 1 < row.len() {
                    let left = desk.seats.last().and_then(|s| s.as_ref());
                    let right = row[col + 1].seats.first().and_then(|s| s.as_ref());
                    if let (Some(l), Some(r)) = (left, right) {
                        assert_ne!(l.class_name, r.class_name, "boundary seats share a class");
                    }
                }
            }
        }
    }

    #[test]
    fn test_mixed_classes_all_seated() {
        let config = EngineConfig::default();
        let mut candidates = class_of("CS", 100..106);
        candidates.extend(class_of("ME", 200..206));
        candidates.extend(class_of("EE", 300..306));

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = SeatAllocator::new(&config)
                .allocate("Hall 1", &candidates, HallLayout::new(4, 4, 2), &mut rng)
                .unwrap();
            assert_eq!(grid.occupied(), candidates.len());
            assert_rules_hold(&grid);

            let ids: HashSet<i64> = grid.candidates().map(|(_, c)| c.roll_no).collect();
            assert_eq!(ids.len(), candidates.len());
        }
    }

    #[test]
    fn test_column_score_strategy_all_seated() {
        let config = EngineConfig::default().with_strategy(PlacementStrategy::ColumnScore);
        let mut candidates = class_of("CS", 100..108);
        candidates.extend(class_of("ME", 200..208));

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = SeatAllocator::new(&config)
                .allocate("Hall 1", &candidates, HallLayout::new(4, 3, 2), &mut rng)
                .unwrap();
            assert_eq!(grid.occupied(), candidates.len());
            assert_rules_hold(&grid);
        }
    }

    #[test]
    fn test_single_class_fills_in_order() {
        let config = EngineConfig::default();
        let candidates = class_of("CS", 1..8);
        let mut rng = StdRng::seed_from_u64(1);
        let grid = SeatAllocator::new(&config)
            .allocate("Hall 1", &candidates, HallLayout::new(2, 2, 2), &mut rng)
            .unwrap();

        let order: Vec<i64> = grid.candidates().map(|(_, c)| c.roll_no).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(grid.seat(SeatPos::new(1, 1, 1)).is_none());
        assert_eq!(grid.seat(SeatPos::new(0, 1, 0)).map(|c| c.roll_no), Some(3));
    }

    #[test]
    fn test_exact_capacity_and_overflow() {
        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut candidates = class_of("A", 0..6);
        candidates.extend(class_of("B", 10..16));
        let layout = HallLayout::new(3, 2, 2);

        let grid = SeatAllocator::new(&config)
            .allocate("Hall 1", &candidates, layout, &mut rng)
            .unwrap();
        assert_eq!(grid.occupied(), grid.capacity());
        assert_rules_hold(&grid);

        candidates.extend(class_of("C", 20..21));
        let err = SeatAllocator::new(&config)
            .allocate("Hall 1", &candidates, layout, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            PlannerError::CapacityExceeded {
                candidates: 13,
                capacity: 12,
                slot: None
            }
        );
    }

    /// One column of two-seat desks: each desk takes at most one `A`, so
    /// `rows + k` A's against `rows - k` B's always leaves exactly k unplaced.
    fn skewed(rows: usize, k: usize) -> (Vec<Candidate>, HallLayout) {
        let mut candidates = class_of("A", 0..(rows + k) as i64);
        candidates.extend(class_of("B", 1000..(1000 + rows - k) as i64));
        (candidates, HallLayout::new(rows, 1, 2))
    }

    #[test]
    fn test_backtracking_attempted_at_limit() {
        let config = EngineConfig::default();
        let (candidates, layout) = skewed(20, 15);
        let mut rng = StdRng::seed_from_u64(11);
        let err = SeatAllocator::new(&config)
            .allocate("Hall 1", &candidates, layout, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            PlannerError::PlacementInfeasible {
                hall: "Hall 1".into(),
                slot: None,
                unplaced: 15,
                backtracking_attempted: true,
            }
        );
    }

    #[test]
    fn test_backtracking_skipped_above_limit() {
        let config = EngineConfig::default();
        let (candidates, layout) = skewed(20, 16);
        let mut rng = StdRng::seed_from_u64(11);
        let err = SeatAllocator::new(&config)
            .allocate("Hall 1", &candidates, layout, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            PlannerError::PlacementInfeasible {
                hall: "Hall 1".into(),
                slot: None,
                unplaced: 16,
                backtracking_attempted: false,
            }
        );
    }

    #[test]
    fn test_same_seed_same_grid() {
        let config = EngineConfig::default();
        let mut candidates = class_of("A", 0..5);
        candidates.extend(class_of("B", 10..15));
        let layout = HallLayout::new(3, 3, 2);

        let a = SeatAllocator::new(&config)
            .allocate("H", &candidates, layout, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let b = SeatAllocator::new(&config)
            .allocate("H", &candidates, layout, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input_and_bad_layout() {
        let config = EngineConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let grid = SeatAllocator::new(&config)
            .allocate("H", &[], HallLayout::new(1, 1, 1), &mut rng)
            .unwrap();
        assert_eq!(grid.occupied(), 0);

        let err = SeatAllocator::new(&config)
            .allocate("H", &[], HallLayout::new(0, 1, 1), &mut rng)
            .unwrap_err();
        assert!(matches!(err, PlannerError::InputValidation(_)));

        // rejected before any grid is allocated
        let oversized = [
            HallLayout::new(1_000_000_000, 1, 1),
            HallLayout::new(1 << 32, 1 << 32, 2),
        ];
        for layout in oversized {
            let err = SeatAllocator::new(&config)
                .allocate("H", &[], layout, &mut rng)
                .unwrap_err();
            assert!(matches!(err, PlannerError::InputValidation(_)));
        }
    }
}
