use super::grid::SeatMap;

/// Added when the desk above already starts with the same class.
pub const REPEAT_PENALTY: u32 = 1000;
/// Added per seat of the same class already in the column.
pub const CLUSTER_WEIGHT: u32 = 10;

/// Preference score of `col` for `class` on `row`; lower is better.
pub fn column_score(map: &SeatMap, row: usize, col: usize, class: usize) -> u32 {
    let mut score = 0;
    if map.last_column_class(row, col) == Some(class) {
        score += REPEAT_PENALTY;
    }
    score + CLUSTER_WEIGHT * map.column_class_count(col, class) as u32
}

/// Lowest-scoring column on `row` whose desk still has a free seat.
/// Ties go to the leftmost column.
pub fn best_column(map: &SeatMap, row: usize, class: usize) -> Option<usize> {
    (0..map.layout().columns)
        .filter(|&col| map.desk_has_space(row, col))
        .min_by_key(|&col| column_score(map, row, col, class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grid::Seated;
    use crate::schedule::types::{HallLayout, SeatPos};

    fn seat(map: &mut SeatMap, row: usize, col: usize, seat: usize, class: usize) {
        map.place(SeatPos::new(row, col, seat), Seated { candidate: 0, class });
    }

    #[test]
    fn test_repeat_penalty_and_clustering() {
        let mut map = SeatMap::new(HallLayout::new(3, 3, 1));
        seat(&mut map, 0, 0, 0, 7);
        seat(&mut map, 1, 1, 0, 7);

        // row 2: column 1 repeats the desk above, column 0 only clusters
        assert_eq!(column_score(&map, 2, 0, 7), CLUSTER_WEIGHT);
        assert_eq!(column_score(&map, 2, 1, 7), REPEAT_PENALTY + CLUSTER_WEIGHT);
        assert_eq!(column_score(&map, 2, 2, 7), 0);
        assert_eq!(best_column(&map, 2, 7), Some(2));
    }

    #[test]
    fn test_ties_pick_first_column() {
        let map = SeatMap::new(HallLayout::new(2, 4, 2));
        assert_eq!(best_column(&map, 0, 0), Some(0));
    }

    #[test]
    fn test_full_desks_skipped() {
        let mut map = SeatMap::new(HallLayout::new(1, 2, 1));
        seat(&mut map, 0, 0, 0, 1);
        assert_eq!(best_column(&map, 0, 0), Some(1));
        seat(&mut map, 0, 1, 0, 2);
        assert_eq!(best_column(&map, 0, 0), None);
    }
}
