use super::types::{Candidate, Desk, HallGrid, HallLayout, SeatPos};

/// A seated candidate, by index into the allocation's candidate slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seated {
    pub candidate: usize,
    pub class: usize,
}

/// Mutable working grid used while an allocation is in progress.
#[derive(Debug, Clone)]
pub struct SeatMap {
    layout: HallLayout,
    seats: Vec<Option<Seated>>,
    placed: usize,
}

impl SeatMap {
    pub fn new(layout: HallLayout) -> Self {
        Self {
            layout,
            seats: vec![None; layout.capacity()],
            placed: 0,
        }
    }

    pub fn layout(&self) -> HallLayout {
        self.layout
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    fn index(&self, pos: SeatPos) -> usize {
        (pos.row * self.layout.columns + pos.col) * self.layout.desk_capacity + pos.seat
    }

    pub fn get(&self, pos: SeatPos) -> Option<Seated> {
        self.seats[self.index(pos)]
    }

    pub fn is_free(&self, pos: SeatPos) -> bool {
        self.get(pos).is_none()
    }

    fn class_at(&self, row: usize, col: usize, seat: usize) -> Option<usize> {
        self.get(SeatPos::new(row, col, seat)).map(|s| s.class)
    }

    /// Same-desk and boundary-seat rules for putting `class` at `pos`.
    pub fn can_place(&self, pos: SeatPos, class: usize) -> bool {
        let cap = self.layout.desk_capacity;

        if (0..cap).any(|seat| self.class_at(pos.row, pos.col, seat) == Some(class)) {
            return false;
        }

        if pos.seat == 0
            && pos.col > 0
            && self.class_at(pos.row, pos.col - 1, cap - 1) == Some(class)
        {
            return false;
        }

        if pos.seat == cap - 1
            && pos.col + 1 < self.layout.columns
            && self.class_at(pos.row, pos.col + 1, 0) == Some(class)
        {
            return false;
        }

        true
    }

    pub fn place(&mut self, pos: SeatPos, seated: Seated) {
        let idx = self.index(pos);
        debug_assert!(self.seats[idx].is_none(), "seat {:?} already taken", pos);
        self.seats[idx] = Some(seated);
        self.placed += 1;
    }

    pub fn clear(&mut self, pos: SeatPos) -> Option<Seated> {
        let idx = self.index(pos);
        let previous = self.seats[idx].take();
        if previous.is_some() {
            self.placed -= 1;
        }
        previous
    }

    /// Class of the first occupied seat in the desk directly above.
    pub fn last_column_class(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 {
            return None;
        }
        (0..self.layout.desk_capacity).find_map(|seat| self.class_at(row - 1, col, seat))
    }

    /// Number of seats in `col`, over all rows, holding `class`.
    pub fn column_class_count(&self, col: usize, class: usize) -> usize {
        (0..self.layout.rows)
            .flat_map(|row| (0..self.layout.desk_capacity).map(move |seat| (row, seat)))
            .filter(|&(row, seat)| self.class_at(row, col, seat) == Some(class))
            .count()
    }

    pub fn desk_has_space(&self, row: usize, col: usize) -> bool {
        (0..self.layout.desk_capacity).any(|seat| self.is_free(SeatPos::new(row, col, seat)))
    }

    /// Every seat position in row-major, desk-major, seat order.
    pub fn positions(&self) -> impl Iterator<Item = SeatPos> {
        let HallLayout {
            rows,
            columns,
            desk_capacity,
        } = self.layout;
        (0..rows).flat_map(move |row| {
            (0..columns).flat_map(move |col| {
                (0..desk_capacity).map(move |seat| SeatPos::new(row, col, seat))
            })
        })
    }

    pub fn free_positions(&self) -> Vec<SeatPos> {
        self.positions().filter(|&pos| self.is_free(pos)).collect()
    }

    pub fn into_hall_grid(self, candidates: &[Candidate]) -> HallGrid {
        let HallLayout {
            rows,
            columns,
            desk_capacity,
        } = self.layout;
        let mut seats = self.seats.into_iter();
        let desks = (0..rows)
            .map(|_| {
                (0..columns)
                    .map(|_| Desk {
                        seats: seats
                            .by_ref()
                            .take(desk_capacity)
                            .map(|s| s.map(|s| candidates[s.candidate].clone()))
                            .collect(),
                    })
                    .collect()
            })
            .collect();

        HallGrid {
            rows,
            columns,
            desk_capacity,
            desks,
        }
    }
}
