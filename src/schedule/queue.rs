use rand::seq::SliceRandom;
use rand::Rng;

/// Remaining members of one class during an allocation attempt.
///
/// Members are taken out of order (lookahead and full scans), so instead of
/// shifting the backing list each removal only flags the slot and the cursor
/// skips past the taken prefix.
#[derive(Debug, Clone)]
pub struct ClassQueue {
    members: Vec<usize>,
    taken: Vec<bool>,
    cursor: usize,
    remaining: usize,
}

impl ClassQueue {
    pub fn new(members: Vec<usize>) -> Self {
        let len = members.len();
        Self {
            members,
            taken: vec![false; len],
            cursor: 0,
            remaining: len,
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(mut members: Vec<usize>, rng: &mut R) -> Self {
        members.shuffle(rng);
        Self::new(members)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// `(slot, candidate)` pairs still queued, front first.
    pub fn pending(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.cursor..self.members.len())
            .filter(move |&slot| !self.taken[slot])
            .map(move |slot| (slot, self.members[slot]))
    }

    /// Removes the member at `slot` and returns its candidate index.
    pub fn take(&mut self, slot: usize) -> usize {
        debug_assert!(!self.taken[slot], "queue slot {} taken twice", slot);
        self.taken[slot] = true;
        self.remaining -= 1;
        while self.cursor < self.members.len() && self.taken[self.cursor] {
            self.cursor += 1;
        }
        self.members[slot]
    }

    pub fn remaining_members(&self) -> Vec<usize> {
        self.pending().map(|(_, c)| c).collect()
    }
}

/// Class table for one allocation: names in first-appearance order and
/// the class index of every candidate.
#[derive(Debug, Clone)]
pub struct ClassIndex {
    pub names: Vec<String>,
    pub class_of: Vec<usize>,
}

impl ClassIndex {
    pub fn build<'a, I>(class_names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut class_of = Vec::new();
        for name in class_names {
            let idx = match names.iter().position(|n| n == name) {
                Some(idx) => idx,
                None => {
                    names.push(name.to_string());
                    names.len() - 1
                }
            };
            class_of.push(idx);
        }
        Self { names, class_of }
    }

    pub fn class_count(&self) -> usize {
        self.names.len()
    }

    /// One shuffled queue per class, indexed by class.
    pub fn queues<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ClassQueue> {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); self.names.len()];
        for (candidate, &class) in self.class_of.iter().enumerate() {
            groups[class].push(candidate);
        }
        groups
            .into_iter()
            .map(|members| ClassQueue::shuffled(members, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_take_out_of_order() {
        let mut q = ClassQueue::new(vec![10, 11, 12, 13]);
        assert_eq!(q.take(1), 11);
        assert_eq!(q.pending().collect::<Vec<_>>(), vec![(0, 10), (2, 12), (3, 13)]);
        assert_eq!(q.take(0), 10);
        // cursor skipped both taken slots
        assert_eq!(q.pending().next(), Some((2, 12)));
        assert_eq!(q.remaining_members(), vec![12, 13]);
        q.take(3);
        q.take(2);
        assert!(q.is_empty());
        assert!(q.remaining_members().is_empty());
    }

    #[test]
    fn test_class_index_first_appearance() {
        let index = ClassIndex::build(["CS-B", "CS-A", "CS-B", "ME"]);
        assert_eq!(index.names, vec!["CS-B", "CS-A", "ME"]);
        assert_eq!(index.class_of, vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_queues_partition_candidates() {
        let index = ClassIndex::build(["A", "B", "A", "A", "B"]);
        let mut rng = StdRng::seed_from_u64(3);
        let queues = index.queues(&mut rng);

        let mut a = queues[0].remaining_members();
        let mut b = queues[1].remaining_members();
        a.sort();
        b.sort();
        assert_eq!(a, vec![0, 2, 3]);
        assert_eq!(b, vec![1, 4]);
    }
}
