use std::{cmp::Ordering, collections::BinaryHeap};
use crate::{ParetoError, ParetoErrorKind};

pub use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet};

/// Default capacity of a [`Space`], in Boolean variables.
pub const DEFAULT_SPACE_CAPACITY: u16 = 1024;

/// A contiguous block of Boolean variables encoding one quantity
/// domain, least significant bit first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VarBlock {
    vars: Vec<BddVariable>,
}

impl VarBlock {
    #[inline]
    pub fn vars(&self) -> &[BddVariable] {
        self.vars.as_slice()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// The shared Boolean variable space of all symbolic relations.
///
/// Created once, with a fixed capacity, by the top-level owner (the
/// symbolic calculator) and threaded through every symbolic operation.
/// Hands out disjoint variable blocks; all node-level resources stay
/// with the external engine.
#[derive(Clone)]
pub struct Space {
    vars: BddVariableSet,
    all: Vec<BddVariable>,
    used: usize,
}

impl std::fmt::Debug for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Space")
            .field("capacity", &self.all.len())
            .field("used", &self.used)
            .finish()
    }
}

impl Space {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SPACE_CAPACITY)
    }

    pub fn with_capacity(capacity: u16) -> Self {
        let vars = BddVariableSet::new_anonymous(capacity);
        let all = vars.variables();

        Space { vars, all, used: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.all.len()
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Allocates a fresh block of `width` variables.
    pub fn alloc_block(&mut self, width: usize) -> Result<VarBlock, ParetoError> {
        if self.used + width > self.all.len() {
            return Err(ParetoErrorKind::VarSpaceExhausted {
                needed: width,
                capacity: self.all.len(),
            }
            .into())
        }

        let vars = self.all[self.used..self.used + width].to_vec();
        self.used += width;

        trace!("Allocated variable block of width {} ({} used)", width, self.used);

        Ok(VarBlock { vars })
    }

    #[inline]
    pub fn mk_true(&self) -> Bdd {
        self.vars.mk_true()
    }

    #[inline]
    pub fn mk_false(&self) -> Bdd {
        self.vars.mk_false()
    }

    #[inline]
    pub fn literal(&self, var: BddVariable, value: bool) -> Bdd {
        self.vars.mk_literal(var, value)
    }

    /// The minterm of `block` encoding `index` in binary, least
    /// significant bit first.
    pub fn encode(&self, block: &VarBlock, index: usize) -> Bdd {
        let mut minterm = self.mk_true();

        for (bit, &var) in block.vars().iter().enumerate() {
            minterm = minterm.and(&self.literal(var, index >> bit & 1 == 1));
        }

        minterm
    }

    /// The relation holding where blocks `a` and `b` carry equal bit
    /// patterns.
    pub fn vars_equal(&self, a: &VarBlock, b: &VarBlock) -> Bdd {
        debug_assert_eq!(a.len(), b.len(), "Unequal block widths");

        let mut eq = self.mk_true();

        for (&va, &vb) in a.vars().iter().zip(b.vars()) {
            eq = eq.and(&self.vars.mk_var(va).iff(&self.vars.mk_var(vb)));
        }

        eq
    }

    /// Maps the support of `bdd` from block `from` onto block `to`:
    /// conjoins block equality and projects the old block away.
    ///
    /// `to` must not occur in the support of `bdd`.
    pub fn rename(&self, bdd: &Bdd, from: &VarBlock, to: &VarBlock) -> Bdd {
        if from == to {
            return bdd.clone()
        }

        bdd.and(&self.vars_equal(from, to)).exists(from.vars())
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordering strategy for combining many relations by pairwise
/// conjunction.
///
/// Smallest-first is faster but needs more memory; largest-first
/// trades speed for a smaller peak; the randomized variants break
/// node-count ties randomly.  A performance knob, not a correctness
/// concern.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AndOrder {
    SmallestFirst,
    LargestFirst,
    SmallestFirstRandom,
    LargestFirstRandom,
}

impl Default for AndOrder {
    fn default() -> Self {
        AndOrder::SmallestFirst
    }
}

struct AndEntry {
    key: i64,
    tie: u32,
    bdd: Bdd,
}

impl PartialEq for AndEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.tie == other.tie
    }
}

impl Eq for AndEntry {}

impl PartialOrd for AndEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AndEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then(self.tie.cmp(&other.tie))
    }
}

impl AndOrder {
    fn entry(self, bdd: Bdd) -> AndEntry {
        let nodes = bdd.size() as i64;

        let (key, tie) = match self {
            // max-heap: negated node count pops the smallest relation
            AndOrder::SmallestFirst => (-nodes, 0),
            AndOrder::LargestFirst => (nodes, 0),
            AndOrder::SmallestFirstRandom => (-nodes, rand::random()),
            AndOrder::LargestFirstRandom => (nodes, rand::random()),
        };

        AndEntry { key, tie, bdd }
    }
}

/// Conjoins all given relations pairwise in the order dictated by the
/// strategy.
pub fn and_all(space: &Space, bdds: Vec<Bdd>, order: AndOrder) -> Bdd {
    let mut queue: BinaryHeap<AndEntry> =
        bdds.into_iter().map(|bdd| order.entry(bdd)).collect();

    while queue.len() > 1 {
        trace!("{} relations remaining to conjoin", queue.len());

        let a = queue.pop().expect("Attempt to pop an empty conjunction queue");
        let b = queue.pop().expect("Attempt to pop an empty conjunction queue");

        queue.push(order.entry(a.bdd.and(&b.bdd)));
    }

    match queue.pop() {
        Some(entry) => entry.bdd,
        None => space.mk_true(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_disjoint() {
        let mut space = Space::with_capacity(8);
        let a = space.alloc_block(3).unwrap();
        let b = space.alloc_block(3).unwrap();

        assert!(a.vars().iter().all(|v| !b.vars().contains(v)));
        assert_eq!(space.used(), 6);
    }

    #[test]
    fn test_alloc_past_capacity() {
        let mut space = Space::with_capacity(4);
        space.alloc_block(3).unwrap();

        let err = space.alloc_block(2).unwrap_err();
        match err.kind() {
            ParetoErrorKind::VarSpaceExhausted { needed: 2, capacity: 4 } => {}
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn test_encode_distinguishes_indices() {
        let mut space = Space::with_capacity(8);
        let block = space.alloc_block(3).unwrap();

        for i in 0..8 {
            for j in 0..8 {
                let meet = space.encode(&block, i).and(&space.encode(&block, j));
                assert_eq!(meet.is_false(), i != j);
            }
        }
    }

    #[test]
    fn test_vars_equal() {
        let mut space = Space::with_capacity(8);
        let a = space.alloc_block(2).unwrap();
        let b = space.alloc_block(2).unwrap();
        let eq = space.vars_equal(&a, &b);

        for i in 0..4 {
            for j in 0..4 {
                let meet = eq.and(&space.encode(&a, i)).and(&space.encode(&b, j));
                assert_eq!(meet.is_false(), i != j);
            }
        }
    }

    #[test]
    fn test_rename_moves_support() {
        let mut space = Space::with_capacity(8);
        let a = space.alloc_block(2).unwrap();
        let b = space.alloc_block(2).unwrap();

        let on_a = space.encode(&a, 2);
        let on_b = space.rename(&on_a, &a, &b);

        assert!(!on_b.and(&space.encode(&b, 2)).is_false());
        assert!(on_b.and(&space.encode(&b, 1)).is_false());
        // the old block is projected away
        assert!(!on_b.and(&space.encode(&a, 1)).is_false());
    }

    #[test]
    fn test_and_all_matches_naive_conjunction() {
        let mut space = Space::with_capacity(8);
        let block = space.alloc_block(3).unwrap();

        // "index is even" and "index < 4" and "index > 0"
        let even: Bdd = [0usize, 2, 4, 6]
            .iter()
            .fold(space.mk_false(), |acc, &i| acc.or(&space.encode(&block, i)));
        let small: Bdd = (0usize..4)
            .fold(space.mk_false(), |acc, i| acc.or(&space.encode(&block, i)));
        let positive: Bdd = (1usize..8)
            .fold(space.mk_false(), |acc, i| acc.or(&space.encode(&block, i)));

        let naive = even.and(&small).and(&positive);

        for &order in &[
            AndOrder::SmallestFirst,
            AndOrder::LargestFirst,
            AndOrder::SmallestFirstRandom,
            AndOrder::LargestFirstRandom,
        ] {
            let combined = and_all(
                &space,
                vec![even.clone(), small.clone(), positive.clone()],
                order,
            );
            assert_eq!(combined, naive);
        }
    }

    #[test]
    fn test_and_all_of_nothing_is_true() {
        let space = Space::with_capacity(4);
        assert!(and_all(&space, Vec::new(), AndOrder::SmallestFirst).is_true());
    }
}
