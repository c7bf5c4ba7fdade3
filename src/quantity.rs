use std::fmt;
use crate::{
    bdd::{Bdd, Space, VarBlock},
    ParetoError, ParetoErrorKind,
};

/// A quantity domain: a finite set of real values, enumerated in
/// ascending order, bound to a contiguous block of Boolean variables
/// in the shared space.
///
/// For ordered quantities the index order equals the value order;
/// symbolic dominance is computed lexicographically over indices and
/// relies on this.  Domains are shared structurally (`Rc`), never
/// deep-copied per relation.
#[derive(Clone, Debug)]
pub struct Quantity {
    values: Vec<f64>,
    ordered: bool,
    block: VarBlock,
}

impl Quantity {
    /// Builds a domain over the given values (deduplicated and sorted
    /// ascending), bound to a fresh variable block.
    pub fn new(
        space: &mut Space,
        mut values: Vec<f64>,
        ordered: bool,
    ) -> Result<Self, ParetoError> {
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup_by(|a, b| a == b);

        if values.is_empty() {
            return Err(ParetoErrorKind::EmptyConfset("a quantity domain").into())
        }

        let block = space.alloc_block(bits_for(values.len()))?;

        Ok(Quantity { values, ordered, block })
    }

    /// The same domain re-bound to another block of equal width.
    pub(crate) fn with_block(&self, block: VarBlock) -> Self {
        debug_assert_eq!(block.len(), self.block.len(), "Unequal block widths");

        Quantity { values: self.values.clone(), ordered: self.ordered, block }
    }

    /// The number of values in the domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        self.values.as_slice()
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    #[inline]
    pub fn block(&self) -> &VarBlock {
        &self.block
    }

    #[inline]
    pub fn block_width(&self) -> usize {
        self.block.len()
    }

    /// The index of `v` in the ascending enumeration.
    pub fn index_of(&self, v: f64) -> Option<usize> {
        self.values.binary_search_by(|p| p.total_cmp(&v)).ok()
    }

    /// The real value at `index`.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// The minterm of this domain's block encoding `index`.
    #[inline]
    pub fn encode(&self, space: &Space, index: usize) -> Bdd {
        debug_assert!(index < self.values.len(), "Index past the domain");
        space.encode(&self.block, index)
    }

    /// Checks whether both domains enumerate the same values with the
    /// same order kind (they may be bound to different blocks).
    pub fn same_values(&self, other: &Quantity) -> bool {
        self.ordered == other.ordered
            && self.values.len() == other.values.len()
            && self.values.iter().zip(&other.values).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;

        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v)?;
        }

        write!(f, "}}")
    }
}

/// The number of Boolean variables encoding a domain of `n` values.
pub(crate) fn bits_for(n: usize) -> usize {
    let mut bits = 1;

    while (1usize << bits) < n {
        bits += 1;
    }

    bits
}

/// The dominance relation between two equal-shaped blocks carrying the
/// same quantity: holds where `a`'s index is at most `b`'s (`a` is at
/// least as good, indices ascending with values, smaller-is-better).
///
/// Built most-significant-bit first: a disjunction, over each bit
/// position, of "all higher bits equal and `a`'s bit is 0 while `b`'s
/// is 1", plus the all-equal case unless `strict`.  For unordered
/// quantities dominance degenerates to bitwise equality (the empty
/// relation when `strict`).
pub fn dominance_leq(
    space: &Space,
    ordered: bool,
    a: &VarBlock,
    b: &VarBlock,
    strict: bool,
) -> Bdd {
    debug_assert_eq!(a.len(), b.len(), "Unequal block widths");

    if !ordered {
        return if strict { space.mk_false() } else { space.vars_equal(a, b) }
    }

    let width = a.len();
    let mut below = space.mk_false();

    for i in (0..width).rev() {
        let mut first_diff = space.mk_true();

        for j in i + 1..width {
            let eq_j = space
                .literal(a.vars()[j], true)
                .iff(&space.literal(b.vars()[j], true));
            first_diff = first_diff.and(&eq_j);
        }

        first_diff = first_diff
            .and(&space.literal(a.vars()[i], false))
            .and(&space.literal(b.vars()[i], true));

        below = below.or(&first_diff);
    }

    if strict {
        below
    } else {
        below.or(&space.vars_equal(a, b))
    }
}

/// The 3-ary addition relation `a + b = s` over binary encodings.
///
/// A ripple-carry construction: bit positions are processed least
/// significant first, a carry sub-formula is combined functionally
/// across positions, and the per-bit sum conditions are conjoined.
/// This yields a relation usable inside further conjunctions and
/// projections, not a computed function.
///
/// A carry out of the sum block's top bit would mean an
/// unrepresentable sum; such combinations are excluded from the
/// relation.
pub fn rel_add(space: &Space, a: &VarBlock, b: &VarBlock, s: &VarBlock) -> Bdd {
    assert!(
        s.len() >= a.len().max(b.len()),
        "Sum block narrower than an addend block"
    );

    let mut carry = space.mk_false();
    let mut rel = space.mk_true();

    for i in 0..s.len() {
        let a_i = if i < a.len() {
            space.literal(a.vars()[i], true)
        } else {
            space.mk_false()
        };
        let b_i = if i < b.len() {
            space.literal(b.vars()[i], true)
        } else {
            space.mk_false()
        };

        let a_xor_b = a_i.xor(&b_i);
        let sum_i = a_xor_b.xor(&carry);
        let s_i = space.literal(s.vars()[i], true);

        rel = rel.and(&sum_i.iff(&s_i));

        carry = a_i.and(&b_i).or(&a_xor_b.and(&carry));
    }

    rel.and(&carry.not())
}
