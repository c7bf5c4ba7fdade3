use std::{
    collections::{btree_set, BTreeSet},
    fmt,
};
use crate::{Conf, ConfKind, ConfSig, ParetoError, ParetoErrorKind, Value};

/// The fixed rendering of a zero-cardinality configuration set.
pub const EMPTY_CONFSET_STR: &str = "empty confset\n";

/// An explicit, enumerated set of same-signature configurations.
///
/// Configurations are stored in their canonical total order.  The
/// first added configuration fixes the width and signature of the set
/// for its whole life (until [`ExplConfset::clear`]).  The visibility
/// mask selects which columns take part in dominance comparisons;
/// hiding a column keeps its data and ignores it structurally.
///
/// Instances are owned by the calculator which created them and are
/// disposed of through it.
#[derive(Clone, Default, Debug)]
pub struct ExplConfset {
    pub(crate) confs: BTreeSet<Conf>,
    pub(crate) sig: Option<ConfSig>,
    pub(crate) width: usize,
    pub(crate) visible: BTreeSet<usize>,
}

impl ExplConfset {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds configuration `c`, taking ownership of it.
    ///
    /// Adding to an empty set fixes the signature; any further
    /// configuration has to match it exactly, and is rejected before
    /// the set is mutated otherwise.
    pub fn add(&mut self, c: Conf) -> Result<(), ParetoError> {
        match self.sig {
            None => {
                self.width = c.len();
                self.visible = (0..self.width).collect();
                self.sig = Some(c.sig());
                self.confs.insert(c);
                Ok(())
            }
            Some(ref sig) => {
                if *sig == c.sig() {
                    self.confs.insert(c);
                    Ok(())
                } else {
                    Err(ParetoErrorKind::SignatureMismatch(format!(
                        "conf {}; didn't add it",
                        c
                    ))
                    .into())
                }
            }
        }
    }

    /// Adds configuration `c` to a minimal set, keeping it minimal.
    ///
    /// Either `c` enters the set, or it is dominated by a member and
    /// dropped; members dominated by `c` are evicted.  Only meaningful
    /// if the set is minimal already.
    pub fn add_and_min(&mut self, c: Conf) -> Result<(), ParetoError> {
        if let Some(ref sig) = self.sig {
            if *sig != c.sig() {
                return Err(ParetoErrorKind::SignatureMismatch(format!(
                    "conf {}; didn't add it",
                    c
                ))
                .into())
            }

            for a in self.confs.iter() {
                if a.dominates_masked(&c, &self.visible) {
                    return Ok(())
                }
            }

            let evicted: Vec<_> = self
                .confs
                .iter()
                .filter(|a| c.dominates_masked(a, &self.visible))
                .cloned()
                .collect();

            for a in evicted {
                self.confs.remove(&a);
            }
        }

        self.add(c)
    }

    /// Removes configuration `c`.  Returns whether it was present.
    pub fn remove(&mut self, c: &Conf) -> bool {
        self.confs.remove(c)
    }

    /// Ignores quantity `k` in dominance comparisons.
    pub fn hide(&mut self, k: usize) -> Result<(), ParetoError> {
        if k < self.width {
            self.visible.remove(&k);
            Ok(())
        } else {
            Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: self.width }.into())
        }
    }

    /// Ignores quantities in the range `[k, l)` in dominance
    /// comparisons.
    pub fn hide_range(&mut self, k: usize, l: usize) -> Result<(), ParetoError> {
        for i in k..l.min(self.width) {
            self.visible.remove(&i);
        }
        Ok(())
    }

    /// Makes quantity `k` take part in dominance comparisons again.
    pub fn unhide(&mut self, k: usize) -> Result<(), ParetoError> {
        if k < self.width {
            self.visible.insert(k);
            Ok(())
        } else {
            Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: self.width }.into())
        }
    }

    /// Makes quantities in the range `[k, l)` take part in dominance
    /// comparisons again.
    pub fn unhide_range(&mut self, k: usize, l: usize) -> Result<(), ParetoError> {
        for i in k..l.min(self.width) {
            self.visible.insert(i);
        }
        Ok(())
    }

    /// A single-pass iterator over the configurations in the set, in
    /// canonical order.  The configurations stay owned by the set.
    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, Conf> {
        self.confs.iter()
    }

    /// The number of configurations in the set.
    #[inline]
    pub fn size(&self) -> usize {
        self.confs.len()
    }

    /// The width (number of quantities) of the configurations.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn sig(&self) -> Option<&ConfSig> {
        self.sig.as_ref()
    }

    #[inline]
    pub fn visible(&self) -> &BTreeSet<usize> {
        &self.visible
    }

    /// Removes all configurations and resets the signature.
    pub fn clear(&mut self) {
        self.confs.clear();
        self.sig = None;
        self.width = 0;
        self.visible.clear();
    }

    /// The distinct values observed in column `k`, in canonical order.
    pub(crate) fn column_values(&self, k: usize) -> Vec<Value> {
        let mut values: Vec<Value> = Vec::new();

        for c in self.confs.iter() {
            if let Some(v) = c.get(k) {
                let pos = values.binary_search_by(|p| p.total_cmp(&v));
                if let Err(pos) = pos {
                    values.insert(pos, v);
                }
            }
        }

        values
    }
}

impl fmt::Display for ExplConfset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.confs.is_empty() {
            write!(f, "{}", EMPTY_CONFSET_STR)
        } else {
            for c in self.confs.iter() {
                writeln!(f, "{}", c)?;
            }
            Ok(())
        }
    }
}

/// A sorted index on one column of an [`ExplConfset`].
///
/// Entries are references into the set, ordered by the column's own
/// canonical order: best-to-worst by default (ascending, since ordered
/// quantities are smaller-is-better), worst-to-best when reversed.
pub struct ExplIndex<'a> {
    ind: Vec<&'a Conf>,
    col: usize,
}

impl<'a> ExplIndex<'a> {
    /// Builds a best-first index on column `col`.
    pub fn new(set: &'a ExplConfset, col: usize) -> Result<Self, ParetoError> {
        Self::with_direction(set, col, true)
    }

    /// Builds an index on column `col`, best-first or reversed.
    pub fn with_direction(
        set: &'a ExplConfset,
        col: usize,
        best_first: bool,
    ) -> Result<Self, ParetoError> {
        if col >= set.width() && set.size() > 0 {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col, width: set.width() }.into()
            )
        }

        let mut ind: Vec<&'a Conf> = set.iter().collect();

        ind.sort_by(|c, d| {
            let ord = c
                .get(col)
                .expect("Attempt to index past the width of a configuration")
                .total_cmp(
                    &d.get(col)
                        .expect("Attempt to index past the width of a configuration"),
                );

            if best_first {
                ord
            } else {
                ord.reverse()
            }
        });

        Ok(ExplIndex { ind, col })
    }

    #[inline]
    pub fn get(&self, i: usize) -> &'a Conf {
        self.ind[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ind.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ind.is_empty()
    }

    #[inline]
    pub(crate) fn col_value(&self, i: usize) -> Value {
        self.ind[i]
            .get(self.col)
            .expect("Attempt to index past the width of a configuration")
    }

    /// The contiguous range `[low, high)` of entries whose column
    /// value is mutually related to `v` by domination: entries below
    /// `low` aren't dominated by `v`, entries from `high` on dominate
    /// `v` no more.
    ///
    /// Requires the column's canonical order to agree with its
    /// dominance order, which holds for the ordered numeric kinds.
    pub fn get_range(&self, v: &Value) -> (usize, usize) {
        let mut i = 0;

        while i < self.ind.len() && !v.dominates(&self.col_value(i)) {
            i += 1;
        }

        let low = i;

        while i < self.ind.len() && self.col_value(i).dominates(v) {
            i += 1;
        }

        (low, i)
    }
}

/// A lazy generator of the cross product of configuration sets.
///
/// Yields owned concatenated configurations one by one, without
/// materializing the product.  Single-pass: once exhausted it can't be
/// restarted; dropping it early releases its sub-iterators and leaves
/// the source sets unmodified.
pub struct ProdGen<'a> {
    sets: Vec<&'a ExplConfset>,
    iters: Vec<btree_set::Iter<'a, Conf>>,
    current: Vec<&'a Conf>,
    stop: bool,
}

impl<'a> ProdGen<'a> {
    pub fn new(sets: Vec<&'a ExplConfset>) -> Result<Self, ParetoError> {
        if let Some((first, rest)) = sets.split_first() {
            if let Some(sig) = first.sig() {
                if sig.kind() == ConfKind::Real {
                    for set in rest {
                        match set.sig() {
                            Some(s) if s.kind() == ConfKind::Real => {}
                            Some(_) => {
                                return Err(ParetoErrorKind::SignatureMismatch(
                                    "a generic factor of a packed product".to_owned(),
                                )
                                .into())
                            }
                            None => {}
                        }
                    }
                }
            }
        }

        let stop = sets.is_empty() || sets.iter().any(|set| set.size() == 0);
        let mut iters = Vec::new();
        let mut current = Vec::new();

        if !stop {
            for set in sets.iter() {
                let mut iter = set.iter();
                current.push(iter.next().expect("Attempt to iterate an empty factor"));
                iters.push(iter);
            }
        }

        Ok(ProdGen { sets, iters, current, stop })
    }

    pub fn from_pair(c: &'a ExplConfset, d: &'a ExplConfset) -> Result<Self, ParetoError> {
        Self::new(vec![c, d])
    }

    fn advance(&mut self) {
        let mut i = self.sets.len() - 1;

        loop {
            if let Some(c) = self.iters[i].next() {
                self.current[i] = c;
                return
            }

            if i == 0 {
                self.stop = true;
                return
            }

            let mut iter = self.sets[i].iter();
            self.current[i] =
                iter.next().expect("Attempt to iterate an empty factor");
            self.iters[i] = iter;
            i -= 1;
        }
    }
}

impl<'a> Iterator for ProdGen<'a> {
    type Item = Conf;

    fn next(&mut self) -> Option<Conf> {
        if self.stop {
            return None
        }

        let mut conf = self.current[0].clone();

        for c in &self.current[1..] {
            conf.append((*c).clone())
                .expect("Product factors were kind-checked on construction");
        }

        self.advance();

        Some(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(rows: &[&[f64]]) -> ExplConfset {
        let mut set = ExplConfset::new();

        for row in rows {
            set.add(Conf::from_reals(row.iter().copied())).unwrap();
        }

        set
    }

    #[test]
    fn test_first_add_fixes_signature() {
        let mut set = set_of(&[&[1.0, 2.0]]);

        assert_eq!(set.width(), 2);
        assert_eq!(set.visible().len(), 2);

        let err = set.add(Conf::from_reals(vec![1.0])).unwrap_err();
        match err.kind() {
            ParetoErrorKind::SignatureMismatch(_) => {}
            other => panic!("unexpected error kind {:?}", other),
        }
        assert_eq!(set.size(), 1);
    }

    #[test]
    fn test_add_and_min_keeps_antichain() {
        let mut set = set_of(&[&[1.0, 3.0], &[2.0, 2.0]]);

        // dominated by (2, 2): dropped
        set.add_and_min(Conf::from_reals(vec![3.0, 3.0])).unwrap();
        assert_eq!(set.size(), 2);

        // dominates (2, 2): evicts it
        set.add_and_min(Conf::from_reals(vec![2.0, 1.0])).unwrap();
        assert_eq!(set.size(), 2);
        assert!(!set.iter().any(|c| c.equals(&Conf::from_reals(vec![2.0, 2.0]))));
    }

    #[test]
    fn test_hide_out_of_range() {
        let mut set = set_of(&[&[1.0, 2.0]]);

        assert!(set.hide(1).is_ok());
        let err = set.hide(2).unwrap_err();
        match err.kind() {
            ParetoErrorKind::ColumnOutOfRange { col: 2, width: 2 } => {}
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn test_render() {
        let set = ExplConfset::new();
        assert_eq!(set.to_string(), EMPTY_CONFSET_STR);

        let set = set_of(&[&[1.0, 2.0]]);
        assert_eq!(set.to_string(), "(1.000, 2.000)\n");
    }

    #[test]
    fn test_index_range() {
        // the duplicate collapses in the ordered set
        let set = set_of(&[&[3.0], &[1.0], &[2.0], &[2.0]]);
        let index = ExplIndex::new(&set, 0).unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.col_value(0).equals(&Value::Real(1.0)));

        let (low, high) = index.get_range(&Value::Real(2.0));
        assert_eq!((low, high), (1, 2));

        let (low, high) = index.get_range(&Value::Real(0.5));
        assert_eq!((low, high), (0, 0));
    }

    #[test]
    fn test_prodgen_yields_whole_product() {
        let c = set_of(&[&[1.0], &[2.0]]);
        let d = set_of(&[&[0.1], &[0.2], &[0.3]]);

        let all: Vec<_> = ProdGen::from_pair(&c, &d).unwrap().collect();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|conf| conf.len() == 2));
        assert!(all.contains(&Conf::from_reals(vec![2.0, 0.3])));
    }

    #[test]
    fn test_prodgen_empty_factor() {
        let c = set_of(&[&[1.0]]);
        let d = ExplConfset::new();

        let mut gen = ProdGen::from_pair(&c, &d).unwrap();
        assert!(gen.next().is_none());
    }
}
