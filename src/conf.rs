use std::{cmp::Ordering, collections::BTreeSet, fmt};
use crate::{ConfKind, ConfSig, ParetoError, ParetoErrorKind, Sig, Value};

/// A configuration: one candidate design, scored as a fixed-width
/// ordered tuple of quantity values.
///
/// Comes in two layouts: the generic heterogeneous tuple, and a packed
/// specialization for configurations of only real values.  The packed
/// form must not be mixed with the generic form within one set or
/// operation; this is guarded by signature checks.
///
/// Appending a value or another configuration transfers ownership to
/// the receiver (the argument is moved).
#[derive(Clone, Debug)]
pub enum Conf {
    Gen(Vec<Value>),
    Real(Vec<f64>),
}

impl Conf {
    /// Creates an empty generic configuration.
    pub fn new_gen() -> Self {
        Conf::Gen(Vec::new())
    }

    /// Creates an empty packed all-real configuration.
    pub fn new_real() -> Self {
        Conf::Real(Vec::new())
    }

    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Conf::Gen(values.into_iter().collect())
    }

    pub fn from_reals<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Conf::Real(values.into_iter().collect())
    }

    /// The signature of this configuration and its space.
    pub fn sig(&self) -> ConfSig {
        match self {
            Conf::Gen(values) => ConfSig {
                kind: ConfKind::Gen,
                cols: values.iter().map(Value::sig).collect(),
            },
            Conf::Real(values) => {
                ConfSig { kind: ConfKind::Real, cols: vec![Sig::Real; values.len()] }
            }
        }
    }

    /// Appends value `v`, taking ownership of it.
    ///
    /// A packed configuration accepts ordered real values only; any
    /// other kind is rejected before the receiver is mutated.
    pub fn append_value(&mut self, v: Value) -> Result<(), ParetoError> {
        match self {
            Conf::Gen(values) => {
                values.push(v);
                Ok(())
            }
            Conf::Real(values) => match v {
                Value::Real(x) => {
                    values.push(x);
                    Ok(())
                }
                other => Err(ParetoErrorKind::SignatureMismatch(format!(
                    "value {}; only an ordered real fits a packed configuration",
                    other
                ))
                .into()),
            },
        }
    }

    /// Appends a raw real value to a packed configuration.
    pub fn push_real(&mut self, x: f64) -> Result<(), ParetoError> {
        match self {
            Conf::Real(values) => {
                values.push(x);
                Ok(())
            }
            Conf::Gen(_) => self.append_value(Value::Real(x)),
        }
    }

    /// Concatenates configuration `c`, taking ownership of it.
    pub fn append(&mut self, c: Conf) -> Result<(), ParetoError> {
        match (&mut *self, c) {
            (Conf::Real(values), Conf::Real(more)) => {
                values.extend(more);
                Ok(())
            }
            (Conf::Real(_), c @ Conf::Gen(_)) => Err(ParetoErrorKind::SignatureMismatch(
                format!("conf {}; only a packed configuration extends a packed one", c),
            )
            .into()),
            (Conf::Gen(values), Conf::Gen(more)) => {
                values.extend(more);
                Ok(())
            }
            (Conf::Gen(values), Conf::Real(more)) => {
                values.extend(more.into_iter().map(Value::Real));
                Ok(())
            }
        }
    }

    /// The value of quantity `k`.
    pub fn get(&self, k: usize) -> Option<Value> {
        match self {
            Conf::Gen(values) => values.get(k).cloned(),
            Conf::Real(values) => values.get(k).copied().map(Value::Real),
        }
    }

    /// The number of quantities.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Conf::Gen(values) => values.len(),
            Conf::Real(values) => values.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether this configuration and `c` are equal in all
    /// quantities.
    pub fn equals(&self, c: &Conf) -> bool {
        if self.len() != c.len() {
            return false
        }

        match (self, c) {
            (Conf::Real(a), Conf::Real(b)) => a.iter().zip(b).all(|(x, y)| x == y),
            _ => (0..self.len()).all(|i| match (self.get(i), c.get(i)) {
                (Some(x), Some(y)) => x.equals(&y),
                _ => false,
            }),
        }
    }

    /// Checks whether this configuration and `c` are equal in the
    /// given visible quantities.
    pub fn equals_masked(&self, c: &Conf, visible: &BTreeSet<usize>) -> bool {
        visible.iter().filter(|&&i| i < self.len()).all(|&i| {
            match (self.get(i), c.get(i)) {
                (Some(x), Some(y)) => x.equals(&y),
                _ => false,
            }
        })
    }

    /// Checks whether this configuration dominates `c`: whether it is
    /// at least as good in every quantity.
    pub fn dominates(&self, c: &Conf) -> bool {
        if self.len() != c.len() {
            return false
        }

        match (self, c) {
            (Conf::Real(a), Conf::Real(b)) => a.iter().zip(b).all(|(x, y)| x <= y),
            _ => (0..self.len()).all(|i| match (self.get(i), c.get(i)) {
                (Some(x), Some(y)) => x.dominates(&y),
                _ => false,
            }),
        }
    }

    /// Checks whether this configuration dominates `c` in the given
    /// visible quantities.
    pub fn dominates_masked(&self, c: &Conf, visible: &BTreeSet<usize>) -> bool {
        match (self, c) {
            (Conf::Real(a), Conf::Real(b)) => visible
                .iter()
                .filter(|&&i| i < a.len())
                .all(|&i| i < b.len() && a[i] <= b[i]),
            _ => visible.iter().filter(|&&i| i < self.len()).all(|&i| {
                match (self.get(i), c.get(i)) {
                    (Some(x), Some(y)) => x.dominates(&y),
                    _ => false,
                }
            }),
        }
    }

    /// Removes quantity `k`.  Out-of-range indices are rejected by the
    /// calculator before configurations are touched.
    pub fn abstract_quant(&mut self, k: usize) {
        match self {
            Conf::Gen(values) => {
                if k < values.len() {
                    values.remove(k);
                }
            }
            Conf::Real(values) => {
                if k < values.len() {
                    values.remove(k);
                }
            }
        }
    }

    /// Removes quantities in the range `[k, l)`.
    pub fn abstract_range(&mut self, k: usize, l: usize) {
        let l = l.min(self.len());

        if k >= l {
            return
        }

        match self {
            Conf::Gen(values) => {
                values.drain(k..l);
            }
            Conf::Real(values) => {
                values.drain(k..l);
            }
        }
    }

    /// Compares with configuration `c` in an artificial total order,
    /// lexicographic over the per-value canonical order.
    ///
    /// This is the storage order of configuration sets; it is distinct
    /// from the dominance preorder and only consistent with it for
    /// tie-breaking.
    pub fn total_cmp(&self, c: &Conf) -> Ordering {
        let common = self.len().min(c.len());

        for i in 0..common {
            let ord = match (self, c) {
                (Conf::Real(a), Conf::Real(b)) => a[i].total_cmp(&b[i]),
                _ => match (self.get(i), c.get(i)) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => Ordering::Equal,
                },
            };

            if ord != Ordering::Equal {
                return ord
            }
        }

        self.len().cmp(&c.len()).then_with(|| self.kind_rank().cmp(&c.kind_rank()))
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Conf::Real(_) => 0,
            Conf::Gen(_) => 1,
        }
    }
}

impl PartialEq for Conf {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Conf {}

impl PartialOrd for Conf {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl Ord for Conf {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl fmt::Display for Conf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;

        for i in 0..self.len() {
            if i > 0 {
                write!(f, ", ")?;
            }

            match self {
                Conf::Real(values) => write!(f, "{:.3}", values[i])?,
                Conf::Gen(values) => write!(f, "{}", values[i])?,
            }
        }

        write!(f, ")")
    }
}
