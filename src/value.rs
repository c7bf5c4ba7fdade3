use std::{cmp::Ordering, fmt, rc::Rc};
use crate::{ParetoError, ParetoErrorKind, Quantity};

/// The kind of a single quantity value.
///
/// Ordered kinds are smaller-is-better; unordered kinds take part in
/// dominance comparisons by equality only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sig {
    Real,
    UnorderedReal,
    Int,
    UnorderedInt,
}

/// The tuple layout of a configuration: the generic heterogeneous
/// form, or the packed all-real specialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConfKind {
    Gen,
    Real,
}

/// The signature of a configuration and of the space it lives in.
///
/// Two configurations (or configuration sets) may only be combined if
/// their signatures are equal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConfSig {
    pub(crate) kind: ConfKind,
    pub(crate) cols: Vec<Sig>,
}

impl ConfSig {
    #[inline]
    pub fn kind(&self) -> ConfKind {
        self.kind
    }

    #[inline]
    pub fn cols(&self) -> &[Sig] {
        self.cols.as_slice()
    }

    pub(crate) fn remove_col(&mut self, k: usize) {
        self.cols.remove(k);
    }

    pub(crate) fn remove_range(&mut self, k: usize, l: usize) {
        self.cols.drain(k..l);
    }
}

/// A value bound to a shared symbolic quantity domain.
///
/// Carries enough information to recover the value's index in the
/// domain's ascending enumeration.
#[derive(Clone, Debug)]
pub struct SymValue {
    val: f64,
    quant: Rc<Quantity>,
}

impl SymValue {
    pub fn new(quant: Rc<Quantity>, val: f64) -> Self {
        SymValue { val, quant }
    }

    #[inline]
    pub fn real(&self) -> f64 {
        self.val
    }

    #[inline]
    pub fn quant(&self) -> &Rc<Quantity> {
        &self.quant
    }

    /// The index of this value in its domain's enumeration.
    pub fn index(&self) -> Result<usize, ParetoError> {
        self.quant.index_of(self.val).ok_or_else(|| {
            ParetoErrorKind::ValueMissingFromDomain(format!("{:.3}", self.val)).into()
        })
    }
}

/// One scored quantity value.
#[derive(Clone, Debug)]
pub enum Value {
    Real(f64),
    UnorderedReal(f64),
    Int(i64),
    UnorderedInt(i64),
    Sym(SymValue),
}

impl Value {
    pub fn sig(&self) -> Sig {
        match self {
            Value::Real(_) | Value::Sym(_) => Sig::Real,
            Value::UnorderedReal(_) => Sig::UnorderedReal,
            Value::Int(_) => Sig::Int,
            Value::UnorderedInt(_) => Sig::UnorderedInt,
        }
    }

    /// Checks whether this value equals `other`.
    pub fn equals(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Real(a), Real(b)) => a == b,
            (UnorderedReal(a), UnorderedReal(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UnorderedInt(a), UnorderedInt(b)) => a == b,
            (Sym(a), Sym(b)) => a.val == b.val,
            _ => false,
        }
    }

    /// Checks whether this value is at least as good as `other`.
    ///
    /// Ordered kinds are smaller-is-better; for unordered kinds this
    /// degenerates to equality.
    pub fn dominates(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Real(a), Real(b)) => a <= b,
            (UnorderedReal(a), UnorderedReal(b)) => a == b,
            (Int(a), Int(b)) => a <= b,
            (UnorderedInt(a), UnorderedInt(b)) => a == b,
            (Sym(a), Sym(b)) => a.val <= b.val,
            _ => false,
        }
    }

    /// Compares with `other` in an artificial total order.
    ///
    /// Used for canonical storage only; this is not a domination test
    /// (unordered kinds are ordered here all the same).
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;

        match (self, other) {
            (Real(a), Real(b)) => a.total_cmp(b),
            (UnorderedReal(a), UnorderedReal(b)) => a.total_cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (UnorderedInt(a), UnorderedInt(b)) => a.cmp(b),
            (Sym(a), Sym(b)) => a.val.total_cmp(&b.val),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// The value as a real number (integers widened).
    pub fn as_f64(&self) -> f64 {
        use Value::*;

        match self {
            Real(a) | UnorderedReal(a) => *a,
            Int(a) | UnorderedInt(a) => *a as f64,
            Sym(a) => a.val,
        }
    }

    fn rank(&self) -> u8 {
        use Value::*;

        match self {
            Real(_) => 0,
            UnorderedReal(_) => 1,
            Int(_) => 2,
            UnorderedInt(_) => 3,
            Sym(_) => 4,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Value::*;

        match self {
            Real(a) | UnorderedReal(a) => write!(f, "{:.3}", a),
            Int(a) | UnorderedInt(a) => write!(f, "{}", a),
            Sym(a) => write!(f, "{:.3}", a.val),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_dominance() {
        let better = Value::Real(1.0);
        let worse = Value::Real(2.0);

        assert!(better.dominates(&worse));
        assert!(!worse.dominates(&better));
        assert!(better.dominates(&better));
    }

    #[test]
    fn test_unordered_dominance_is_equality() {
        let a = Value::UnorderedReal(1.0);
        let b = Value::UnorderedReal(2.0);

        assert!(!a.dominates(&b));
        assert!(!b.dominates(&a));
        assert!(a.dominates(&Value::UnorderedReal(1.0)));
    }

    #[test]
    fn test_total_order_is_not_dominance() {
        let a = Value::UnorderedInt(1);
        let b = Value::UnorderedInt(2);

        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert!(!a.dominates(&b));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Real(0.25).to_string(), "0.250");
        assert_eq!(Value::Int(7).to_string(), "7");
    }

    #[test]
    fn test_kind_mismatch_never_dominates() {
        assert!(!Value::Real(1.0).dominates(&Value::Int(1)));
        assert!(!Value::Real(1.0).equals(&Value::Int(1)));
    }

    #[test]
    fn test_sym_value_recovers_its_index() {
        let mut space = crate::Space::with_capacity(4);
        let quant =
            Rc::new(Quantity::new(&mut space, vec![1.0, 2.0, 4.0], true).unwrap());

        let v = SymValue::new(quant.clone(), 2.0);
        assert_eq!(v.index().unwrap(), 1);

        let better = Value::Sym(SymValue::new(quant.clone(), 1.0));
        assert!(better.dominates(&Value::Sym(v)));

        let stray = SymValue::new(quant, 3.0);
        assert!(stray.index().is_err());
    }
}
