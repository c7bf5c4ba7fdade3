use std::{fmt, error::Error};
use crate::CsId;

/// The specific reason of a [`ParetoError`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParetoErrorKind {
    /// Appending or combining configurations of incompatible kind.
    ///
    /// Raised before the receiver is mutated.
    SignatureMismatch(String),
    /// Direct tuple insertion into a converted symbolic set.
    ConvertedSetAppend,
    /// A quantity index outside the width of the configuration set.
    ColumnOutOfRange { col: usize, width: usize },
    /// An operation which is ill-defined on a zero-cardinality set.
    EmptyConfset(&'static str),
    /// Two symbolic columns combined without a common value domain.
    DomainMismatch(usize),
    /// A value which doesn't occur in the quantity domain it is held
    /// against.
    ValueMissingFromDomain(String),
    /// A configuration set handle unknown to (or disposed by) the
    /// calculator it was passed to.
    ConfsetMissingForId(CsId),
    /// The shared variable space can't fit another domain block.
    VarSpaceExhausted { needed: usize, capacity: usize },
}

impl fmt::Display for ParetoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParetoErrorKind::*;

        match self {
            SignatureMismatch(what) => {
                write!(f, "Non-matching signature of {}", what)
            }
            ConvertedSetAppend => {
                write!(f, "Dynamic addition to a converted symbolic set isn't supported")
            }
            ColumnOutOfRange { col, width } => {
                write!(f, "Quantity index {} is out of range for width {}", col, width)
            }
            EmptyConfset(op) => write!(f, "Empty configuration set in {}", op),
            DomainMismatch(col) => {
                write!(f, "Quantity domains of column {} weren't declared identical", col)
            }
            ValueMissingFromDomain(val) => {
                write!(f, "Value {} is missing from its quantity domain", val)
            }
            ConfsetMissingForId(id) => {
                write!(f, "Configuration set is missing for {:?}", id)
            }
            VarSpaceExhausted { needed, capacity } => write!(
                f,
                "Variable space of capacity {} can't fit another {} variables",
                capacity, needed
            ),
        }
    }
}

/// The error type of all fallible operations of the crate.
///
/// Wraps a [`ParetoErrorKind`]; construct it from a kind with
/// `kind.into()` or [`ParetoError::from`].
#[derive(Clone, Debug)]
pub struct ParetoError {
    kind: ParetoErrorKind,
}

impl ParetoError {
    #[inline]
    pub fn kind(&self) -> &ParetoErrorKind {
        &self.kind
    }
}

impl From<ParetoErrorKind> for ParetoError {
    #[inline]
    fn from(kind: ParetoErrorKind) -> Self {
        ParetoError { kind }
    }
}

impl fmt::Display for ParetoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl Error for ParetoError {}
