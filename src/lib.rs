//! Pareto algebra over configuration sets &mdash; a calculator for
//! multi-objective design-space exploration.  In an attempt to clarify
//! some of the obscure parts of the implementation, several
//! definitions are collected below.
//!
//! # Configurations and quantities
//!
//! A _quantity_ is one objective of a design problem: a finite set of
//! possible values with a domination order.  Ordered quantities here
//! are smaller-is-better; unordered quantities admit no preference
//! between distinct values.  A _configuration_ is one candidate
//! design, scored as a fixed-width tuple of quantity values.
//!
//! A configuration _dominates_ another iff it is at least as good in
//! every quantity.  Dominance is a preorder, not a total order: two
//! configurations may well be incomparable.  A set with no two
//! mutually dominating members is an _antichain_; the Pareto-minimal
//! subset of a configuration set is the antichain of its undominated
//! members, and every culled member is dominated by a surviving one.
//!
//! Configuration sets carry a _visibility mask_: the subset of
//! quantity columns which take part in dominance comparisons.  Hiding
//! a column is a comparison-time projection &mdash; the data is kept,
//! the structure ignores it.
//!
//! # The algebra
//!
//! A [`Calculator`] owns the configuration sets it creates and
//! provides the operations of the algebra over them: minimisation,
//! free product, abstraction, constraint, union, derived quantities,
//! and the compound producer-consumer and join compositions.  Two
//! interchangeable backends implement the same surface:
//!
//! * [`ExplCalculator`] enumerates tuples in ordered containers and
//!   runs the explicit algorithms (Simple Cull and Divide & Conquer
//!   minimisation, sorted-index joins, the two-pointer
//!   producer-consumer sweep);
//!
//! * [`SymCalculator`] encodes each set as a relation over finite
//!   quantity domains &mdash; a Boolean function of binary-encoded
//!   value indices &mdash; and computes the same operations on the
//!   relation level, including a closed-form symbolic minimisation.
//!   Sets convert to the symbolic form lazily, on first use by a
//!   symbolic operation, and materialize back on demand.
//!
//! The symbolic backend consumes an external BDD engine through its
//! Boolean algebra only; node storage, hash-consing and reclamation
//! stay inside the engine.

#[macro_use]
extern crate log;

mod error;
mod value;
mod conf;
mod confset;
mod calculator;
pub mod bdd;
mod quantity;
mod relation;
mod sym;
mod logging;

pub use error::{ParetoError, ParetoErrorKind};
pub use value::{ConfKind, ConfSig, Sig, SymValue, Value};
pub use conf::Conf;
pub use confset::{ExplConfset, ExplIndex, ProdGen, EMPTY_CONFSET_STR};
pub use calculator::{Calculator, CsId, ExplCalculator, MinAlgo};
pub use bdd::{and_all, AndOrder, Space, VarBlock, DEFAULT_SPACE_CAPACITY};
pub use quantity::{dominance_leq, rel_add, Quantity};
pub use relation::Relation;
pub use sym::{SymCalculator, SymConfset};
pub use logging::Logger;

use std::num::NonZeroUsize;

/// A generic one-based serial identifier.
///
/// Used as the common internal type backing the conversion between
/// vector indices and specific identifiers, such as [`CsId`].
pub(crate) type AnyId = NonZeroUsize;
