use std::rc::Rc;
use bit_vec::BitVec;
use crate::{
    bdd::{and_all, AndOrder, Bdd, Space},
    calculator::{join_sets, prodcons_sets},
    quantity::{dominance_leq, rel_add, Quantity},
    Conf, ConfKind, ConfSig, ExplConfset, ParetoError, ParetoErrorKind, Sig, Value,
    EMPTY_CONFSET_STR,
};

/// A symbolic relation: a set of index tuples over an ordered tuple of
/// quantity domains, represented as a Boolean function of the domains'
/// variable blocks.
///
/// Domains of one relation occupy pairwise-disjoint variable ranges
/// and are shared structurally; copying a relation never deep-copies a
/// domain, and all node-level resources belong to the external engine.
#[derive(Clone)]
pub struct Relation {
    doms: Vec<Rc<Quantity>>,
    bdd: Bdd,
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("arity", &self.doms.len())
            .field("nodes", &self.bdd.size())
            .finish()
    }
}

impl Relation {
    /// Creates an empty relation over the given domains.
    pub fn new(space: &Space, doms: Vec<Rc<Quantity>>) -> Self {
        Relation { doms, bdd: space.mk_false() }
    }

    /// The number of quantity domains (columns).
    #[inline]
    pub fn arity(&self) -> usize {
        self.doms.len()
    }

    #[inline]
    pub fn doms(&self) -> &[Rc<Quantity>] {
        self.doms.as_slice()
    }

    #[inline]
    pub fn dom(&self, i: usize) -> &Rc<Quantity> {
        &self.doms[i]
    }

    #[inline]
    pub fn bdd(&self) -> &Bdd {
        &self.bdd
    }

    /// Inserts the tuple given as one index per column.
    pub fn insert(&mut self, space: &Space, indices: &[usize]) {
        debug_assert_eq!(indices.len(), self.arity(), "Tuple arity mismatch");

        let mut minterm = space.mk_true();

        for (dom, &index) in self.doms.iter().zip(indices) {
            minterm = minterm.and(&dom.encode(space, index));
        }

        self.bdd = self.bdd.or(&minterm);
    }

    /// Checks whether the tuple given as one index per column is in
    /// the relation.
    pub fn contains(&self, space: &Space, indices: &[usize]) -> bool {
        let mut minterm = self.bdd.clone();

        for (dom, &index) in self.doms.iter().zip(indices) {
            minterm = minterm.and(&dom.encode(space, index));
        }

        !minterm.is_false()
    }

    /// Enumerates all tuples of the relation, one index per column, in
    /// lexicographic index order.
    ///
    /// Descends column by column, restricting the relation to each
    /// candidate index and skipping empty restrictions.
    pub fn enumerate(&self, space: &Space) -> Vec<Vec<usize>> {
        let mut out = Vec::new();

        if self.doms.is_empty() || self.bdd.is_false() {
            return out
        }

        let mut prefix = Vec::with_capacity(self.arity());
        self.descend(space, &self.bdd, 0, &mut prefix, &mut out);

        out
    }

    fn descend(
        &self,
        space: &Space,
        constrained: &Bdd,
        col: usize,
        prefix: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        for index in 0..self.doms[col].len() {
            let next = constrained.and(&self.doms[col].encode(space, index));

            if next.is_false() {
                continue
            }

            prefix.push(index);

            if col + 1 == self.arity() {
                out.push(prefix.clone());
            } else {
                self.descend(space, &next, col + 1, prefix, out);
            }

            prefix.pop();
        }
    }

    /// The number of tuples in the relation.
    pub fn count(&self, space: &Space) -> usize {
        self.enumerate(space).len()
    }

    /// The distinct indices occurring in column `i`.
    pub fn column_indices(&self, space: &Space, i: usize) -> Vec<usize> {
        let mut out = Vec::new();

        for index in 0..self.doms[i].len() {
            if !self.bdd.and(&self.doms[i].encode(space, index)).is_false() {
                out.push(index);
            }
        }

        out
    }

    /// Re-encodes the whole relation onto fresh variable blocks.
    fn refreshed(
        &self,
        space: &mut Space,
    ) -> Result<(Vec<Rc<Quantity>>, Bdd), ParetoError> {
        let mut doms = Vec::with_capacity(self.arity());
        let mut bdd = self.bdd.clone();

        for dom in self.doms.iter() {
            let block = space.alloc_block(dom.block_width())?;
            bdd = space.rename(&bdd, dom.block(), &block);
            doms.push(Rc::new(dom.with_block(block)));
        }

        Ok((doms, bdd))
    }

    /// Re-encodes `other` onto this relation's blocks.
    ///
    /// Requires columnwise identical value domains (declared identical
    /// beforehand, or derived from the same observations).  Routed
    /// through fresh intermediate blocks so that overlapping supports
    /// can't collide.
    fn aligned_bdd(&self, other: &Relation, space: &mut Space) -> Result<Bdd, ParetoError> {
        if self.arity() != other.arity() {
            return Err(ParetoErrorKind::SignatureMismatch(
                "the operands of a symbolic combination".to_owned(),
            )
            .into())
        }

        for (i, (a, b)) in self.doms.iter().zip(&other.doms).enumerate() {
            if !a.same_values(b) {
                return Err(ParetoErrorKind::DomainMismatch(i).into())
            }
        }

        if self
            .doms
            .iter()
            .zip(&other.doms)
            .all(|(a, b)| a.block() == b.block())
        {
            return Ok(other.bdd.clone())
        }

        let (odoms, mut bdd) = other.refreshed(space)?;

        for (fresh, target) in odoms.iter().zip(&self.doms) {
            bdd = space.rename(&bdd, fresh.block(), target.block());
        }

        Ok(bdd)
    }

    /// The free product: every concatenation of a tuple of this
    /// relation with a tuple of `other` (re-encoded onto fresh
    /// blocks, so that self-products are well-formed).
    pub fn product(&self, other: &Relation, space: &mut Space) -> Result<Relation, ParetoError> {
        let (odoms, obdd) = other.refreshed(space)?;

        let mut doms = self.doms.clone();
        doms.extend(odoms);

        Ok(Relation { doms, bdd: self.bdd.and(&obdd) })
    }

    /// The union of two relations over identical domains.
    pub fn unite(&self, other: &Relation, space: &mut Space) -> Result<Relation, ParetoError> {
        let obdd = self.aligned_bdd(other, space)?;

        Ok(Relation { doms: self.doms.clone(), bdd: self.bdd.or(&obdd) })
    }

    /// The intersection of two relations over identical domains.
    pub fn constrain(
        &self,
        other: &Relation,
        space: &mut Space,
    ) -> Result<Relation, ParetoError> {
        let obdd = self.aligned_bdd(other, space)?;

        Ok(Relation { doms: self.doms.clone(), bdd: self.bdd.and(&obdd) })
    }

    /// The difference of two relations over identical domains.
    pub fn minus(&self, other: &Relation, space: &mut Space) -> Result<Relation, ParetoError> {
        let obdd = self.aligned_bdd(other, space)?;

        Ok(Relation { doms: self.doms.clone(), bdd: self.bdd.and_not(&obdd) })
    }

    /// Abstracts from column `k`: projects its block away and drops
    /// its domain.
    pub fn abstract_quant(&self, k: usize) -> Result<Relation, ParetoError> {
        if k >= self.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: k, width: self.arity() }.into()
            )
        }

        let mut doms = self.doms.clone();
        let dom = doms.remove(k);

        Ok(Relation { doms, bdd: self.bdd.exists(dom.block().vars()) })
    }

    /// Abstracts from columns in the range `[k, l)`.
    pub fn abstract_range(&self, k: usize, l: usize) -> Result<Relation, ParetoError> {
        if k >= self.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: k, width: self.arity() }.into()
            )
        }

        let l = l.min(self.arity());
        let mut result = self.clone();

        for _ in k..l {
            result = result.abstract_quant(k)?;
        }

        Ok(result)
    }

    /// Pareto-minimises the relation in one closed-form computation.
    ///
    /// Forms the self-join on fresh variables, conjoins per-column
    /// dominance and identity relations (the universal relation for
    /// hidden columns) in the order given by `order`, projects the
    /// dominated tuples out and subtracts them:
    ///
    /// `Min(x) = R(x) ∖ ∃y. R(x) ∧ R(y) ∧ D(y,x) ∧ ¬I(y,x)`
    pub fn minimise(
        &self,
        space: &mut Space,
        hidden: &BitVec,
        order: AndOrder,
    ) -> Result<Relation, ParetoError> {
        let n = self.arity();

        debug!("Symbolic minimisation over {} columns ({} nodes)", n, self.bdd.size());

        let mut ys = Vec::with_capacity(n);
        let mut ry = self.bdd.clone();

        for dom in self.doms.iter() {
            let block = space.alloc_block(dom.block_width())?;
            ry = space.rename(&ry, dom.block(), &block);
            ys.push(block);
        }

        let mut dom_parts = Vec::with_capacity(n);
        let mut id_parts = Vec::with_capacity(n);

        for (i, dom) in self.doms.iter().enumerate() {
            if hidden.get(i).unwrap_or(false) {
                dom_parts.push(space.mk_true());
                id_parts.push(space.mk_true());
            } else {
                dom_parts.push(dominance_leq(
                    space,
                    dom.is_ordered(),
                    &ys[i],
                    dom.block(),
                    false,
                ));
                id_parts.push(space.vars_equal(&ys[i], dom.block()));
            }
        }

        let dominance = and_all(space, dom_parts, order);
        let identical = and_all(space, id_parts, order);

        let mut dominated =
            self.bdd.and(&ry).and(&dominance).and(&identical.not());

        for y in ys.iter() {
            dominated = dominated.exists(y.vars());
        }

        Ok(Relation { doms: self.doms.clone(), bdd: self.bdd.and_not(&dominated) })
    }

    /// Builds the compatible-pairing relation over column `k` of this
    /// relation and column `l` of `other` (already re-encoded) from an
    /// explicit pairing of the two value lists.
    fn pairing_bdd(
        &self,
        space: &Space,
        k: usize,
        odom: &Quantity,
        pairs: &ExplConfset,
    ) -> Result<Bdd, ParetoError> {
        let kdom = &self.doms[k];
        let mut pairing = space.mk_false();

        for pair in pairs.iter() {
            let kv = pair.get(0).map(|v| v.as_f64()).unwrap_or(f64::NAN);
            let lv = pair.get(1).map(|v| v.as_f64()).unwrap_or(f64::NAN);

            let ki = kdom.index_of(kv).ok_or_else(|| {
                ParetoError::from(ParetoErrorKind::ValueMissingFromDomain(format!(
                    "{:.3}",
                    kv
                )))
            })?;
            let li = odom.index_of(lv).ok_or_else(|| {
                ParetoError::from(ParetoErrorKind::ValueMissingFromDomain(format!(
                    "{:.3}",
                    lv
                )))
            })?;

            pairing = pairing.or(&kdom.encode(space, ki).and(&odom.encode(space, li)));
        }

        Ok(pairing)
    }

    /// Joins two relations on columns `k` and `l`.
    ///
    /// Hybrid scheme: the (small) explicit value lists of the two
    /// columns are paired by the explicit sorted-index join, the
    /// pairing is re-encoded over the two variable blocks and conjoined
    /// with the cross product of both relations; with `abstr` set the
    /// joined column of `other` is projected away.
    pub fn join(
        &self,
        other: &Relation,
        k: usize,
        l: usize,
        abstr: bool,
        space: &mut Space,
    ) -> Result<Relation, ParetoError> {
        if k >= self.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: k, width: self.arity() }.into()
            )
        }
        if l >= other.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: l, width: other.arity() }.into()
            )
        }

        let (odoms, obdd) = other.refreshed(space)?;

        let mut kvals = ExplConfset::new();
        for &v in self.doms[k].values() {
            kvals.add(Conf::from_reals(vec![v]))?;
        }

        let mut lvals = ExplConfset::new();
        for &v in odoms[l].values() {
            lvals.add(Conf::from_reals(vec![v]))?;
        }

        let pairs = join_sets(&kvals, 0, &lvals, 0, false)?;
        let pairing = self.pairing_bdd(space, k, &odoms[l], &pairs)?;

        let mut bdd = self.bdd.and(&obdd).and(&pairing);
        let mut doms = self.doms.clone();

        if abstr {
            bdd = bdd.exists(odoms[l].block().vars());

            for (i, dom) in odoms.into_iter().enumerate() {
                if i != l {
                    doms.push(dom);
                }
            }
        } else {
            doms.extend(odoms);
        }

        Ok(Relation { doms, bdd })
    }

    /// Producer-consumer composition of two relations.
    ///
    /// The same hybrid scheme as [`Relation::join`], with the pairing
    /// computed by the explicit two-pointer sweep over the two value
    /// lists under the cost transform `f`.
    pub fn prodcons(
        &self,
        other: &Relation,
        pq: usize,
        cq: usize,
        f: &dyn Fn(&Value) -> Value,
        space: &mut Space,
    ) -> Result<Relation, ParetoError> {
        if pq >= self.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: pq, width: self.arity() }.into()
            )
        }
        if cq >= other.arity() {
            return Err(
                ParetoErrorKind::ColumnOutOfRange { col: cq, width: other.arity() }.into()
            )
        }

        let (odoms, obdd) = other.refreshed(space)?;

        let mut pvals = ExplConfset::new();
        for &v in self.doms[pq].values() {
            pvals.add(Conf::from_reals(vec![v]))?;
        }

        let mut cvals = ExplConfset::new();
        for &v in odoms[cq].values() {
            cvals.add(Conf::from_reals(vec![v]))?;
        }

        let pairs = prodcons_sets(&pvals, 0, &cvals, 0, f)?;
        let pairing = self.pairing_bdd(space, pq, &odoms[cq], &pairs)?;

        let mut doms = self.doms.clone();
        doms.extend(odoms);

        Ok(Relation { doms, bdd: self.bdd.and(&obdd).and(&pairing) })
    }

    /// Combines two value-annotated relations: the result pairs the
    /// leading columns of both operands and replaces their two last
    /// columns by the sum of the values they carry.
    ///
    /// Defined for index-valued last columns (the `i`-th value of the
    /// domain is `i`), which the ripple-carry addition relation works
    /// on.
    pub fn add_values(
        &self,
        other: &Relation,
        space: &mut Space,
    ) -> Result<Relation, ParetoError> {
        if self.arity() == 0 || other.arity() == 0 {
            return Err(ParetoErrorKind::EmptyConfset("add_values").into())
        }

        let (odoms, obdd) = other.refreshed(space)?;

        let a_dom = self.doms.last().expect("Attempt to sum a nullary relation");
        let b_dom = odoms.last().expect("Attempt to sum a nullary relation");

        let max_sum = (a_dom.len() - 1) + (b_dom.len() - 1);
        let sum_dom = Rc::new(Quantity::new(
            space,
            (0..=max_sum).map(|i| i as f64).collect(),
            true,
        )?);

        let add = rel_add(space, a_dom.block(), b_dom.block(), sum_dom.block());

        let bdd = self
            .bdd
            .and(&obdd)
            .and(&add)
            .exists(a_dom.block().vars())
            .exists(b_dom.block().vars());

        let mut doms: Vec<Rc<Quantity>> =
            self.doms[..self.arity() - 1].to_vec();
        doms.extend(odoms[..odoms.len() - 1].iter().cloned());
        doms.push(sum_dom);

        Ok(Relation { doms, bdd })
    }

    /// Materializes the relation as an explicit configuration set,
    /// recovering per-column value kinds from `sig` when given (and
    /// falling back on the domains' order kinds otherwise).
    pub fn to_confset(
        &self,
        space: &Space,
        sig: Option<&ConfSig>,
    ) -> Result<ExplConfset, ParetoError> {
        let mut set = ExplConfset::new();

        for tuple in self.enumerate(space) {
            let packed = sig.map(|s| s.kind() == ConfKind::Real).unwrap_or(false);

            let mut conf = if packed { Conf::new_real() } else { Conf::new_gen() };

            for (i, &index) in tuple.iter().enumerate() {
                let value = self.doms[i].value(index).ok_or_else(|| {
                    ParetoError::from(ParetoErrorKind::ValueMissingFromDomain(format!(
                        "index {}",
                        index
                    )))
                })?;

                let col_sig = sig
                    .and_then(|s| s.cols().get(i).copied())
                    .unwrap_or_else(|| {
                        if self.doms[i].is_ordered() {
                            Sig::Real
                        } else {
                            Sig::UnorderedReal
                        }
                    });

                conf.append_value(match col_sig {
                    Sig::Real => Value::Real(value),
                    Sig::UnorderedReal => Value::UnorderedReal(value),
                    Sig::Int => Value::Int(value as i64),
                    Sig::UnorderedInt => Value::UnorderedInt(value as i64),
                })?;
            }

            set.add(conf)?;
        }

        Ok(set)
    }

    /// Renders the relation, one `(v0, v1, ..., vn)` tuple per line.
    pub fn render(&self, space: &Space) -> String {
        let tuples = self.enumerate(space);

        if tuples.is_empty() {
            return EMPTY_CONFSET_STR.to_owned()
        }

        let mut out = String::new();

        for tuple in tuples {
            out.push('(');

            for (i, &index) in tuple.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!(
                    "{:.3}",
                    self.doms[i].value(index).unwrap_or(f64::NAN)
                ));
            }

            out.push_str(")\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::simple_cull;

    fn quant(space: &mut Space, values: &[f64]) -> Rc<Quantity> {
        Rc::new(Quantity::new(space, values.to_vec(), true).unwrap())
    }

    fn relation_of(
        space: &mut Space,
        doms: Vec<Rc<Quantity>>,
        tuples: &[&[usize]],
    ) -> Relation {
        let mut rel = Relation::new(space, doms);

        for tuple in tuples {
            rel.insert(space, tuple);
        }

        rel
    }

    fn no_hidden(n: usize) -> BitVec {
        BitVec::from_elem(n, false)
    }

    #[test]
    fn test_insert_enumerate_roundtrip() {
        let mut space = Space::with_capacity(16);
        let q0 = quant(&mut space, &[1.0, 2.0, 3.0]);
        let q1 = quant(&mut space, &[0.1, 0.2]);

        let rel =
            relation_of(&mut space, vec![q0, q1], &[&[0, 1], &[2, 0], &[0, 1]]);

        assert_eq!(rel.count(&space), 2);
        assert_eq!(rel.enumerate(&space), vec![vec![0, 1], vec![2, 0]]);
        assert!(rel.contains(&space, &[2, 0]));
        assert!(!rel.contains(&space, &[1, 1]));
    }

    #[test]
    fn test_column_indices() {
        let mut space = Space::with_capacity(16);
        let q0 = quant(&mut space, &[1.0, 2.0, 3.0]);
        let q1 = quant(&mut space, &[0.1, 0.2]);

        let rel = relation_of(&mut space, vec![q0, q1], &[&[0, 1], &[2, 1]]);

        assert_eq!(rel.column_indices(&space, 0), vec![0, 2]);
        assert_eq!(rel.column_indices(&space, 1), vec![1]);
    }

    #[test]
    fn test_product_cardinality() {
        let mut space = Space::with_capacity(32);
        let q0 = quant(&mut space, &[1.0, 2.0]);
        let q1 = quant(&mut space, &[0.1, 0.2, 0.3]);

        let a = relation_of(&mut space, vec![q0], &[&[0], &[1]]);
        let b = relation_of(&mut space, vec![q1], &[&[0], &[1], &[2]]);

        let prod = a.product(&b, &mut space).unwrap();

        assert_eq!(prod.arity(), 2);
        assert_eq!(prod.count(&space), 6);

        // self-product re-encodes the right operand
        let sq = a.product(&a, &mut space).unwrap();
        assert_eq!(sq.count(&space), 4);
    }

    #[test]
    fn test_unite_and_minus_align_blocks() {
        let mut space = Space::with_capacity(32);
        let q0 = quant(&mut space, &[1.0, 2.0, 3.0]);
        let q1 = quant(&mut space, &[1.0, 2.0, 3.0]);

        let a = relation_of(&mut space, vec![q0], &[&[0], &[1]]);
        let b = relation_of(&mut space, vec![q1], &[&[1], &[2]]);

        let u = a.unite(&b, &mut space).unwrap();
        assert_eq!(u.count(&space), 3);

        let m = u.minus(&b, &mut space).unwrap();
        assert_eq!(m.enumerate(&space), vec![vec![0]]);
    }

    #[test]
    fn test_domain_mismatch() {
        let mut space = Space::with_capacity(32);
        let q0 = quant(&mut space, &[1.0, 2.0]);
        let q1 = quant(&mut space, &[1.0, 3.0]);

        let a = relation_of(&mut space, vec![q0], &[&[0]]);
        let b = relation_of(&mut space, vec![q1], &[&[0]]);

        let err = a.unite(&b, &mut space).unwrap_err();
        match err.kind() {
            ParetoErrorKind::DomainMismatch(0) => {}
            other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn test_abstract_quant() {
        let mut space = Space::with_capacity(16);
        let q0 = quant(&mut space, &[1.0, 2.0]);
        let q1 = quant(&mut space, &[0.1, 0.2]);

        let rel = relation_of(&mut space, vec![q0, q1], &[&[0, 0], &[1, 0], &[1, 1]]);
        let abs = rel.abstract_quant(0).unwrap();

        assert_eq!(abs.arity(), 1);
        assert_eq!(abs.enumerate(&space), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_minimise_matches_simple_cull() {
        let rows: &[&[usize]] = &[&[0, 1], &[1, 0], &[1, 1], &[2, 2]];

        let mut space = Space::with_capacity(64);
        let q0 = quant(&mut space, &[1.0, 2.0, 3.0]);
        let q1 = quant(&mut space, &[1.0, 2.0, 3.0]);

        let rel = relation_of(&mut space, vec![q0.clone(), q1.clone()], rows);
        let min = rel.minimise(&mut space, &no_hidden(2), AndOrder::SmallestFirst).unwrap();

        let mut expl = ExplConfset::new();
        for row in rows {
            expl.add(Conf::from_reals(vec![
                q0.value(row[0]).unwrap(),
                q1.value(row[1]).unwrap(),
            ]))
            .unwrap();
        }
        simple_cull(&mut expl);

        let materialized = min.to_confset(&space, None).unwrap();
        let got: Vec<String> = materialized.iter().map(|c| c.to_string()).collect();
        let expected: Vec<String> = expl.iter().map(|c| c.to_string()).collect();

        assert_eq!(got, expected);
    }

    #[test]
    fn test_minimise_with_hidden_column() {
        let mut space = Space::with_capacity(64);
        let q0 = quant(&mut space, &[1.0, 2.0]);
        let q1 = quant(&mut space, &[4.0, 5.0]);

        // (1, 5) and (2, 4) are incomparable, but with column 1 hidden
        // (1, ...) dominates (2, ...)
        let rel =
            relation_of(&mut space, vec![q0, q1], &[&[0, 1], &[1, 0]]);

        let mut hidden = no_hidden(2);
        hidden.set(1, true);

        let min = rel.minimise(&mut space, &hidden, AndOrder::SmallestFirst).unwrap();
        assert_eq!(min.enumerate(&space), vec![vec![0, 1]]);
    }

    #[test]
    fn test_minimise_keeps_masked_duplicates() {
        let mut space = Space::with_capacity(64);
        let q0 = quant(&mut space, &[1.0, 2.0]);
        let q1 = quant(&mut space, &[4.0, 5.0]);

        // equal in the visible column, different in the hidden one:
        // an antichain under the mask, nothing may be culled
        let rel = relation_of(&mut space, vec![q0, q1], &[&[0, 0], &[0, 1]]);

        let mut hidden = no_hidden(2);
        hidden.set(1, true);

        let min = rel.minimise(&mut space, &hidden, AndOrder::SmallestFirst).unwrap();
        assert_eq!(min.count(&space), 2);
    }

    #[test]
    fn test_join_matches_explicit() {
        let mut space = Space::with_capacity(64);
        let shared = quant(&mut space, &[1.0, 2.0, 3.0]);
        let q1 = quant(&mut space, &[10.0, 20.0]);
        let q2 = quant(&mut space, &[0.5, 0.6]);

        let a = relation_of(
            &mut space,
            vec![shared.clone(), q1],
            &[&[0, 0], &[1, 1]],
        );
        let b = relation_of(
            &mut space,
            vec![shared.clone(), q2],
            &[&[1, 0], &[2, 1]],
        );

        let joined = a.join(&b, 0, 0, false, &mut space).unwrap();

        assert_eq!(joined.arity(), 4);
        assert_eq!(joined.enumerate(&space), vec![vec![1, 1, 1, 0]]);

        let abstracted = a.join(&b, 0, 0, true, &mut space).unwrap();
        assert_eq!(abstracted.arity(), 3);
        assert_eq!(abstracted.enumerate(&space), vec![vec![1, 1, 0]]);
    }

    #[test]
    fn test_prodcons_matches_explicit() {
        let mut space = Space::with_capacity(128);

        // compatible iff the required quality dominates 1/p: the
        // cheapest producer satisfies only the laxest consumers
        let pq = quant(&mut space, &[1.0, 2.0, 4.0]);
        let cq = quant(&mut space, &[0.25, 0.5, 1.0]);

        let p = relation_of(&mut space, vec![pq], &[&[0], &[1], &[2]]);
        let c = relation_of(&mut space, vec![cq], &[&[0], &[1], &[2]]);

        let pc = p
            .prodcons(&c, 0, 0, &|v| Value::Real(1.0 / v.as_f64()), &mut space)
            .unwrap();

        let got = pc.enumerate(&space);
        let expected: Vec<Vec<usize>> = vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![2, 0],
        ];

        assert_eq!(got, expected);
    }

    #[test]
    fn test_add_values() {
        let mut space = Space::with_capacity(64);

        // index-valued cost domains
        let a_cost = quant(&mut space, &[0.0, 1.0, 2.0]);
        let b_cost = quant(&mut space, &[0.0, 1.0]);
        let a_id = quant(&mut space, &[10.0, 20.0]);
        let b_id = quant(&mut space, &[30.0, 40.0]);

        let a = relation_of(&mut space, vec![a_id, a_cost], &[&[0, 2], &[1, 1]]);
        let b = relation_of(&mut space, vec![b_id, b_cost], &[&[0, 1], &[1, 0]]);

        let sum = a.add_values(&b, &mut space).unwrap();

        assert_eq!(sum.arity(), 3);

        let got = sum.enumerate(&space);
        let expected: Vec<Vec<usize>> = vec![
            // (10, 2) + (30, 1) -> (10, 30, 3)
            vec![0, 0, 3],
            // (10, 2) + (40, 0) -> (10, 40, 2)
            vec![0, 1, 2],
            // (20, 1) + (30, 1) -> (20, 30, 2)
            vec![1, 0, 2],
            // (20, 1) + (40, 0) -> (20, 40, 1)
            vec![1, 1, 1],
        ];

        assert_eq!(got, expected);
    }

    #[test]
    fn test_render() {
        let mut space = Space::with_capacity(16);
        let q0 = quant(&mut space, &[1.0, 2.0]);

        let empty = Relation::new(&space, vec![q0.clone()]);
        assert_eq!(empty.render(&space), EMPTY_CONFSET_STR);

        let rel = relation_of(&mut space, vec![q0], &[&[1]]);
        assert_eq!(rel.render(&space), "(2.000)\n");
    }
}
