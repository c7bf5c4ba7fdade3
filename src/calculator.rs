use std::collections::BTreeSet;
use crate::{
    AnyId, Conf, ExplConfset, ExplIndex, ParetoError, ParetoErrorKind, ProdGen, Value,
};

/// An identifier of a configuration set owned by a calculator.
///
/// A calculator is the sole owning arena of the sets it creates; all
/// access and disposal goes through the calculator with one of these
/// handles.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct CsId(pub(crate) AnyId);

impl CsId {
    #[inline]
    pub const fn get(self) -> AnyId {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        CsId(unsafe { AnyId::new_unchecked(index + 1) })
    }

    #[inline]
    pub(crate) fn to_index(self) -> usize {
        self.0.get() - 1
    }
}

/// Strategy of explicit minimisation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MinAlgo {
    /// Single pass with a running minimal set.
    SimpleCull,
    /// Recursive halving with a Simple-Cull merge of the minimized
    /// halves.
    DivideConquer,
}

impl Default for MinAlgo {
    fn default() -> Self {
        MinAlgo::SimpleCull
    }
}

/// The algebra of Pareto operations over configuration sets.
///
/// Operations taking a mutable set mutate it in place and return the
/// same handle; operations combining two sets allocate a fresh one and
/// retain both inputs unmodified.
pub trait Calculator {
    /// Creates an empty configuration set owned by this calculator.
    fn new_confset(&mut self) -> CsId;

    /// Creates a copy of the set `c`, including its visibility mask.
    fn copy_confset(&mut self, c: CsId) -> Result<CsId, ParetoError>;

    /// Disposes the set `c` and every configuration it owns.
    fn dispose(&mut self, c: CsId) -> Result<(), ParetoError>;

    /// Disposes all sets owned by this calculator.
    fn dispose_all(&mut self);

    /// Adds configuration `conf` to the set `c`, transferring
    /// ownership.
    fn add(&mut self, c: CsId, conf: Conf) -> Result<(), ParetoError>;

    /// Adds configuration `conf` to the minimal set `c`, keeping it
    /// minimal.
    fn add_and_min(&mut self, c: CsId, conf: Conf) -> Result<(), ParetoError>;

    /// Removes configuration `conf` from the set `c`.
    fn remove(&mut self, c: CsId, conf: &Conf) -> Result<bool, ParetoError>;

    fn hide(&mut self, c: CsId, k: usize) -> Result<(), ParetoError>;

    fn hide_range(&mut self, c: CsId, k: usize, l: usize) -> Result<(), ParetoError>;

    fn unhide(&mut self, c: CsId, k: usize) -> Result<(), ParetoError>;

    fn unhide_range(&mut self, c: CsId, k: usize, l: usize) -> Result<(), ParetoError>;

    /// The number of configurations in the set `c`.
    fn size(&self, c: CsId) -> Result<usize, ParetoError>;

    /// The width of the configurations in the set `c`.
    fn width(&self, c: CsId) -> Result<usize, ParetoError>;

    /// Renders the set `c`, one `(v0, v1, ..., vn)` tuple per line.
    fn render(&mut self, c: CsId) -> Result<String, ParetoError>;

    fn clear(&mut self, c: CsId) -> Result<(), ParetoError>;

    /// A materialized snapshot of the configurations in the set `c`.
    fn confs(&mut self, c: CsId) -> Result<Vec<Conf>, ParetoError>;

    /// A lazy generator of the cross product of the given sets.
    fn prodgen<'a>(
        &'a mut self,
        cs: &[CsId],
    ) -> Result<Box<dyn Iterator<Item = Conf> + 'a>, ParetoError>;

    /// Minimises the set `c` in place: the result is an antichain
    /// dominance-equivalent to the input under the visibility mask.
    fn minimise(&mut self, c: CsId) -> Result<CsId, ParetoError>;

    /// The free product of `c` and `d`: every concatenation of a
    /// configuration of `c` with one of `d`.
    fn multiply(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError>;

    /// Removes quantity `k` from every configuration of `c`.
    fn abstract_quant(&mut self, c: CsId, k: usize) -> Result<CsId, ParetoError>;

    /// Removes quantities in the range `[k, l)` from every
    /// configuration of `c`.
    fn abstract_range(&mut self, c: CsId, k: usize, l: usize)
        -> Result<CsId, ParetoError>;

    /// Keeps only the configurations of `c` which also occur in the
    /// constraint set `d` (equality over the visible columns).
    fn constrain(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError>;

    /// Keeps only the configurations of `c` accepted by `check`.
    fn constrain_where(
        &mut self,
        c: CsId,
        check: &dyn Fn(&Conf) -> bool,
    ) -> Result<CsId, ParetoError>;

    /// Keeps only the configurations of `c` which dominate `bound`.
    fn constrain_above(&mut self, c: CsId, bound: &Conf) -> Result<CsId, ParetoError>;

    /// The union of `c` and `d` as a fresh set.
    fn unite(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError>;

    /// Appends the derived quantity `f(conf)` to every configuration
    /// of `c`.
    fn add_derived(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Value,
    ) -> Result<CsId, ParetoError>;

    /// Appends the derived quantities `f(conf)` to every configuration
    /// of `c`.
    fn add_derived_vector(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Conf,
    ) -> Result<CsId, ParetoError>;

    /// Producer-consumer composition: all pairs of a producer from `p`
    /// and a consumer from `c` such that the consumer's quantity `l`
    /// dominates `f` of the producer's quantity `k`.
    fn prodcons(
        &mut self,
        p: CsId,
        k: usize,
        c: CsId,
        l: usize,
        f: &dyn Fn(&Value) -> Value,
    ) -> Result<CsId, ParetoError>;

    /// Joins `c` and `d` on quantities `k` and `l`; with `abstr` set,
    /// the joined quantity of `d` is dropped from the result.
    fn join(
        &mut self,
        c: CsId,
        k: usize,
        d: CsId,
        l: usize,
        abstr: bool,
    ) -> Result<CsId, ParetoError>;

    /// Joins `c` and `d` on quantities `k` and `l` and abstracts from
    /// the second joined quantity.
    fn join_and_abstract(
        &mut self,
        c: CsId,
        k: usize,
        d: CsId,
        l: usize,
    ) -> Result<CsId, ParetoError> {
        self.join(c, k, d, l, true)
    }

    /// Declares quantity `k` of `c` and quantity `l` of `d` identical.
    ///
    /// Only meaningful for the symbolic calculator, where quantities
    /// to be joined must share one value domain before any symbolic
    /// operation is done; a no-op otherwise.
    fn identical_quantities(
        &mut self,
        _c: CsId,
        _k: usize,
        _d: CsId,
        _l: usize,
    ) -> Result<(), ParetoError> {
        Ok(())
    }
}

// Algorithm bodies shared by the explicit calculator and the explicit
// fallbacks of the symbolic one.

pub(crate) fn simple_cull(set: &mut ExplConfset) {
    let visible = set.visible.clone();
    let input = std::mem::take(&mut set.confs);
    let mut min: BTreeSet<Conf> = BTreeSet::new();

    for a in input {
        let mut add = true;
        let mut evicted: Vec<Conf> = Vec::new();

        for b in min.iter() {
            if a.dominates_masked(b, &visible) {
                evicted.push(b.clone());
            } else if b.dominates_masked(&a, &visible) {
                add = false;
                break
            }
        }

        if add {
            for b in evicted {
                min.remove(&b);
            }
            min.insert(a);
        }
    }

    set.confs = min;
}

pub(crate) fn divide_conquer(set: &mut ExplConfset) {
    let visible = set.visible.clone();
    let input: Vec<Conf> = std::mem::take(&mut set.confs).into_iter().collect();

    set.confs = dc_halves(input, &visible);
}

fn dc_halves(mut input: Vec<Conf>, visible: &BTreeSet<usize>) -> BTreeSet<Conf> {
    if input.len() <= 1 {
        return input.into_iter().collect()
    }

    let right = input.split_off(input.len() / 2);
    let left = dc_halves(input, visible);
    let right = dc_halves(right, visible);

    // merge the two minimized halves by culling one against the other
    let mut merged = left;

    'next: for a in right {
        let mut evicted: Vec<Conf> = Vec::new();

        for b in merged.iter() {
            if b.dominates_masked(&a, visible) {
                continue 'next
            } else if a.dominates_masked(b, visible) {
                evicted.push(b.clone());
            }
        }

        for b in evicted {
            merged.remove(&b);
        }
        merged.insert(a);
    }

    merged
}

pub(crate) fn multiply_sets(
    c: &ExplConfset,
    d: &ExplConfset,
) -> Result<ExplConfset, ParetoError> {
    let mut prod = ExplConfset::new();

    for c0 in c.iter() {
        for d0 in d.iter() {
            let mut conf = c0.clone();
            conf.append(d0.clone())?;
            prod.add(conf)?;
        }
    }

    Ok(prod)
}

pub(crate) fn abstract_quant_set(
    set: &mut ExplConfset,
    k: usize,
) -> Result<(), ParetoError> {
    if k >= set.width {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: set.width }.into())
    }

    let input = std::mem::take(&mut set.confs);

    for mut c in input {
        c.abstract_quant(k);
        set.confs.insert(c);
    }

    set.width -= 1;
    if let Some(ref mut sig) = set.sig {
        sig.remove_col(k);
    }

    let visible = std::mem::take(&mut set.visible);
    set.visible = visible
        .into_iter()
        .filter(|&i| i != k)
        .map(|i| if i > k { i - 1 } else { i })
        .collect();

    Ok(())
}

pub(crate) fn abstract_range_set(
    set: &mut ExplConfset,
    k: usize,
    l: usize,
) -> Result<(), ParetoError> {
    if k >= set.width {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: set.width }.into())
    }

    let l = l.min(set.width);

    if k >= l {
        return Ok(())
    }

    let input = std::mem::take(&mut set.confs);

    for mut c in input {
        c.abstract_range(k, l);
        set.confs.insert(c);
    }

    set.width -= l - k;
    if let Some(ref mut sig) = set.sig {
        sig.remove_range(k, l);
    }

    let visible = std::mem::take(&mut set.visible);
    set.visible = visible
        .into_iter()
        .filter(|&i| i < k || i >= l)
        .map(|i| if i >= l { i - (l - k) } else { i })
        .collect();

    Ok(())
}

pub(crate) fn constrain_with(set: &mut ExplConfset, constraint: &ExplConfset) {
    let visible = set.visible.clone();
    let input: Vec<Conf> = std::mem::take(&mut set.confs).into_iter().collect();
    let mut keep: BTreeSet<Conf> = BTreeSet::new();
    let mut diter = constraint.iter().peekable();
    let mut ci = 0;

    // both walks are in canonical order
    while ci < input.len() {
        match diter.peek() {
            None => break,
            Some(d0) => {
                if input[ci].equals_masked(d0, &visible) {
                    keep.insert(input[ci].clone());
                    ci += 1;
                    diter.next();
                } else if input[ci].total_cmp(d0) == std::cmp::Ordering::Less {
                    ci += 1;
                } else {
                    diter.next();
                }
            }
        }
    }

    set.confs = keep;
}

pub(crate) fn constrain_where_set(set: &mut ExplConfset, check: &dyn Fn(&Conf) -> bool) {
    let input = std::mem::take(&mut set.confs);
    set.confs = input.into_iter().filter(|c| check(c)).collect();
}

pub(crate) fn constrain_above_set(set: &mut ExplConfset, bound: &Conf) {
    let input = std::mem::take(&mut set.confs);
    set.confs = input.into_iter().filter(|c| c.dominates(bound)).collect();
}

pub(crate) fn unite_sets(
    c: &ExplConfset,
    d: &ExplConfset,
) -> Result<ExplConfset, ParetoError> {
    if let (Some(cs), Some(ds)) = (c.sig(), d.sig()) {
        if cs != ds {
            return Err(ParetoErrorKind::SignatureMismatch(
                "the operands of a union".to_owned(),
            )
            .into())
        }
    }

    let mut union = c.clone();

    for d0 in d.iter() {
        union.add(d0.clone())?;
    }

    Ok(union)
}

pub(crate) fn add_derived_set(
    set: &mut ExplConfset,
    f: &dyn Fn(&Conf) -> Value,
) -> Result<(), ParetoError> {
    if set.size() == 0 {
        return Ok(())
    }

    let input = std::mem::take(&mut set.confs);
    let mut sig = None;

    for mut c in input {
        let v = f(&c);
        c.append_value(v)?;
        sig = Some(c.sig());
        set.confs.insert(c);
    }

    set.width += 1;
    set.sig = sig;
    set.visible.insert(set.width - 1);

    Ok(())
}

pub(crate) fn add_derived_vector_set(
    set: &mut ExplConfset,
    f: &dyn Fn(&Conf) -> Conf,
) -> Result<(), ParetoError> {
    if set.size() == 0 {
        return Ok(())
    }

    let old_width = set.width;
    let input = std::mem::take(&mut set.confs);
    let mut sig = None;
    let mut width = old_width;

    for mut c in input {
        let extra = f(&c);
        c.append(extra)?;
        width = c.len();
        sig = Some(c.sig());
        set.confs.insert(c);
    }

    set.width = width;
    set.sig = sig;
    for i in old_width..width {
        set.visible.insert(i);
    }

    Ok(())
}

/// The two-pointer producer-consumer sweep (output-sensitive, no full
/// pairwise test).
pub(crate) fn prodcons_sets(
    p: &ExplConfset,
    k: usize,
    c: &ExplConfset,
    l: usize,
    f: &dyn Fn(&Value) -> Value,
) -> Result<ExplConfset, ParetoError> {
    let mut out = ExplConfset::new();

    if p.size() == 0 || c.size() == 0 {
        return Ok(out)
    }

    if k >= p.width() {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: p.width() }.into())
    }
    if l >= c.width() {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: l, width: c.width() }.into())
    }

    let ip = ExplIndex::new(p, k)?;
    let ic = ExplIndex::new(c, l)?;

    let emit = |out: &mut ExplConfset, prod: &Conf, cons: &Conf| {
        let mut conf = prod.clone();
        conf.append(cons.clone())?;
        out.add(conf)
    };

    let mut i = 0;
    let mut j = ip.len() as isize - 1;

    while i < ic.len() && j >= 0 {
        let offer = f(&ip.col_value(j as usize));

        if ic.col_value(i).dominates(&offer) {
            emit(&mut out, ip.get(j as usize), ic.get(i))?;
            i += 1;
        } else {
            j -= 1;

            if j >= 0 {
                // a producer retreat makes every consumer reached so
                // far compatible with the better producer as well
                for a in 0..i {
                    emit(&mut out, ip.get(j as usize), ic.get(a))?;
                }
            }
        }
    }

    if i == ic.len() {
        for a in 0..ic.len() {
            for b in 0..j {
                emit(&mut out, ip.get(b as usize), ic.get(a))?;
            }
        }
    }

    Ok(out)
}

/// The sorted-index join: for every distinct key of `c`'s column `k`,
/// the cross product of the matching ranges of both indexes.
pub(crate) fn join_sets(
    c: &ExplConfset,
    k: usize,
    d: &ExplConfset,
    l: usize,
    abstr: bool,
) -> Result<ExplConfset, ParetoError> {
    let mut out = ExplConfset::new();

    if c.size() == 0 || d.size() == 0 {
        return Ok(out)
    }

    if k >= c.width() {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: c.width() }.into())
    }
    if l >= d.width() {
        return Err(ParetoErrorKind::ColumnOutOfRange { col: l, width: d.width() }.into())
    }

    let ic = ExplIndex::new(c, k)?;
    let id = ExplIndex::new(d, l)?;

    let mut i = 0;

    while i < ic.len() {
        let test = ic.col_value(i);

        let (il, iu) = ic.get_range(&test);
        let (jl, ju) = id.get_range(&test);

        for m in il..iu {
            for n in jl..ju {
                let mut conf = ic.get(m).clone();
                conf.append(id.get(n).clone())?;

                if abstr {
                    conf.abstract_quant(c.width() + l);
                }

                out.add(conf)?;
            }
        }

        i = iu;
    }

    Ok(out)
}

/// The explicit Pareto calculator: the enumerated backend of the
/// algebra, with a selectable minimisation strategy.
#[derive(Default, Debug)]
pub struct ExplCalculator {
    sets: Vec<Option<ExplConfset>>,
    minalgo: MinAlgo,
}

impl ExplCalculator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_min_algo(minalgo: MinAlgo) -> Self {
        ExplCalculator { sets: Vec::new(), minalgo }
    }

    /// Selects a minimisation algorithm; Simple Cull is the default.
    pub fn set_min_algo(&mut self, minalgo: MinAlgo) {
        self.minalgo = minalgo;
    }

    pub fn get(&self, c: CsId) -> Result<&ExplConfset, ParetoError> {
        self.sets
            .get(c.to_index())
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    pub fn get_mut(&mut self, c: CsId) -> Result<&mut ExplConfset, ParetoError> {
        self.sets
            .get_mut(c.to_index())
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    fn insert_set(&mut self, set: ExplConfset) -> CsId {
        let id = CsId::from_index(self.sets.len());
        self.sets.push(Some(set));
        id
    }

    fn take_set(&mut self, c: CsId) -> Result<ExplConfset, ParetoError> {
        self.sets
            .get_mut(c.to_index())
            .and_then(|slot| slot.take())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    fn put_back(&mut self, c: CsId, set: ExplConfset) {
        self.sets[c.to_index()] = Some(set);
    }
}

impl Calculator for ExplCalculator {
    fn new_confset(&mut self) -> CsId {
        trace!("New explicit confset");
        self.insert_set(ExplConfset::new())
    }

    fn copy_confset(&mut self, c: CsId) -> Result<CsId, ParetoError> {
        let copy = self.get(c)?.clone();
        Ok(self.insert_set(copy))
    }

    fn dispose(&mut self, c: CsId) -> Result<(), ParetoError> {
        self.take_set(c).map(|_| ())
    }

    fn dispose_all(&mut self) {
        self.sets.clear();
    }

    fn add(&mut self, c: CsId, conf: Conf) -> Result<(), ParetoError> {
        self.get_mut(c)?.add(conf)
    }

    fn add_and_min(&mut self, c: CsId, conf: Conf) -> Result<(), ParetoError> {
        self.get_mut(c)?.add_and_min(conf)
    }

    fn remove(&mut self, c: CsId, conf: &Conf) -> Result<bool, ParetoError> {
        Ok(self.get_mut(c)?.remove(conf))
    }

    fn hide(&mut self, c: CsId, k: usize) -> Result<(), ParetoError> {
        self.get_mut(c)?.hide(k)
    }

    fn hide_range(&mut self, c: CsId, k: usize, l: usize) -> Result<(), ParetoError> {
        self.get_mut(c)?.hide_range(k, l)
    }

    fn unhide(&mut self, c: CsId, k: usize) -> Result<(), ParetoError> {
        self.get_mut(c)?.unhide(k)
    }

    fn unhide_range(&mut self, c: CsId, k: usize, l: usize) -> Result<(), ParetoError> {
        self.get_mut(c)?.unhide_range(k, l)
    }

    fn size(&self, c: CsId) -> Result<usize, ParetoError> {
        Ok(self.get(c)?.size())
    }

    fn width(&self, c: CsId) -> Result<usize, ParetoError> {
        Ok(self.get(c)?.width())
    }

    fn render(&mut self, c: CsId) -> Result<String, ParetoError> {
        Ok(self.get(c)?.to_string())
    }

    fn clear(&mut self, c: CsId) -> Result<(), ParetoError> {
        self.get_mut(c)?.clear();
        Ok(())
    }

    fn confs(&mut self, c: CsId) -> Result<Vec<Conf>, ParetoError> {
        Ok(self.get(c)?.iter().cloned().collect())
    }

    fn prodgen<'a>(
        &'a mut self,
        cs: &[CsId],
    ) -> Result<Box<dyn Iterator<Item = Conf> + 'a>, ParetoError> {
        let mut sets = Vec::with_capacity(cs.len());

        for &c in cs {
            sets.push(
                self.sets
                    .get(c.to_index())
                    .and_then(|slot| slot.as_ref())
                    .ok_or_else(|| ParetoError::from(
                        ParetoErrorKind::ConfsetMissingForId(c),
                    ))?,
            );
        }

        Ok(Box::new(ProdGen::new(sets)?))
    }

    fn minimise(&mut self, c: CsId) -> Result<CsId, ParetoError> {
        let minalgo = self.minalgo;
        let set = self.get_mut(c)?;

        if set.size() == 0 {
            return Err(ParetoErrorKind::EmptyConfset("minimise").into())
        }

        debug!("Minimising {} confs with {:?}", set.size(), minalgo);

        match minalgo {
            MinAlgo::SimpleCull => simple_cull(set),
            MinAlgo::DivideConquer => divide_conquer(set),
        }

        Ok(c)
    }

    fn multiply(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        let prod = multiply_sets(self.get(c)?, self.get(d)?)?;
        Ok(self.insert_set(prod))
    }

    fn abstract_quant(&mut self, c: CsId, k: usize) -> Result<CsId, ParetoError> {
        abstract_quant_set(self.get_mut(c)?, k)?;
        Ok(c)
    }

    fn abstract_range(
        &mut self,
        c: CsId,
        k: usize,
        l: usize,
    ) -> Result<CsId, ParetoError> {
        abstract_range_set(self.get_mut(c)?, k, l)?;
        Ok(c)
    }

    fn constrain(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        if c == d {
            return Ok(c)
        }

        let mut cset = self.take_set(c)?;

        let result = match self.get(d) {
            Ok(dset) => {
                constrain_with(&mut cset, dset);
                Ok(c)
            }
            Err(err) => Err(err),
        };

        self.put_back(c, cset);
        result
    }

    fn constrain_where(
        &mut self,
        c: CsId,
        check: &dyn Fn(&Conf) -> bool,
    ) -> Result<CsId, ParetoError> {
        constrain_where_set(self.get_mut(c)?, check);
        Ok(c)
    }

    fn constrain_above(&mut self, c: CsId, bound: &Conf) -> Result<CsId, ParetoError> {
        constrain_above_set(self.get_mut(c)?, bound);
        Ok(c)
    }

    fn unite(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        let union = unite_sets(self.get(c)?, self.get(d)?)?;
        Ok(self.insert_set(union))
    }

    fn add_derived(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Value,
    ) -> Result<CsId, ParetoError> {
        add_derived_set(self.get_mut(c)?, f)?;
        Ok(c)
    }

    fn add_derived_vector(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Conf,
    ) -> Result<CsId, ParetoError> {
        add_derived_vector_set(self.get_mut(c)?, f)?;
        Ok(c)
    }

    fn prodcons(
        &mut self,
        p: CsId,
        k: usize,
        c: CsId,
        l: usize,
        f: &dyn Fn(&Value) -> Value,
    ) -> Result<CsId, ParetoError> {
        let out = prodcons_sets(self.get(p)?, k, self.get(c)?, l, f)?;
        Ok(self.insert_set(out))
    }

    fn join(
        &mut self,
        c: CsId,
        k: usize,
        d: CsId,
        l: usize,
        abstr: bool,
    ) -> Result<CsId, ParetoError> {
        let out = join_sets(self.get(c)?, k, self.get(d)?, l, abstr)?;
        Ok(self.insert_set(out))
    }
}
