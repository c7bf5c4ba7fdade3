use std::{collections::BTreeSet, rc::Rc};
use bit_vec::BitVec;
use crate::{
    bdd::{AndOrder, Space},
    calculator::{
        add_derived_set, add_derived_vector_set, constrain_above_set,
        constrain_where_set, simple_cull,
    },
    quantity::Quantity,
    relation::Relation,
    Calculator, Conf, ConfKind, ConfSig, CsId, ExplConfset, ParetoError,
    ParetoErrorKind, Sig, Value,
};

/// A configuration set with a lazy symbolic representation.
///
/// While under construction the set is explicit and append-enabled.
/// The first symbolic operation converts it into a relation over
/// quantity domains derived from the observed values (or from domains
/// unified beforehand); once converted, direct tuple insertion is
/// rejected.  Operations which inherently need the explicit form
/// materialize it back and invalidate the relation.
#[derive(Clone, Default, Debug)]
pub struct SymConfset {
    pub(crate) econf: ExplConfset,
    pub(crate) rel: Option<Relation>,
    pub(crate) converted: bool,
    pub(crate) pinned: Vec<Option<Rc<Quantity>>>,
    pub(crate) sig: Option<ConfSig>,
    pub(crate) visible: BTreeSet<usize>,
}

impl SymConfset {
    pub fn new() -> Self {
        Default::default()
    }

    fn rel_born(rel: Relation, sig: Option<ConfSig>) -> Self {
        let arity = rel.arity();

        SymConfset {
            econf: ExplConfset::new(),
            pinned: vec![None; arity],
            rel: Some(rel),
            converted: true,
            sig,
            visible: (0..arity).collect(),
        }
    }

    #[inline]
    pub fn is_converted(&self) -> bool {
        self.converted
    }

    #[inline]
    pub fn sig(&self) -> Option<&ConfSig> {
        self.sig.as_ref()
    }

    pub fn width(&self) -> usize {
        if self.converted {
            self.rel.as_ref().map(Relation::arity).unwrap_or(0)
        } else {
            self.econf.width()
        }
    }

    pub fn size(&self, space: &Space) -> usize {
        if self.converted {
            self.rel.as_ref().map(|rel| rel.count(space)).unwrap_or(0)
        } else {
            self.econf.size()
        }
    }

    /// Adds configuration `c`, taking ownership of it.
    ///
    /// Rejected once the set has been converted to its symbolic form.
    pub fn add(&mut self, c: Conf) -> Result<(), ParetoError> {
        if self.converted {
            return Err(ParetoErrorKind::ConvertedSetAppend.into())
        }

        let first = self.sig.is_none();
        self.econf.add(c)?;

        if first {
            self.sig = self.econf.sig().cloned();
            self.pinned = vec![None; self.econf.width()];
            self.visible = self.econf.visible().clone();
        }

        Ok(())
    }

    /// Adds configuration `c` to a minimal set, keeping it minimal.
    ///
    /// Rejected once the set has been converted to its symbolic form.
    pub fn add_and_min(&mut self, c: Conf) -> Result<(), ParetoError> {
        if self.converted {
            return Err(ParetoErrorKind::ConvertedSetAppend.into())
        }

        let first = self.sig.is_none();
        self.econf.visible = self.visible.clone();
        self.econf.add_and_min(c)?;

        if first {
            self.sig = self.econf.sig().cloned();
            self.pinned = vec![None; self.econf.width()];
            self.visible = self.econf.visible().clone();
        }

        Ok(())
    }

    /// Removes configuration `c`.  Returns whether it was present.
    pub fn remove(&mut self, c: &Conf, space: &mut Space) -> Result<bool, ParetoError> {
        if !self.converted {
            return Ok(self.econf.remove(c))
        }

        let remaining = {
            let rel = self.rel.as_ref().expect("Attempt to use a missing relation");
            let mut indices = Vec::with_capacity(rel.arity());

            for i in 0..rel.arity() {
                let value = match c.get(i) {
                    Some(v) => v.as_f64(),
                    None => return Ok(false),
                };

                match rel.dom(i).index_of(value) {
                    Some(index) => indices.push(index),
                    None => return Ok(false),
                }
            }

            if !rel.contains(space, &indices) {
                return Ok(false)
            }

            let mut singleton = Relation::new(space, rel.doms().to_vec());
            singleton.insert(space, &indices);

            rel.minus(&singleton, space)?
        };

        self.rel = Some(remaining);

        Ok(true)
    }

    pub fn hide(&mut self, k: usize) -> Result<(), ParetoError> {
        if k < self.width() {
            self.visible.remove(&k);
            Ok(())
        } else {
            Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: self.width() }.into())
        }
    }

    pub fn hide_range(&mut self, k: usize, l: usize) -> Result<(), ParetoError> {
        for i in k..l.min(self.width()) {
            self.visible.remove(&i);
        }
        Ok(())
    }

    pub fn unhide(&mut self, k: usize) -> Result<(), ParetoError> {
        if k < self.width() {
            self.visible.insert(k);
            Ok(())
        } else {
            Err(ParetoErrorKind::ColumnOutOfRange { col: k, width: self.width() }.into())
        }
    }

    pub fn unhide_range(&mut self, k: usize, l: usize) -> Result<(), ParetoError> {
        for i in k..l.min(self.width()) {
            self.visible.insert(i);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.econf.clear();
        self.rel = None;
        self.converted = false;
        self.pinned.clear();
        self.sig = None;
        self.visible.clear();
    }

    /// Converts the explicit form into the symbolic relation, deriving
    /// a quantity domain per column from the observed values unless a
    /// unified domain was pinned beforehand.  A no-op when converted
    /// already.
    pub fn to_symbolic(&mut self, space: &mut Space) -> Result<(), ParetoError> {
        if self.converted {
            return Ok(())
        }

        if self.econf.size() == 0 {
            return Err(ParetoErrorKind::EmptyConfset("symbolic conversion").into())
        }

        let width = self.econf.width();
        let sig = self.sig.clone().expect("Attempt to convert an untyped confset");
        let mut doms = Vec::with_capacity(width);

        debug!("Converting {} confs to a symbolic relation", self.econf.size());

        for i in 0..width {
            if let Some(quant) = self.pinned.get(i).and_then(|q| q.as_ref()) {
                doms.push(quant.clone());
            } else {
                let values: Vec<f64> = self
                    .econf
                    .column_values(i)
                    .iter()
                    .map(Value::as_f64)
                    .collect();

                let ordered = match sig.cols()[i] {
                    Sig::Real | Sig::Int => true,
                    Sig::UnorderedReal | Sig::UnorderedInt => false,
                };

                doms.push(Rc::new(Quantity::new(space, values, ordered)?));
            }
        }

        let mut rel = Relation::new(space, doms);

        for conf in self.econf.iter() {
            let mut indices = Vec::with_capacity(width);

            for i in 0..width {
                let value = conf
                    .get(i)
                    .expect("Attempt to index past the width of a configuration")
                    .as_f64();

                let index = rel.dom(i).index_of(value).ok_or_else(|| {
                    ParetoError::from(ParetoErrorKind::ValueMissingFromDomain(
                        format!("{:.3}", value),
                    ))
                })?;

                indices.push(index);
            }

            rel.insert(space, &indices);
        }

        self.rel = Some(rel);
        self.converted = true;

        Ok(())
    }

    /// Materializes the explicit form from the relation (when
    /// converted), caching it for iteration.  The set stays converted.
    pub fn materialize(&mut self, space: &Space) -> Result<&ExplConfset, ParetoError> {
        if self.converted {
            let rel = self.rel.as_ref().expect("Attempt to use a missing relation");
            let arity = rel.arity();

            self.econf = rel.to_confset(space, self.sig.as_ref())?;
            self.econf.width = self.econf.width.max(arity);
        }

        self.econf.visible =
            self.visible.iter().copied().filter(|&i| i < self.econf.width).collect();

        Ok(&self.econf)
    }

    /// Drops the relation after the explicit form was changed behind
    /// its back.
    fn invalidate(&mut self) {
        self.rel = None;
        self.converted = false;
    }

    fn hidden_mask(&self) -> BitVec {
        let width = self.width();
        let mut hidden = BitVec::from_elem(width, false);

        for i in 0..width {
            if !self.visible.contains(&i) {
                hidden.set(i, true);
            }
        }

        hidden
    }

    pub fn render(&self, space: &Space) -> Result<String, ParetoError> {
        if self.converted {
            let rel = self.rel.as_ref().expect("Attempt to use a missing relation");
            Ok(rel.to_confset(space, self.sig.as_ref())?.to_string())
        } else {
            Ok(self.econf.to_string())
        }
    }

    /// The distinct values observed in column `k` before conversion.
    fn observed_values(&self, k: usize) -> Vec<f64> {
        self.econf.column_values(k).iter().map(Value::as_f64).collect()
    }
}

fn concat_sig(a: Option<&ConfSig>, b: Option<&ConfSig>) -> Option<ConfSig> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let kind = if a.kind() == ConfKind::Real && b.kind() == ConfKind::Real {
                ConfKind::Real
            } else {
                ConfKind::Gen
            };

            let mut cols = a.cols().to_vec();
            cols.extend_from_slice(b.cols());

            Some(ConfSig { kind, cols })
        }
        _ => None,
    }
}

/// The symbolic Pareto calculator: the BDD-backed backend of the
/// algebra.
///
/// Owns the shared variable space and threads it through every
/// symbolic operation; the conjunction-ordering strategy is an
/// injectable performance knob.
#[derive(Default, Debug)]
pub struct SymCalculator {
    space: Space,
    sets: Vec<Option<SymConfset>>,
    and_order: AndOrder,
}

impl SymCalculator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(capacity: u16) -> Self {
        SymCalculator {
            space: Space::with_capacity(capacity),
            sets: Vec::new(),
            and_order: AndOrder::default(),
        }
    }

    /// Selects the pairwise-conjunction ordering strategy;
    /// smallest-first is the default.
    pub fn set_and_order(&mut self, order: AndOrder) {
        self.and_order = order;
    }

    #[inline]
    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn get(&self, c: CsId) -> Result<&SymConfset, ParetoError> {
        self.sets
            .get(c.to_index())
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    pub fn get_mut(&mut self, c: CsId) -> Result<&mut SymConfset, ParetoError> {
        self.sets
            .get_mut(c.to_index())
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    fn insert_set(&mut self, set: SymConfset) -> CsId {
        let id = CsId::from_index(self.sets.len());
        self.sets.push(Some(set));
        id
    }

    fn take_set(&mut self, c: CsId) -> Result<SymConfset, ParetoError> {
        self.sets
            .get_mut(c.to_index())
            .and_then(|slot| slot.take())
            .ok_or_else(|| ParetoErrorKind::ConfsetMissingForId(c).into())
    }

    fn put_back(&mut self, c: CsId, set: SymConfset) {
        self.sets[c.to_index()] = Some(set);
    }

    fn with_set_mut<T, F>(&mut self, c: CsId, f: F) -> Result<T, ParetoError>
    where
        F: FnOnce(&mut SymConfset, &mut Space) -> Result<T, ParetoError>,
    {
        let mut set = self.take_set(c)?;
        let result = f(&mut set, &mut self.space);
        self.put_back(c, set);
        result
    }

    fn convert(&mut self, c: CsId) -> Result<(), ParetoError> {
        self.with_set_mut(c, |set, space| set.to_symbolic(space))
    }

    fn binary_rel<F>(&mut self, c: CsId, d: CsId, f: F) -> Result<Relation, ParetoError>
    where
        F: FnOnce(&Relation, &Relation, &mut Space) -> Result<Relation, ParetoError>,
    {
        self.convert(c)?;
        self.convert(d)?;

        let cset = self.take_set(c)?;
        let crel = cset.rel.as_ref().expect("Attempt to use a missing relation");

        let result = if c == d {
            f(crel, crel, &mut self.space)
        } else {
            match self.take_set(d) {
                Ok(dset) => {
                    let drel =
                        dset.rel.as_ref().expect("Attempt to use a missing relation");
                    let result = f(crel, drel, &mut self.space);
                    self.put_back(d, dset);
                    result
                }
                Err(err) => Err(err),
            }
        };

        self.put_back(c, cset);
        result
    }

    /// Materializes the explicit form of `c`, then runs an explicit
    /// operation on it and invalidates the relation.
    fn explicit_fallback<T, F>(&mut self, c: CsId, f: F) -> Result<T, ParetoError>
    where
        F: FnOnce(&mut ExplConfset) -> Result<T, ParetoError>,
    {
        self.with_set_mut(c, |set, space| {
            set.materialize(space)?;

            let result = f(&mut set.econf)?;

            set.visible = set.econf.visible().clone();
            set.sig = set.econf.sig().cloned();
            set.pinned.resize(set.econf.width(), None);
            set.invalidate();

            Ok(result)
        })
    }
}

impl Calculator for SymCalculator {
    fn new_confset(&mut self) -> CsId {
        trace!("New symbolic confset");
        self.insert_set(SymConfset::new())
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
        self.with_set_mut(c, |set, space| set.remove(conf, space))
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
        Ok(self.get(c)?.size(&self.space))
    }

    fn width(&self, c: CsId) -> Result<usize, ParetoError> {
        Ok(self.get(c)?.width())
    }

    fn render(&mut self, c: CsId) -> Result<String, ParetoError> {
        self.get(c)?.render(&self.space)
    }

    fn clear(&mut self, c: CsId) -> Result<(), ParetoError> {
        self.get_mut(c)?.clear();
        Ok(())
    }

    fn confs(&mut self, c: CsId) -> Result<Vec<Conf>, ParetoError> {
        self.with_set_mut(c, |set, space| {
            if set.converted {
                set.materialize(space)?;
            }

            Ok(set.econf.iter().cloned().collect())
        })
    }

    fn prodgen<'a>(
        &'a mut self,
        cs: &[CsId],
    ) -> Result<Box<dyn Iterator<Item = Conf> + 'a>, ParetoError> {
        let mut ids = cs.iter();

        let &first = ids.next().ok_or_else(|| {
            ParetoError::from(ParetoErrorKind::EmptyConfset("a product generator"))
        })?;

        let mut acc = self.copy_confset(first)?;

        for &next in ids {
            let prod = self.multiply(acc, next)?;
            self.dispose(acc)?;
            acc = prod;
        }

        let confs = self.confs(acc)?;
        self.dispose(acc)?;

        Ok(Box::new(confs.into_iter()))
    }

    fn minimise(&mut self, c: CsId) -> Result<CsId, ParetoError> {
        if self.size(c)? == 0 {
            return Err(ParetoErrorKind::EmptyConfset("minimise").into())
        }

        let and_order = self.and_order;

        self.with_set_mut(c, |set, space| {
            if set.converted {
                let hidden = set.hidden_mask();
                let rel = set.rel.as_ref().expect("Attempt to use a missing relation");

                set.rel = Some(rel.minimise(space, &hidden, and_order)?);
            } else {
                set.econf.visible = set.visible.clone();
                simple_cull(&mut set.econf);
            }

            Ok(())
        })?;

        Ok(c)
    }

    fn multiply(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        if self.size(c)? == 0 || self.size(d)? == 0 {
            return Ok(self.new_confset())
        }

        let sig = concat_sig(self.get(c)?.sig(), self.get(d)?.sig());
        let rel = self.binary_rel(c, d, |a, b, space| a.product(b, space))?;

        Ok(self.insert_set(SymConfset::rel_born(rel, sig)))
    }

    fn abstract_quant(&mut self, c: CsId, k: usize) -> Result<CsId, ParetoError> {
        self.convert(c)?;

        self.with_set_mut(c, |set, _space| {
            let rel = set.rel.as_ref().expect("Attempt to use a missing relation");

            set.rel = Some(rel.abstract_quant(k)?);

            if let Some(ref mut sig) = set.sig {
                sig.remove_col(k);
            }
            if k < set.pinned.len() {
                set.pinned.remove(k);
            }

            let visible = std::mem::take(&mut set.visible);
            set.visible = visible
                .into_iter()
                .filter(|&i| i != k)
                .map(|i| if i > k { i - 1 } else { i })
                .collect();

            Ok(())
        })?;

        Ok(c)
    }

    fn abstract_range(&mut self, c: CsId, k: usize, l: usize) -> Result<CsId, ParetoError> {
        let width = self.width(c)?;

        if k >= width {
            return Err(ParetoErrorKind::ColumnOutOfRange { col: k, width }.into())
        }

        for _ in k..l.min(width) {
            self.abstract_quant(c, k)?;
        }

        Ok(c)
    }

    fn constrain(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        if c == d || self.size(c)? == 0 {
            return Ok(c)
        }

        if self.size(d)? == 0 {
            self.with_set_mut(c, |set, space| {
                if set.converted {
                    let rel =
                        set.rel.as_ref().expect("Attempt to use a missing relation");
                    set.rel = Some(Relation::new(space, rel.doms().to_vec()));
                } else {
                    set.econf.confs.clear();
                }

                Ok(())
            })?;

            return Ok(c)
        }

        let rel = self.binary_rel(c, d, |a, b, space| a.constrain(b, space))?;
        self.get_mut(c)?.rel = Some(rel);

        Ok(c)
    }

    fn constrain_where(
        &mut self,
        c: CsId,
        check: &dyn Fn(&Conf) -> bool,
    ) -> Result<CsId, ParetoError> {
        self.explicit_fallback(c, |econf| {
            constrain_where_set(econf, check);
            Ok(())
        })?;

        Ok(c)
    }

    fn constrain_above(&mut self, c: CsId, bound: &Conf) -> Result<CsId, ParetoError> {
        self.explicit_fallback(c, |econf| {
            constrain_above_set(econf, bound);
            Ok(())
        })?;

        Ok(c)
    }

    fn unite(&mut self, c: CsId, d: CsId) -> Result<CsId, ParetoError> {
        if self.size(c)? == 0 {
            return self.copy_confset(d)
        }
        if self.size(d)? == 0 {
            return self.copy_confset(c)
        }

        let sig = self.get(c)?.sig().cloned();
        let rel = self.binary_rel(c, d, |a, b, space| a.unite(b, space))?;

        Ok(self.insert_set(SymConfset::rel_born(rel, sig)))
    }

    fn add_derived(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Value,
    ) -> Result<CsId, ParetoError> {
        self.explicit_fallback(c, |econf| add_derived_set(econf, f))?;
        Ok(c)
    }

    fn add_derived_vector(
        &mut self,
        c: CsId,
        f: &dyn Fn(&Conf) -> Conf,
    ) -> Result<CsId, ParetoError> {
        self.explicit_fallback(c, |econf| add_derived_vector_set(econf, f))?;
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
        if self.size(p)? == 0 || self.size(c)? == 0 {
            return Ok(self.new_confset())
        }

        let sig = concat_sig(self.get(p)?.sig(), self.get(c)?.sig());
        let rel = self.binary_rel(p, c, |a, b, space| a.prodcons(b, k, l, f, space))?;

        Ok(self.insert_set(SymConfset::rel_born(rel, sig)))
    }

    fn join(
        &mut self,
        c: CsId,
        k: usize,
        d: CsId,
        l: usize,
        abstr: bool,
    ) -> Result<CsId, ParetoError> {
        if self.size(c)? == 0 || self.size(d)? == 0 {
            return Ok(self.new_confset())
        }

        let c_width = self.width(c)?;
        let mut sig = concat_sig(self.get(c)?.sig(), self.get(d)?.sig());

        if abstr {
            if let Some(ref mut sig) = sig {
                sig.remove_col(c_width + l);
            }
        }

        let rel = self.binary_rel(c, d, |a, b, space| a.join(b, k, l, abstr, space))?;

        Ok(self.insert_set(SymConfset::rel_born(rel, sig)))
    }

    /// Unifies the value domains of quantity `k` of `c` and quantity
    /// `l` of `d`: computes the union of both sides' observed values,
    /// builds one shared domain and binds it to both sides, so that
    /// later joins and arithmetic compare like-for-like encodings.
    ///
    /// Must be called before either set is converted; the pinned
    /// domain takes effect at conversion time.
    fn identical_quantities(
        &mut self,
        c: CsId,
        k: usize,
        d: CsId,
        l: usize,
    ) -> Result<(), ParetoError> {
        if self.size(c)? == 0 || self.size(d)? == 0 {
            return Err(ParetoErrorKind::EmptyConfset("identical_quantities").into())
        }

        if k >= self.width(c)? {
            return Err(ParetoErrorKind::ColumnOutOfRange {
                col: k,
                width: self.width(c)?,
            }
            .into())
        }
        if l >= self.width(d)? {
            return Err(ParetoErrorKind::ColumnOutOfRange {
                col: l,
                width: self.width(d)?,
            }
            .into())
        }

        if c == d && k == l {
            return Ok(())
        }

        let mut values = self.get(c)?.observed_values(k);
        values.extend(self.get(d)?.observed_values(l));

        let ordered = match self.get(c)?.sig() {
            Some(sig) => match sig.cols()[k] {
                Sig::Real | Sig::Int => true,
                Sig::UnorderedReal | Sig::UnorderedInt => false,
            },
            None => true,
        };

        let quant = Rc::new(Quantity::new(&mut self.space, values, ordered)?);

        debug!("Unified quantity domain {} over columns {} and {}", quant, k, l);

        if c == d {
            // two columns of one relation can't share a variable
            // block; give the second column a twin domain of its own
            let twin = self.space.alloc_block(quant.block_width())?;
            let second = Rc::new(quant.with_block(twin));

            let set = self.get_mut(c)?;
            set.pinned[k] = Some(quant);
            set.pinned[l] = Some(second);
        } else {
            self.get_mut(c)?.pinned[k] = Some(quant.clone());
            self.get_mut(d)?.pinned[l] = Some(quant);
        }

        Ok(())
    }
}
