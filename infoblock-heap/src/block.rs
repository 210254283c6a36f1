use crate::{
    heap::{ArrayIndexEntry, Heap, HeapScalar, Parsed, StrView},
    ledger::Ledger,
    plan::{CapacityPlan, FieldPlan, Placement},
    tokenize::{InfoToken, InfoTokens},
};
use infoblock_base::{err, Bitmap, Result};
use infoblock_schema::{
    FieldId, HeapCounts, HeapKind, InternalRepresentation as R, ResourceHandle, Schema, SchemaEntry,
};
use tracing::warn;

/// One record's INFO data, packed into five exactly-sized typed heaps.
/// Immutable once built; read it through the typed accessor.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBlock {
    pub(crate) chars: Box<[u8]>,
    pub(crate) ints: Box<[i32]>,
    pub(crate) floats: Box<[f32]>,
    pub(crate) views: Box<[StrView]>,
    pub(crate) arrays: Box<[ArrayIndexEntry]>,
    pub(crate) present: Bitmap,
}

/// Tolerated data problems met while planning and building one record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct BuildReport {
    pub warnings: usize,
}

impl RecordBlock {
    pub fn heap_sizes(&self) -> HeapCounts {
        HeapCounts {
            chars: self.chars.len(),
            ints: self.ints.len(),
            floats: self.floats.len(),
            views: self.views.len(),
            arrays: self.arrays.len(),
        }
    }

    pub fn arrays(&self) -> &[ArrayIndexEntry] {
        &self.arrays
    }

    pub fn views(&self) -> &[StrView] {
        &self.views
    }

    pub fn present(&self) -> &Bitmap {
        &self.present
    }

    /// Diagnostic dump: heap sizes, which fields were present, the array
    /// table and the char heap (escaped).
    pub fn render_layout(&self, schema: &Schema) -> Result<String> {
        use std::fmt::Write;
        let name_of = |id: FieldId| {
            schema
                .entry_by_id(id)
                .map(|x| x.descriptor.name.as_str())
                .unwrap_or("?")
        };
        let mut s = String::new();
        let sizes = self.heap_sizes();
        for heap in HeapKind::ALL {
            writeln!(s, "- {}: {}", heap.name(), sizes.get(heap))?;
        }
        let present: Vec<&str> = self
            .present
            .iter_ones()
            .map(|i| name_of(FieldId(i as u64)))
            .collect();
        writeln!(s, "- present: {}", present.join(" "))?;
        for e in self.arrays.iter() {
            writeln!(s, "- array {} {} @{}+{}", e.field_id, name_of(e.field_id), e.offset, e.length)?;
        }
        writeln!(s, "- chars: \"{}\"", self.chars.escape_ascii())?;
        Ok(s)
    }
}

struct BlockBuilder {
    chars: Heap<u8>,
    ints: Heap<i32>,
    floats: Heap<f32>,
    views: Heap<StrView>,
    arrays: Heap<ArrayIndexEntry>,
    present: Bitmap,
    ledger: Ledger,
    warnings: usize,
}

/// Builds a record's block from its plan. Malformed-but-tokenizable data
/// has already been absorbed by the planner or is absorbed here as
/// missing values; any error returned is an internal inconsistency.
pub fn build(schema: &Schema, plan: &CapacityPlan, tokens: &InfoTokens) -> Result<(RecordBlock, BuildReport)> {
    if plan.fields.len() != schema.len() {
        return Err(err(format!(
            "plan has {} fields, schema has {}",
            plan.fields.len(),
            schema.len()
        )));
    }
    let layout = schema.layout();
    let mut b = BlockBuilder {
        chars: Heap::new(HeapKind::Chars, plan.counts.chars, layout.chars)?,
        ints: Heap::new(HeapKind::Ints, plan.counts.ints, layout.ints)?,
        floats: Heap::new(HeapKind::Floats, plan.counts.floats, layout.floats)?,
        views: Heap::new(HeapKind::Views, plan.counts.views, layout.views)?,
        arrays: Heap::new(HeapKind::Arrays, plan.counts.arrays, 0)?,
        present: Bitmap::new(schema.len()),
        ledger: Ledger::new(),
        warnings: 0,
    };
    // Schema order is ascending field id, so descriptors come out sorted.
    for (entry, fp) in schema.entries().iter().zip(plan.fields.iter()) {
        if fp.id != entry.handle.id {
            return Err(err(format!(
                "plan field {} out of step with schema field {}",
                fp.id, entry.handle.id
            )));
        }
        let tok = tokens.get(&entry.descriptor.name);
        if fp.placement.is_present() != tok.is_some() {
            return Err(err(format!(
                "plan and tokens disagree on presence of {}",
                entry.descriptor.name
            )));
        }
        b.ledger.enter_field(fp.id);
        b.write_field(entry, fp, tok)?;
        b.ledger.leave_field();
    }
    b.finish(plan, plan.warnings)
}

impl BlockBuilder {
    fn written(&self) -> HeapCounts {
        HeapCounts {
            chars: self.chars.written(),
            ints: self.ints.written(),
            floats: self.floats.written(),
            views: self.views.written(),
            arrays: self.arrays.written(),
        }
    }

    fn finish(self, plan: &CapacityPlan, plan_warnings: usize) -> Result<(RecordBlock, BuildReport)> {
        self.ledger.check(&plan.counts, &self.written())?;
        let arrays = self.arrays.into_boxed_slice();
        if let Some(w) = arrays.windows(2).find(|w| w[0].field_id >= w[1].field_id) {
            return Err(err(format!(
                "array table out of order at fields {} and {}",
                w[0].field_id, w[1].field_id
            )));
        }
        let block = RecordBlock {
            chars: self.chars.into_boxed_slice(),
            ints: self.ints.into_boxed_slice(),
            floats: self.floats.into_boxed_slice(),
            views: self.views.into_boxed_slice(),
            arrays,
            present: self.present,
        };
        let report = BuildReport {
            warnings: plan_warnings + self.warnings,
        };
        Ok((block, report))
    }

    fn write_field(&mut self, entry: &SchemaEntry, fp: &FieldPlan, tok: Option<&InfoToken>) -> Result<()> {
        let h = &entry.handle;
        let name = entry.descriptor.name.as_str();
        if fp.placement.is_present() {
            self.present.set(h.id.index(), true);
        }
        let tok = tok.copied().unwrap_or(InfoToken::bare());
        match h.repr {
            R::FixedBool | R::Unresolved => {
                let slot = self.chars.claim_static(h.static_range(), &mut self.ledger)?;
                self.chars.fill(slot, fp.placement.is_present() as u8)?;
            }
            R::FixedInt => {
                let w = write_scalar(&mut self.ints, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::FixedFloat => {
                let w = write_scalar(&mut self.floats, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::FixedString => {
                let slot = self.views.claim_static(h.static_range(), &mut self.ledger)?;
                let view = if fp.placement.items() == 0 {
                    StrView::EMPTY
                } else {
                    // Whole text, separators included.
                    let range = self.chars.claim(fp.chars, &mut self.ledger)?;
                    self.chars.set_slice(range.start, tok.text.as_bytes())?;
                    StrView::new(range)?
                };
                self.views.fill(slot, view)?;
            }
            R::FixedIntArray => {
                let w = write_fixed_array(&mut self.ints, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::FixedFloatArray => {
                let w = write_fixed_array(&mut self.floats, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::FixedStringArray => {
                let slots = self.views.claim_static(h.static_range(), &mut self.ledger)?;
                let n = fp.placement.items();
                self.write_string_items(slots.start, n, fp.chars, &tok)?;
                self.views.fill(slots.start + n..slots.end, StrView::MISSING)?;
                push_entry(&mut self.arrays, &mut self.ledger, h, slots.start, n)?;
            }
            R::AssumedScalarInt => {
                let w = write_assumed_scalar(&mut self.ints, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::AssumedScalarFloat => {
                let w = write_assumed_scalar(&mut self.floats, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::AssumedScalarString => {
                let slot = self.views.claim_static(h.static_range(), &mut self.ledger)?;
                match fp.placement {
                    Placement::Static { items: 1 } => {
                        self.write_string_items(slot.start, 1, fp.chars, &tok)?;
                    }
                    Placement::Spilled { items } => {
                        self.views.fill(slot, StrView::MISSING)?;
                        let views = self.views.claim(items, &mut self.ledger)?;
                        self.write_string_items(views.start, items, fp.chars, &tok)?;
                        push_entry(&mut self.arrays, &mut self.ledger, h, views.start, items)?;
                    }
                    _ => self.views.fill(slot, StrView::MISSING)?,
                }
            }
            R::DynamicIntArray => {
                let w = write_dynamic_array(&mut self.ints, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::DynamicFloatArray => {
                let w = write_dynamic_array(&mut self.floats, &mut self.arrays, &mut self.ledger, h, fp, &tok, name)?;
                self.warnings += w;
            }
            R::DynamicStringArray => {
                if let Placement::Spilled { items } = fp.placement {
                    let views = self.views.claim(items, &mut self.ledger)?;
                    self.write_string_items(views.start, items, fp.chars, &tok)?;
                    push_entry(&mut self.arrays, &mut self.ledger, h, views.start, items)?;
                }
            }
        }
        Ok(())
    }

    // Copies the first `n` items of `tok` into a fresh `chars`-byte run of
    // the char heap, writing one view per item starting at `view_at`.
    fn write_string_items(&mut self, view_at: usize, n: usize, chars: usize, tok: &InfoToken) -> Result<()> {
        let run = self.chars.claim(chars, &mut self.ledger)?;
        let mut pos = run.start;
        for (i, item) in tok.items().take(n).enumerate() {
            let bytes = item.as_bytes();
            self.chars.set_slice(pos, bytes)?;
            self.views.set(view_at + i, StrView::new(pos..pos + bytes.len())?)?;
            pos += bytes.len();
        }
        if pos != run.end {
            return Err(err(format!(
                "string run planned {} bytes, copied {} for field {:?}",
                run.len(),
                pos - run.start,
                self.ledger.current()
            )));
        }
        Ok(())
    }
}

fn parse_items<T: HeapScalar>(tok: &InfoToken, n: usize, name: &str) -> (Vec<T>, usize) {
    let mut invalid = 0;
    let vals = tok
        .items()
        .take(n)
        .map(|item| {
            let p = Parsed::<T>::parse(item);
            if p == Parsed::Invalid {
                invalid += 1;
            }
            p.slot()
        })
        .collect();
    if invalid > 0 {
        warn!(
            target: "infoblock",
            name,
            value = tok.text,
            invalid,
            "{} conversion failed, stored as missing",
            T::TYPE_NAME
        );
    }
    (vals, (invalid > 0) as usize)
}

fn push_entry(
    arrays: &mut Heap<ArrayIndexEntry>,
    ledger: &mut Ledger,
    h: &ResourceHandle,
    offset: usize,
    length: usize,
) -> Result<()> {
    let at = arrays.claim(1, ledger)?;
    arrays.set(
        at.start,
        ArrayIndexEntry {
            field_id: h.id,
            offset,
            length,
        },
    )
}

fn write_scalar<T: HeapScalar>(
    heap: &mut Heap<T>,
    ledger: &mut Ledger,
    h: &ResourceHandle,
    fp: &FieldPlan,
    tok: &InfoToken,
    name: &str,
) -> Result<usize> {
    let slot = heap.claim_static(h.static_range(), ledger)?;
    let (vals, warnings) = parse_items::<T>(tok, fp.placement.items().min(1), name);
    heap.fill(slot, vals.first().copied().unwrap_or(T::MISSING))?;
    Ok(warnings)
}

fn write_fixed_array<T: HeapScalar>(
    heap: &mut Heap<T>,
    arrays: &mut Heap<ArrayIndexEntry>,
    ledger: &mut Ledger,
    h: &ResourceHandle,
    fp: &FieldPlan,
    tok: &InfoToken,
    name: &str,
) -> Result<usize> {
    let slots = heap.claim_static(h.static_range(), ledger)?;
    let (vals, warnings) = parse_items::<T>(tok, fp.placement.items(), name);
    heap.set_slice(slots.start, &vals)?;
    heap.fill(slots.start + vals.len()..slots.end, T::MISSING)?;
    push_entry(arrays, ledger, h, slots.start, vals.len())?;
    Ok(warnings)
}

fn write_assumed_scalar<T: HeapScalar>(
    heap: &mut Heap<T>,
    arrays: &mut Heap<ArrayIndexEntry>,
    ledger: &mut Ledger,
    h: &ResourceHandle,
    fp: &FieldPlan,
    tok: &InfoToken,
    name: &str,
) -> Result<usize> {
    let slot = heap.claim_static(h.static_range(), ledger)?;
    match fp.placement {
        Placement::Spilled { items } => {
            // The sentinel in the scalar slot sends readers to the array table.
            heap.fill(slot, T::MISSING)?;
            let (vals, warnings) = parse_items::<T>(tok, items, name);
            let run = heap.claim(items, ledger)?;
            heap.set_slice(run.start, &vals)?;
            push_entry(arrays, ledger, h, run.start, items)?;
            Ok(warnings)
        }
        p => {
            let (vals, warnings) = parse_items::<T>(tok, p.items().min(1), name);
            heap.fill(slot, vals.first().copied().unwrap_or(T::MISSING))?;
            Ok(warnings)
        }
    }
}

fn write_dynamic_array<T: HeapScalar>(
    heap: &mut Heap<T>,
    arrays: &mut Heap<ArrayIndexEntry>,
    ledger: &mut Ledger,
    h: &ResourceHandle,
    fp: &FieldPlan,
    tok: &InfoToken,
    name: &str,
) -> Result<usize> {
    let Placement::Spilled { items } = fp.placement else {
        return Ok(0);
    };
    let (vals, warnings) = parse_items::<T>(tok, items, name);
    let run = heap.claim(items, ledger)?;
    heap.set_slice(run.start, &vals)?;
    push_entry(arrays, ledger, h, run.start, items)?;
    Ok(warnings)
}
