use infoblock_base::{err, Result};
use infoblock_schema::{FieldId, HeapCounts, HeapKind};
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Claim {
    pub(crate) heap: HeapKind,
    pub(crate) range: Range<usize>,
    pub(crate) field: Option<FieldId>,
}

// Records every region handed out while a block is built, tagged with the
// field that asked for it, so the accounting pass can prove the heaps are
// tiled exactly: no gaps, no overlaps, nothing past the end.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    current: Option<FieldId>,
    pub(crate) claims: Vec<Claim>,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Ledger::default()
    }
    pub(crate) fn enter_field(&mut self, id: FieldId) {
        self.current = Some(id);
    }
    pub(crate) fn leave_field(&mut self) {
        self.current = None;
    }
    pub(crate) fn current(&self) -> Option<FieldId> {
        self.current
    }
    pub(crate) fn record(&mut self, heap: HeapKind, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.claims.push(Claim {
            heap,
            range,
            field: self.current,
        });
    }

    /// Checks that, for every heap, the claims tile `0..planned` exactly and
    /// that as many elements were written as were planned.
    pub(crate) fn check(&self, planned: &HeapCounts, written: &HeapCounts) -> Result<()> {
        for heap in HeapKind::ALL {
            let mut claims: Vec<&Claim> = self.claims.iter().filter(|c| c.heap == heap).collect();
            claims.sort_by_key(|c| c.range.start);
            let mut pos = 0;
            for c in claims {
                if c.range.start > pos {
                    return Err(err(format!(
                        "{} heap: {} elements at {} never claimed (next claim by field {:?})",
                        heap.name(),
                        c.range.start - pos,
                        pos,
                        c.field
                    )));
                }
                if c.range.start < pos {
                    return Err(err(format!(
                        "{} heap: claim {:?} by field {:?} overlaps previous claim ending at {}",
                        heap.name(),
                        c.range,
                        c.field,
                        pos
                    )));
                }
                pos = c.range.end;
            }
            let expected = planned.get(heap);
            if pos != expected {
                return Err(err(format!(
                    "{} heap: planned {} elements, claimed {}",
                    heap.name(),
                    expected,
                    pos
                )));
            }
            let actual = written.get(heap);
            if actual != expected {
                return Err(err(format!(
                    "{} heap: planned {} elements, wrote {}",
                    heap.name(),
                    expected,
                    actual
                )));
            }
        }
        Ok(())
    }
}
