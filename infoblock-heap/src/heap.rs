use crate::ledger::Ledger;
use infoblock_base::{err, Result};
use infoblock_schema::{FieldId, HeapKind, MISSING_TEXT};
use std::{fmt::Debug, ops::Range, str::FromStr};

// A numeric type that can live in a fixed-width heap slot, with the value
// reserved to mean "nothing here".
pub trait HeapScalar: Copy + Default + PartialEq + FromStr + Debug + Send + Sync + 'static {
    const MISSING: Self;
    const TYPE_NAME: &'static str;
}

impl HeapScalar for i32 {
    const MISSING: i32 = i32::MIN;
    const TYPE_NAME: &'static str = "Integer";
}

impl HeapScalar for f32 {
    const MISSING: f32 = f32::MIN;
    const TYPE_NAME: &'static str = "Float";
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Parsed<T> {
    Value(T),
    Missing,
    Invalid,
}

impl<T: HeapScalar> Parsed<T> {
    // '.' is VCF for missing. A literal that parses to the sentinel is
    // refused rather than silently read back as missing.
    pub(crate) fn parse(item: &str) -> Self {
        if item == MISSING_TEXT || item.is_empty() {
            return Parsed::Missing;
        }
        match item.parse::<T>() {
            Ok(v) if v != T::MISSING => Parsed::Value(v),
            _ => Parsed::Invalid,
        }
    }

    pub(crate) fn slot(self) -> T {
        match self {
            Parsed::Value(v) => v,
            Parsed::Missing | Parsed::Invalid => T::MISSING,
        }
    }
}

/// An `(offset, length)` view of a string's bytes in the char heap.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct StrView {
    pub offset: u32,
    pub len: u32,
}

impl StrView {
    pub const MISSING: StrView = StrView {
        offset: u32::MAX,
        len: 0,
    };
    pub const EMPTY: StrView = StrView { offset: 0, len: 0 };

    pub fn new(range: Range<usize>) -> Result<Self> {
        Ok(StrView {
            offset: u32::try_from(range.start)?,
            len: u32::try_from(range.len())?,
        })
    }

    pub fn is_missing(&self) -> bool {
        *self == StrView::MISSING
    }

    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }
}

/// Where a field's array lives for one record. Kept sorted by `field_id`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ArrayIndexEntry {
    pub field_id: FieldId,
    pub offset: usize,
    pub length: usize,
}

impl ArrayIndexEntry {
    pub fn range(&self) -> Result<Range<usize>> {
        let end = self
            .offset
            .checked_add(self.length)
            .ok_or_else(|| err(format!("array entry for field {} overflows", self.field_id)))?;
        Ok(self.offset..end)
    }
}

// One fixed-capacity typed heap under construction. The first
// `static_len` elements are the schema's static slots; the rest is claimed
// front to back by per-record data. Every claim goes through the ledger.
#[derive(Debug)]
pub(crate) struct Heap<T> {
    kind: HeapKind,
    data: Vec<T>,
    static_len: usize,
    cursor: usize,
    written: usize,
}

impl<T: Copy + Default> Heap<T> {
    pub(crate) fn new(kind: HeapKind, capacity: usize, static_len: usize) -> Result<Self> {
        if static_len > capacity {
            return Err(err(format!(
                "{} heap: static region {} exceeds capacity {}",
                kind.name(),
                static_len,
                capacity
            )));
        }
        Ok(Heap {
            kind,
            data: vec![T::default(); capacity],
            static_len,
            cursor: static_len,
            written: 0,
        })
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    /// Claims a field's slots inside the static region.
    pub(crate) fn claim_static(&mut self, range: Range<usize>, ledger: &mut Ledger) -> Result<Range<usize>> {
        if range.end > self.static_len {
            return Err(err(format!(
                "{} heap: static slots {:?} of field {:?} outside static region of {}",
                self.kind.name(),
                range,
                ledger.current(),
                self.static_len
            )));
        }
        ledger.record(self.kind, range.clone());
        Ok(range)
    }

    /// Claims the next `n` elements of the dynamic region.
    pub(crate) fn claim(&mut self, n: usize, ledger: &mut Ledger) -> Result<Range<usize>> {
        let end = self.cursor + n;
        if end > self.data.len() {
            return Err(err(format!(
                "{} heap: claim of {} at {} by field {:?} exceeds capacity {}",
                self.kind.name(),
                n,
                self.cursor,
                ledger.current(),
                self.data.len()
            )));
        }
        let range = self.cursor..end;
        self.cursor = end;
        ledger.record(self.kind, range.clone());
        Ok(range)
    }

    pub(crate) fn set(&mut self, at: usize, val: T) -> Result<()> {
        let cap = self.data.len();
        let slot = self.data.get_mut(at).ok_or_else(|| {
            err(format!("{} heap: write at {} past capacity {}", self.kind.name(), at, cap))
        })?;
        *slot = val;
        self.written += 1;
        Ok(())
    }

    pub(crate) fn set_slice(&mut self, at: usize, vals: &[T]) -> Result<()> {
        let cap = self.data.len();
        let dst = at
            .checked_add(vals.len())
            .and_then(|end| self.data.get_mut(at..end))
            .ok_or_else(|| {
                err(format!(
                    "{} heap: write of {} at {} past capacity {}",
                    self.kind.name(),
                    vals.len(),
                    at,
                    cap
                ))
            })?;
        dst.copy_from_slice(vals);
        self.written += vals.len();
        Ok(())
    }

    pub(crate) fn fill(&mut self, range: Range<usize>, val: T) -> Result<()> {
        for i in range {
            self.set(i, val)?;
        }
        Ok(())
    }

    pub(crate) fn into_boxed_slice(self) -> Box<[T]> {
        self.data.into_boxed_slice()
    }
}
