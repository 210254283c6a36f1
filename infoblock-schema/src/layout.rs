use crate::repr::Primitive;
use serde::{Deserialize, Serialize};

/// Identity of a registered field. Assigned densely from zero in
/// registration order, so it doubles as the field's index in its schema.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u64);

impl FieldId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum HeapKind {
    Chars,
    Ints,
    Floats,
    Views,
    Arrays,
}

impl HeapKind {
    pub const ALL: [HeapKind; 5] = [
        HeapKind::Chars,
        HeapKind::Ints,
        HeapKind::Floats,
        HeapKind::Views,
        HeapKind::Arrays,
    ];

    /// The heap holding a primitive's slots (not its string bytes).
    pub fn for_slots(p: Primitive) -> HeapKind {
        match p {
            Primitive::Bool => HeapKind::Chars,
            Primitive::Int => HeapKind::Ints,
            Primitive::Float => HeapKind::Floats,
            Primitive::String => HeapKind::Views,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HeapKind::Chars => "chars",
            HeapKind::Ints => "ints",
            HeapKind::Floats => "floats",
            HeapKind::Views => "views",
            HeapKind::Arrays => "arrays",
        }
    }
}

// Element counts for the five heaps of a record block. At schema time this
// is the static layout; per record, the same counters grown by dynamic
// contributions become the exact allocation sizes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HeapCounts {
    pub chars: usize,
    pub ints: usize,
    pub floats: usize,
    pub views: usize,
    pub arrays: usize,
}

impl HeapCounts {
    pub fn get(&self, heap: HeapKind) -> usize {
        match heap {
            HeapKind::Chars => self.chars,
            HeapKind::Ints => self.ints,
            HeapKind::Floats => self.floats,
            HeapKind::Views => self.views,
            HeapKind::Arrays => self.arrays,
        }
    }

    pub fn get_mut(&mut self, heap: HeapKind) -> &mut usize {
        match heap {
            HeapKind::Chars => &mut self.chars,
            HeapKind::Ints => &mut self.ints,
            HeapKind::Floats => &mut self.floats,
            HeapKind::Views => &mut self.views,
            HeapKind::Arrays => &mut self.arrays,
        }
    }

    /// Bumps a heap counter, returning the offset the new run starts at.
    pub fn grow(&mut self, heap: HeapKind, n: usize) -> usize {
        let c = self.get_mut(heap);
        let off = *c;
        *c += n;
        off
    }

    pub fn total(&self) -> usize {
        HeapKind::ALL.iter().map(|h| self.get(*h)).sum()
    }
}
