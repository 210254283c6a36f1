use crate::{
    catalogue::Catalogue,
    field::FieldDescriptor,
    layout::{FieldId, HeapCounts, HeapKind},
    options::SchemaOptions,
    repr::{resolve, DynamicClass, InternalRepresentation, Primitive},
};
use rapidhash::RapidHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Where a registered field lives in every record block. Created once at
/// registration and never changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub id: FieldId,
    pub repr: InternalRepresentation,
    pub class: DynamicClass,
    pub primitive: Primitive,
    pub static_offset: usize,
    pub static_size: usize,
}

impl ResourceHandle {
    pub fn slot_heap(&self) -> HeapKind {
        HeapKind::for_slots(self.primitive)
    }

    pub fn static_range(&self) -> std::ops::Range<usize> {
        self.static_offset..self.static_offset + self.static_size
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaEntry {
    pub descriptor: FieldDescriptor,
    pub handle: ResourceHandle,
}

// Assigns permanent static slots to fields, one at a time, in the order
// they are offered. Owns the id counter; nothing here is process-global.
#[derive(Debug, Default)]
pub struct StaticPlanner {
    next_id: u64,
    layout: HeapCounts,
    entries: Vec<SchemaEntry>,
    by_name: RapidHashMap<String, usize>,
    pending_dynamic: Vec<FieldId>,
}

impl StaticPlanner {
    pub fn new() -> Self {
        StaticPlanner::default()
    }

    /// Registers one field. A name seen before is logged and skipped; an
    /// unmapped (type, arity) pair is logged and downgraded to a zero-size
    /// boolean that only reports presence.
    pub fn register_field(&mut self, descriptor: FieldDescriptor) -> Option<ResourceHandle> {
        if self.by_name.contains_key(&descriptor.name) {
            warn!(target: "infoblock", name = %descriptor.name, "field registered twice, keeping the first");
            return None;
        }
        let mut repr = resolve(descriptor.declared_type, descriptor.declared_arity);
        let mut static_size = match repr {
            InternalRepresentation::FixedIntArray
            | InternalRepresentation::FixedFloatArray
            | InternalRepresentation::FixedStringArray => {
                descriptor.declared_arity.fixed_len().unwrap_or(1)
            }
            InternalRepresentation::DynamicIntArray
            | InternalRepresentation::DynamicFloatArray
            | InternalRepresentation::DynamicStringArray => 0,
            _ => 1,
        };
        if repr == InternalRepresentation::Unresolved {
            warn!(
                target: "infoblock",
                name = %descriptor.name,
                ty = ?descriptor.declared_type,
                arity = ?descriptor.declared_arity,
                "no storage rule for declared type and arity, storing presence only"
            );
            repr = InternalRepresentation::FixedBool;
            static_size = 0;
        }
        let primitive = repr.primitive();
        let static_offset = self.layout.grow(HeapKind::for_slots(primitive), static_size);
        if repr.is_fixed_array() {
            // Fixed arrays always own exactly one descriptor.
            self.layout.grow(HeapKind::Arrays, 1);
        }
        let id = FieldId(self.next_id);
        self.next_id += 1;
        let handle = ResourceHandle {
            id,
            repr,
            class: repr.class(),
            primitive,
            static_offset,
            static_size,
        };
        if handle.class == DynamicClass::FixedDynamic {
            self.pending_dynamic.push(id);
        }
        debug!(target: "infoblock", name = %descriptor.name, ?handle, "registered field");
        self.by_name.insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(SchemaEntry { descriptor, handle });
        Some(handle)
    }

    pub fn layout(&self) -> &HeapCounts {
        &self.layout
    }

    pub fn finish(self) -> Schema {
        Schema {
            layout: self.layout,
            entries: self.entries,
            by_name: self.by_name,
            pending_dynamic: self.pending_dynamic,
        }
    }
}

/// The registered, immutable schema: static heap layout plus one handle per
/// subscribed field. Shared by reference across record builders.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    layout: HeapCounts,
    entries: Vec<SchemaEntry>,
    by_name: RapidHashMap<String, usize>,
    pending_dynamic: Vec<FieldId>,
}

impl Schema {
    pub fn register<'a>(fields: impl IntoIterator<Item = &'a FieldDescriptor>) -> Schema {
        let mut planner = StaticPlanner::new();
        for f in fields {
            planner.register_field(f.clone());
        }
        planner.finish()
    }

    /// Registers the subset of `catalogue` the options subscribe to.
    pub fn subscribe(catalogue: &Catalogue, options: &SchemaOptions) -> Schema {
        let selected = options.subscription().select(catalogue);
        let schema = Schema::register(selected);
        info!(
            target: "infoblock",
            "subscribed {} of {} INFO fields",
            schema.len(),
            catalogue.len()
        );
        schema
    }

    pub fn layout(&self) -> &HeapCounts {
        &self.layout
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.by_name.get(name).map(|i| &self.entries[*i])
    }

    pub fn entry_by_id(&self, id: FieldId) -> Option<&SchemaEntry> {
        self.entries.get(id.index())
    }

    pub fn handle(&self, name: &str) -> Option<&ResourceHandle> {
        self.entry(name).map(|e| &e.handle)
    }

    /// Fields registered with a static scalar slot that a record may
    /// override with an array.
    pub fn pending_dynamic(&self) -> &[FieldId] {
        &self.pending_dynamic
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
