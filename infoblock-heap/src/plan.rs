use crate::tokenize::{InfoToken, InfoTokens};
use infoblock_schema::{
    Arity, DynamicClass, FieldId, HeapCounts, HeapKind, InternalRepresentation, Primitive,
    ResourceHandle, Schema, SchemaEntry,
};
use tracing::{debug, warn};

/// How one field of one record will be stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Placement {
    /// No token. Static slots are filled with the missing value.
    Absent,
    /// Present, stored in the field's static slots; `items` of them hold
    /// data. For flags, `items` is 1.
    Static { items: usize },
    /// Present, stored as `items` elements past the static region plus one
    /// array descriptor.
    Spilled { items: usize },
}

impl Placement {
    pub fn is_present(&self) -> bool {
        !matches!(self, Placement::Absent)
    }
    pub fn items(&self) -> usize {
        match self {
            Placement::Absent => 0,
            Placement::Static { items } | Placement::Spilled { items } => *items,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FieldPlan {
    pub id: FieldId,
    pub placement: Placement,
    // String bytes this field adds to the char heap.
    pub chars: usize,
}

/// Exact heap sizes for one record, plus the per-field decisions that
/// produced them. `fields` is in schema order, one entry per field.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapacityPlan {
    pub counts: HeapCounts,
    pub fields: Vec<FieldPlan>,
    pub warnings: usize,
}

impl CapacityPlan {
    pub fn dynamic_growth(&self, schema: &Schema) -> usize {
        self.counts.total() - schema.layout().total()
    }
}

/// For an assumed-scalar field, whether this token overrides the reserved
/// scalar slot and must spill into an array.
pub fn resolve_one(handle: &ResourceHandle, token: &InfoToken) -> bool {
    handle.class == DynamicClass::FixedDynamic && token.count > handle.static_size
}

/// Per-record planning: starts from the schema's static counters and adds
/// what this record's tokens need on top. `alt_alleles`, when known, is
/// only used to note per-allele fields whose item count disagrees.
pub fn plan(schema: &Schema, tokens: &InfoTokens, alt_alleles: Option<usize>) -> CapacityPlan {
    let mut plan = CapacityPlan {
        counts: *schema.layout(),
        fields: Vec::with_capacity(schema.len()),
        warnings: 0,
    };
    for entry in schema.entries() {
        let h = &entry.handle;
        let Some(tok) = tokens.get(&entry.descriptor.name) else {
            plan.fields.push(FieldPlan {
                id: h.id,
                placement: Placement::Absent,
                chars: 0,
            });
            continue;
        };
        note_allele_mismatch(entry, tok, alt_alleles);
        let placement = match h.class {
            DynamicClass::Fixed => plan_fixed(entry, tok, &mut plan.warnings),
            DynamicClass::FixedDynamic => {
                if resolve_one(h, tok) {
                    Placement::Spilled { items: tok.count }
                } else {
                    if tok.is_flag() {
                        warn_flag_syntax(entry, &mut plan.warnings);
                    }
                    Placement::Static { items: tok.count }
                }
            }
            DynamicClass::Dynamic => {
                if tok.is_flag() {
                    warn_flag_syntax(entry, &mut plan.warnings);
                }
                Placement::Spilled { items: tok.count }
            }
        };
        if let Placement::Spilled { items } = placement {
            plan.counts.grow(h.slot_heap(), items);
            plan.counts.grow(HeapKind::Arrays, 1);
        }
        let chars = if h.primitive == Primitive::String {
            string_chars(h, tok, placement)
        } else {
            0
        };
        plan.counts.grow(HeapKind::Chars, chars);
        plan.fields.push(FieldPlan {
            id: h.id,
            placement,
            chars,
        });
    }
    debug!(
        target: "infoblock",
        growth = plan.dynamic_growth(schema),
        warnings = plan.warnings,
        "planned record"
    );
    plan
}

fn plan_fixed(entry: &SchemaEntry, tok: &InfoToken, warnings: &mut usize) -> Placement {
    let h = &entry.handle;
    let name = entry.descriptor.name.as_str();
    match h.repr {
        InternalRepresentation::FixedBool => {
            if !tok.is_flag() {
                *warnings += 1;
                warn!(target: "infoblock", name, value = tok.text, "flag carries a value, treating as set");
            }
            Placement::Static { items: 1 }
        }
        InternalRepresentation::FixedString => {
            if tok.is_flag() {
                warn_flag_syntax(entry, warnings);
            } else if tok.count > 1 {
                // The separator is part of the string.
                debug!(target: "infoblock", name, value = tok.text, "separator inside scalar string");
            }
            Placement::Static {
                items: tok.count.min(1),
            }
        }
        InternalRepresentation::FixedInt | InternalRepresentation::FixedFloat => {
            if tok.is_flag() {
                warn_flag_syntax(entry, warnings);
            } else if tok.count > 1 {
                *warnings += 1;
                warn!(
                    target: "infoblock",
                    name,
                    count = tok.count,
                    "scalar field carries several items, keeping the first"
                );
            }
            Placement::Static {
                items: tok.count.min(1),
            }
        }
        _ => {
            // Fixed-length arrays.
            if tok.count != h.static_size {
                *warnings += 1;
                warn!(
                    target: "infoblock",
                    name,
                    declared = h.static_size,
                    found = tok.count,
                    "item count differs from declared Number"
                );
            }
            Placement::Static {
                items: tok.count.min(h.static_size),
            }
        }
    }
}

fn warn_flag_syntax(entry: &SchemaEntry, warnings: &mut usize) {
    *warnings += 1;
    warn!(
        target: "infoblock",
        name = %entry.descriptor.name,
        ty = ?entry.descriptor.declared_type,
        "typed field written as a bare flag, treating as missing"
    );
}

fn note_allele_mismatch(entry: &SchemaEntry, tok: &InfoToken, alt_alleles: Option<usize>) {
    let arity = entry.descriptor.declared_arity;
    if !matches!(arity, Arity::PerAltAllele | Arity::PerAllAllele) {
        return;
    }
    if let Some(expected) = alt_alleles.and_then(|n| arity.expected_len(n)) {
        if tok.count != expected {
            debug!(
                target: "infoblock",
                name = %entry.descriptor.name,
                expected,
                found = tok.count,
                "per-allele field count differs from allele count"
            );
        }
    }
}

// Scalar strings keep their separators, the other string forms drop them.
fn string_chars(h: &ResourceHandle, tok: &InfoToken, placement: Placement) -> usize {
    match placement {
        Placement::Absent => 0,
        _ if h.repr == InternalRepresentation::FixedString => {
            if placement.items() == 0 {
                0
            } else {
                tok.text.len()
            }
        }
        p => tok.item_bytes(p.items()),
    }
}
