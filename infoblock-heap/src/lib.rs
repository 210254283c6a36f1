// Per-record INFO storage. For each record:
//
//   text --tokenize--> tokens --plan--> CapacityPlan --build--> RecordBlock
//
// A block is five flat typed heaps sized exactly by its plan:
//
// - chars: one byte per flag field (the schema's static region), then the
//   bytes of every string value, separators dropped
// - ints, floats: static scalar/fixed-array slots, then per-record arrays
// - views: (offset, len) into chars for each string value
// - arrays: (field id, offset, length) descriptors, sorted by field id,
//   one per fixed array and one per field that spilled this record
//
// Missing numbers are stored as the type's minimum value and missing
// strings as a sentinel view; the accessor turns both into empty lists.
//
// Nothing here is shared between records, so records can be built on as
// many threads as you like against one `&Schema`.

mod access;
mod block;
mod heap;
mod ledger;
mod plan;
mod tokenize;

#[cfg(test)]
mod test;

pub use block::{build, BuildReport, RecordBlock};
pub use heap::{ArrayIndexEntry, HeapScalar, StrView};
pub use plan::{plan, resolve_one, CapacityPlan, FieldPlan, Placement};
pub use tokenize::{tokenize, InfoToken, InfoTokens, FIELD_SEPARATOR, ITEM_SEPARATOR, KEY_VALUE_SEPARATOR};

use infoblock_base::Result;
use infoblock_schema::Schema;

/// Tokenizes, plans and builds one record's block.
pub fn build_record(schema: &Schema, info: &str, alt_alleles: Option<usize>) -> Result<(RecordBlock, BuildReport)> {
    let tokens = tokenize(info)?;
    let plan = plan(schema, &tokens, alt_alleles);
    build(schema, &plan, &tokens)
}
