// The schema side of INFO storage: what a header declares, how each
// declaration is represented, and where its static slots sit in every
// record block. Everything here is built once, before any record is read,
// and is immutable afterwards.

mod catalogue;
mod field;
mod layout;
mod options;
mod planner;
mod repr;
mod value;

#[cfg(test)]
mod test;

pub use catalogue::Catalogue;
pub use field::{Arity, DeclaredType, FieldDescriptor, DEFAULT_FILE_FORMAT};
pub use layout::{FieldId, HeapCounts, HeapKind};
pub use options::{SchemaOptions, Subscription, SUBSCRIBE_NONE};
pub use planner::{ResourceHandle, Schema, SchemaEntry, StaticPlanner};
pub use repr::{resolve, DynamicClass, InternalRepresentation, Primitive};
pub use value::{Value, ITEM_SEPARATOR, MISSING_TEXT};
