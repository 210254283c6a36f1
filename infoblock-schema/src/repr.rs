use crate::field::{Arity, DeclaredType};
use serde::{Deserialize, Serialize};

// Which of the typed heaps a field's slots live in. Strings occupy the
// string-view heap; their bytes go in the char heap alongside booleans.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    String,
}

/// Allocation class of a field.
///
/// - `Fixed`: size known at schema time and constant across records.
/// - `FixedDynamic`: a one-element static slot is reserved, but a record may
///   carry more and spill into the array table.
/// - `Dynamic`: no static slot; every record resolves its own size.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DynamicClass {
    Fixed,
    FixedDynamic,
    Dynamic,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum InternalRepresentation {
    FixedBool,
    FixedInt,
    FixedFloat,
    FixedString,
    FixedIntArray,
    FixedFloatArray,
    FixedStringArray,
    AssumedScalarInt,
    AssumedScalarFloat,
    AssumedScalarString,
    DynamicIntArray,
    DynamicFloatArray,
    DynamicStringArray,
    Unresolved,
}

impl InternalRepresentation {
    pub fn primitive(&self) -> Primitive {
        use InternalRepresentation::*;
        match self {
            FixedBool | Unresolved => Primitive::Bool,
            FixedInt | FixedIntArray | AssumedScalarInt | DynamicIntArray => Primitive::Int,
            FixedFloat | FixedFloatArray | AssumedScalarFloat | DynamicFloatArray => Primitive::Float,
            FixedString | FixedStringArray | AssumedScalarString | DynamicStringArray => {
                Primitive::String
            }
        }
    }

    pub fn class(&self) -> DynamicClass {
        use InternalRepresentation::*;
        match self {
            AssumedScalarInt | AssumedScalarFloat | AssumedScalarString => DynamicClass::FixedDynamic,
            DynamicIntArray | DynamicFloatArray | DynamicStringArray => DynamicClass::Dynamic,
            _ => DynamicClass::Fixed,
        }
    }

    pub fn is_fixed_array(&self) -> bool {
        use InternalRepresentation::*;
        matches!(self, FixedIntArray | FixedFloatArray | FixedStringArray)
    }
}

// Coarse arity buckets the resolution table matches on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ArityClass {
    Zero,
    One,
    Many,
    PerAllele,
    Variable,
}

impl From<Arity> for ArityClass {
    fn from(a: Arity) -> Self {
        match a {
            Arity::Zero => ArityClass::Zero,
            Arity::Scalar => ArityClass::One,
            Arity::Fixed(_) => ArityClass::Many,
            Arity::PerAltAllele | Arity::PerAllAllele | Arity::PerGenotype => ArityClass::PerAllele,
            Arity::Variable => ArityClass::Variable,
        }
    }
}

// First match wins.
const RULES: &[(DeclaredType, ArityClass, InternalRepresentation)] = {
    use ArityClass as A;
    use DeclaredType as T;
    use InternalRepresentation as R;
    &[
        (T::Boolean, A::Zero, R::FixedBool),
        (T::Integer, A::One, R::FixedInt),
        (T::Float, A::One, R::FixedFloat),
        (T::String, A::One, R::FixedString),
        (T::Integer, A::Many, R::FixedIntArray),
        (T::Float, A::Many, R::FixedFloatArray),
        (T::String, A::Many, R::FixedStringArray),
        (T::Integer, A::PerAllele, R::AssumedScalarInt),
        (T::Float, A::PerAllele, R::AssumedScalarFloat),
        (T::String, A::PerAllele, R::AssumedScalarString),
        (T::Integer, A::Variable, R::DynamicIntArray),
        (T::Float, A::Variable, R::DynamicFloatArray),
        (T::String, A::Variable, R::DynamicStringArray),
    ]
};

/// Maps a declared (type, arity) pair to its storage representation. Pairs
/// with no rule come back `Unresolved`; the caller decides the fallback.
pub fn resolve(declared_type: DeclaredType, declared_arity: Arity) -> InternalRepresentation {
    let class = ArityClass::from(declared_arity);
    RULES
        .iter()
        .find(|(t, a, _)| *t == declared_type && *a == class)
        .map(|(_, _, r)| *r)
        .unwrap_or(InternalRepresentation::Unresolved)
}
