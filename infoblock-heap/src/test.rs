use infoblock_schema::{Arity, DeclaredType, FieldDescriptor, Schema};

mod block;
mod properties;

pub(crate) fn schema(fields: &[(&str, DeclaredType, Arity)]) -> Schema {
    let descs: Vec<FieldDescriptor> = fields
        .iter()
        .map(|(n, t, a)| FieldDescriptor::new(*n, *t, *a))
        .collect();
    Schema::register(&descs)
}

pub(crate) fn standard_schema() -> Schema {
    use Arity::*;
    use DeclaredType::*;
    schema(&[
        ("AF", Float, PerAltAllele),
        ("DP", Integer, Scalar),
        ("DB", Boolean, Zero),
        ("CIPOS", Integer, Fixed(2)),
        ("ANN", String, Variable),
        ("SVTYPE", String, Scalar),
        ("AC", Integer, PerAltAllele),
        ("CSQ", String, PerAllAllele),
        ("MQ", Float, Scalar),
        ("RANKS", Float, Variable),
        ("ODD", Integer, Zero),
    ])
}
