use super::{schema, standard_schema};
use crate::{build_record, plan, tokenize};
use infoblock_base::ErrorKind;
use infoblock_schema::{Arity, DeclaredType, DynamicClass, Schema, Value};
use ordered_float::OrderedFloat;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Item {
    Int(Option<i32>),
    Float(Option<f32>),
    Str(String),
}

impl Item {
    fn render(&self) -> String {
        match self {
            Item::Int(Some(i)) => i.to_string(),
            Item::Float(Some(x)) => x.to_string(),
            Item::Int(None) | Item::Float(None) => ".".to_string(),
            Item::Str(s) => s.clone(),
        }
    }
}

fn arb_decl() -> impl Strategy<Value = (DeclaredType, Arity)> {
    prop_oneof![
        Just((DeclaredType::Boolean, Arity::Zero)),
        (
            prop_oneof![
                Just(DeclaredType::Integer),
                Just(DeclaredType::Float),
                Just(DeclaredType::String)
            ],
            prop_oneof![
                Just(Arity::Scalar),
                (2u32..5).prop_map(Arity::Fixed),
                Just(Arity::PerAltAllele),
                Just(Arity::PerAllAllele),
                Just(Arity::PerGenotype),
                Just(Arity::Variable),
            ]
        ),
    ]
}

fn arb_items(ty: DeclaredType, arity: Arity) -> BoxedStrategy<Vec<Item>> {
    let count: BoxedStrategy<usize> = match arity.fixed_len() {
        Some(n) => Just(n).boxed(),
        None => (1usize..5).boxed(),
    };
    let item: BoxedStrategy<Item> = match ty {
        DeclaredType::Integer => prop::option::of(-100_000i32..100_000).prop_map(Item::Int).boxed(),
        DeclaredType::Float => prop::option::of((-4000i32..4000).prop_map(|k| k as f32 / 4.0))
            .prop_map(Item::Float)
            .boxed(),
        DeclaredType::String => "[a-zA-Z|:_]{1,6}".prop_map(Item::Str).boxed(),
        DeclaredType::Boolean => Just(Item::Str(String::new())).boxed(),
    };
    count
        .prop_flat_map(move |n| prop::collection::vec(item.clone(), n))
        .boxed()
}

type Case = (Vec<(DeclaredType, Arity)>, Vec<Option<Vec<Item>>>);

fn arb_case() -> impl Strategy<Value = Case> {
    prop::collection::vec(arb_decl(), 0..12).prop_flat_map(|decls| {
        let vals: Vec<_> = decls
            .iter()
            .map(|(t, a)| prop::option::of(arb_items(*t, *a)))
            .collect();
        (Just(decls), vals)
    })
}

fn case_schema(decls: &[(DeclaredType, Arity)]) -> Schema {
    let names: Vec<String> = (0..decls.len()).map(|i| format!("F{}", i)).collect();
    let fields: Vec<(&str, DeclaredType, Arity)> = names
        .iter()
        .zip(decls)
        .map(|(n, (t, a))| (n.as_str(), *t, *a))
        .collect();
    schema(&fields)
}

fn case_text(decls: &[(DeclaredType, Arity)], vals: &[Option<Vec<Item>>]) -> String {
    let mut parts = Vec::new();
    for (i, (decl, v)) in decls.iter().zip(vals).enumerate() {
        match v {
            None => (),
            Some(_) if decl.0 == DeclaredType::Boolean => parts.push(format!("F{}", i)),
            Some(items) => {
                let rendered: Vec<String> = items.iter().map(Item::render).collect();
                parts.push(format!("F{}={}", i, rendered.join(",")));
            }
        }
    }
    parts.join(";")
}

fn expected(decl: (DeclaredType, Arity), v: &Option<Vec<Item>>) -> Value {
    let items = v.clone().unwrap_or_default();
    // A lone missing item in a scalar slot reads back as "missing", not [None].
    let lone_missing = items.len() == 1
        && matches!(items[0], Item::Int(None) | Item::Float(None))
        && decl.1.fixed_len().map_or(true, |n| n == 1)
        && decl.1 != Arity::Variable;
    match decl.0 {
        DeclaredType::Boolean => Value::Bool(v.is_some()),
        _ if lone_missing => match decl.0 {
            DeclaredType::Integer => Value::Ints(vec![]),
            _ => Value::Floats(vec![]),
        },
        DeclaredType::Integer => Value::Ints(
            items
                .iter()
                .map(|x| match x {
                    Item::Int(i) => *i,
                    _ => None,
                })
                .collect(),
        ),
        DeclaredType::Float => Value::Floats(
            items
                .iter()
                .map(|x| match x {
                    Item::Float(f) => f.map(OrderedFloat),
                    _ => None,
                })
                .collect(),
        ),
        DeclaredType::String => Value::Strings(items.iter().map(Item::render).collect()),
    }
}

proptest! {
    #[test]
    fn prop_no_overflow_and_exact_sizes((decls, vals) in arb_case()) {
        let schema = case_schema(&decls);
        let text = case_text(&decls, &vals);
        let toks = tokenize(&text).unwrap();
        let p = plan(&schema, &toks, None);
        let (block, report) = build_record(&schema, &text, None).unwrap();
        prop_assert_eq!(report.warnings, 0);
        let sizes = block.heap_sizes();
        prop_assert_eq!(sizes, p.counts);
        for e in schema.entries() {
            prop_assert!(e.handle.static_range().end <= sizes.get(e.handle.slot_heap()));
        }
        for a in block.arrays() {
            let h = &schema.entry_by_id(a.field_id).unwrap().handle;
            prop_assert!(a.offset + a.length <= sizes.get(h.slot_heap()));
        }
        for v in block.views().iter().filter(|v| !v.is_missing()) {
            prop_assert!(v.range().end <= sizes.chars);
        }
    }

    #[test]
    fn prop_round_trip((decls, vals) in arb_case()) {
        let schema = case_schema(&decls);
        let text = case_text(&decls, &vals);
        let (block, _) = build_record(&schema, &text, None).unwrap();
        for (i, e) in schema.entries().iter().enumerate() {
            let got = block.get(&e.handle).unwrap();
            prop_assert_eq!(&got, &expected(decls[i], &vals[i]), "field {} in {:?}", i, text);
        }
    }

    #[test]
    fn prop_idempotent_and_reencodable((decls, vals) in arb_case()) {
        let schema = case_schema(&decls);
        let text = case_text(&decls, &vals);
        let (a, _) = build_record(&schema, &text, None).unwrap();
        let (b, _) = build_record(&schema, &text, None).unwrap();
        prop_assert_eq!(&a, &b);
        let mut entries = Vec::new();
        for e in schema.entries() {
            let v = a.get(&e.handle).unwrap();
            prop_assert_eq!(&v, &b.get(&e.handle).unwrap());
            if let Some(s) = v.to_info_entry(&e.descriptor.name) {
                entries.push(s);
            }
        }
        let again = entries.join(";");
        let (c, _) = build_record(&schema, &again, None).unwrap();
        for e in schema.entries() {
            prop_assert_eq!(a.get(&e.handle).unwrap(), c.get(&e.handle).unwrap());
        }
    }

    #[test]
    fn prop_unique_ids((decls, vals) in arb_case()) {
        let schema = case_schema(&decls);
        let text = case_text(&decls, &vals);
        let (block, _) = build_record(&schema, &text, None).unwrap();
        let mut ids: Vec<u64> = schema.entries().iter().map(|e| e.handle.id.0).collect();
        ids.dedup();
        prop_assert_eq!(ids.len(), schema.len());
        let table: Vec<u64> = block.arrays().iter().map(|e| e.field_id.0).collect();
        prop_assert!(table.windows(2).all(|w| w[0] < w[1]));
        let fixed_dynamic = schema.entries().iter().filter(|e| e.handle.class == DynamicClass::FixedDynamic).count();
        prop_assert_eq!(schema.pending_dynamic().len(), fixed_dynamic);
    }
}

// Any mix of known and unknown keys, bare or with junk values: truncated
// and overlong arrays, several items in scalars, bad numbers, stray '='.
fn arb_messy_text() -> impl Strategy<Value = String> {
    let key = prop_oneof![
        prop::sample::select(vec![
            "AF", "DP", "DB", "CIPOS", "ANN", "SVTYPE", "AC", "CSQ", "MQ", "RANKS", "ODD",
        ])
        .prop_map(String::from),
        "[A-Z]{1,3}",
    ];
    let entry = (key, prop::option::of("[-0-9a-z.,|=]{0,8}")).prop_map(|(k, v)| match v {
        Some(v) => format!("{}={}", k, v),
        None => k,
    });
    prop::collection::vec(entry, 0..12).prop_map(|v| v.join(";"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn prop_messy_text_is_never_internal(text in arb_messy_text()) {
        let schema = standard_schema();
        match build_record(&schema, &text, None) {
            Ok((block, _)) => {
                let toks = tokenize(&text).unwrap();
                prop_assert_eq!(block.heap_sizes(), plan(&schema, &toks, None).counts);
                for e in schema.entries() {
                    prop_assert!(block.get(&e.handle).is_ok(), "{} in {:?}", e.descriptor.name, text);
                }
            }
            Err(e) => prop_assert_eq!(e.kind(), ErrorKind::Parse, "{:?}", text),
        }
    }
}

#[test]
fn test_expected_helper_sanity() {
    let e = expected((DeclaredType::Integer, Arity::PerAltAllele), &Some(vec![Item::Int(None)]));
    assert_eq!(e, Value::Ints(vec![]));
    let e = expected((DeclaredType::Integer, Arity::Variable), &Some(vec![Item::Int(None)]));
    assert_eq!(e, Value::Ints(vec![None]));
}
