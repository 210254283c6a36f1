use super::store;
use infoblock_schema::{Arity, DeclaredType, HeapKind, Value};
use test_log::test;

fn scenario_store() -> crate::InfoStore {
    store(&[
        ("AF", DeclaredType::Float, Arity::PerAltAllele),
        ("DP", DeclaredType::Integer, Arity::Scalar),
        ("FLAG1", DeclaredType::Boolean, Arity::Zero),
    ])
}

#[test]
fn test_flags_scalars_and_assumed_scalar() {
    let store = scenario_store();
    let (block, report) = store.build("AF=0.5;DP=20;FLAG1", Some(1)).unwrap();
    assert_eq!(report.warnings, 0);
    let view = store.view(&block);
    assert_eq!(view.get("AF").unwrap().unwrap().to_string(), "0.5");
    assert_eq!(view.get("DP").unwrap(), Some(Value::Ints(vec![Some(20)])));
    assert_eq!(view.get("FLAG1").unwrap(), Some(Value::Bool(true)));
    assert!(block.arrays().is_empty());
    assert_eq!(block.heap_sizes(), *store.schema().layout());
}

#[test]
fn test_assumed_scalar_spills_to_array() {
    let store = store(&[("AC", DeclaredType::Integer, Arity::PerAltAllele)]);
    let (block, report) = store.build("AC=3,5", Some(2)).unwrap();
    assert_eq!(report.warnings, 0);
    let ac = store.schema().handle("AC").unwrap();
    let entry = block.find_array(ac.id).unwrap();
    assert_eq!((entry.offset, entry.length), (1, 2));
    // One static slot, left at the missing sentinel, plus the two spilled items.
    assert_eq!(block.heap_sizes().get(HeapKind::Ints), 3);
    assert!(block.render_layout(store.schema()).unwrap().contains("AC"));
    assert_eq!(store.view(&block).get("AC").unwrap(), Some(Value::Ints(vec![Some(3), Some(5)])));
}

#[test]
fn test_flag_syntax_on_typed_field() {
    let store = scenario_store();
    let (block, report) = store.build("DP", None).unwrap();
    assert_eq!(report.warnings, 1);
    let view = store.view(&block);
    assert_eq!(view.get("DP").unwrap(), Some(Value::Ints(vec![])));
    assert!(view.is_present("DP"));
    assert_eq!(view.get("FLAG1").unwrap(), Some(Value::Bool(false)));
}

#[test]
fn test_empty_info() {
    let store = scenario_store();
    for text in ["", "."] {
        let (block, report) = store.build(text, None).unwrap();
        assert_eq!(report.warnings, 0);
        assert_eq!(block.heap_sizes(), *store.schema().layout());
        let view = store.view(&block);
        for (name, v) in view.fields().unwrap() {
            assert!(v.is_empty(), "{} -> {:?}", name, v);
            assert!(!view.is_present(name));
        }
        assert_eq!(view.to_info_text().unwrap(), ".");
    }
}

#[test]
fn test_unknown_names() {
    let store = scenario_store();
    let (block, _) = store.build("AF=0.5;XX=1;YY", None).unwrap();
    let view = store.view(&block);
    assert_eq!(view.get("XX").unwrap(), None);
    assert!(!view.is_present("YY"));
    assert_eq!(view.to_info_text().unwrap(), "AF=0.5");
}

#[test]
fn test_missing_is_distinguishable() {
    let store = store(&[
        ("DP", DeclaredType::Integer, Arity::Scalar),
        ("RANKS", DeclaredType::Float, Arity::Variable),
    ]);
    let (zero, _) = store.build("DP=0;RANKS=0,.", None).unwrap();
    let (missing, _) = store.build("DP=.", None).unwrap();
    let (low, _) = store.build("DP=-2147483647", None).unwrap();
    assert_eq!(store.view(&zero).get("DP").unwrap(), Some(Value::Ints(vec![Some(0)])));
    assert_eq!(store.view(&zero).get("RANKS").unwrap().unwrap().to_string(), "0,.");
    assert_eq!(store.view(&missing).get("DP").unwrap(), Some(Value::Ints(vec![])));
    assert_eq!(
        store.view(&low).get("DP").unwrap(),
        Some(Value::Ints(vec![Some(-2147483647)]))
    );
}

#[test]
fn test_malformed_text_is_rejected() {
    let store = scenario_store();
    let e = store.build("=3;DP=1", None).unwrap_err();
    assert_eq!(e.kind(), crate::ErrorKind::Parse);
    assert!(store.lookup("DP=1\tAF=2", "DP").is_err());
    assert_eq!(store.lookup("DP=7", "DP").unwrap(), Some(Value::Ints(vec![Some(7)])));
}
