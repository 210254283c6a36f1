use super::standard_schema;
use crate::{build, build_record, plan, tokenize, ArrayIndexEntry, Placement, StrView};
use infoblock_base::ErrorKind;
use infoblock_schema::HeapKind;
use test_log::test;

#[test]
fn test_heaps_sized_exactly() {
    let schema = standard_schema();
    let text = "AF=0.5;DP=20;DB;CIPOS=-5,7;ANN=a|b,c;SVTYPE=DEL;AC=3,5;CSQ=x;MQ=60.5;RANKS=1.5,.";
    let toks = tokenize(text).unwrap();
    let p = plan(&schema, &toks, Some(2));
    let (block, report) = build(&schema, &p, &toks).unwrap();
    assert_eq!(block.heap_sizes(), p.counts);
    assert_eq!(report.warnings, 0);
    assert_eq!(block.present().count(), 10);
}

#[test]
fn test_sentinel_and_array_entry_for_spilled_scalar() {
    let schema = standard_schema();
    let (block, _) = build_record(&schema, "AC=3,5", Some(2)).unwrap();
    let ac = schema.handle("AC").unwrap();
    assert_eq!(block.ints[ac.static_offset], i32::MIN);
    let e = block.find_array(ac.id).unwrap();
    assert_eq!(e.length, 2);
    assert_eq!(&block.ints[e.offset..e.offset + e.length], &[3, 5]);
    // CIPOS has its static descriptor even though absent.
    let cipos = schema.handle("CIPOS").unwrap();
    assert_eq!(
        block.find_array(cipos.id),
        Some(&ArrayIndexEntry {
            field_id: cipos.id,
            offset: cipos.static_offset,
            length: 0
        })
    );
    assert_eq!(block.arrays().len(), 2);
}

#[test]
fn test_string_packing() {
    let schema = standard_schema();
    let (block, _) = build_record(&schema, "DB;SVTYPE=a,b;ANN=xy,,z", None).unwrap();
    // DB's flag byte, then ANN items without separators, then SVTYPE
    // with its comma: field order, not text order.
    assert_eq!(&*block.chars, b"\x01xyza,b");
    let sv = schema.handle("SVTYPE").unwrap();
    assert_eq!(block.views()[sv.static_offset], StrView { offset: 4, len: 3 });
    let ann = block.find_array(schema.handle("ANN").unwrap().id).unwrap();
    let views = &block.views()[ann.offset..ann.offset + ann.length];
    assert_eq!(
        views,
        &[
            StrView { offset: 1, len: 2 },
            StrView { offset: 3, len: 0 },
            StrView { offset: 3, len: 1 }
        ]
    );
    // CSQ absent: its slot holds the missing view.
    assert!(block.views()[schema.handle("CSQ").unwrap().static_offset].is_missing());
}

#[test]
fn test_table_sorted_and_unique() {
    let schema = standard_schema();
    let (block, _) = build_record(&schema, "RANKS=1;ANN=q;CSQ=a,b,c;AC=1,2,3;AF=0.1,0.2", Some(3)).unwrap();
    let ids: Vec<u64> = block.arrays().iter().map(|e| e.field_id.0).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 6);
}

#[test]
fn test_plan_tampering_is_internal_error() {
    let schema = standard_schema();
    let toks = tokenize("AC=3,5;ANN=abc").unwrap();
    let good = plan(&schema, &toks, None);

    let mut over = good.clone();
    *over.counts.get_mut(HeapKind::Ints) += 1;
    let e = build(&schema, &over, &toks).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Internal);

    let mut under = good.clone();
    under.counts.chars -= 1;
    assert!(build(&schema, &under, &toks).unwrap_err().is_internal());

    let mut wrong_chars = good.clone();
    let ann = schema.handle("ANN").unwrap().id.index();
    wrong_chars.fields[ann].chars += 1;
    wrong_chars.counts.chars += 1;
    assert!(build(&schema, &wrong_chars, &toks).unwrap_err().is_internal());

    let mut wrong_presence = good.clone();
    wrong_presence.fields[schema.handle("DP").unwrap().id.index()].placement = Placement::Static { items: 1 };
    assert!(build(&schema, &wrong_presence, &toks).unwrap_err().is_internal());

    let mut short = good;
    short.fields.pop();
    assert!(build(&schema, &short, &toks).unwrap_err().is_internal());
}

#[test]
fn test_parse_error_rejects_record() {
    let schema = standard_schema();
    let e = build_record(&schema, "DP=5;AF=", None).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Parse);
}

#[test]
fn test_render_layout() {
    let schema = standard_schema();
    let (block, _) = build_record(&schema, "DB;AC=1,2;ANN=hello,world", None).unwrap();
    let s = block.render_layout(&schema).unwrap();
    assert!(s.contains("- ints: 6"));
    assert!(s.contains("AC @"));
    assert!(s.contains("ANN @"));
    assert!(s.contains("- present: DB ANN AC"));
    assert!(s.contains(r#"- chars: "\x01helloworld""#));
}
