//! Serializer output scenarios (spec §8, E5: exact-byte TSV escaping) plus a
//! CSV sanity check at the integration level.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use gatewaydb_core::option::Config;
use gatewaydb_core::result::ResultSet;
use gatewaydb_core::row::Row;
use gatewaydb_core::serializer::by_name;
use gatewaydb_core::value::{Field, TypeCode, Value};

fn fields(names: &[&str]) -> Vec<Field> {
    names.iter().map(|n| Field::new(*n, TypeCode::String)).collect()
}

#[test]
fn e5_tsv_escapes_every_control_character_exactly() {
    let flds = fields(&["a\tb", "\\c"]);
    let rows = vec![
        Row::new(Arc::new(flds.clone()), vec![Value::Null, Value::Null]),
        Row::new(
            Arc::new(flds.clone()),
            vec![
                Value::String("1\t2\n3".to_string(), None),
                Value::String("\t".to_string(), None),
            ],
        ),
    ];
    let mut result = ResultSet::from_rows(flds, rows);
    let mut out = Vec::new();
    by_name("tsv", &mut result, &mut out, &Config::new()).unwrap();

    let expected = "a\\tb\t\\\\c\n\t\n1\\t2\\n3\t\\t\n";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn csv_quotes_only_the_cell_that_needs_it() {
    let flds = fields(&["a", "b"]);
    let rows = vec![Row::new(
        Arc::new(flds.clone()),
        vec![Value::String("x,y".to_string(), None), Value::String("z".to_string(), None)],
    )];
    let mut result = ResultSet::from_rows(flds, rows);
    let mut out = Vec::new();
    by_name("csv", &mut result, &mut out, &Config::new()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a,b\n\"x,y\",z\n");
}

#[test]
fn unknown_format_name_is_a_client_error() {
    let flds = fields(&["a"]);
    let mut result = ResultSet::from_rows(flds, Vec::new());
    let mut out = Vec::new();
    let err = by_name("no-such-format", &mut result, &mut out, &Config::new()).unwrap_err();
    assert!(err.to_string().contains("no-such-format"));
}
