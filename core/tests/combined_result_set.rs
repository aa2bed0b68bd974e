//! E6 (spec §8): three result sets sized 0, 2, 1 iterate as one sequence of
//! three rows, and close() closes every wrapped set.

use std::sync::Arc;

use gatewaydb_core::result::ResultSet;
use gatewaydb_core::row::Row;
use gatewaydb_core::value::{Field, TypeCode, Value};
use gatewaydb_core::wrapper::CombinedResultSet;

fn rs(values: Vec<i32>) -> ResultSet {
    let fields = vec![Field::new("n", TypeCode::Int32)];
    let rows = values
        .into_iter()
        .map(|v| Row::new(Arc::new(fields.clone()), vec![Value::Int32(v)]))
        .collect();
    ResultSet::from_rows(fields, rows)
}

#[test]
fn e6_three_sets_sized_0_2_1_iterate_as_one_sequence() {
    let mut combined = CombinedResultSet::new(vec![rs(vec![]), rs(vec![1, 2]), rs(vec![3])]);
    let mut seen = Vec::new();
    while let Some(row) = combined.next_row().unwrap() {
        seen.push(row.get(0).unwrap().as_i64());
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(combined.row_number(), 3);
}

#[test]
fn e6_close_closes_every_wrapped_set_even_the_empty_one() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let closed_mask = Arc::new(AtomicUsize::new(0));
    let mut first = rs(vec![]);
    let mut second = rs(vec![1, 2]);
    let mut third = rs(vec![3]);

    let (a, b, c) = (closed_mask.clone(), closed_mask.clone(), closed_mask.clone());
    first.add_post_close_hook(move || {
        a.fetch_or(1, Ordering::SeqCst);
        Ok(())
    });
    second.add_post_close_hook(move || {
        b.fetch_or(2, Ordering::SeqCst);
        Ok(())
    });
    third.add_post_close_hook(move || {
        c.fetch_or(4, Ordering::SeqCst);
        Ok(())
    });

    let mut combined = CombinedResultSet::new(vec![first, second, third]);
    combined.close().unwrap();
    assert_eq!(closed_mask.load(Ordering::SeqCst), 0b111);
}
