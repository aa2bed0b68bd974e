use crate::error::{GatewayError, Result};
use crate::result::ResultSet;
use crate::row::Row;
use crate::value::Field;

/// Iterates a sequence of underlying [ResultSet]s as one logical stream,
/// transparently advancing across boundaries and reporting a global row
/// number (spec §4.8).
pub struct CombinedResultSet {
    sets: Vec<ResultSet>,
    current: usize,
    global_row_number: u64,
    pending: Option<Row>,
}

impl CombinedResultSet {
    pub fn new(sets: Vec<ResultSet>) -> Self {
        Self {
            sets,
            current: 0,
            global_row_number: 0,
            pending: None,
        }
    }

    pub fn row_number(&self) -> u64 {
        self.global_row_number
    }

    /// Delegated to the underlying result set currently positioned (spec
    /// §4.8: "column accessors, and metadata are delegated to the current
    /// underlying RS").
    pub fn fields(&self) -> &[Field] {
        self.sets.get(self.current).map(ResultSet::fields).unwrap_or(&[])
    }

    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if let Some(row) = self.pending.take() {
            return Ok(Some(row));
        }
        loop {
            if self.current >= self.sets.len() {
                return Ok(None);
            }
            match self.sets[self.current].next_row()? {
                Some(row) => {
                    self.global_row_number += 1;
                    return Ok(Some(row));
                }
                None => self.current += 1,
            }
        }
    }

    /// Preserves the upstream behavior documented as an open question in
    /// spec §8 (c): checking whether the cursor is after the last row
    /// actually advances it, by pulling the next row into a one-row buffer.
    /// Kept intentionally impure rather than "fixed" to preserve
    /// compatibility for callers that rely on the side effect.
    pub fn is_after_last(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(false);
        }
        match self.next_row()? {
            Some(row) => {
                self.pending = Some(row);
                Ok(false)
            }
            None => Ok(true),
        }
    }

    pub fn absolute(&mut self, _position: i64) -> Result<bool> {
        Err(GatewayError::FeatureNotSupported(
            "absolute cursor positioning is not supported".into(),
        ))
    }

    pub fn previous(&mut self) -> Result<bool> {
        Err(GatewayError::FeatureNotSupported(
            "backward iteration is not supported".into(),
        ))
    }

    pub fn insert_row(&mut self) -> Result<()> {
        Err(GatewayError::FeatureNotSupported("insert-row is not supported".into()))
    }

    /// Closes every wrapped result set, collecting failures into a single
    /// chained error (first wins as head, rest as subsequent causes, per
    /// spec §4.8 and §7).
    pub fn close(&mut self) -> Result<()> {
        let mut errors = Vec::new();
        for rs in self.sets.iter_mut() {
            if let Err(e) = rs.close() {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            let mut iter = errors.into_iter();
            let head = iter.next().unwrap();
            Err(head.chain_with(iter.collect()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TypeCode, Value};
    use std::sync::Arc;

    fn rs_with_rows(values: Vec<i32>) -> ResultSet {
        let fields = vec![Field::new("a", TypeCode::Int32)];
        let rows = values
            .into_iter()
            .map(|v| Row::new(Arc::new(fields.clone()), vec![Value::Int32(v)]))
            .collect();
        ResultSet::from_rows(fields, rows)
    }

    #[test]
    fn advances_across_result_set_boundaries_with_global_row_numbers() {
        let mut combined = CombinedResultSet::new(vec![rs_with_rows(vec![1, 2]), rs_with_rows(vec![3])]);
        let mut seen = Vec::new();
        while let Some(row) = combined.next_row().unwrap() {
            seen.push(row.get(0).unwrap().as_i64());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(combined.row_number(), 3);
    }

    #[test]
    fn is_after_last_advances_the_cursor_as_a_side_effect() {
        let mut combined = CombinedResultSet::new(vec![rs_with_rows(vec![1])]);
        assert!(!combined.is_after_last().unwrap());
        assert_eq!(combined.row_number(), 1);
        let row = combined.next_row().unwrap().unwrap();
        assert_eq!(row.get(0).unwrap().as_i64(), 1);
        assert!(combined.is_after_last().unwrap());
        assert!(combined.next_row().unwrap().is_none());
    }

    #[test]
    fn absolute_positioning_is_feature_not_supported() {
        let mut combined = CombinedResultSet::new(vec![rs_with_rows(vec![1])]);
        assert!(matches!(combined.absolute(0), Err(GatewayError::FeatureNotSupported(_))));
    }

    #[test]
    fn close_collects_errors_from_every_wrapped_set() {
        let mut first = rs_with_rows(vec![1]);
        first.add_post_close_hook(|| Err(GatewayError::client("a")));
        let mut second = rs_with_rows(vec![2]);
        second.add_post_close_hook(|| Err(GatewayError::client("b")));
        let mut combined = CombinedResultSet::new(vec![first, second]);
        let err = combined.close().unwrap_err();
        match err {
            GatewayError::Chained { head, causes } => {
                assert!(head.to_string().contains('a'));
                assert_eq!(causes.len(), 1);
            }
            other => panic!("expected chained error, got {other:?}"),
        }
    }
}
