//! Result model (spec §3, component B): a lazy, possibly-infinite row stream
//! or a single scalar payload, with ordered post-close hooks.

use std::io::Read;
use std::sync::Arc;

use crate::error::{GatewayError, Result as GwResult};
use crate::row::Row;
use crate::value::Field;

/// Source of rows behind a [ResultSet]. Implementors decide whether
/// [RowSource::reset] is supported; the default says it isn't, which makes a
/// [ResultSet] built from it non-restartable.
pub trait RowSource: Send {
    fn next(&mut self) -> GwResult<Option<Row>>;

    fn reset(&mut self) -> GwResult<()> {
        Err(GatewayError::FeatureNotSupported(
            "result set is not restartable".into(),
        ))
    }
}

/// An in-memory row source, trivially restartable. Used for interpreter
/// outputs that are already fully materialized (spec §4.5 Listener results).
pub struct VecRowSource {
    rows: Vec<Row>,
    pos: usize,
}

impl VecRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, pos: 0 }
    }
}

impl RowSource for VecRowSource {
    fn next(&mut self) -> GwResult<Option<Row>> {
        if self.pos < self.rows.len() {
            let row = self.rows[self.pos].clone();
            self.pos += 1;
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    fn reset(&mut self) -> GwResult<()> {
        self.pos = 0;
        Ok(())
    }
}

/// A single scalar payload, used by the binary serializer (spec §3, §4.9).
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
    Stream(Box<dyn Read + Send>),
}

type PostCloseHook = Box<dyn FnMut() -> GwResult<()> + Send>;

/// A tuple of `(fields, row_iterator, post_close_hooks, scalar_value?)`
/// (spec §3). Either `rows` or `payload` is meaningful for a given result;
/// both may be absent for a zero-field, zero-row result.
pub struct ResultSet {
    fields: Arc<Vec<Field>>,
    rows: Option<Box<dyn RowSource>>,
    restartable: bool,
    payload: Option<Payload>,
    post_close: Vec<PostCloseHook>,
    closed: bool,
}

impl ResultSet {
    pub fn new(fields: Vec<Field>, rows: Box<dyn RowSource>, restartable: bool) -> Self {
        Self {
            fields: Arc::new(fields),
            rows: Some(rows),
            restartable,
            payload: None,
            post_close: Vec::new(),
            closed: false,
        }
    }

    pub fn from_rows(fields: Vec<Field>, rows: Vec<Row>) -> Self {
        Self::new(fields, Box::new(VecRowSource::new(rows)), true)
    }

    pub fn empty() -> Self {
        Self::from_rows(Vec::new(), Vec::new())
    }

    pub fn scalar(payload: Payload) -> Self {
        Self {
            fields: Arc::new(Vec::new()),
            rows: None,
            restartable: false,
            payload: Some(payload),
            post_close: Vec::new(),
            closed: false,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_restartable(&self) -> bool {
        self.restartable
    }

    pub fn payload(&mut self) -> Option<&mut Payload> {
        self.payload.as_mut()
    }

    pub fn next_row(&mut self) -> GwResult<Option<Row>> {
        match self.rows.as_mut() {
            Some(source) => source.next(),
            None => Ok(None),
        }
    }

    pub fn reset(&mut self) -> GwResult<()> {
        match self.rows.as_mut() {
            Some(source) if self.restartable => source.reset(),
            _ => Err(GatewayError::FeatureNotSupported(
                "result set is not restartable".into(),
            )),
        }
    }

    /// Registers a hook to run, in order, when [ResultSet::close] is called
    /// (spec §3, §4.7 step 5 — the bridge's error-probe hook is one of these).
    pub fn add_post_close_hook<F>(&mut self, hook: F)
    where
        F: FnMut() -> GwResult<()> + Send + 'static,
    {
        self.post_close.push(Box::new(hook));
    }

    /// Runs every post-close hook in registration order, collecting every
    /// failure into a single chained error (first wins as head, per spec §7),
    /// then releases underlying resources.
    pub fn close(&mut self) -> GwResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut errors = Vec::new();
        for hook in self.post_close.iter_mut() {
            if let Err(e) = hook() {
                errors.push(e);
            }
        }
        self.rows = None;
        self.payload = None;
        if errors.is_empty() {
            Ok(())
        } else {
            let mut iter = errors.into_iter();
            let head = iter.next().unwrap();
            Err(head.chain_with(iter.collect()))
        }
    }
}

impl Drop for ResultSet {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TypeCode, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc as StdArc;

    fn row(v: i32) -> Row {
        Row::new(
            StdArc::new(vec![Field::new("a", TypeCode::Int32)]),
            vec![Value::Int32(v)],
        )
    }

    #[test]
    fn iterates_rows_lazily_in_order() {
        let mut rs = ResultSet::from_rows(
            vec![Field::new("a", TypeCode::Int32)],
            vec![row(1), row(2), row(3)],
        );
        let mut seen = Vec::new();
        while let Some(r) = rs.next_row().unwrap() {
            seen.push(r.get(0).unwrap().as_i64());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(rs.next_row().unwrap().is_none());
    }

    #[test]
    fn restartable_result_can_reset() {
        let mut rs = ResultSet::from_rows(vec![Field::new("a", TypeCode::Int32)], vec![row(1)]);
        assert!(rs.next_row().unwrap().is_some());
        rs.reset().unwrap();
        assert!(rs.next_row().unwrap().is_some());
    }

    #[test]
    fn close_runs_hooks_in_order_and_chains_errors() {
        let order = StdArc::new(std::sync::Mutex::new(Vec::new()));
        let mut rs = ResultSet::empty();
        let o1 = order.clone();
        rs.add_post_close_hook(move || {
            o1.lock().unwrap().push(1);
            Err(GatewayError::client("first"))
        });
        let o2 = order.clone();
        rs.add_post_close_hook(move || {
            o2.lock().unwrap().push(2);
            Err(GatewayError::client("second"))
        });
        let err = rs.close().unwrap_err();
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
        match err {
            GatewayError::Chained { head, causes } => {
                assert!(head.to_string().contains("first"));
                assert_eq!(causes.len(), 1);
            }
            other => panic!("expected chained error, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let calls = StdArc::new(AtomicUsize::new(0));
        let mut rs = ResultSet::empty();
        let c = calls.clone();
        rs.add_post_close_hook(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        rs.close().unwrap();
        rs.close().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
