//! Row model (spec §3, component B).

use std::sync::Arc;

use crate::value::{Field, Value};

/// A fixed-width ordered list of [Value]s paired with an ordered [Field]
/// list. `size()` is `min(fields.len(), values.len())`; values beyond the
/// field count are reachable by index but not by name (spec §3).
#[derive(Debug, Clone)]
pub struct Row {
    fields: Arc<Vec<Field>>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(fields: Arc<Vec<Field>>, values: Vec<Value>) -> Self {
        Self { fields, values }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.fields.len().min(self.values.len())
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    /// Case-insensitive field-name lookup, only over the `size()` columns
    /// that have both a field and a value (spec §3).
    pub fn index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .take(self.size())
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.index(name).and_then(|i| self.values.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeCode;

    fn fields() -> Arc<Vec<Field>> {
        Arc::new(vec![
            Field::new("a", TypeCode::Int32),
            Field::new("b", TypeCode::String),
        ])
    }

    #[test]
    fn size_is_min_of_fields_and_values() {
        let row = Row::new(fields(), vec![Value::Int32(1)]);
        assert_eq!(row.size(), 1);
        assert_eq!(row.index("b"), None);
    }

    #[test]
    fn extra_values_are_reachable_by_index_not_name() {
        let row = Row::new(
            fields(),
            vec![
                Value::Int32(1),
                Value::String("x".into(), None),
                Value::Int32(99),
            ],
        );
        assert_eq!(row.size(), 2);
        assert!(row.get(2).is_some());
        assert_eq!(row.index("c"), None);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let row = Row::new(fields(), vec![Value::Int32(1), Value::String("x".into(), None)]);
        assert_eq!(row.index("A"), Some(0));
        assert_eq!(row.get_by_name("B").unwrap().as_string(), "x");
    }
}
