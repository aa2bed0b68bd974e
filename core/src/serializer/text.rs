//! Cell-rendering helpers shared by the text-based serializers (spec §4.9).

use crate::row::Row;
use crate::value::Field;

use super::TextOptions;

/// Renders one row's cells, substituting `options.null_value` for nulls.
pub fn render_cells(row: &Row, options: &TextOptions) -> Vec<String> {
    row.values()
        .iter()
        .take(row.size())
        .map(|v| if v.is_null() { options.null_value.clone() } else { v.as_string() })
        .collect()
}

pub fn field_names(fields: &[Field]) -> Vec<String> {
    fields.iter().map(|f| f.name().to_string()).collect()
}
