//! TSV serializer (spec §4.9): tab-separated, per-cell backslash escapes.

use std::io::Write;

use crate::error::Result;
use crate::option::Config;
use crate::result::ResultSet;

use super::text::{field_names, render_cells};
use super::TextOptions;

fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    let options = TextOptions::from_config(cfg);
    let fields = result.fields().to_vec();
    if options.header {
        write_line(out, &field_names(&fields))?;
    }
    while let Some(row) = result.next_row()? {
        write_line(out, &render_cells(&row, &options))?;
    }
    Ok(())
}

fn write_line(out: &mut dyn Write, cells: &[String]) -> Result<()> {
    let line = cells.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join("\t");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Field, TypeCode, Value};
    use std::sync::Arc;

    #[test]
    fn tabs_and_backslashes_are_escaped() {
        let fields = vec![Field::new("a", TypeCode::String)];
        let mut result = ResultSet::from_rows(
            fields.clone(),
            vec![crate::row::Row::new(Arc::new(fields), vec![Value::String("x\ty\\z".into(), None)])],
        );
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &Config::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nx\\ty\\\\z\n");
    }
}
