//! Markdown serializer (spec §4.9): header forced on, reserved characters
//! backslash-escaped, newlines become `<br/>`.

use std::io::Write;

use crate::error::Result;
use crate::option::Config;
use crate::result::ResultSet;
use crate::value::Field;

use super::text::{field_names, render_cells};
use super::TextOptions;

const RESERVED: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.chars() {
        if c == '\n' {
            out.push_str("<br/>");
        } else if RESERVED.contains(c) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn write_row(out: &mut dyn Write, cells: &[String]) -> Result<()> {
    let escaped = cells.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join(" | ");
    out.write_all(format!("| {escaped} |\n").as_bytes())?;
    Ok(())
}

/// Right-aligns columns whose field declares a non-zero scale (spec §4.9).
fn separator(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| if f.scale() > 0 { "---:" } else { "---" })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    // The header row is always written, regardless of the `header` option
    // (spec §4.9: "header forced on").
    let fields = result.fields().to_vec();
    write_row(out, &field_names(&fields))?;
    out.write_all(format!("| {} |\n", separator(&fields)).as_bytes())?;
    let options = TextOptions::from_config(cfg);
    while let Some(row) = result.next_row()? {
        write_row(out, &render_cells(&row, &options))?;
    }
    Ok(())
}
