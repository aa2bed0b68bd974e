//! CSV serializer (spec §4.9): configurable delimiter/quote/escape/newline.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{GatewayError, Result};
use crate::option::Config;
use crate::result::ResultSet;

use super::text::{field_names, render_cells};
use super::TextOptions;

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    let options = TextOptions::from_config(cfg);
    let delimiter = cfg.get_or("delimiter", ",").as_bytes().first().copied().unwrap_or(b',');
    let quote = cfg.get_or("quote", "\"").as_bytes().first().copied().unwrap_or(b'"');
    let escape = cfg.get("escape").and_then(|s| s.as_bytes().first().copied());
    let use_quotes = cfg.get_bool("useQuotes", false);
    let crlf = cfg.get_or("newline", "\n") == "\r\n";

    let mut builder = WriterBuilder::new();
    builder.delimiter(delimiter);
    builder.quote(quote);
    if let Some(esc) = escape {
        builder.escape(esc);
        builder.double_quote(false);
    }
    builder.quote_style(if use_quotes {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    });
    builder.terminator(if crlf { Terminator::CRLF } else { Terminator::Any(b'\n') });

    let mut writer = builder.from_writer(out);
    let fields = result.fields().to_vec();
    if options.header {
        writer.write_record(field_names(&fields)).map_err(csv_err)?;
    }
    while let Some(row) = result.next_row()? {
        writer.write_record(render_cells(&row, &options)).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_err(e: csv::Error) -> GatewayError {
    GatewayError::Data(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TypeCode, Value};

    fn result_with_one_row() -> ResultSet {
        let fields = vec![Field::new("a", TypeCode::String), Field::new("b", TypeCode::String)];
        ResultSet::from_rows(
            fields.clone(),
            vec![crate::row::Row::new(
                std::sync::Arc::new(fields),
                vec![Value::String("x,y".into(), None), Value::String("z".into(), None)],
            )],
        )
    }

    use crate::value::Field;

    #[test]
    fn conflicting_cell_is_quoted_automatically() {
        let mut result = result_with_one_row();
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &Config::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "a,b\n\"x,y\",z\n");
    }

    #[test]
    fn use_quotes_forces_quoting_on_every_cell() {
        let mut result = result_with_one_row();
        let mut cfg = Config::new();
        cfg.set("useQuotes", "true");
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &cfg).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\"a\",\"b\"\n\"x,y\",\"z\"\n");
    }
}
