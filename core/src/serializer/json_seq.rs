//! JSON-sequence serializer (spec §4.9): each row framed with RFC 7464's
//! `0x1E` record separator.

use std::io::Write;

use crate::error::Result;
use crate::option::Config;
use crate::result::ResultSet;

const RECORD_SEPARATOR: u8 = 0x1E;

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    let header = cfg.get_bool("header", true);
    let fields = result.fields().to_vec();
    while let Some(row) = result.next_row()? {
        let value = if header {
            let mut map = serde_json::Map::new();
            for (i, field) in fields.iter().enumerate().take(row.size()) {
                if let Some(v) = row.get(i) {
                    map.insert(field.name().to_string(), v.as_json());
                }
            }
            serde_json::Value::Object(map)
        } else {
            serde_json::Value::Array(row.values().iter().take(row.size()).map(|v| v.as_json()).collect())
        };
        out.write_all(&[RECORD_SEPARATOR])?;
        out.write_all(value.to_string().as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Field, TypeCode, Value};
    use std::sync::Arc;

    #[test]
    fn header_true_emits_objects_framed_by_record_separator() {
        let fields = vec![Field::new("a", TypeCode::Int32)];
        let mut result = ResultSet::from_rows(
            fields.clone(),
            vec![crate::row::Row::new(Arc::new(fields), vec![Value::Int32(1)])],
        );
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &Config::new()).unwrap();
        assert_eq!(out[0], 0x1E);
        let text = String::from_utf8(out[1..].to_vec()).unwrap();
        assert_eq!(text, "{\"a\":1}\n");
    }

    #[test]
    fn header_false_emits_arrays() {
        let fields = vec![Field::new("a", TypeCode::Int32)];
        let mut result = ResultSet::from_rows(
            fields.clone(),
            vec![crate::row::Row::new(Arc::new(fields), vec![Value::Int32(1)])],
        );
        let mut cfg = Config::new();
        cfg.set("header", "false");
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &cfg).unwrap();
        let text = String::from_utf8(out[1..].to_vec()).unwrap();
        assert_eq!(text, "[1]\n");
    }
}
