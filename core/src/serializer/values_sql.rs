//! SQL VALUES serializer (spec §4.9): `(col,...) VALUES (v,...),...`.

use std::io::Write;

use crate::error::Result;
use crate::option::Config;
use crate::result::ResultSet;

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, _cfg: &Config) -> Result<()> {
    let fields = result.fields().to_vec();
    let columns = fields.iter().map(|f| quote_identifier(f.name())).collect::<Vec<_>>().join(",");
    out.write_all(format!("({columns}) VALUES\n").as_bytes())?;

    let mut first = true;
    while let Some(row) = result.next_row()? {
        if !first {
            out.write_all(b",\n")?;
        }
        first = false;
        let values = row.values().iter().take(row.size()).map(|v| v.as_sql()).collect::<Vec<_>>().join(",");
        out.write_all(format!("({values})").as_bytes())?;
    }
    out.write_all(b"\n")?;
    Ok(())
}
