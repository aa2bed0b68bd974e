//! Result serializers (spec §4.9, component C): every format shares
//! `{serialize(Result, Writer)}`. Deserialization is out of scope — the
//! gateway only ever serializes outbound results (spec §1 Non-goals).

pub mod arrow_ipc;
pub mod binary;
pub mod csv;
pub mod json_seq;
pub mod markdown;
pub mod parquet;
pub mod text;
pub mod tsv;
pub mod values_sql;

use std::io::Write;

use crate::error::Result;
use crate::option::Config;
use crate::result::ResultSet;

/// Shared serializer contract (spec §4.9).
pub trait Serializer {
    fn serialize(&self, result: &mut ResultSet, out: &mut dyn Write, options: &Config) -> Result<()>;
}

/// Options honoured by every text-based serializer (spec §4.9): `header`,
/// `charset`, `null_value`. `buffer` is accepted for parity with the
/// upstream option surface but text writes here are unbuffered by the
/// serializer itself — callers wrap `out` in a `BufWriter` when it matters.
pub struct TextOptions {
    pub header: bool,
    pub charset: String,
    pub null_value: String,
}

impl TextOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            header: cfg.get_bool("header", true),
            charset: cfg.get_or("charset", "utf-8").to_string(),
            null_value: cfg.get_or("null_value", "").to_string(),
        }
    }
}

/// Picks a serializer by name (spec §4.9's nine formats plus the shared
/// contract). Used by the dialect/outer-engine boundary (spec §4.10) and by
/// `util::infer_format`.
pub fn by_name(name: &str, result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    match name.to_ascii_lowercase().as_str() {
        "csv" => csv::serialize(result, out, cfg),
        "tsv" => tsv::serialize(result, out, cfg),
        "markdown" | "md" => markdown::serialize(result, out, cfg),
        "json" | "jsonl" | "json-seq" => json_seq::serialize(result, out, cfg),
        "values" | "sql" => values_sql::serialize(result, out, cfg),
        "binary" | "raw" => binary::serialize(result, out, cfg),
        "arrow" => arrow_ipc::serialize(result, out, cfg),
        "parquet" => parquet::serialize(result, out, cfg),
        other => Err(crate::error::GatewayError::client(format!("unknown output format '{other}'"))),
    }
}
