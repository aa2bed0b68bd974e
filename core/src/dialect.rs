//! Target-database dialect abstraction (spec §4.10, component §4.10).
//!
//! A [Dialect] tells the rest of the gateway how a particular outer SQL
//! engine prefers results shaped: which compression/format pairs it can
//! consume directly, which variable-tag family reads most naturally in its
//! SQL dialect, and how to project a [Field] into that engine's column-
//! definition syntax. Modeled as a trait so new engines plug in the way new
//! interpreters plug into [crate::registry::Registry] — one small `impl` per
//! backend, registered by name.

use std::collections::HashMap;

use crate::value::{Field, TypeCode};
use crate::vartag::VariableTag;

/// Compression codecs a dialect may claim support for (mirrors the
/// serializer-facing `compression` option values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Gzip,
    Snappy,
    Lz4,
    Zstd,
    Brotli,
}

/// Output formats a dialect may claim support for (mirrors
/// [crate::serializer::by_name]'s format names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Csv,
    Tsv,
    Markdown,
    JsonSeq,
    ValuesSql,
    Binary,
    Arrow,
    Parquet,
}

/// Converts a [Field] into the target engine's column-definition syntax
/// (e.g. `name VARCHAR(255)`), independent of any particular row's values.
pub trait ResultMapper: Send + Sync {
    fn column_definition(&self, field: &Field) -> String;
}

/// Maps SQL-standard type names to [TypeCode]s; used by dialects whose
/// `column_definition` needs the inverse direction too.
fn default_sql_type_name(field: &Field) -> &'static str {
    match field.type_code() {
        TypeCode::Bool => "BOOLEAN",
        TypeCode::Int8 => "TINYINT",
        TypeCode::Int16 => "SMALLINT",
        TypeCode::Int32 => "INTEGER",
        TypeCode::Int64 => "BIGINT",
        TypeCode::Uint8 | TypeCode::Uint16 | TypeCode::Uint32 | TypeCode::Uint64 => "BIGINT UNSIGNED",
        TypeCode::F32 => "REAL",
        TypeCode::F64 => "DOUBLE PRECISION",
        TypeCode::Decimal => "DECIMAL",
        TypeCode::Date => "DATE",
        TypeCode::Time => "TIME",
        TypeCode::DateTime => "TIMESTAMP",
        TypeCode::Binary => "VARBINARY",
        TypeCode::String => "VARCHAR",
    }
}

struct DefaultResultMapper;

impl ResultMapper for DefaultResultMapper {
    fn column_definition(&self, field: &Field) -> String {
        let mut def = format!("{} {}", field.name(), default_sql_type_name(field));
        if field.type_code() == TypeCode::Decimal && field.precision() > 0 {
            def.push_str(&format!("({}, {})", field.precision(), field.scale()));
        }
        if !field.nullable() {
            def.push_str(" NOT NULL");
        }
        def
    }
}

/// Per-engine preferences and capabilities (spec §4.10).
pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this engine can directly consume `format` compressed with
    /// `compression` without an intermediate decode step.
    fn supports(&self, format: Format, compression: Compression) -> bool;

    /// The serializer format this engine reads most efficiently, used when
    /// no explicit `outputFormat` is configured.
    fn preferred_format(&self) -> Format {
        Format::Csv
    }

    fn preferred_compression(&self) -> Compression {
        Compression::None
    }

    /// Which bracket family reads most naturally embedded in this engine's
    /// SQL dialect (e.g. an engine using `{}` for map literals would prefer
    /// [VariableTag::Angle] or [VariableTag::Square] instead).
    fn preferred_variable_tag(&self) -> VariableTag {
        VariableTag::Brace
    }

    fn result_mapper(&self) -> &dyn ResultMapper;

    /// Wraps a URL so the outer engine can `SELECT` from it directly (e.g.
    /// `url('...', 'CSVWithNames')` on ClickHouse, `read_csv(...)` on
    /// DuckDB). Default: the URL single-quoted, per spec §4.10.
    fn remote_table(&self, url: &str) -> String {
        format!("'{}'", url.replace('\'', "''"))
    }
}

/// A conservative, format-agnostic fallback: accepts only uncompressed CSV,
/// prefers brace tags, and maps fields with [DefaultResultMapper].
pub struct GenericDialect {
    mapper: DefaultResultMapper,
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            mapper: DefaultResultMapper,
        }
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &str {
        "generic"
    }

    fn supports(&self, format: Format, compression: Compression) -> bool {
        matches!(format, Format::Csv | Format::Tsv) && compression == Compression::None
    }

    fn result_mapper(&self) -> &dyn ResultMapper {
        &self.mapper
    }
}

/// A dialect whose `remote_table` mirrors ClickHouse's table function style
/// and which prefers columnar formats over text.
pub struct ClickHouseLikeDialect {
    mapper: DefaultResultMapper,
}

impl ClickHouseLikeDialect {
    pub fn new() -> Self {
        Self {
            mapper: DefaultResultMapper,
        }
    }
}

impl Default for ClickHouseLikeDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for ClickHouseLikeDialect {
    fn name(&self) -> &str {
        "clickhouse-like"
    }

    fn supports(&self, format: Format, compression: Compression) -> bool {
        (match format {
            Format::Csv | Format::Tsv | Format::JsonSeq | Format::Parquet | Format::Arrow => true,
            _ => false,
        }) && matches!(compression, Compression::None | Compression::Gzip | Compression::Lz4)
    }

    fn preferred_format(&self) -> Format {
        Format::Csv
    }

    fn result_mapper(&self) -> &dyn ResultMapper {
        &self.mapper
    }

    fn remote_table(&self, url: &str) -> String {
        format!("url('{}', 'CSVWithNames')", url.replace('\'', "''"))
    }
}

/// A dialect whose `remote_table` mirrors DuckDB's function-call style.
pub struct DuckDbLikeDialect {
    mapper: DefaultResultMapper,
}

impl DuckDbLikeDialect {
    pub fn new() -> Self {
        Self {
            mapper: DefaultResultMapper,
        }
    }
}

impl Default for DuckDbLikeDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for DuckDbLikeDialect {
    fn name(&self) -> &str {
        "duckdb-like"
    }

    fn supports(&self, format: Format, compression: Compression) -> bool {
        (match format {
            Format::Csv | Format::Parquet | Format::JsonSeq => true,
            _ => false,
        }) && matches!(compression, Compression::None | Compression::Gzip | Compression::Zstd)
    }

    fn preferred_format(&self) -> Format {
        Format::Parquet
    }

    fn result_mapper(&self) -> &dyn ResultMapper {
        &self.mapper
    }

    fn remote_table(&self, url: &str) -> String {
        format!("read_csv('{}')", url.replace('\'', "''"))
    }
}

/// Looks up dialects by name, analogous to [crate::registry::Registry]'s
/// extension lookup but for the small, closed set of engine adapters.
pub struct DialectRegistry {
    dialects: HashMap<String, Box<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn with_defaults() -> Self {
        let mut dialects: HashMap<String, Box<dyn Dialect>> = HashMap::new();
        dialects.insert("generic".into(), Box::new(GenericDialect::new()));
        dialects.insert("clickhouse-like".into(), Box::new(ClickHouseLikeDialect::new()));
        dialects.insert("duckdb-like".into(), Box::new(DuckDbLikeDialect::new()));
        Self { dialects }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Dialect> {
        self.dialects.get(&name.to_ascii_lowercase()).map(|d| d.as_ref())
    }
}

/// Intercepts a connection URL prefixed with the configured gateway prefix
/// (default `gw:`, spec §6: "any URL starting with the configured JDBCX
/// prefix... the segment between the prefix and the next `:` optionally
/// names an extension; the remainder is forwarded to the inner driver").
///
/// Returns `(extension_name, remaining_url)` on a match, `None` if `url`
/// doesn't start with `prefix`.
pub fn strip_prefix<'a>(url: &'a str, prefix: &str) -> Option<(Option<&'a str>, &'a str)> {
    let rest = url.strip_prefix(prefix)?;
    match rest.split_once(':') {
        Some((ext, remainder)) if !ext.is_empty() && is_extension_name(ext) => {
            Some((Some(ext), remainder))
        }
        _ => Some((None, rest)),
    }
}

/// An extension-name segment is a bare identifier; if it contains `//` or
/// other URL syntax it's part of the inner URL, not an extension tag.
fn is_extension_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
