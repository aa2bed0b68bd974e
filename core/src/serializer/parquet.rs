//! Parquet serializer (spec §4.9): reuses the Arrow schema/batch machinery
//! and hands batches to `parquet`'s `ArrowWriter`, with the compression
//! codec taken from the `compression` option (default uncompressed).

use std::io::Write;
use std::sync::Arc;

use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{GatewayError, Result};
use crate::option::Config;
use crate::result::ResultSet;

use super::arrow_ipc::{build_batch, build_schema};

const DEFAULT_BATCH_ROWS: usize = 1024;

fn parquet_err(e: parquet::errors::ParquetError) -> GatewayError {
    GatewayError::Data(e.to_string())
}

fn compression_codec(cfg: &Config) -> Compression {
    match cfg.get_or("compression", "uncompressed").to_ascii_lowercase().as_str() {
        "snappy" => Compression::SNAPPY,
        "gzip" => Compression::GZIP(Default::default()),
        "lz4" => Compression::LZ4,
        "zstd" => Compression::ZSTD(Default::default()),
        "brotli" => Compression::BROTLI(Default::default()),
        _ => Compression::UNCOMPRESSED,
    }
}

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    let fields = result.fields().to_vec();
    let schema = Arc::new(build_schema(&fields));
    let batch_size = cfg
        .get("batch")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_BATCH_ROWS)
        .max(1);

    let properties = WriterProperties::builder()
        .set_compression(compression_codec(cfg))
        .build();
    let mut writer =
        ArrowWriter::try_new(Vec::new(), schema.clone(), Some(properties)).map_err(parquet_err)?;

    let mut buffer = Vec::with_capacity(batch_size);
    while let Some(row) = result.next_row()? {
        buffer.push(row);
        if buffer.len() >= batch_size {
            writer.write(&build_batch(&schema, &buffer)?).map_err(parquet_err)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        writer.write(&build_batch(&schema, &buffer)?).map_err(parquet_err)?;
    }
    let bytes = writer.into_inner().map_err(parquet_err)?;
    out.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;
    use crate::value::{Field, TypeCode, Value};

    #[test]
    fn default_compression_is_uncompressed() {
        assert_eq!(compression_codec(&Config::new()), Compression::UNCOMPRESSED);
    }

    #[test]
    fn compression_option_selects_snappy() {
        let mut cfg = Config::new();
        cfg.set("compression", "snappy");
        assert_eq!(compression_codec(&cfg), Compression::SNAPPY);
    }

    #[test]
    fn writes_a_small_batch_without_error() {
        let fields = vec![Field::new("a", TypeCode::Int32)];
        let mut result = ResultSet::from_rows(
            fields.clone(),
            vec![Row::new(Arc::new(fields), vec![Value::Int32(1)])],
        );
        let mut out = Vec::new();
        serialize(&mut result, &mut out, &Config::new()).unwrap();
        assert!(!out.is_empty());
    }
}
