//! Arrow serializer (spec §4.9): maps each [Field] to an Arrow type, builds
//! record batches of `batch` rows, and streams them out via the Arrow IPC
//! stream or file writer depending on the `stream` option.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Date32Builder, Decimal128Builder, Decimal256Builder,
    Float32Builder, Float64Builder, Int16Builder, Int32Builder, Int64Builder, Int8Builder, StringBuilder,
    Time64NanosecondBuilder, TimestampNanosecondBuilder, UInt16Builder, UInt32Builder, UInt64Builder,
    UInt8Builder,
};
use arrow::datatypes::{i256, DataType, Field as ArrowField, Schema, TimeUnit};
use arrow::ipc::writer::{FileWriter, IpcWriteOptions, StreamWriter};
use arrow::record_batch::RecordBatch;

use crate::error::{GatewayError, Result};
use crate::option::Config;
use crate::result::ResultSet;
use crate::row::Row;
use crate::value::{Field, TypeCode, Value};

const DEFAULT_BATCH_ROWS: usize = 1024;

fn arrow_type(field: &Field) -> DataType {
    match field.type_code() {
        TypeCode::Bool => DataType::Boolean,
        TypeCode::Int8 => DataType::Int8,
        TypeCode::Int16 => DataType::Int16,
        TypeCode::Int32 => DataType::Int32,
        TypeCode::Int64 => DataType::Int64,
        TypeCode::Uint8 => DataType::UInt8,
        TypeCode::Uint16 => DataType::UInt16,
        TypeCode::Uint32 => DataType::UInt32,
        TypeCode::Uint64 => DataType::UInt64,
        TypeCode::F32 => DataType::Float32,
        TypeCode::F64 => DataType::Float64,
        TypeCode::Decimal if field.precision() > 38 => {
            DataType::Decimal256(field.precision().clamp(1, 76) as u8, field.scale() as i8)
        }
        TypeCode::Decimal => DataType::Decimal128(field.precision().clamp(1, 38) as u8, field.scale() as i8),
        TypeCode::Date => DataType::Date32,
        TypeCode::Time => DataType::Time64(scale_unit(field.scale())),
        TypeCode::DateTime => DataType::Timestamp(scale_unit(field.scale()), None),
        TypeCode::Binary => DataType::Binary,
        TypeCode::String => DataType::Utf8,
    }
}

fn scale_unit(scale: u32) -> TimeUnit {
    match scale {
        0 => TimeUnit::Second,
        1..=3 => TimeUnit::Millisecond,
        4..=6 => TimeUnit::Microsecond,
        _ => TimeUnit::Nanosecond,
    }
}

pub(super) fn build_schema(fields: &[Field]) -> Schema {
    Schema::new(
        fields
            .iter()
            .map(|f| ArrowField::new(f.name(), arrow_type(f), f.nullable()))
            .collect::<Vec<_>>(),
    )
}

enum ColumnBuilder {
    Bool(BooleanBuilder),
    Int8(Int8Builder),
    Int16(Int16Builder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    Uint8(UInt8Builder),
    Uint16(UInt16Builder),
    Uint32(UInt32Builder),
    Uint64(UInt64Builder),
    F32(Float32Builder),
    F64(Float64Builder),
    Decimal128(Decimal128Builder, u8, i8),
    Decimal256(Decimal256Builder, u8, i8),
    Date(Date32Builder),
    Time(Time64NanosecondBuilder),
    DateTime(TimestampNanosecondBuilder),
    Binary(BinaryBuilder),
    String(StringBuilder),
}

impl ColumnBuilder {
    fn new(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnBuilder::Bool(BooleanBuilder::new()),
            DataType::Int8 => ColumnBuilder::Int8(Int8Builder::new()),
            DataType::Int16 => ColumnBuilder::Int16(Int16Builder::new()),
            DataType::Int32 => ColumnBuilder::Int32(Int32Builder::new()),
            DataType::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            DataType::UInt8 => ColumnBuilder::Uint8(UInt8Builder::new()),
            DataType::UInt16 => ColumnBuilder::Uint16(UInt16Builder::new()),
            DataType::UInt32 => ColumnBuilder::Uint32(UInt32Builder::new()),
            DataType::UInt64 => ColumnBuilder::Uint64(UInt64Builder::new()),
            DataType::Float32 => ColumnBuilder::F32(Float32Builder::new()),
            DataType::Float64 => ColumnBuilder::F64(Float64Builder::new()),
            DataType::Decimal128(p, s) => ColumnBuilder::Decimal128(Decimal128Builder::new(), *p, *s),
            DataType::Decimal256(p, s) => ColumnBuilder::Decimal256(Decimal256Builder::new(), *p, *s),
            DataType::Date32 => ColumnBuilder::Date(Date32Builder::new()),
            DataType::Time64(_) => ColumnBuilder::Time(Time64NanosecondBuilder::new()),
            DataType::Timestamp(_, _) => ColumnBuilder::DateTime(TimestampNanosecondBuilder::new()),
            DataType::Binary => ColumnBuilder::Binary(BinaryBuilder::new()),
            DataType::Utf8 => ColumnBuilder::String(StringBuilder::new()),
            other => unreachable!("unmapped arrow type {other:?}"),
        }
    }

    fn append(&mut self, value: &Value) {
        if value.is_null() {
            return append_null(self);
        }
        match (self, value) {
            (ColumnBuilder::Bool(b), v) => b.append_value(v.as_bool()),
            (ColumnBuilder::Int8(b), Value::Int8(v)) => b.append_value(*v),
            (ColumnBuilder::Int16(b), Value::Int16(v)) => b.append_value(*v),
            (ColumnBuilder::Int32(b), Value::Int32(v)) => b.append_value(*v),
            (ColumnBuilder::Int64(b), Value::Int64(v)) => b.append_value(*v),
            (ColumnBuilder::Uint8(b), Value::Uint8(v)) => b.append_value(*v),
            (ColumnBuilder::Uint16(b), Value::Uint16(v)) => b.append_value(*v),
            (ColumnBuilder::Uint32(b), Value::Uint32(v)) => b.append_value(*v),
            (ColumnBuilder::Uint64(b), Value::Uint64(v)) => b.append_value(*v),
            (ColumnBuilder::F32(b), Value::F32(v)) => b.append_value(*v),
            (ColumnBuilder::F64(b), Value::F64(v)) => b.append_value(*v),
            (ColumnBuilder::Decimal128(b, ..), Value::Decimal(..)) => {
                b.append_value(decimal_fixed_point(value))
            }
            (ColumnBuilder::Decimal256(b, ..), Value::Decimal(..)) => {
                b.append_value(i256::from_i128(decimal_fixed_point(value)))
            }
            (ColumnBuilder::Date(b), Value::Date(days)) => b.append_value(*days),
            (ColumnBuilder::Time(b), Value::Time(t)) => b.append_value(t.nanos_of_day),
            (ColumnBuilder::DateTime(b), Value::DateTime(dt)) => {
                b.append_value(dt.naive.and_utc().timestamp_nanos_opt().unwrap_or(0))
            }
            (ColumnBuilder::Binary(b), Value::Binary(bytes)) => b.append_value(bytes),
            (ColumnBuilder::String(b), v) => b.append_value(v.as_string()),
            (builder, _) => append_null(builder),
        }
    }

    fn finish(self) -> Result<ArrayRef> {
        Ok(match self {
            ColumnBuilder::Bool(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int8(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int16(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Uint8(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Uint16(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Uint32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Uint64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::F32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::F64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Decimal128(mut b, p, s) => {
                Arc::new(b.finish().with_precision_and_scale(p, s).map_err(arrow_err)?)
            }
            ColumnBuilder::Decimal256(mut b, p, s) => {
                Arc::new(b.finish().with_precision_and_scale(p, s).map_err(arrow_err)?)
            }
            ColumnBuilder::Date(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Time(mut b) => Arc::new(b.finish()),
            ColumnBuilder::DateTime(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Binary(mut b) => Arc::new(b.finish()),
            ColumnBuilder::String(mut b) => Arc::new(b.finish()),
        })
    }
}

fn append_null(builder: &mut ColumnBuilder) {
    match builder {
        ColumnBuilder::Bool(b) => b.append_null(),
        ColumnBuilder::Int8(b) => b.append_null(),
        ColumnBuilder::Int16(b) => b.append_null(),
        ColumnBuilder::Int32(b) => b.append_null(),
        ColumnBuilder::Int64(b) => b.append_null(),
        ColumnBuilder::Uint8(b) => b.append_null(),
        ColumnBuilder::Uint16(b) => b.append_null(),
        ColumnBuilder::Uint32(b) => b.append_null(),
        ColumnBuilder::Uint64(b) => b.append_null(),
        ColumnBuilder::F32(b) => b.append_null(),
        ColumnBuilder::F64(b) => b.append_null(),
        ColumnBuilder::Decimal128(b, ..) => b.append_null(),
        ColumnBuilder::Decimal256(b, ..) => b.append_null(),
        ColumnBuilder::Date(b) => b.append_null(),
        ColumnBuilder::Time(b) => b.append_null(),
        ColumnBuilder::DateTime(b) => b.append_null(),
        ColumnBuilder::Binary(b) => b.append_null(),
        ColumnBuilder::String(b) => b.append_null(),
    }
}

/// Reads the already-formatted fixed-point string back into an `i128`
/// mantissa. `Value::as_string` renders a Decimal at its declared scale, so
/// stripping the decimal point yields the scaled integer directly; this is
/// a deliberate simplification and loses precision beyond `i128` for
/// Decimal256 columns (tracked in DESIGN.md).
fn decimal_fixed_point(value: &Value) -> i128 {
    let text = value.as_string();
    let negative = text.starts_with('-');
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let magnitude: i128 = digits.parse().unwrap_or(0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn arrow_err(e: arrow::error::ArrowError) -> GatewayError {
    GatewayError::Data(e.to_string())
}

pub(super) fn build_batch(schema: &Arc<Schema>, rows: &[Row]) -> Result<RecordBatch> {
    let mut builders: Vec<ColumnBuilder> = schema.fields().iter().map(|f| ColumnBuilder::new(f.data_type())).collect();
    for row in rows {
        for (i, builder) in builders.iter_mut().enumerate().take(row.size()) {
            if let Some(v) = row.get(i) {
                builder.append(v);
            }
        }
    }
    let columns = builders
        .into_iter()
        .map(ColumnBuilder::finish)
        .collect::<Result<Vec<_>>>()?;
    RecordBatch::try_new(schema.clone(), columns).map_err(arrow_err)
}

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, cfg: &Config) -> Result<()> {
    let fields = result.fields().to_vec();
    let schema = Arc::new(build_schema(&fields));
    let batch_size = cfg
        .get("batch")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_BATCH_ROWS)
        .max(1);
    let use_stream = cfg.get_bool("stream", true);

    let options = IpcWriteOptions::default();
    let mut stream_writer;
    let mut file_writer;
    let writer: &mut dyn ArrowWriter = if use_stream {
        stream_writer = StreamWriter::try_new_with_options(out, &schema, options).map_err(arrow_err)?;
        &mut stream_writer
    } else {
        file_writer = FileWriter::try_new_with_options(out, &schema, options).map_err(arrow_err)?;
        &mut file_writer
    };

    let mut buffer = Vec::with_capacity(batch_size);
    loop {
        match result.next_row()? {
            Some(row) => {
                buffer.push(row);
                if buffer.len() >= batch_size {
                    writer.write_batch(&build_batch(&schema, &buffer)?)?;
                    buffer.clear();
                }
            }
            None => break,
        }
    }
    if !buffer.is_empty() {
        writer.write_batch(&build_batch(&schema, &buffer)?)?;
    }
    writer.finish_writer()
}

/// Lets [serialize] address either IPC writer kind through one trait object
/// (the two concrete writer types don't share a common trait in `arrow`).
trait ArrowWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;
    fn finish_writer(&mut self) -> Result<()>;
}

impl<W: Write> ArrowWriter for StreamWriter<W> {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        StreamWriter::write(self, batch).map_err(arrow_err)
    }
    fn finish_writer(&mut self) -> Result<()> {
        StreamWriter::finish(self).map_err(arrow_err)
    }
}

impl<W: Write> ArrowWriter for FileWriter<W> {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        FileWriter::write(self, batch).map_err(arrow_err)
    }
    fn finish_writer(&mut self) -> Result<()> {
        FileWriter::finish(self).map_err(arrow_err)
    }
}
