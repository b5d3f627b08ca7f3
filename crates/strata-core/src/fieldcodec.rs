//! 字段读写策略派发。
//!
//! # 模块架构（Why）
//! - 每种字段类别对应一组 `encode / decode / skip` 策略：定宽类别直接按宽度
//!   读写；变长类别一律携带长度前缀，这既是解码框架的防线，也是导航器
//!   结构化跳过的前提；
//! - 集合与映射支持两种编码：统一编码在头部写一次元素类型，元素以裸负载
//!   排列（更小更快，要求运行时类型精确一致）；异构编码给每个元素独立
//!   打标签（支持多态集合）；
//! - 嵌套对象递归委托给分层序列化器，运行时类型标识经注册表解析后写入
//!   线上，使多态字段可被正确还原。

use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::{WireReader, WireWriter};
use crate::error::{CodecError, codes};
use crate::registry::TypeRegistry;
use crate::schema::{DateMode, ElementHint, ElementType, FieldDescriptor, FieldKind, PrimitiveKind};
use crate::serializer::HierarchicalSerializer;
use crate::value::{BigInt, DateValue, Decimal, Value};

/// 集合元素的线上标签。
mod tag {
    pub const BOOL: u8 = 0x01;
    pub const I32: u8 = 0x02;
    pub const I64: u8 = 0x03;
    pub const F64: u8 = 0x04;
    pub const TEXT: u8 = 0x05;
    pub const DECIMAL: u8 = 0x06;
    pub const BIGINT: u8 = 0x07;
    pub const BINARY: u8 = 0x08;
    pub const OBJECT: u8 = 0x09;
}

fn mismatch(field: &str, expected: &str, actual: &Value) -> CodecError {
    CodecError::new(
        codes::DECODE_TYPE_MISMATCH,
        alloc::format!(
            "field `{field}` expects {expected}, got {}",
            actual.kind_name()
        ),
    )
}

/// 编码单个字段值。
///
/// # 契约说明（What）
/// - `value` 的变体必须与 `desc.kind` 匹配，不做隐式转换，违约返回
///   `decode.type_mismatch`；
/// - 嵌套对象与集合元素的类型解析失败以配置类错误上抛。
pub fn encode_field(
    desc: &FieldDescriptor,
    value: Value,
    registry: &TypeRegistry,
    writer: &mut dyn WireWriter,
) -> crate::Result<()> {
    let field = desc.name.as_ref();
    match (desc.kind, value) {
        (FieldKind::Primitive(PrimitiveKind::Bool), Value::Bool(v)) => writer.put_bool(v),
        (FieldKind::Primitive(PrimitiveKind::I32), Value::I32(v)) => writer.put_i32(v),
        (FieldKind::Primitive(PrimitiveKind::I64), Value::I64(v)) => writer.put_i64(v),
        (FieldKind::Primitive(PrimitiveKind::F64), Value::F64(v)) => writer.put_f64(v),
        (FieldKind::PrimitiveArray(PrimitiveKind::Bool), Value::BoolArray(v)) => {
            writer.put_u32(v.len() as u32)?;
            for item in v {
                writer.put_bool(item)?;
            }
            Ok(())
        }
        (FieldKind::PrimitiveArray(PrimitiveKind::I32), Value::I32Array(v)) => {
            writer.put_u32(v.len() as u32)?;
            for item in v {
                writer.put_i32(item)?;
            }
            Ok(())
        }
        (FieldKind::PrimitiveArray(PrimitiveKind::I64), Value::I64Array(v)) => {
            writer.put_u32(v.len() as u32)?;
            for item in v {
                writer.put_i64(item)?;
            }
            Ok(())
        }
        (FieldKind::PrimitiveArray(PrimitiveKind::F64), Value::F64Array(v)) => {
            writer.put_u32(v.len() as u32)?;
            for item in v {
                writer.put_f64(item)?;
            }
            Ok(())
        }
        (FieldKind::Text, Value::Text(v)) => encode_text(writer, &v),
        (FieldKind::Decimal, Value::Decimal(v)) => encode_decimal(writer, v),
        (FieldKind::BigInt, Value::BigInt(v)) => encode_bigint(writer, &v),
        (FieldKind::Binary, Value::Binary(v)) => {
            writer.put_u32(v.len() as u32)?;
            writer.put_slice(&v)
        }
        (FieldKind::Date { mode, with_offset }, Value::Date(v)) => {
            encode_date(writer, mode, with_offset, &v, field)
        }
        (FieldKind::Nested { .. }, Value::Object(mut object)) => {
            let type_id = registry.type_id_for(object.as_any().type_id())?;
            let slot = writer.begin_segment(type_id)?;
            HierarchicalSerializer::new(registry).encode(object.as_mut(), writer)?;
            writer.end_segment(slot)
        }
        (FieldKind::Collection(hint), Value::Collection(items)) => {
            let slot = writer.position();
            writer.put_u32(0)?;
            writer.put_u32(items.len() as u32)?;
            match hint {
                ElementHint::Uniform(element) => {
                    encode_uniform_header(writer, element)?;
                    for item in items {
                        encode_uniform_element(writer, element, item, registry, field)?;
                    }
                }
                ElementHint::Mixed => {
                    for item in items {
                        encode_tagged_element(writer, item, registry, field)?;
                    }
                }
            }
            patch_length(writer, slot)
        }
        (FieldKind::Map { key, value }, Value::Map(entries)) => {
            let slot = writer.position();
            writer.put_u32(0)?;
            writer.put_u32(entries.len() as u32)?;
            if let ElementHint::Uniform(element) = key {
                encode_uniform_header(writer, element)?;
            }
            if let ElementHint::Uniform(element) = value {
                encode_uniform_header(writer, element)?;
            }
            for (entry_key, entry_value) in entries {
                match key {
                    ElementHint::Uniform(element) => {
                        encode_uniform_element(writer, element, entry_key, registry, field)?
                    }
                    ElementHint::Mixed => {
                        encode_tagged_element(writer, entry_key, registry, field)?
                    }
                }
                match value {
                    ElementHint::Uniform(element) => {
                        encode_uniform_element(writer, element, entry_value, registry, field)?
                    }
                    ElementHint::Mixed => {
                        encode_tagged_element(writer, entry_value, registry, field)?
                    }
                }
            }
            patch_length(writer, slot)
        }
        (_, actual) => Err(mismatch(field, kind_label(&desc.kind), &actual)),
    }
}

/// 解码单个字段值。
pub fn decode_field(
    desc: &FieldDescriptor,
    registry: &TypeRegistry,
    reader: &mut dyn WireReader,
) -> crate::Result<Value> {
    match desc.kind {
        FieldKind::Primitive(PrimitiveKind::Bool) => Ok(Value::Bool(reader.read_bool()?)),
        FieldKind::Primitive(PrimitiveKind::I32) => Ok(Value::I32(reader.read_i32()?)),
        FieldKind::Primitive(PrimitiveKind::I64) => Ok(Value::I64(reader.read_i64()?)),
        FieldKind::Primitive(PrimitiveKind::F64) => Ok(Value::F64(reader.read_f64()?)),
        FieldKind::PrimitiveArray(kind) => decode_primitive_array(reader, kind),
        FieldKind::Text => Ok(Value::Text(decode_text(reader)?)),
        FieldKind::Decimal => Ok(Value::Decimal(decode_decimal(reader)?)),
        FieldKind::BigInt => Ok(Value::BigInt(decode_bigint(reader)?)),
        FieldKind::Binary => {
            let len = reader.read_u32()? as usize;
            Ok(Value::Binary(reader.read_vec(len)?))
        }
        FieldKind::Date { mode, with_offset } => {
            Ok(Value::Date(decode_date(reader, mode, with_offset)?))
        }
        FieldKind::Nested { .. } => {
            let header = reader.begin_segment()?;
            let object = HierarchicalSerializer::new(registry).decode(header.type_id, reader)?;
            reader.end_segment(&header)?;
            Ok(Value::Object(object))
        }
        FieldKind::Collection(hint) => {
            let len = reader.read_u32()? as usize;
            let end = reader.position() + len;
            let count = reader.read_u32()? as usize;
            let mut items = Vec::with_capacity(count.min(reader.remaining()));
            match hint {
                ElementHint::Uniform(_) => {
                    let element = decode_uniform_header(reader)?;
                    for _ in 0..count {
                        items.push(decode_uniform_element(reader, element, registry)?);
                    }
                }
                ElementHint::Mixed => {
                    for _ in 0..count {
                        items.push(decode_tagged_element(reader, registry)?);
                    }
                }
            }
            check_region_end(reader, end, "collection")?;
            Ok(Value::Collection(items))
        }
        FieldKind::Map { key, value } => {
            let len = reader.read_u32()? as usize;
            let end = reader.position() + len;
            let count = reader.read_u32()? as usize;
            let key_element = match key {
                ElementHint::Uniform(_) => Some(decode_uniform_header(reader)?),
                ElementHint::Mixed => None,
            };
            let value_element = match value {
                ElementHint::Uniform(_) => Some(decode_uniform_header(reader)?),
                ElementHint::Mixed => None,
            };
            let mut entries = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                let entry_key = match key_element {
                    Some(element) => decode_uniform_element(reader, element, registry)?,
                    None => decode_tagged_element(reader, registry)?,
                };
                let entry_value = match value_element {
                    Some(element) => decode_uniform_element(reader, element, registry)?,
                    None => decode_tagged_element(reader, registry)?,
                };
                entries.push((entry_key, entry_value));
            }
            check_region_end(reader, end, "map")?;
            Ok(Value::Map(entries))
        }
    }
}

/// 跳过单个字段，不物化其值。
///
/// 定宽字段直接按宽度前移；变长字段消费自身的长度前缀后跳过负载。
/// 导航器对目标索引之前的字段逐一调用本函数。
pub fn skip_field(kind: &FieldKind, reader: &mut dyn WireReader) -> crate::Result<()> {
    if let Some(width) = kind.fixed_width() {
        return reader.skip(width);
    }
    match kind {
        FieldKind::PrimitiveArray(element) => {
            let count = reader.read_u32()? as usize;
            reader.skip(count.saturating_mul(element.width()))
        }
        FieldKind::Text | FieldKind::Binary | FieldKind::Collection(_) | FieldKind::Map { .. } => {
            let len = reader.read_u32()? as usize;
            reader.skip(len)
        }
        FieldKind::Decimal => {
            reader.skip(5)?;
            let len = reader.read_u32()? as usize;
            reader.skip(len)
        }
        FieldKind::BigInt => {
            reader.skip(1)?;
            let len = reader.read_u32()? as usize;
            reader.skip(len)
        }
        FieldKind::Nested { .. } => {
            let header = reader.begin_segment()?;
            reader.skip(header.len as usize)
        }
        // 定宽类别已在上方返回。
        FieldKind::Primitive(_) | FieldKind::Date { .. } => Ok(()),
    }
}

fn kind_label(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Primitive(PrimitiveKind::Bool) => "bool",
        FieldKind::Primitive(PrimitiveKind::I32) => "i32",
        FieldKind::Primitive(PrimitiveKind::I64) => "i64",
        FieldKind::Primitive(PrimitiveKind::F64) => "f64",
        FieldKind::PrimitiveArray(_) => "primitive array",
        FieldKind::Text => "text",
        FieldKind::Decimal => "decimal",
        FieldKind::BigInt => "bigint",
        FieldKind::Binary => "binary",
        FieldKind::Date { .. } => "date",
        FieldKind::Nested { .. } => "nested object",
        FieldKind::Collection(_) => "collection",
        FieldKind::Map { .. } => "map",
    }
}

fn patch_length(writer: &mut dyn WireWriter, slot: usize) -> crate::Result<()> {
    let len = writer.position() - slot - 4;
    writer.patch_u32(slot, len as u32)
}

fn check_region_end(
    reader: &mut dyn WireReader,
    end: usize,
    what: &str,
) -> crate::Result<()> {
    if reader.position() != end {
        return Err(CodecError::new(
            codes::DECODE_SEGMENT_OVERRUN,
            alloc::format!(
                "{what} region expected to end at {end}, reader is at {}",
                reader.position()
            ),
        ));
    }
    Ok(())
}

fn encode_text(writer: &mut dyn WireWriter, text: &str) -> crate::Result<()> {
    writer.put_u32(text.len() as u32)?;
    writer.put_slice(text.as_bytes())
}

fn decode_text(reader: &mut dyn WireReader) -> crate::Result<String> {
    let len = reader.read_u32()? as usize;
    let bytes = reader.read_vec(len)?;
    String::from_utf8(bytes)
        .map_err(|_| CodecError::new(codes::DECODE_BAD_UTF8, "text field is not valid utf-8"))
}

fn encode_decimal(writer: &mut dyn WireWriter, decimal: Decimal) -> crate::Result<()> {
    writer.put_i32(decimal.scale)?;
    let negative = decimal.unscaled < 0;
    let magnitude = decimal.unscaled.unsigned_abs().to_be_bytes();
    let first = magnitude
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(magnitude.len());
    writer.put_u8(u8::from(negative))?;
    writer.put_u32((magnitude.len() - first) as u32)?;
    writer.put_slice(&magnitude[first..])
}

fn decode_decimal(reader: &mut dyn WireReader) -> crate::Result<Decimal> {
    let scale = reader.read_i32()?;
    let negative = reader.read_bool()?;
    let len = reader.read_u32()? as usize;
    let magnitude = reader.read_vec(len)?;
    Ok(Decimal::new(decode_i128(negative, &magnitude)?, scale))
}

fn decode_i128(negative: bool, magnitude: &[u8]) -> crate::Result<i128> {
    if magnitude.len() > 16 {
        return Err(CodecError::new(
            codes::DECODE_TYPE_MISMATCH,
            "decimal magnitude exceeds 128 bits",
        ));
    }
    let mut buf = [0u8; 16];
    buf[16 - magnitude.len()..].copy_from_slice(magnitude);
    let raw = u128::from_be_bytes(buf);
    if negative {
        if raw > 1u128 << 127 {
            return Err(CodecError::new(
                codes::DECODE_TYPE_MISMATCH,
                "decimal magnitude exceeds i128 range",
            ));
        }
        Ok((raw as i128).wrapping_neg())
    } else {
        if raw > i128::MAX as u128 {
            return Err(CodecError::new(
                codes::DECODE_TYPE_MISMATCH,
                "decimal magnitude exceeds i128 range",
            ));
        }
        Ok(raw as i128)
    }
}

fn encode_bigint(writer: &mut dyn WireWriter, value: &BigInt) -> crate::Result<()> {
    writer.put_u8(u8::from(value.negative))?;
    writer.put_u32(value.magnitude.len() as u32)?;
    writer.put_slice(&value.magnitude)
}

fn decode_bigint(reader: &mut dyn WireReader) -> crate::Result<BigInt> {
    let negative = reader.read_bool()?;
    let len = reader.read_u32()? as usize;
    let magnitude = reader.read_vec(len)?;
    Ok(BigInt {
        negative,
        magnitude,
    })
}

fn encode_date(
    writer: &mut dyn WireWriter,
    mode: DateMode,
    with_offset: bool,
    value: &DateValue,
    field: &str,
) -> crate::Result<()> {
    if matches!(mode, DateMode::DateOnly | DateMode::DateTime) {
        writer.put_i32(value.year)?;
        writer.put_u8(value.month)?;
        writer.put_u8(value.day)?;
    }
    if matches!(mode, DateMode::TimeOnly | DateMode::DateTime) {
        writer.put_u8(value.hour)?;
        writer.put_u8(value.minute)?;
        writer.put_u8(value.second)?;
        writer.put_u32(value.nanos)?;
    }
    if with_offset {
        let Some(offset) = value.offset_seconds else {
            return Err(CodecError::new(
                codes::DECODE_TYPE_MISMATCH,
                alloc::format!("field `{field}` declares a zone offset, value carries none"),
            ));
        };
        writer.put_i32(offset)?;
    }
    Ok(())
}

fn decode_date(
    reader: &mut dyn WireReader,
    mode: DateMode,
    with_offset: bool,
) -> crate::Result<DateValue> {
    let mut value = DateValue::default();
    if matches!(mode, DateMode::DateOnly | DateMode::DateTime) {
        value.year = reader.read_i32()?;
        value.month = reader.read_u8()?;
        value.day = reader.read_u8()?;
    }
    if matches!(mode, DateMode::TimeOnly | DateMode::DateTime) {
        value.hour = reader.read_u8()?;
        value.minute = reader.read_u8()?;
        value.second = reader.read_u8()?;
        value.nanos = reader.read_u32()?;
    }
    if with_offset {
        value.offset_seconds = Some(reader.read_i32()?);
    }
    Ok(value)
}

fn decode_primitive_array(
    reader: &mut dyn WireReader,
    kind: PrimitiveKind,
) -> crate::Result<Value> {
    let count = reader.read_u32()? as usize;
    if count.saturating_mul(kind.width()) > reader.remaining() {
        return Err(CodecError::new(
            codes::DECODE_TRUNCATED,
            alloc::format!("array of {count} elements exceeds remaining input"),
        ));
    }
    match kind {
        PrimitiveKind::Bool => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_bool()?);
            }
            Ok(Value::BoolArray(items))
        }
        PrimitiveKind::I32 => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_i32()?);
            }
            Ok(Value::I32Array(items))
        }
        PrimitiveKind::I64 => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_i64()?);
            }
            Ok(Value::I64Array(items))
        }
        PrimitiveKind::F64 => {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(reader.read_f64()?);
            }
            Ok(Value::F64Array(items))
        }
    }
}

/// 推导元素值的线上类别；无法表达的元素值属于提示配置错误。
fn element_type_of(value: &Value, registry: &TypeRegistry) -> crate::Result<ElementType> {
    match value {
        Value::Bool(_) => Ok(ElementType::Bool),
        Value::I32(_) => Ok(ElementType::I32),
        Value::I64(_) => Ok(ElementType::I64),
        Value::F64(_) => Ok(ElementType::F64),
        Value::Text(_) => Ok(ElementType::Text),
        Value::Decimal(_) => Ok(ElementType::Decimal),
        Value::BigInt(_) => Ok(ElementType::BigInt),
        Value::Binary(_) => Ok(ElementType::Binary),
        Value::Object(object) => {
            let type_id = registry.type_id_for(object.as_any().type_id())?;
            Ok(ElementType::Object(type_id))
        }
        other => Err(CodecError::new(
            codes::CONFIG_ELEMENT_HINT,
            alloc::format!("{} cannot appear as a collection element", other.kind_name()),
        )),
    }
}

fn encode_uniform_header(
    writer: &mut dyn WireWriter,
    element: ElementType,
) -> crate::Result<()> {
    match element {
        ElementType::Bool => writer.put_u8(tag::BOOL),
        ElementType::I32 => writer.put_u8(tag::I32),
        ElementType::I64 => writer.put_u8(tag::I64),
        ElementType::F64 => writer.put_u8(tag::F64),
        ElementType::Text => writer.put_u8(tag::TEXT),
        ElementType::Decimal => writer.put_u8(tag::DECIMAL),
        ElementType::BigInt => writer.put_u8(tag::BIGINT),
        ElementType::Binary => writer.put_u8(tag::BINARY),
        ElementType::Object(type_id) => {
            writer.put_u8(tag::OBJECT)?;
            writer.put_i32(type_id)
        }
    }
}

fn decode_uniform_header(reader: &mut dyn WireReader) -> crate::Result<ElementType> {
    let tag_byte = reader.read_u8()?;
    match tag_byte {
        tag::BOOL => Ok(ElementType::Bool),
        tag::I32 => Ok(ElementType::I32),
        tag::I64 => Ok(ElementType::I64),
        tag::F64 => Ok(ElementType::F64),
        tag::TEXT => Ok(ElementType::Text),
        tag::DECIMAL => Ok(ElementType::Decimal),
        tag::BIGINT => Ok(ElementType::BigInt),
        tag::BINARY => Ok(ElementType::Binary),
        tag::OBJECT => Ok(ElementType::Object(reader.read_i32()?)),
        other => Err(CodecError::new(
            codes::DECODE_BAD_TAG,
            alloc::format!("unknown element tag {other:#04x}"),
        )),
    }
}

/// 统一编码的元素负载：类型信息已写在头部，元素不再重复。
fn encode_uniform_element(
    writer: &mut dyn WireWriter,
    element: ElementType,
    value: Value,
    registry: &TypeRegistry,
    field: &str,
) -> crate::Result<()> {
    let actual = element_type_of(&value, registry)?;
    if actual != element {
        return Err(CodecError::new(
            codes::DECODE_TYPE_MISMATCH,
            alloc::format!(
                "field `{field}` declares a uniform element type, element differs ({actual:?} vs {element:?})"
            ),
        ));
    }
    match value {
        Value::Bool(v) => writer.put_bool(v),
        Value::I32(v) => writer.put_i32(v),
        Value::I64(v) => writer.put_i64(v),
        Value::F64(v) => writer.put_f64(v),
        Value::Text(v) => encode_text(writer, &v),
        Value::Decimal(v) => encode_decimal(writer, v),
        Value::BigInt(v) => encode_bigint(writer, &v),
        Value::Binary(v) => {
            writer.put_u32(v.len() as u32)?;
            writer.put_slice(&v)
        }
        Value::Object(mut object) => {
            let slot = writer.position();
            writer.put_u32(0)?;
            HierarchicalSerializer::new(registry).encode(object.as_mut(), writer)?;
            patch_length(writer, slot)
        }
        // `element_type_of` 已拒绝其余变体。
        other => Err(mismatch(field, "uniform element", &other)),
    }
}

fn decode_uniform_element(
    reader: &mut dyn WireReader,
    element: ElementType,
    registry: &TypeRegistry,
) -> crate::Result<Value> {
    match element {
        ElementType::Bool => Ok(Value::Bool(reader.read_bool()?)),
        ElementType::I32 => Ok(Value::I32(reader.read_i32()?)),
        ElementType::I64 => Ok(Value::I64(reader.read_i64()?)),
        ElementType::F64 => Ok(Value::F64(reader.read_f64()?)),
        ElementType::Text => Ok(Value::Text(decode_text(reader)?)),
        ElementType::Decimal => Ok(Value::Decimal(decode_decimal(reader)?)),
        ElementType::BigInt => Ok(Value::BigInt(decode_bigint(reader)?)),
        ElementType::Binary => {
            let len = reader.read_u32()? as usize;
            Ok(Value::Binary(reader.read_vec(len)?))
        }
        ElementType::Object(type_id) => {
            let len = reader.read_u32()? as usize;
            let end = reader.position() + len;
            let object = HierarchicalSerializer::new(registry).decode(type_id, reader)?;
            check_region_end(reader, end, "uniform object element")?;
            Ok(Value::Object(object))
        }
    }
}

/// 异构编码的元素：每个元素独立携带标签（对象元素额外携带类型标识）。
fn encode_tagged_element(
    writer: &mut dyn WireWriter,
    value: Value,
    registry: &TypeRegistry,
    field: &str,
) -> crate::Result<()> {
    let element = element_type_of(&value, registry)?;
    match value {
        Value::Object(mut object) => {
            let ElementType::Object(type_id) = element else {
                return Err(mismatch(field, "object element", &Value::Object(object)));
            };
            writer.put_u8(tag::OBJECT)?;
            let slot = writer.begin_segment(type_id)?;
            HierarchicalSerializer::new(registry).encode(object.as_mut(), writer)?;
            writer.end_segment(slot)
        }
        scalar => {
            encode_uniform_header(writer, element)?;
            encode_uniform_element(writer, element, scalar, registry, field)
        }
    }
}

fn decode_tagged_element(
    reader: &mut dyn WireReader,
    registry: &TypeRegistry,
) -> crate::Result<Value> {
    let tag_byte = reader.read_u8()?;
    match tag_byte {
        tag::BOOL => Ok(Value::Bool(reader.read_bool()?)),
        tag::I32 => Ok(Value::I32(reader.read_i32()?)),
        tag::I64 => Ok(Value::I64(reader.read_i64()?)),
        tag::F64 => Ok(Value::F64(reader.read_f64()?)),
        tag::TEXT => Ok(Value::Text(decode_text(reader)?)),
        tag::DECIMAL => Ok(Value::Decimal(decode_decimal(reader)?)),
        tag::BIGINT => Ok(Value::BigInt(decode_bigint(reader)?)),
        tag::BINARY => {
            let len = reader.read_u32()? as usize;
            Ok(Value::Binary(reader.read_vec(len)?))
        }
        tag::OBJECT => {
            let header = reader.begin_segment()?;
            let object = HierarchicalSerializer::new(registry).decode(header.type_id, reader)?;
            reader.end_segment(&header)?;
            Ok(Value::Object(object))
        }
        other => Err(CodecError::new(
            codes::DECODE_BAD_TAG,
            alloc::format!("unknown element tag {other:#04x}"),
        )),
    }
}
