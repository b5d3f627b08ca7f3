//! 分层序列化器。
//!
//! # 模块架构（Why）
//! - 这是编排核心：一次编码/解码覆盖对象完整的祖先类型链，每个祖先类型
//!   占据一个自定界的嵌套段，段内以版本标记门控字段序列；
//! - 前向兼容的实现点在解码第 3 步：新 schema 写入、本端不认识的尾部字节
//!   被原样存入 [`EvolvableState`](crate::evolvable::EvolvableState)，
//!   下次编码逐字节回放——未识别的数据绝不丢弃；
//! - 读写双方 schema 版本不一致**不是错误**，而是设计内场景；截断或段边界
//!   错位才是硬性解码错误，立即上抛、从不静默恢复（静默跳过损坏段会破坏
//!   后续字段对齐）。
//!
//! # 线上形态（What）
//! - Evolvable 类型：`[版本映射前导][段数][段…][remainder]`；
//!   非 Evolvable 类型省略前导，链与版本同步取自注册表；
//! - 段：`[type_id: i32][len: u32][版本标记: i32][字段…][future data]`；
//! - 顶层 remainder 恒为空，仅作为结构终止标记存在。

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::buffer::{SliceReader, VecWriter, WireReader, WireWriter};
use crate::error::{CodecError, codes};
use crate::fieldcodec;
use crate::metrics::{CodecMetrics, CodecPhase};
use crate::registry::TypeRegistry;
use crate::value::PortableObject;

struct SegmentPlan {
    type_id: i32,
    marker: i32,
    known: bool,
    future: Option<Vec<u8>>,
}

/// `HierarchicalSerializer` 按注册表驱动对象的分层编解码。
///
/// # 并发模型（Concurrency）
/// - 单次编解码是同步的单线程遍历；序列化器自身无状态，仅借用注册表与
///   可选的指标挂钩，可被多线程各自构造并发使用。
pub struct HierarchicalSerializer<'a> {
    registry: &'a TypeRegistry,
    metrics: Option<&'a dyn CodecMetrics>,
}

impl<'a> HierarchicalSerializer<'a> {
    /// 基于注册表构造序列化器。
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            metrics: None,
        }
    }

    /// 注入指标挂钩。
    #[must_use]
    pub fn with_metrics(mut self, metrics: &'a dyn CodecMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 编码对象的完整祖先链。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：对象的具体 Rust 类型及其全部祖先类型均已注册；
    /// - **后置条件**：Evolvable 实例的每个链上版本标记被提升到
    ///   `max(注册声明版本, 既存版本)`——版本永不回退；
    /// - 对象携带的 future data 按类型标识原样写回对应段的尾部。
    pub fn encode(
        &self,
        object: &mut dyn PortableObject,
        writer: &mut dyn WireWriter,
    ) -> crate::Result<()> {
        let start = writer.position();
        let result = self.encode_inner(object, writer);
        if let Some(metrics) = self.metrics {
            match &result {
                Ok(()) => {
                    metrics.record_bytes(CodecPhase::Encode, (writer.position() - start) as u64)
                }
                Err(_) => metrics.record_error(CodecPhase::Encode),
            }
        }
        result
    }

    /// 便捷入口：编码到新分配的字节向量。
    pub fn encode_to_vec(&self, object: &mut dyn PortableObject) -> crate::Result<Vec<u8>> {
        let mut writer = VecWriter::new();
        self.encode(object, &mut writer)?;
        Ok(writer.into_vec())
    }

    /// 解码 `type_id` 对应类型的对象。
    ///
    /// # 失败语义（Errors）
    /// - 实例化失败（未注册、无工厂）是配置错误；
    /// - 截断、段边界错位是硬性解码错误；
    /// - 链上出现本端注册表不认识的类型标识**不是**错误：该段被结构化跳过，
    ///   Evolvable 实例将其字节保留为 future data，非 Evolvable 实例静默丢弃。
    pub fn decode(
        &self,
        type_id: i32,
        reader: &mut dyn WireReader,
    ) -> crate::Result<Box<dyn PortableObject>> {
        let start = reader.position();
        let result = self.decode_inner(type_id, reader);
        if let Some(metrics) = self.metrics {
            match &result {
                Ok(_) => {
                    metrics.record_bytes(CodecPhase::Decode, (reader.position() - start) as u64)
                }
                Err(_) => metrics.record_error(CodecPhase::Decode),
            }
        }
        result
    }

    /// 便捷入口：从字节切片解码。
    pub fn decode_slice(
        &self,
        type_id: i32,
        bytes: &[u8],
    ) -> crate::Result<Box<dyn PortableObject>> {
        let mut reader = SliceReader::new(bytes);
        self.decode(type_id, &mut reader)
    }

    fn encode_inner(
        &self,
        object: &mut dyn PortableObject,
        writer: &mut dyn WireWriter,
    ) -> crate::Result<()> {
        let type_id = self.registry.type_id_for(object.as_any().type_id())?;
        let chain = self.registry.chain(type_id)?;
        let evolvable = self
            .registry
            .descriptor(type_id)
            .map(|descriptor| descriptor.evolvable)
            .unwrap_or(false);
        ensure_capability(type_id, evolvable, object.evolvable().is_some())?;

        // 链上每个类型的声明版本；chain() 成功即保证描述符存在。
        let mut declared = Vec::with_capacity(chain.len());
        for id in &chain {
            let descriptor = self.registry.descriptor(*id).ok_or_else(|| {
                CodecError::new(
                    codes::CONFIG_UNKNOWN_TYPE,
                    alloc::format!("type id {id} vanished from the registry"),
                )
            })?;
            declared.push((*id, descriptor.declared_version));
        }

        let mut preamble: Vec<(i32, i32)> = Vec::new();
        let mut plan: Vec<SegmentPlan> = Vec::new();
        if evolvable {
            let Some(state) = object.evolvable_mut() else {
                return Err(capability_error(type_id));
            };
            for (id, version) in &declared {
                state.bump_version(*id, *version);
            }
            preamble = state.versions().collect();
            for (id, version) in &declared {
                plan.push(SegmentPlan {
                    type_id: *id,
                    marker: state.version(*id).unwrap_or(*version),
                    known: true,
                    future: state.future_data(*id).map(<[u8]>::to_vec),
                });
            }
            // 本端注册表不认识的祖先段：按类型标识升序补在链后。
            for (id, version) in &preamble {
                if !chain.contains(id) {
                    plan.push(SegmentPlan {
                        type_id: *id,
                        marker: *version,
                        known: false,
                        future: state.future_data(*id).map(<[u8]>::to_vec),
                    });
                }
            }
        } else {
            for (id, version) in &declared {
                plan.push(SegmentPlan {
                    type_id: *id,
                    marker: *version,
                    known: true,
                    future: None,
                });
            }
        }

        if evolvable {
            writer.put_u16(preamble.len() as u16)?;
            for (id, version) in &preamble {
                writer.put_i32(*id)?;
                writer.put_i32(*version)?;
            }
        }
        writer.put_u16(plan.len() as u16)?;
        for segment in plan {
            let slot = writer.begin_segment(segment.type_id)?;
            writer.put_i32(segment.marker)?;
            if segment.known {
                let schema = self.registry.schema(segment.type_id)?;
                for field in schema.fields_up_to(segment.marker) {
                    let value = object.read_field(segment.type_id, field.index)?;
                    fieldcodec::encode_field(field, value, self.registry, writer)?;
                }
            }
            if let Some(bytes) = &segment.future {
                writer.put_slice(bytes)?;
            }
            writer.end_segment(slot)?;
        }
        writer.write_remainder(&[])
    }

    fn decode_inner(
        &self,
        type_id: i32,
        reader: &mut dyn WireReader,
    ) -> crate::Result<Box<dyn PortableObject>> {
        let descriptor = self.registry.descriptor(type_id).ok_or_else(|| {
            CodecError::new(
                codes::CONFIG_UNKNOWN_TYPE,
                alloc::format!("cannot decode unregistered type id {type_id}"),
            )
        })?;
        let mut object = self.registry.instantiate(type_id)?;
        let evolvable = descriptor.evolvable;
        ensure_capability(type_id, evolvable, object.evolvable().is_some())?;

        // Evolvable 编码以版本映射前导开路；非 Evolvable 编码直接进入段序列。
        let mut preamble: Vec<(i32, i32)> = Vec::new();
        if evolvable {
            let count = reader.read_u16()?;
            preamble.reserve(count as usize);
            for _ in 0..count {
                let id = reader.read_i32()?;
                let version = reader.read_i32()?;
                preamble.push((id, version));
            }
        }

        let segment_count = reader.read_u16()?;
        for _ in 0..segment_count {
            let header = reader.begin_segment()?;
            let marker = reader.read_i32()?;
            if self.registry.descriptor(header.type_id).is_some() {
                let schema = self.registry.schema(header.type_id)?;
                for field in schema.fields_up_to(marker) {
                    let value = fieldcodec::decode_field(field, self.registry, reader)?;
                    object.write_field(header.type_id, field.index, value)?;
                }
                if reader.position() > header.end {
                    return Err(CodecError::new(
                        codes::DECODE_SEGMENT_OVERRUN,
                        alloc::format!(
                            "fields of segment {} overran its length prefix",
                            header.type_id
                        ),
                    ));
                }
                // 尾部未识别字节：这是前向兼容的关键一步。
                let trailing = reader.read_vec(header.end - reader.position())?;
                if let Some(state) = object.evolvable_mut() {
                    state.bump_version(header.type_id, marker);
                    state.set_future_data(header.type_id, trailing);
                }
            } else {
                // 注册表不认识的祖先段：长度前缀使结构化跳过成为可能。
                let payload = reader.read_vec(header.end - reader.position())?;
                if let Some(state) = object.evolvable_mut() {
                    state.bump_version(header.type_id, marker);
                    state.set_future_data(header.type_id, payload);
                }
            }
            reader.end_segment(&header)?;
        }

        if let Some(state) = object.evolvable_mut() {
            for (id, version) in preamble {
                state.bump_version(id, version);
            }
        }
        let _ = reader.read_remainder()?;
        Ok(object)
    }
}

fn capability_error(type_id: i32) -> CodecError {
    CodecError::new(
        codes::CONFIG_EVOLVABLE_MISMATCH,
        alloc::format!(
            "type id {type_id}: registration and instance disagree on evolvable support"
        ),
    )
}

fn ensure_capability(
    type_id: i32,
    registered: bool,
    instance: bool,
) -> crate::Result<()> {
    if registered != instance {
        return Err(capability_error(type_id));
    }
    Ok(())
}
