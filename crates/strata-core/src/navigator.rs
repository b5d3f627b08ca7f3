//! 字段导航器。
//!
//! # 模块架构（Why）
//! - 外部存储层的点读/点写操作不应为单个字段物化整个对象：导航器把点号
//!   路径（如 `address.city`）解析为 `(type_id, field_index)` 跳点序列，
//!   然后在编码缓冲上按偏移行走，直接取出或替换目标字段的字节区间；
//! - 跳过策略依赖字段元数据：定宽字段直接前移，变长字段顺序消费到目标
//!   索引——这正是线上格式给所有变长类别配长度前缀的原因。
//!
//! # 并发模型（Concurrency）
//! - 路径解析结果无状态、可缓存；本实现按 `(根类型, 路径串)` 记忆化；
//! - 点写期间缓冲必须被调用方独占，并发写同一缓冲不受支持。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::RwLock;

use crate::buffer::{SliceReader, VecWriter, WireReader};
use crate::error::{CodecError, codes};
use crate::fieldcodec;
use crate::registry::TypeRegistry;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::value::Value;

/// 路径中的单个跳点：目标字段及其所属祖先类型。
#[derive(Clone, Debug)]
pub struct Hop {
    /// 拥有该字段的祖先类型标识。
    pub type_id: i32,
    /// 目标字段的完整描述符。
    pub field: FieldDescriptor,
}

/// 解析完成的导航路径：每个路径段一个跳点。
#[derive(Clone, Debug)]
pub struct NavigationPath {
    root_type_id: i32,
    hops: Vec<Hop>,
}

impl NavigationPath {
    /// 路径锚定的根类型标识。
    pub fn root_type_id(&self) -> i32 {
        self.root_type_id
    }

    /// 按顺序返回全部跳点。
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }
}

struct Span {
    start: usize,
    end: usize,
    /// 包裹目标区间的所有长度前缀槽位（段长度、嵌套字段长度），
    /// 点写后按字节差额逐一修正。
    length_slots: Vec<usize>,
}

/// `FieldNavigator` 提供点号路径的解析与缓冲级点读/点写。
pub struct FieldNavigator<'a> {
    registry: &'a TypeRegistry,
    memo: RwLock<BTreeMap<(i32, String), Arc<NavigationPath>>>,
}

impl<'a> FieldNavigator<'a> {
    /// 基于注册表构造导航器。
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            memo: RwLock::new(BTreeMap::new()),
        }
    }

    /// 将点号路径解析为跳点序列。
    ///
    /// # 失败语义（Errors）
    /// - `navigate.field_not_found`：某段未命中根类型可达的任何字段
    ///   （沿自身字段与嵌套对象字段类型递归可达）；
    /// - `navigate.not_nested`：中间段命中的字段不是嵌套对象。
    ///
    /// 解析结果按 `(根类型, 路径串)` 记忆化；路径本身无状态。
    pub fn resolve(
        &self,
        root_type_id: i32,
        path: &str,
    ) -> crate::Result<Arc<NavigationPath>> {
        let key = (root_type_id, String::from(path));
        if let Some(resolved) = self.memo.read().get(&key) {
            return Ok(resolved.clone());
        }
        let resolved = Arc::new(self.resolve_uncached(root_type_id, path)?);
        self.memo.write().insert(key, resolved.clone());
        Ok(resolved)
    }

    fn resolve_uncached(
        &self,
        root_type_id: i32,
        path: &str,
    ) -> crate::Result<NavigationPath> {
        if path.is_empty() {
            return Err(CodecError::new(
                codes::NAVIGATE_FIELD_NOT_FOUND,
                "navigation path is empty",
            ));
        }
        let segments: Vec<&str> = path.split('.').collect();
        let mut hops = Vec::with_capacity(segments.len());
        let mut current = root_type_id;
        for (position, segment) in segments.iter().enumerate() {
            let chain = self.registry.chain(current)?;
            let mut found = None;
            for id in chain {
                let schema = self.registry.schema(id)?;
                if let Some(field) = schema.field_by_name(segment) {
                    found = Some(Hop {
                        type_id: id,
                        field: field.clone(),
                    });
                    break;
                }
            }
            let Some(hop) = found else {
                return Err(CodecError::new(
                    codes::NAVIGATE_FIELD_NOT_FOUND,
                    alloc::format!(
                        "path segment `{segment}` matches no field reachable from type {current}"
                    ),
                ));
            };
            if position + 1 < segments.len() {
                let FieldKind::Nested { type_id } = hop.field.kind else {
                    return Err(CodecError::new(
                        codes::NAVIGATE_NOT_NESTED,
                        alloc::format!(
                            "path segment `{segment}` is not a nested object field"
                        ),
                    ));
                };
                current = type_id;
            }
            hops.push(hop);
        }
        Ok(NavigationPath {
            root_type_id,
            hops,
        })
    }

    /// 点读：在编码缓冲上定位并解出目标字段的值，不物化整个对象。
    pub fn read(&self, buffer: &[u8], path: &NavigationPath) -> crate::Result<Value> {
        let span = self.locate(buffer, path)?;
        let hop = last_hop(path)?;
        let mut reader = SliceReader::new(&buffer[span.start..span.end]);
        fieldcodec::decode_field(&hop.field, self.registry, &mut reader)
    }

    /// 点写：将目标字段的字节区间替换为新值的编码，并修正所有包裹层的
    /// 长度前缀。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：缓冲在整个拼接期间被调用方独占；
    /// - **后置条件**：缓冲仍是合法编码，后续整体解码观察到新值；
    ///   目标区间之后的字节按差额整体平移，其余内容保持不变。
    pub fn write(
        &self,
        buffer: &mut Vec<u8>,
        path: &NavigationPath,
        value: Value,
    ) -> crate::Result<()> {
        let span = self.locate(buffer, path)?;
        let hop = last_hop(path)?;
        let mut writer = VecWriter::new();
        fieldcodec::encode_field(&hop.field, value, self.registry, &mut writer)?;
        let replacement = writer.into_vec();
        let delta = replacement.len() as i64 - (span.end - span.start) as i64;
        buffer.splice(span.start..span.end, replacement);
        // 长度槽全部位于目标区间之前，不受拼接平移影响。
        for slot in span.length_slots {
            let old = u32::from_be_bytes(
                buffer[slot..slot + 4]
                    .try_into()
                    .map_err(|_| slot_error(slot))?,
            );
            let new = (i64::from(old) + delta) as u32;
            buffer[slot..slot + 4].copy_from_slice(&new.to_be_bytes());
        }
        Ok(())
    }

    /// 在缓冲上行走跳点序列，返回目标字段的字节区间与包裹长度槽。
    fn locate(&self, buffer: &[u8], path: &NavigationPath) -> crate::Result<Span> {
        let mut reader = SliceReader::new(buffer);
        let mut length_slots = Vec::new();
        let mut region_root = path.root_type_id;
        let total = path.hops.len();
        for (position, hop) in path.hops.iter().enumerate() {
            let last = position + 1 == total;
            // 区域以可选前导开路：前导的有无由区域根类型的注册描述决定。
            let evolvable = self
                .registry
                .descriptor(region_root)
                .map(|descriptor| descriptor.evolvable)
                .unwrap_or(false);
            if evolvable {
                let count = reader.read_u16()? as usize;
                reader.skip(count * 8)?;
            }
            let segment_count = reader.read_u16()?;
            let mut entered = false;
            for _ in 0..segment_count {
                let header_at = reader.position();
                let header = reader.begin_segment()?;
                if header.type_id != hop.type_id {
                    reader.skip(header.len as usize)?;
                    continue;
                }
                length_slots.push(header_at + 4);
                let marker = reader.read_i32()?;
                if hop.field.since_version > marker {
                    return Err(CodecError::new(
                        codes::NAVIGATE_FIELD_ABSENT,
                        alloc::format!(
                            "field `{}` requires version {}, segment carries {marker}",
                            hop.field.name,
                            hop.field.since_version
                        ),
                    ));
                }
                let schema = self.registry.schema(hop.type_id)?;
                for field in schema.fields_up_to(marker) {
                    if field.index == hop.field.index {
                        break;
                    }
                    fieldcodec::skip_field(&field.kind, &mut reader)?;
                }
                if last {
                    let start = reader.position();
                    fieldcodec::skip_field(&hop.field.kind, &mut reader)?;
                    return Ok(Span {
                        start,
                        end: reader.position(),
                        length_slots,
                    });
                }
                // 中间跳点：进入嵌套对象字段的主体继续行走。
                let nested_at = reader.position();
                let nested = reader.begin_segment()?;
                length_slots.push(nested_at + 4);
                region_root = nested.type_id;
                entered = true;
                break;
            }
            if !entered {
                return Err(CodecError::new(
                    codes::NAVIGATE_FIELD_ABSENT,
                    alloc::format!(
                        "segment for type {} is absent from the buffer",
                        hop.type_id
                    ),
                ));
            }
        }
        Err(CodecError::new(
            codes::NAVIGATE_FIELD_NOT_FOUND,
            "navigation path has no hops",
        ))
    }
}

fn last_hop(path: &NavigationPath) -> crate::Result<&Hop> {
    path.hops.last().ok_or_else(|| {
        CodecError::new(codes::NAVIGATE_FIELD_NOT_FOUND, "navigation path has no hops")
    })
}

fn slot_error(slot: usize) -> CodecError {
    CodecError::new(
        codes::DECODE_SEGMENT_OVERRUN,
        alloc::format!("length slot at {slot} is outside the buffer"),
    )
}
