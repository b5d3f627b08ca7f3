//! 读写契约模块。
//!
//! # 模块架构（Why）
//! - 编解码核心不关心字节从哪里来、到哪里去：传输层可能是阻塞 IO、共享内存或测试向量，
//!   因此以对象安全的 [`WireReader`] / [`WireWriter`] 契约隔离底层实现；
//! - 段（Segment）的“自定界”能力是整个演进式编码的根基——长度前缀让未知类型的段
//!   可以被结构化跳过，而非破坏后续字段对齐。
//!
//! # 设计总览（How）
//! - 基础原语统一采用大端序（网络字节序），字符串与二进制采用 `u32` 长度前缀；
//! - `begin_segment`/`end_segment` 成对出现，写侧预留长度槽并在闭合时回填，
//!   读侧校验消费字节数与长度前缀严格一致；
//! - [`SliceReader`] 与 [`VecWriter`] 是内建实现，基于 `bytes` 的 `Buf`/`BufMut` 族接口。

use alloc::vec::Vec;
use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CodecError, codes};

/// 嵌套段的读侧边界信息。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentHeader {
    /// 段所属的类型标识。
    pub type_id: i32,
    /// 段负载的字节长度。
    pub len: u32,
    /// 段负载结束时读指针应处的绝对位置。
    pub end: usize,
}

/// `WireReader` 定义对象安全的只读字节流契约。
///
/// # 设计背景（Why）
/// - 对标框架缓冲层的 `ReadableBuffer`：以“剩余量 + 顺序消费”模型覆盖各种底层载体；
/// - 编解码核心只依赖此最小集合，调用方可用切片、环形缓冲或映射内存实现。
///
/// # 契约说明（What）
/// - **前置条件**：所有读取操作要求剩余字节充足，否则返回 `decode.truncated`；
/// - **后置条件**：任何成功的读取都使 [`position`](Self::position) 精确前移对应字节数；
/// - 默认方法实现了大端序原语与段协议，实现方通常只需提供四个基础操作。
pub trait WireReader {
    /// 返回自流起点以来已消费的字节数。
    fn position(&self) -> usize;

    /// 返回剩余可读字节数。
    fn remaining(&self) -> usize;

    /// 精确读取 `dst.len()` 字节。
    fn read_exact(&mut self, dst: &mut [u8]) -> crate::Result<()>;

    /// 读取 `len` 字节并返回拥有所有权的副本。
    fn read_vec(&mut self, len: usize) -> crate::Result<Vec<u8>>;

    /// 跳过 `len` 字节，丢弃对应数据。
    fn skip(&mut self, len: usize) -> crate::Result<()>;

    /// 读取单字节。
    fn read_u8(&mut self) -> crate::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// 读取布尔值；非 0/1 编码视为非法标签。
    fn read_bool(&mut self) -> crate::Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::new(
                codes::DECODE_BAD_TAG,
                alloc::format!("invalid bool byte {other:#04x}"),
            )),
        }
    }

    /// 读取大端 `u16`。
    fn read_u16(&mut self) -> crate::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// 读取大端 `u32`。
    fn read_u32(&mut self) -> crate::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// 读取大端 `i32`。
    fn read_i32(&mut self) -> crate::Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// 读取大端 `i64`。
    fn read_i64(&mut self) -> crate::Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    /// 读取大端 IEEE-754 双精度浮点。
    fn read_f64(&mut self) -> crate::Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    /// 打开一个嵌套段：读取类型标识与长度前缀，并校验长度不超过剩余输入。
    fn begin_segment(&mut self) -> crate::Result<SegmentHeader> {
        let type_id = self.read_i32()?;
        let len = self.read_u32()?;
        if len as usize > self.remaining() {
            return Err(CodecError::new(
                codes::DECODE_TRUNCATED,
                alloc::format!(
                    "segment {type_id} declares {len} bytes, only {} remain",
                    self.remaining()
                ),
            ));
        }
        Ok(SegmentHeader {
            type_id,
            len,
            end: self.position() + len as usize,
        })
    }

    /// 关闭嵌套段：消费字节数必须与长度前缀严格一致。
    fn end_segment(&mut self, segment: &SegmentHeader) -> crate::Result<()> {
        if self.position() != segment.end {
            return Err(CodecError::new(
                codes::DECODE_SEGMENT_OVERRUN,
                alloc::format!(
                    "segment {} expected to end at {}, reader is at {}",
                    segment.type_id,
                    segment.end,
                    self.position()
                ),
            ));
        }
        Ok(())
    }

    /// 消费尾部 remainder 标记（`u32` 长度 + 原始字节）。
    fn read_remainder(&mut self) -> crate::Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        self.read_vec(len)
    }
}

/// `WireWriter` 定义对象安全的顺序写出契约。
///
/// # 设计背景（Why）
/// - 对标框架缓冲层的 `WritableBuffer`：顺序写入、容量按需增长、不支持并发写；
/// - 段长度在写入时未知，契约以“预留槽位 + 回填”表达，实现方只需支持定点补写。
///
/// # 契约说明（What）
/// - **前置条件**：调用方保证 `begin_segment`/`end_segment` 严格配对且后进先出；
/// - **后置条件**：`end_segment` 回填的长度精确等于两调用之间写出的字节数。
pub trait WireWriter {
    /// 返回已写出的字节数。
    fn position(&self) -> usize;

    /// 将切片写入末尾。
    fn put_slice(&mut self, src: &[u8]) -> crate::Result<()>;

    /// 在 `at` 处回填一个大端 `u32`，不移动写指针。
    fn patch_u32(&mut self, at: usize, value: u32) -> crate::Result<()>;

    /// 写入单字节。
    fn put_u8(&mut self, value: u8) -> crate::Result<()> {
        self.put_slice(&[value])
    }

    /// 写入布尔值（0/1 单字节编码）。
    fn put_bool(&mut self, value: bool) -> crate::Result<()> {
        self.put_u8(u8::from(value))
    }

    /// 写入大端 `u16`。
    fn put_u16(&mut self, value: u16) -> crate::Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// 写入大端 `u32`。
    fn put_u32(&mut self, value: u32) -> crate::Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// 写入大端 `i32`。
    fn put_i32(&mut self, value: i32) -> crate::Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// 写入大端 `i64`。
    fn put_i64(&mut self, value: i64) -> crate::Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// 写入大端 IEEE-754 双精度浮点。
    fn put_f64(&mut self, value: f64) -> crate::Result<()> {
        self.put_slice(&value.to_bits().to_be_bytes())
    }

    /// 打开一个嵌套段：写出类型标识并预留长度槽，返回槽位偏移供闭合时回填。
    fn begin_segment(&mut self, type_id: i32) -> crate::Result<usize> {
        self.put_i32(type_id)?;
        let slot = self.position();
        self.put_u32(0)?;
        Ok(slot)
    }

    /// 闭合嵌套段，将实际负载长度回填到预留槽。
    fn end_segment(&mut self, slot: usize) -> crate::Result<()> {
        let len = self.position() - slot - 4;
        self.patch_u32(slot, len as u32)
    }

    /// 写出尾部 remainder 标记（`u32` 长度 + 原始字节）。
    fn write_remainder(&mut self, bytes: &[u8]) -> crate::Result<()> {
        self.put_u32(bytes.len() as u32)?;
        self.put_slice(bytes)
    }
}

/// 基于切片的内建读取器。
///
/// 保留完整切片与未读尾部两个视图，`position` 由二者长度差推得，
/// 避免额外的游标字段与一致性维护。
#[derive(Clone, Debug)]
pub struct SliceReader<'a> {
    full: &'a [u8],
    rest: &'a [u8],
}

impl<'a> SliceReader<'a> {
    /// 从字节切片构造读取器。
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            full: bytes,
            rest: bytes,
        }
    }

    fn ensure(&self, len: usize) -> crate::Result<()> {
        if self.rest.len() < len {
            return Err(CodecError::new(
                codes::DECODE_TRUNCATED,
                alloc::format!("need {len} bytes, only {} remain", self.rest.len()),
            ));
        }
        Ok(())
    }
}

impl WireReader for SliceReader<'_> {
    fn position(&self) -> usize {
        self.full.len() - self.rest.len()
    }

    fn remaining(&self) -> usize {
        self.rest.len()
    }

    fn read_exact(&mut self, dst: &mut [u8]) -> crate::Result<()> {
        self.ensure(dst.len())?;
        self.rest.copy_to_slice(dst);
        Ok(())
    }

    fn read_vec(&mut self, len: usize) -> crate::Result<Vec<u8>> {
        self.ensure(len)?;
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head.to_vec())
    }

    fn skip(&mut self, len: usize) -> crate::Result<()> {
        self.ensure(len)?;
        self.rest.advance(len);
        Ok(())
    }
}

/// 基于 [`BytesMut`] 的内建写出器。
#[derive(Debug, Default)]
pub struct VecWriter {
    buf: BytesMut,
}

impl VecWriter {
    /// 构造空写出器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 查看已写出的字节。
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// 结束写出，取回字节向量。
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

impl WireWriter for VecWriter {
    fn position(&self) -> usize {
        self.buf.len()
    }

    fn put_slice(&mut self, src: &[u8]) -> crate::Result<()> {
        self.buf.put_slice(src);
        Ok(())
    }

    fn patch_u32(&mut self, at: usize, value: u32) -> crate::Result<()> {
        let Some(slot) = self.buf.get_mut(at..at + 4) else {
            return Err(CodecError::new(
                codes::DECODE_SEGMENT_OVERRUN,
                alloc::format!("length slot at {at} is outside the written range"),
            ));
        };
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }
}
