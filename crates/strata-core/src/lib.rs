#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![allow(clippy::result_large_err)]
#![doc = "strata-core: 版本化、分层自描述的二进制对象编解码核心。"]
#![doc = ""]
#![doc = "== 核心保证 =="]
#![doc = "1. Schema 演进：读写双方版本不一致不是错误；旧端解码新数据时未识别的"]
#![doc = "   字节被保留（future data），再编码逐字节回放，版本标记永不回退。"]
#![doc = "2. 确定性：字段索引由 (引入版本, 名称) 全序唯一决定，与声明顺序无关；"]
#![doc = "   同一对象状态的编码结果字节级可复现。"]
#![doc = "3. 结构自定界：每个嵌套段携带长度前缀，支持不物化对象的点读/点写"]
#![doc = "   （见 [`navigator`]）与未知段的结构化跳过。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "核心定位于 `no_std + alloc`：对象图、字段表与编解码缓冲依赖 `Box`、"]
#![doc = "`Arc`、`Vec` 等堆结构。`std` Feature 仅增量开启 `std::error::Error` 等"]
#![doc = "集成面，不改变任何编解码语义。"]

extern crate alloc;

pub mod buffer;
pub mod error;
pub mod evolvable;
pub mod fieldcodec;
pub mod metrics;
pub mod navigator;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod value;

/// 全 crate 统一的 Result 别名，错误默认收敛到 [`CodecError`](error::CodecError)。
pub type Result<T, E = error::CodecError> = core::result::Result<T, E>;

pub use buffer::{SegmentHeader, SliceReader, VecWriter, WireReader, WireWriter};
pub use error::{CodecError, ErrorKind};
pub use evolvable::EvolvableState;
pub use metrics::{CodecMetrics, CodecPhase, NoopCodecMetrics};
pub use navigator::{FieldNavigator, NavigationPath};
pub use registry::{TypeRegistration, TypeRegistry};
pub use serializer::HierarchicalSerializer;
pub use value::{PortableObject, Value};

/// 常用导出集合，业务代码 `use strata_core::prelude::*;` 即可开箱使用。
pub mod prelude {
    pub use crate::error::{CodecError, ErrorKind, codes};
    pub use crate::evolvable::EvolvableState;
    pub use crate::navigator::FieldNavigator;
    pub use crate::registry::{TypeRegistration, TypeRegistry};
    pub use crate::schema::{
        DateMode, ElementHint, ElementType, FieldKind, PrimitiveKind,
    };
    pub use crate::serializer::HierarchicalSerializer;
    pub use crate::value::{BigInt, DateValue, Decimal, PortableObject, Value};
    pub use crate::{Result, buffer::SliceReader, buffer::VecWriter};
}
