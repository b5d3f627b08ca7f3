//! 动态值模型。
//!
//! # 模块架构（Why）
//! - Rust 没有运行时反射，字段访问必须经由显式媒介：[`PortableObject`] 以
//!   `(type_id, index)` 键读写字段，[`Value`] 承载字段的运行时取值；
//! - 该组合等价于原始设计中“注入的编解码方法 + 反射属性访问”，但完全由
//!   静态注册表驱动，不依赖任何二进制改写。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::evolvable::EvolvableState;

/// 任意精度十进制数：`unscaled * 10^(-scale)`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decimal {
    /// 未缩放整数值。
    pub unscaled: i128,
    /// 十进制缩放因子。
    pub scale: i32,
}

impl Decimal {
    /// 构造十进制数。
    pub const fn new(unscaled: i128, scale: i32) -> Self {
        Self { unscaled, scale }
    }
}

/// 任意精度整数：符号 + 大端幅值（无前导零）。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigInt {
    /// 是否为负。幅值为空（零值）时必须为 `false`。
    pub negative: bool,
    /// 大端幅值字节，规范形式不含前导零。
    pub magnitude: Vec<u8>,
}

impl BigInt {
    /// 从 `i64` 构造规范形式。
    pub fn from_i64(value: i64) -> Self {
        let negative = value < 0;
        let magnitude_value = value.unsigned_abs();
        let bytes = magnitude_value.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self {
            negative: negative && magnitude_value != 0,
            magnitude: bytes[first..].to_vec(),
        }
    }

    /// 是否为零。
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }
}

/// 日期/时间值。
///
/// 各分量是否参与编码由字段元数据的 [`DateMode`](crate::schema::DateMode)
/// 与偏移开关决定，值本身始终携带全部分量。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DateValue {
    /// 公历年。
    pub year: i32,
    /// 月（1-12）。
    pub month: u8,
    /// 日（1-31）。
    pub day: u8,
    /// 时（0-23）。
    pub hour: u8,
    /// 分（0-59）。
    pub minute: u8,
    /// 秒（0-59）。
    pub second: u8,
    /// 纳秒。
    pub nanos: u32,
    /// 时区偏移（秒）；仅当字段声明携带偏移时参与编码。
    pub offset_seconds: Option<i32>,
}

/// 字段的运行时取值。
///
/// # 契约说明（What）
/// - 变体与 [`FieldKind`](crate::schema::FieldKind) 一一对应，编码期做严格匹配，
///   不做任何隐式数值转换；
/// - `Object` 变体持有独立的可移植对象，结构相等性经由
///   [`PortableObject::portable_eq`] 递归判定。
#[derive(Debug)]
pub enum Value {
    /// 布尔。
    Bool(bool),
    /// 32 位整数。
    I32(i32),
    /// 64 位整数。
    I64(i64),
    /// 双精度浮点。
    F64(f64),
    /// 布尔数组。
    BoolArray(Vec<bool>),
    /// 32 位整数数组。
    I32Array(Vec<i32>),
    /// 64 位整数数组。
    I64Array(Vec<i64>),
    /// 双精度浮点数组。
    F64Array(Vec<f64>),
    /// UTF-8 字符串。
    Text(String),
    /// 任意精度十进制。
    Decimal(Decimal),
    /// 任意精度整数。
    BigInt(BigInt),
    /// 二进制块。
    Binary(Vec<u8>),
    /// 日期/时间。
    Date(DateValue),
    /// 嵌套可移植对象。
    Object(Box<dyn PortableObject>),
    /// 有序集合。
    Collection(Vec<Value>),
    /// 键值映射（保持写入顺序）。
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// 返回变体名称，用于错误消息。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::BoolArray(_) => "bool[]",
            Value::I32Array(_) => "i32[]",
            Value::I64Array(_) => "i64[]",
            Value::F64Array(_) => "f64[]",
            Value::Text(_) => "text",
            Value::Decimal(_) => "decimal",
            Value::BigInt(_) => "bigint",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::Object(_) => "object",
            Value::Collection(_) => "collection",
            Value::Map(_) => "map",
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Bool(v) => Value::Bool(*v),
            Value::I32(v) => Value::I32(*v),
            Value::I64(v) => Value::I64(*v),
            Value::F64(v) => Value::F64(*v),
            Value::BoolArray(v) => Value::BoolArray(v.clone()),
            Value::I32Array(v) => Value::I32Array(v.clone()),
            Value::I64Array(v) => Value::I64Array(v.clone()),
            Value::F64Array(v) => Value::F64Array(v.clone()),
            Value::Text(v) => Value::Text(v.clone()),
            Value::Decimal(v) => Value::Decimal(*v),
            Value::BigInt(v) => Value::BigInt(v.clone()),
            Value::Binary(v) => Value::Binary(v.clone()),
            Value::Date(v) => Value::Date(*v),
            Value::Object(v) => Value::Object(v.clone_portable()),
            Value::Collection(v) => Value::Collection(v.clone()),
            Value::Map(v) => Value::Map(v.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::BoolArray(a), Value::BoolArray(b)) => a == b,
            (Value::I32Array(a), Value::I32Array(b)) => a == b,
            (Value::I64Array(a), Value::I64Array(b)) => a == b,
            (Value::F64Array(a), Value::F64Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.portable_eq(b.as_ref()),
            (Value::Collection(a), Value::Collection(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// `PortableObject` 是参与分层编码的对象契约。
///
/// # 设计初衷（Why）
/// - 序列化器按 `(type_id, index)` 键读写字段，对象自身决定如何映射到
///   具体成员——等价于原始设计中注入的编解码方法，但以普通 trait 实现；
/// - Evolvable 能力通过可选的状态访问器暴露：返回 `None` 的类型不追踪
///   版本与 future data。
///
/// # 契约说明（What）
/// - **前置条件**：`read_field`/`write_field` 收到的 `(type_id, index)` 均来自
///   本类型注册的字段表；越界访问应返回 `decode.type_mismatch` 类错误；
/// - **后置条件**：`write_field` 成功后，随后的 `read_field` 观察到新值；
/// - `clone_portable`/`portable_eq` 支撑 [`Value::Object`] 的克隆与结构相等。
pub trait PortableObject: fmt::Debug + Send + Sync + 'static {
    /// 按 `(type_id, index)` 读取字段值。
    fn read_field(&self, type_id: i32, index: u16) -> crate::Result<Value>;

    /// 按 `(type_id, index)` 写入字段值。
    fn write_field(&mut self, type_id: i32, index: u16, value: Value) -> crate::Result<()>;

    /// 访问 Evolvable 状态；不支持演进追踪的类型返回 `None`。
    fn evolvable(&self) -> Option<&EvolvableState> {
        None
    }

    /// 可变访问 Evolvable 状态。
    fn evolvable_mut(&mut self) -> Option<&mut EvolvableState> {
        None
    }

    /// 向上转型为 [`Any`]，供注册表按 Rust 类型反查类型标识。
    fn as_any(&self) -> &dyn Any;

    /// 可变向上转型。
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 深克隆为新的可移植对象。
    fn clone_portable(&self) -> Box<dyn PortableObject>;

    /// 结构相等性判定，实现方应向下转型后比较业务字段。
    fn portable_eq(&self, other: &dyn PortableObject) -> bool;
}

impl Clone for Box<dyn PortableObject> {
    fn clone(&self) -> Self {
        self.clone_portable()
    }
}
