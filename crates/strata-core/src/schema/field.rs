use alloc::borrow::Cow;

/// 定宽数值/布尔类别。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// 单字节 0/1 布尔。
    Bool,
    /// 大端 32 位有符号整数。
    I32,
    /// 大端 64 位有符号整数。
    I64,
    /// 大端 IEEE-754 双精度浮点。
    F64,
}

impl PrimitiveKind {
    /// 返回线上定宽字节数。
    pub const fn width(self) -> usize {
        match self {
            PrimitiveKind::Bool => 1,
            PrimitiveKind::I32 => 4,
            PrimitiveKind::I64 | PrimitiveKind::F64 => 8,
        }
    }
}

/// 日期/时间字段的模式。
///
/// 模式与“是否携带时区偏移”一样，在元数据构建期固定，绝不从值推断。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateMode {
    /// 仅日期（年/月/日）。
    DateOnly,
    /// 仅时间（时/分/秒/纳秒）。
    TimeOnly,
    /// 日期与时间。
    DateTime,
}

impl DateMode {
    /// 返回该模式下（不含偏移）的线上定宽字节数。
    pub const fn width(self) -> usize {
        match self {
            DateMode::DateOnly => 6,
            DateMode::TimeOnly => 7,
            DateMode::DateTime => 13,
        }
    }
}

/// 集合/映射元素的线上类别。
///
/// # 契约说明（What）
/// - 统一编码（uniform）场景下，该类别在集合头部只写一次；
/// - 异构编码（heterogeneous）场景下，每个元素独立携带对应标签；
/// - `Object` 变体携带类型标识，统一编码要求元素运行时类型与之精确一致，
///   子类型必须退回异构编码。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// 布尔元素。
    Bool,
    /// 32 位整数元素。
    I32,
    /// 64 位整数元素。
    I64,
    /// 双精度浮点元素。
    F64,
    /// UTF-8 字符串元素。
    Text,
    /// 任意精度十进制元素。
    Decimal,
    /// 任意精度整数元素。
    BigInt,
    /// 二进制块元素。
    Binary,
    /// 嵌套可移植对象元素，携带其注册类型标识。
    Object(i32),
}

/// 集合/映射字段的元素类型提示。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementHint {
    /// 声明统一元素类型：线上只写一次类型信息，元素以裸负载排列。
    Uniform(ElementType),
    /// 未声明统一类型：每个元素独立打标签，支持混合具体类型。
    Mixed,
}

/// 字段的语义类别，决定读写策略的派发目标。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// 定宽数值/布尔。
    Primitive(PrimitiveKind),
    /// 定宽元素的数组形式（`u32` 计数前缀 + 裸元素）。
    PrimitiveArray(PrimitiveKind),
    /// 长度前缀 UTF-8 字符串。
    Text,
    /// 任意精度十进制（缩放因子 + 长度前缀幅值）。
    Decimal,
    /// 任意精度整数（符号 + 长度前缀幅值）。
    BigInt,
    /// 长度前缀二进制块。
    Binary,
    /// 日期/时间，模式与偏移开关在构建期固定。
    Date {
        /// 日期/时间模式。
        mode: DateMode,
        /// 是否携带时区偏移（秒）。
        with_offset: bool,
    },
    /// 嵌套可移植对象；`type_id` 为声明类型，供导航器静态解析，
    /// 实际编码以运行时类型标识为准。
    Nested {
        /// 声明的嵌套类型标识。
        type_id: i32,
    },
    /// 同构/异构集合。
    Collection(ElementHint),
    /// 键值映射，键与值各自携带元素提示。
    Map {
        /// 键的元素提示。
        key: ElementHint,
        /// 值的元素提示。
        value: ElementHint,
    },
}

impl FieldKind {
    /// 若字段为定宽编码，返回其字节数；变长字段返回 `None`。
    ///
    /// 导航器据此区分“直接跳过”与“需读长度前缀再跳过”的两类字段。
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            FieldKind::Primitive(kind) => Some(kind.width()),
            FieldKind::Date { mode, with_offset } => {
                Some(mode.width() + if *with_offset { 4 } else { 0 })
            }
            _ => None,
        }
    }
}

/// 字段的声明单元：类型注册时提交的静态描述。
#[derive(Clone, Debug)]
pub struct FieldDecl {
    /// 字段名，仅用于索引分配与导航，绝不上线。
    pub name: Cow<'static, str>,
    /// 字段引入时的 schema 版本。
    pub since_version: i32,
    /// 字段类别。
    pub kind: FieldKind,
}

impl FieldDecl {
    /// 构造字段声明。
    pub fn new(name: impl Into<Cow<'static, str>>, since_version: i32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            since_version,
            kind,
        }
    }
}

/// 构建完成的字段描述符：声明信息加上确定性分配的线上索引。
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// 字段名。
    pub name: Cow<'static, str>,
    /// 字段引入时的 schema 版本。
    pub since_version: i32,
    /// 线上索引，0 起始、全局连续。
    pub index: u16,
    /// 字段类别。
    pub kind: FieldKind,
}
