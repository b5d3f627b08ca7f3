use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::fmt;

/// `CodecError` 表示编解码核心跨层共享的稳定错误域。
///
/// # 设计背景（Why）
/// - 元数据构建、字节流解码与字段导航在不同阶段产生的故障需要合流为统一的错误码，
///   以便宿主系统的日志与告警链路执行精确分类；
/// - 核心需兼容 `no_std + alloc` 场景，因此不直接依赖 `std::error::Error`，
///   仅在 `std` Feature 下补充实现。
///
/// # 逻辑解析（How）
/// - 错误码 `code` 始终为 `'static` 字符串，承载稳定语义；`message` 面向排障人员；
/// - [`kind`](Self::kind) 按错误码前缀归入 [`ErrorKind`] 三级分类，驱动调用方的处置策略；
/// - 底层原因通过 [`with_cause`](Self::with_cause) 叠加，形成完整链路。
///
/// # 契约说明（What）
/// - **前置条件**：调用方必须使用 [`codes`] 模块或遵循 `<域>.<语义>` 约定的自定义码值；
/// - **后置条件**：返回的 `CodecError` 拥有独立所有权，可安全跨线程移动（`Send + Sync + 'static`）。
///
/// # 设计取舍（Trade-offs）
/// - 采用 `Cow` 保存消息，静态描述零分配，动态描述仅一次堆分配；
/// - 版本偏差不是错误：读写双方 schema 不一致属于设计内场景，由版本门控与
///   future data 机制吸收，绝不会流经本类型。
#[derive(Debug)]
pub struct CodecError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<Box<CodecError>>,
}

impl CodecError {
    /// 构造核心错误。
    ///
    /// # 契约说明（What）
    /// - `code`：遵循 `<域>.<语义>` 约定的稳定错误码；
    /// - `message`：面向排障人员的自然语言描述，可为 `&'static str` 或堆分配字符串；
    /// - **后置条件**：错误尚不含底层原因，可通过 [`with_cause`](Self::with_cause) 补充。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附带底层原因并返回新的错误。
    #[must_use]
    pub fn with_cause(mut self, cause: CodecError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取底层原因。
    pub fn cause(&self) -> Option<&CodecError> {
        self.cause.as_deref()
    }

    /// 按错误码前缀返回结构化分类。
    ///
    /// # 返回契约
    /// - `config.*` → [`ErrorKind::Configuration`]：注册/构建期配置错误，永不重试；
    /// - `decode.*` → [`ErrorKind::Decode`]：字节流损坏或截断，本次解码失败；
    /// - `navigate.*` → [`ErrorKind::Navigation`]：路径解析失败，仅影响本次导航请求；
    /// - 其余前缀回退为 [`ErrorKind::Other`]。
    pub fn kind(&self) -> ErrorKind {
        if self.code.starts_with("config.") {
            ErrorKind::Configuration
        } else if self.code.starts_with("decode.") {
            ErrorKind::Decode
        } else if self.code.starts_with("navigate.") {
            ErrorKind::Navigation
        } else {
            ErrorKind::Other
        }
    }

    /// 判断是否属于配置错误。
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// 判断是否属于解码错误。
    pub fn is_decode(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    /// 判断是否属于导航错误。
    pub fn is_navigation(&self) -> bool {
        self.kind() == ErrorKind::Navigation
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// 错误三级分类，对应“配置 / 解码 / 导航”的处置策略边界。
///
/// # 设计动机（Why）
/// - 配置错误在注册或元数据构建阶段暴露，属于部署缺陷，必须快速失败；
/// - 解码错误表明输入字节流损坏或版本完全错位，本次调用失败且不可自动重试；
/// - 导航错误只影响单次路径请求，不波及其它对象。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// 注册/元数据构建期的配置缺陷。
    Configuration,
    /// 字节流层面的解码失败。
    Decode,
    /// 字段路径解析或定位失败。
    Navigation,
    /// 未归类错误码。
    Other,
}

/// 稳定错误码命名空间。
///
/// 码值遵循 `<域>.<语义>` 约定；新增码值须同步更新 [`ErrorKind`] 映射与契约测试。
pub mod codes {
    /// 类型标识或 Rust 类型重复注册。
    pub const CONFIG_DUPLICATE_TYPE: &str = "config.duplicate_type";
    /// 同一类型内字段名重复。
    pub const CONFIG_DUPLICATE_FIELD: &str = "config.duplicate_field";
    /// 字段 `since_version` 越界（小于 1 或大于类型声明版本）。
    pub const CONFIG_BAD_VERSION: &str = "config.bad_version";
    /// 注册表中不存在请求的类型标识或 Rust 类型。
    pub const CONFIG_UNKNOWN_TYPE: &str = "config.unknown_type";
    /// 类型未注册无参构造工厂，无法在解码时实例化。
    pub const CONFIG_NO_FACTORY: &str = "config.no_factory";
    /// 集合/映射字段的元素类型提示无法满足。
    pub const CONFIG_ELEMENT_HINT: &str = "config.element_hint";
    /// 父类型链存在环。
    pub const CONFIG_CYCLIC_SUPERTYPE: &str = "config.cyclic_supertype";
    /// 类型注册声明与实例的 Evolvable 能力不一致。
    pub const CONFIG_EVOLVABLE_MISMATCH: &str = "config.evolvable_mismatch";

    /// 输入在预期位置之前耗尽。
    pub const DECODE_TRUNCATED: &str = "decode.truncated";
    /// 段内消费字节数与段长度前缀不一致。
    pub const DECODE_SEGMENT_OVERRUN: &str = "decode.segment_overrun";
    /// 字符串字段包含非法 UTF-8 序列。
    pub const DECODE_BAD_UTF8: &str = "decode.bad_utf8";
    /// 运行时值与字段声明的类别不匹配。
    pub const DECODE_TYPE_MISMATCH: &str = "decode.type_mismatch";
    /// 集合元素携带无法识别的类型标签。
    pub const DECODE_BAD_TAG: &str = "decode.bad_tag";

    /// 点号路径中的某段未命中任何可达字段。
    pub const NAVIGATE_FIELD_NOT_FOUND: &str = "navigate.field_not_found";
    /// 路径中间段指向的字段不是嵌套对象。
    pub const NAVIGATE_NOT_NESTED: &str = "navigate.not_nested";
    /// 字段在缓冲区携带的版本标记之后才引入，或对应段缺失。
    pub const NAVIGATE_FIELD_ABSENT: &str = "navigate.field_absent";
}
