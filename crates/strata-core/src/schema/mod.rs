//! 字段元数据模型。
//!
//! # 模块架构（Why）
//! - 线上格式从不传输字段名：字段仅以整数索引定位，因此索引分配必须是
//!   确定性的——两次独立推导出的 `(since_version, name) -> index` 映射完全一致；
//! - 原始设计通过语言内建的注解与字节码改写发现字段，这里按重构要求改为
//!   显式注册：每个类型提供一张静态的 [`FieldDecl`] 表，元数据模型与任何
//!   反射机制解耦。
//!
//! # 设计总览（How）
//! - [`field`] 定义字段类别、日期模式与集合元素提示等声明单元；
//! - [`groups`] 将声明表整理为按引入版本分组、全局有序的
//!   [`VersionedFieldGroups`]，并在构建期完成所有配置校验。

pub mod field;
pub mod groups;

pub use field::{DateMode, ElementHint, ElementType, FieldDecl, FieldDescriptor, FieldKind, PrimitiveKind};
pub use groups::VersionedFieldGroups;
