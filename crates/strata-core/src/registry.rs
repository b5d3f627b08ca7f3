//! 类型注册表。
//!
//! # 模块架构（Why）
//! - 类型标识到具体类型、字段表与构造工厂的映射由宿主系统集中供给，
//!   编解码核心只消费三类查询（schema、按 Rust 类型反查、按标识取描述符），
//!   从不反向修改注册表；
//! - 字段元数据的推导被建模为进程级“按需计算、幂等竞建”的缓存：
//!   重复计算廉价且无副作用，因此以原子性的 once 插入取代全局锁。

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId as RustTypeId;

use spin::{Once, RwLock};

use crate::error::{CodecError, codes};
use crate::schema::{FieldDecl, FieldKind, VersionedFieldGroups};
use crate::value::PortableObject;

/// 解码期使用的无参构造工厂。
pub type Factory = fn() -> Box<dyn PortableObject>;

/// 类型的注册描述：标识、声明版本、父类型与 Evolvable 能力。
///
/// 注册完成后不可变；父类型以标识引用，链条经由注册表解析。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// 注册的类型标识。
    pub type_id: i32,
    /// 类型当前声明的 schema 版本。
    pub declared_version: i32,
    /// 父类型标识；根类型为 `None`。
    pub super_type: Option<i32>,
    /// 实例是否携带 [`EvolvableState`](crate::evolvable::EvolvableState)。
    pub evolvable: bool,
    /// 类型名，仅用于诊断输出。
    pub type_name: &'static str,
}

/// 一次类型注册提交的全部信息。
///
/// # 使用方式（How）
/// - 以 [`of`](Self::of) 锚定 Rust 类型与标识，链式补充父类型、字段表与工厂；
/// - 字段表是静态声明的 [`FieldDecl`] 序列——这是对原始设计中“注解发现 +
///   字节码注入”的显式化替代，派生宏或代码生成步骤可产出同样的表。
#[derive(Debug)]
pub struct TypeRegistration {
    descriptor: TypeDescriptor,
    rust_type: RustTypeId,
    fields: Vec<FieldDecl>,
    factory: Option<Factory>,
}

impl TypeRegistration {
    /// 锚定 Rust 类型 `T` 与类型标识，开始一次注册。
    pub fn of<T: PortableObject>(
        type_id: i32,
        type_name: &'static str,
        declared_version: i32,
    ) -> Self {
        Self {
            descriptor: TypeDescriptor {
                type_id,
                declared_version,
                super_type: None,
                evolvable: false,
                type_name,
            },
            rust_type: RustTypeId::of::<T>(),
            fields: Vec::new(),
            factory: None,
        }
    }

    /// 声明父类型。
    #[must_use]
    pub fn with_super(mut self, super_type_id: i32) -> Self {
        self.descriptor.super_type = Some(super_type_id);
        self
    }

    /// 声明实例携带 Evolvable 状态。
    #[must_use]
    pub fn evolvable(mut self) -> Self {
        self.descriptor.evolvable = true;
        self
    }

    /// 追加一条字段声明。
    #[must_use]
    pub fn with_field(
        mut self,
        name: &'static str,
        since_version: i32,
        kind: FieldKind,
    ) -> Self {
        self.fields.push(FieldDecl::new(name, since_version, kind));
        self
    }

    /// 注册无参构造工厂，解码实例化依赖它。
    #[must_use]
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }
}

struct TypeEntry {
    descriptor: TypeDescriptor,
    decls: Vec<FieldDecl>,
    factory: Option<Factory>,
    schema: Once<Arc<VersionedFieldGroups>>,
}

/// `TypeRegistry` 维护类型标识与 Rust 类型的双向映射及字段元数据缓存。
///
/// # 并发模型（Concurrency）
/// - 注册阶段持写锁；查询路径仅持读锁并克隆 `Arc`，无共享可变状态外溢；
/// - 元数据缓存采用 once 语义：竞态下多次构建幂等，首个完成者胜出，
///   其余结果丢弃——推导廉价且无副作用，故无需互斥。
#[derive(Default)]
pub struct TypeRegistry {
    by_id: RwLock<BTreeMap<i32, Arc<TypeEntry>>>,
    by_rust: RwLock<BTreeMap<RustTypeId, i32>>,
}

impl TypeRegistry {
    /// 构造空注册表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一次类型注册。
    ///
    /// # 错误（Errors）
    /// - `config.duplicate_type`：类型标识或 Rust 类型已被占用；
    /// - `config.bad_version`：声明版本小于 1；
    /// - 字段表的全部配置校验在此处执行（见
    ///   [`VersionedFieldGroups::build`]），注册失败的类型不会留下任何痕迹。
    pub fn register(&self, registration: TypeRegistration) -> crate::Result<()> {
        let TypeRegistration {
            descriptor,
            rust_type,
            fields,
            factory,
        } = registration;
        if descriptor.declared_version < 1 {
            return Err(CodecError::new(
                codes::CONFIG_BAD_VERSION,
                alloc::format!(
                    "type `{}` declares version {}",
                    descriptor.type_name,
                    descriptor.declared_version
                ),
            ));
        }
        // 配置错误必须在注册期暴露；构建结果直接作为缓存初值。
        let schema = Arc::new(VersionedFieldGroups::build(
            &fields,
            descriptor.declared_version,
        )?);

        let mut by_id = self.by_id.write();
        let mut by_rust = self.by_rust.write();
        if by_id.contains_key(&descriptor.type_id) {
            return Err(CodecError::new(
                codes::CONFIG_DUPLICATE_TYPE,
                alloc::format!("type id {} registered twice", descriptor.type_id),
            ));
        }
        if by_rust.contains_key(&rust_type) {
            return Err(CodecError::new(
                codes::CONFIG_DUPLICATE_TYPE,
                alloc::format!(
                    "rust type behind `{}` already bound to another type id",
                    descriptor.type_name
                ),
            ));
        }
        let entry = Arc::new(TypeEntry {
            descriptor,
            decls: fields,
            factory,
            schema: Once::new(),
        });
        entry.schema.call_once(|| schema);
        by_rust.insert(rust_type, descriptor.type_id);
        by_id.insert(descriptor.type_id, entry);
        Ok(())
    }

    fn entry(&self, type_id: i32) -> crate::Result<Arc<TypeEntry>> {
        self.by_id.read().get(&type_id).cloned().ok_or_else(|| {
            CodecError::new(
                codes::CONFIG_UNKNOWN_TYPE,
                alloc::format!("type id {type_id} is not registered"),
            )
        })
    }

    /// 返回类型的字段元数据（注册期已构建并缓存；竞态重建幂等）。
    pub fn schema(&self, type_id: i32) -> crate::Result<Arc<VersionedFieldGroups>> {
        let entry = self.entry(type_id)?;
        if let Some(schema) = entry.schema.get() {
            return Ok(schema.clone());
        }
        let built = Arc::new(VersionedFieldGroups::build(
            &entry.decls,
            entry.descriptor.declared_version,
        )?);
        Ok(entry.schema.call_once(|| built).clone())
    }

    /// 按类型标识取描述符；未注册返回 `None`（这不是错误，见解码语义）。
    pub fn descriptor(&self, type_id: i32) -> Option<TypeDescriptor> {
        self.by_id
            .read()
            .get(&type_id)
            .map(|entry| entry.descriptor)
    }

    /// 按 Rust 类型反查类型标识。
    pub fn type_id_for(&self, rust_type: RustTypeId) -> crate::Result<i32> {
        self.by_rust.read().get(&rust_type).copied().ok_or_else(|| {
            CodecError::new(
                codes::CONFIG_UNKNOWN_TYPE,
                "rust type is not bound to any type id",
            )
        })
    }

    /// 经注册的无参工厂实例化对象。
    pub fn instantiate(&self, type_id: i32) -> crate::Result<Box<dyn PortableObject>> {
        let entry = self.entry(type_id)?;
        let factory = entry.factory.ok_or_else(|| {
            CodecError::new(
                codes::CONFIG_NO_FACTORY,
                alloc::format!(
                    "type `{}` ({type_id}) has no parameterless factory",
                    entry.descriptor.type_name
                ),
            )
        })?;
        Ok(factory())
    }

    /// 计算参与编码的祖先类型链，最派生类型在前。
    ///
    /// # 错误（Errors）
    /// - `config.unknown_type`：链上某个类型未注册（编码侧必须完整认识自己的链）；
    /// - `config.cyclic_supertype`：父类型声明成环。
    pub fn chain(&self, type_id: i32) -> crate::Result<Vec<i32>> {
        let mut chain = Vec::new();
        let mut current = Some(type_id);
        while let Some(id) = current {
            if chain.contains(&id) {
                return Err(CodecError::new(
                    codes::CONFIG_CYCLIC_SUPERTYPE,
                    alloc::format!("supertype chain of {type_id} revisits {id}"),
                ));
            }
            let entry = self.entry(id)?;
            chain.push(id);
            current = entry.descriptor.super_type;
        }
        Ok(chain)
    }
}
