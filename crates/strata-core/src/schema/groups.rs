use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::error::{CodecError, codes};

use super::field::{FieldDecl, FieldDescriptor};

/// `VersionedFieldGroups` 是单个类型的完整字段元数据快照。
///
/// # 设计背景（Why）
/// - 线上格式以整数索引定位字段，索引由“引入版本升序、字段名字典序”的全局排序
///   唯一决定——这是线上位置的**唯一**事实来源；
/// - 快照构建一次后进程级缓存、永不变更；竞态下的重复构建是幂等的，
///   因此缓存无需全局锁。
///
/// # 逻辑解析（How）
/// - [`build`](Self::build) 对声明表做一次遍历完成排序、索引分配与分组；
/// - [`fields_up_to`](Self::fields_up_to) 按索引序给出版本门控后的字段序列，
///   编码、解码与导航共用同一迭代顺序。
///
/// # 契约说明（What）
/// - **前置条件**：声明表中的 `since_version` 落在 `1..=declared_version`，字段名唯一；
/// - **后置条件**：索引 0 起始且连续；同一声明表两次构建产出完全一致的映射。
#[derive(Clone, Debug)]
pub struct VersionedFieldGroups {
    ordered: Vec<FieldDescriptor>,
    groups: BTreeMap<i32, Vec<u16>>,
}

impl VersionedFieldGroups {
    /// 从声明表构建字段元数据。
    ///
    /// # 错误（Errors）
    /// - `config.duplicate_field`：同一类型内字段名重复；
    /// - `config.bad_version`：`since_version` 小于 1 或超出类型声明版本。
    ///
    /// 所有配置错误都在此处暴露，而非拖延到编码期；配置错误永不重试。
    pub fn build(decls: &[FieldDecl], declared_version: i32) -> crate::Result<Self> {
        let mut sorted: Vec<&FieldDecl> = decls.iter().collect();
        sorted.sort_by(|a, b| {
            a.since_version
                .cmp(&b.since_version)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut ordered = Vec::with_capacity(sorted.len());
        let mut groups: BTreeMap<i32, Vec<u16>> = BTreeMap::new();
        for (index, decl) in sorted.into_iter().enumerate() {
            if decl.since_version < 1 || decl.since_version > declared_version {
                return Err(CodecError::new(
                    codes::CONFIG_BAD_VERSION,
                    alloc::format!(
                        "field `{}` introduced at version {}, type declares {declared_version}",
                        decl.name,
                        decl.since_version
                    ),
                ));
            }
            if ordered
                .iter()
                .any(|existing: &FieldDescriptor| existing.name == decl.name)
            {
                return Err(CodecError::new(
                    codes::CONFIG_DUPLICATE_FIELD,
                    alloc::format!("field `{}` declared twice", decl.name),
                ));
            }
            let index = index as u16;
            groups.entry(decl.since_version).or_default().push(index);
            ordered.push(FieldDescriptor {
                name: decl.name.clone(),
                since_version: decl.since_version,
                index,
                kind: decl.kind,
            });
        }
        Ok(Self { ordered, groups })
    }

    /// 按索引序返回全部字段。
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.ordered
    }

    /// 按索引序返回 `since_version <= marker` 的字段，即版本门控后的线上字段序列。
    pub fn fields_up_to(&self, marker: i32) -> impl Iterator<Item = &FieldDescriptor> {
        self.ordered
            .iter()
            .take_while(move |field| field.since_version <= marker)
    }

    /// 按线上索引取字段。
    pub fn field(&self, index: u16) -> Option<&FieldDescriptor> {
        self.ordered.get(index as usize)
    }

    /// 按名称取字段，供导航器解析点号路径。
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.ordered.iter().find(|field| field.name == name)
    }

    /// 返回某引入版本的字段索引组。
    pub fn group(&self, since_version: i32) -> Option<&[u16]> {
        self.groups.get(&since_version).map(Vec::as_slice)
    }

    /// 字段总数。
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// 是否不含任何字段。
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::{FieldKind, PrimitiveKind};

    fn decl(name: &'static str, since: i32) -> FieldDecl {
        FieldDecl::new(name, since, FieldKind::Primitive(PrimitiveKind::I32))
    }

    #[test]
    fn index_order_is_version_then_name() {
        let groups = VersionedFieldGroups::build(
            &[decl("zeta", 1), decl("alpha", 2), decl("beta", 1)],
            2,
        )
        .expect("合法声明表必须构建成功");
        let names: Vec<&str> = groups.fields().iter().map(|f| f.name.as_ref()).collect();
        assert_eq!(names, ["beta", "zeta", "alpha"]);
        assert_eq!(groups.fields()[2].index, 2);
        assert_eq!(groups.group(1), Some(&[0u16, 1][..]));
    }

    #[test]
    fn version_gate_filters_newer_fields() {
        let groups = VersionedFieldGroups::build(
            &[decl("a", 1), decl("b", 2), decl("c", 3)],
            3,
        )
        .expect("构建");
        let gated: Vec<&str> = groups
            .fields_up_to(2)
            .map(|f| f.name.as_ref())
            .collect();
        assert_eq!(gated, ["a", "b"]);
    }

    #[test]
    fn duplicate_name_is_a_configuration_error() {
        let err = VersionedFieldGroups::build(&[decl("a", 1), decl("a", 2)], 2)
            .expect_err("重名字段必须在构建期失败");
        assert_eq!(err.code(), codes::CONFIG_DUPLICATE_FIELD);
    }

    #[test]
    fn out_of_range_since_version_is_rejected() {
        let err = VersionedFieldGroups::build(&[decl("a", 3)], 2)
            .expect_err("超出声明版本的字段必须被拒绝");
        assert_eq!(err.code(), codes::CONFIG_BAD_VERSION);
        let err = VersionedFieldGroups::build(&[decl("a", 0)], 2)
            .expect_err("版本号必须从 1 起");
        assert_eq!(err.code(), codes::CONFIG_BAD_VERSION);
    }
}
