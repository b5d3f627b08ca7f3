//! Evolvable 实例状态。

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// `EvolvableState` 记录单个对象实例的演进痕迹。
///
/// # 设计背景（Why）
/// - 前向兼容的关键：旧 schema 的读取端解出新 schema 写入的数据后，
///   必须能够在再编码时逐字节复原自己不认识的部分；
/// - 状态按祖先类型标识分桶：`data_version` 记录每段最近一次见到的
///   schema 版本，`future_data` 保存该段未识别的尾部字节。
///
/// # 契约说明（What）
/// - 状态由所属对象实例独占，随实例构造为空、随实例销毁，不单独持久化；
/// - [`bump_version`](Self::bump_version) 只升不降：版本标记在反复
///   解码/再编码循环中永不回退；
/// - 无任何内部同步——并发关切完全由持有实例的调用方承担。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvolvableState {
    data_version: BTreeMap<i32, i32>,
    future_data: BTreeMap<i32, Vec<u8>>,
}

impl EvolvableState {
    /// 构造空状态。
    pub fn new() -> Self {
        Self::default()
    }

    /// 将 `type_id` 段的版本标记提升到至少 `min_version`。
    ///
    /// 已存储的更高版本保持不变，保证版本单调不减。
    pub fn bump_version(&mut self, type_id: i32, min_version: i32) {
        let slot = self.data_version.entry(type_id).or_insert(min_version);
        if *slot < min_version {
            *slot = min_version;
        }
    }

    /// 返回 `type_id` 段已记录的版本标记。
    pub fn version(&self, type_id: i32) -> Option<i32> {
        self.data_version.get(&type_id).copied()
    }

    /// 按类型标识升序遍历全部版本记录。
    pub fn versions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.data_version.iter().map(|(id, ver)| (*id, *ver))
    }

    /// 返回 `type_id` 段保存的 future data。
    pub fn future_data(&self, type_id: i32) -> Option<&[u8]> {
        self.future_data.get(&type_id).map(Vec::as_slice)
    }

    /// 保存 `type_id` 段的 future data；空字节等价于清除。
    pub fn set_future_data(&mut self, type_id: i32, bytes: Vec<u8>) {
        if bytes.is_empty() {
            self.future_data.remove(&type_id);
        } else {
            self.future_data.insert(type_id, bytes);
        }
    }

    /// 按类型标识升序遍历全部 future data。
    pub fn future_entries(&self) -> impl Iterator<Item = (i32, &[u8])> + '_ {
        self.future_data
            .iter()
            .map(|(id, bytes)| (*id, bytes.as_slice()))
    }

    /// 状态是否为空（从未参与编解码）。
    pub fn is_empty(&self) -> bool {
        self.data_version.is_empty() && self.future_data.is_empty()
    }
}
