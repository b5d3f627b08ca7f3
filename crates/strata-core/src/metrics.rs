//! 编解码指标挂钩。

/// 编解码阶段枚举，区分 Encode 与 Decode。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecPhase {
    /// 业务对象序列化为字节的阶段。
    Encode,
    /// 从字节还原业务对象的阶段。
    Decode,
}

impl CodecPhase {
    /// 返回稳定的阶段标签值，供指标系统作为维度使用。
    pub fn label(self) -> &'static str {
        match self {
            CodecPhase::Encode => "encode",
            CodecPhase::Decode => "decode",
        }
    }
}

/// `CodecMetrics` 是宿主指标系统接入编解码核心的最小契约。
///
/// # 设计动机（Why）
/// - 核心保持 `no_std`，不内置任何日志或指标后端；宿主以借用形式注入挂钩，
///   序列化器在关键节点上报字节量与错误计数；
/// - 契约刻意最小化：维度扩展（类型标识、调用方标签）由宿主在实现内部补充。
///
/// # 契约说明（What）
/// - **前置条件**：实现必须满足 `Send + Sync`，可被并发调用；
/// - **后置条件**：上报即时写入或进入宿主缓冲，核心不做聚合。
pub trait CodecMetrics: Send + Sync {
    /// 记录单次操作成功处理的字节量。
    fn record_bytes(&self, phase: CodecPhase, bytes: u64);

    /// 记录单次操作失败。
    fn record_error(&self, phase: CodecPhase);
}

/// 官方维护的空实现，供测试与示例复用。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCodecMetrics;

impl CodecMetrics for NoopCodecMetrics {
    fn record_bytes(&self, _phase: CodecPhase, _bytes: u64) {}

    fn record_error(&self, _phase: CodecPhase) {}
}
