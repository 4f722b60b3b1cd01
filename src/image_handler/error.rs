//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载转换链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 三类错误均为致命错误，链路在第一次失败时终止，不做重试。

/// 图片转换统一错误类型。
///
/// 每个分支携带底层库给出的诊断信息，由入口直接输出。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 输入缺失、不可读、过大、损坏或格式无法识别。
    #[error("解码错误：{0}")]
    Decode(String),

    /// 像素格式转换失败或尺寸约束被破坏。
    #[error("格式错误：{0}")]
    Format(String),

    /// 输出路径不可写或编码器失败。
    #[error("编码错误：{0}")]
    Encode(String),
}
