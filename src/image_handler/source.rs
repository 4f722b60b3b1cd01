//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `RawImageData` 表示已加载但未解码的字节
//! - `SavedImage` 表示保存阶段的产出

use std::path::PathBuf;

/// 图片输入来源。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(PathBuf),
    /// 已在内存中的编码字节。
    ///
    /// 程序入口只使用 `FilePath`；该分支供测试直接喂入内存中生成的样例图。
    Bytes(Vec<u8>),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: String,
}

/// 保存阶段输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// 输出文件路径。
    pub path: PathBuf,
    /// 图像宽度（像素）。
    pub width: u32,
    /// 图像高度（像素）。
    pub height: u32,
    /// 写入磁盘的字节数。
    pub bytes_written: u64,
}
