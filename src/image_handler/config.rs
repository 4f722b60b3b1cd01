//! # 配置模块
//!
//! ## 设计思路
//!
//! 将转换链路中的固定参数集中到 `ImageConfig`，保证行为可观测、可测试。
//! 程序本身不接受任何外部参数，`Default` 即为生产配置。
//!
//! ## 实现思路
//!
//! - `Default` 提供输入/输出路径、目标尺寸、滤镜与优化开关。
//! - 像素上限只用于拦截解压炸弹，普通相机照片（数千万像素）必须能正常转换。
//! - `png_encoding` 将“是否优化”映射为 PNG 编码器的压缩/行滤波组合。

use std::path::PathBuf;

use image::codecs::png::{CompressionType, FilterType as PngFilterType};
use image::imageops::FilterType;

/// 默认输入文件。
pub const DEFAULT_INPUT_PATH: &str = "input.png";
/// 默认输出文件。
pub const DEFAULT_OUTPUT_PATH: &str = "emoji.png";
/// 默认目标边长（像素）。
pub const DEFAULT_TARGET_SIZE: u32 = 100;

/// 解压炸弹阈值（像素），约 1.79 亿像素，超过即视为恶意输入。
pub const DECOMPRESSION_BOMB_PIXELS: u64 = 2 * 89_478_485;

/// 图片转换配置。
///
/// 字段覆盖了加载、解码、缩放与保存四个阶段。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 输入图片路径。
    pub input_path: PathBuf,
    /// 输出 PNG 路径，已存在时覆盖。
    pub output_path: PathBuf,
    /// 输出宽度（像素），不保持宽高比。
    pub target_width: u32,
    /// 输出高度（像素），不保持宽高比。
    pub target_height: u32,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
    /// 是否以更长编码时间换取更小的输出体积。
    pub optimize: bool,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            target_width: DEFAULT_TARGET_SIZE,
            target_height: DEFAULT_TARGET_SIZE,
            resize_filter: FilterType::Lanczos3,
            optimize: true,
            max_decoded_pixels: DECOMPRESSION_BOMB_PIXELS,
            max_decoded_bytes: DECOMPRESSION_BOMB_PIXELS * 4,
        }
    }
}

impl ImageConfig {
    /// PNG 编码参数。
    ///
    /// 优化模式使用最高压缩级别，并由编码器逐行挑选滤波方式。
    pub fn png_encoding(&self) -> (CompressionType, PngFilterType) {
        if self.optimize {
            (CompressionType::Best, PngFilterType::Adaptive)
        } else {
            (CompressionType::Default, PngFilterType::Adaptive)
        }
    }
}
