//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 内存字节）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + 普通文件检查 + 读取。
//! - 两者最后都做文件签名（magic bytes）校验。
//! - `infer` 只识别常见格式，PNM / QOI / TGA 等它不认识的图片交给 `image` 判断；
//!   仅当 `infer` 明确识别为非图片且 `image` 也无法识别时才拒绝。
//! - 所有失败统一映射为 `ImageError::Decode`。

use std::path::Path;

use super::source::{ImageSource, RawImageData};
use super::{ImageError, ImageHandler};

impl ImageHandler {
    /// 按来源加载原始字节。
    pub(crate) fn load(&self, source: ImageSource) -> Result<RawImageData, ImageError> {
        match source {
            ImageSource::FilePath(path) => self.load_from_file(&path),
            ImageSource::Bytes(bytes) => self.load_from_bytes(bytes),
        }
    }

    /// 从本地路径加载图片原始字节。
    pub(crate) fn load_from_file(&self, path: &Path) -> Result<RawImageData, ImageError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(ImageError::Decode(format!(
                "文件不存在：{}",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| ImageError::Decode(format!("无法读取文件信息：{}", e)))?;

        if !metadata.is_file() {
            return Err(ImageError::Decode(format!(
                "不是普通文件：{}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ImageError::Decode(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: path.display().to_string(),
        })
    }

    /// 从内存字节加载图片。
    pub(crate) fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<RawImageData, ImageError> {
        log::debug!("📝 开始处理内存图片 - {} bytes", bytes.len());

        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "memory".to_string(),
        })
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Decode("图片内容为空".to_string()));
        }

        let Some(kind) = infer::get(bytes) else {
            return Ok(());
        };

        if kind.matcher_type() != infer::MatcherType::Image && image::guess_format(bytes).is_err() {
            return Err(ImageError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        log::debug!("🔎 文件签名：{}", kind.mime_type());
        Ok(())
    }
}
