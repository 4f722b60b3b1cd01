//! # PNG 写入模块
//!
//! ## 设计思路
//!
//! 保存阶段只接受已归一化为 RGBA8 的缓冲，输出固定为 PNG。
//! 编码参数来自 `ImageConfig::png_encoding`，其余细节交给 `image` 的 PNG 编码器。
//!
//! ## 实现思路
//!
//! - `File::create` 截断已有输出，实现“每次运行覆盖”。
//! - `BufWriter` 缓冲写入，显式 `flush` 让刷盘错误也能被捕获。
//! - 任一步骤失败都映射为 `ImageError::Encode`，并尽力删除残留的半成品文件。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use super::source::SavedImage;
use super::{ImageError, ImageHandler};

impl ImageHandler {
    /// 将 RGBA 缓冲编码为 PNG 并写入指定路径。
    pub(crate) fn save_png(&self, image: &RgbaImage, path: &Path) -> Result<SavedImage, ImageError> {
        let (width, height) = image.dimensions();
        let (compression, filter) = self.config.png_encoding();

        log::debug!(
            "💾 PNG 编码参数：compression={:?} filter={:?} optimize={}",
            compression,
            filter,
            self.config.optimize
        );

        let file = File::create(path).map_err(|e| {
            ImageError::Encode(format!("无法创建输出文件 {}：{}", path.display(), e))
        })?;

        let result = Self::write_png(file, image, compression, filter);
        if let Err(err) = result {
            Self::remove_partial_output(path);
            return Err(err);
        }

        let bytes_written = std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| ImageError::Encode(format!("无法读取输出文件信息：{}", e)))?;

        log::info!(
            "✅ 已写入 {} - {}x{} {} bytes",
            path.display(),
            width,
            height,
            bytes_written
        );

        Ok(SavedImage {
            path: path.to_path_buf(),
            width,
            height,
            bytes_written,
        })
    }

    fn write_png(
        file: File,
        image: &RgbaImage,
        compression: image::codecs::png::CompressionType,
        filter: image::codecs::png::FilterType,
    ) -> Result<(), ImageError> {
        let mut writer = BufWriter::new(file);

        PngEncoder::new_with_quality(&mut writer, compression, filter)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;

        writer
            .flush()
            .map_err(|e| ImageError::Encode(format!("写入输出文件失败：{}", e)))
    }

    fn remove_partial_output(path: &Path) {
        if let Err(err) = std::fs::remove_file(path) {
            log::warn!("⚠️ 清理未完成的输出文件失败 {}：{}", path.display(), err);
        }
    }
}
