//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA → 目标尺寸”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 转换 RGBA，并校验字节长度一致性
//! 5. 按固定尺寸缩放（不保持宽高比），优先 `fast_image_resize`，失败回退 `image::imageops`
//!
//! 两条缩放路径都在预乘 alpha 空间内卷积，半透明边缘不会混入透明像素的颜色。

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, RgbaImage};
use std::io::Cursor;

use super::source::RawImageData;
use super::{ImageError, ImageHandler};

impl ImageHandler {
    /// 将原始字节解码为图像。
    pub(crate) fn decode(&self, raw: RawImageData) -> Result<DynamicImage, ImageError> {
        let format = image::guess_format(&raw.bytes)
            .map_err(|e| ImageError::Decode(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        self.validate_pixel_limits(header_width, header_height)?;
        self.validate_decoded_memory_limits(header_width, header_height)?;

        // 像素上限已在上方校验，这里解除 image 内置的分配上限，避免与配置阈值不一致。
        let mut reader = ImageReader::with_format(Cursor::new(raw.bytes.as_slice()), format);
        reader.no_limits();
        let decoded = reader
            .decode()
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        self.validate_pixel_limits(width, height)?;
        self.validate_decoded_memory_limits(width, height)?;

        log::info!(
            "✅ 图片解码成功 - 来源: {} 格式: {:?} 颜色: {:?} 尺寸: {}x{}",
            raw.source_hint,
            format,
            decoded.color(),
            width,
            height
        );

        Ok(decoded)
    }

    /// 将任意颜色模型统一转换为 RGBA8。
    ///
    /// 不含 alpha 的输入，转换后 alpha 恒为 255。
    pub(crate) fn normalize(&self, image: DynamicImage) -> Result<RgbaImage, ImageError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Format(format!(
                "图片尺寸无效：{}x{}",
                width, height
            )));
        }

        let source_color = image.color();
        let rgba = match image {
            DynamicImage::ImageRgba8(buffer) => buffer,
            other => other.to_rgba8(),
        };

        let expected_len = Self::rgba_len(width, height)?;
        if rgba.as_raw().len() != expected_len {
            return Err(ImageError::Format(format!(
                "转换后像素数据长度异常：{}（期望 {}）",
                rgba.as_raw().len(),
                expected_len
            )));
        }

        log::debug!("🎨 颜色模型转换：{:?} -> Rgba8", source_color);
        Ok(rgba)
    }

    /// 按配置缩放到固定尺寸。
    pub(crate) fn resize(&self, image: &RgbaImage) -> Result<RgbaImage, ImageError> {
        let target_width = self.config.target_width;
        let target_height = self.config.target_height;
        let filter = self.config.resize_filter;

        if target_width == 0 || target_height == 0 {
            return Err(ImageError::Format(format!(
                "目标尺寸无效：{}x{}",
                target_width, target_height
            )));
        }

        let (width, height) = image.dimensions();
        log::info!(
            "🧩 缩放：{}x{} -> {}x{}（filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            filter
        );

        match Self::resize_with_fast_image_resize(image, target_width, target_height, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize（预乘 alpha）：{}",
                    err
                );
                Ok(Self::resize_with_imageops(image, target_width, target_height, filter))
            }
        }
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64) * (height as u64);

        if pixels > self.config.max_decoded_pixels {
            return Err(ImageError::Decode(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::Decode("图片解码内存估算溢出".to_string()))?;

        if estimated > self.config.max_decoded_bytes {
            return Err(ImageError::Decode(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                self.config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    fn rgba_len(width: u32, height: u32) -> Result<usize, ImageError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::Format("图片尺寸导致内存溢出风险".to_string()))
    }

    fn resize_with_fast_image_resize(
        image: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ImageError> {
        let (src_width, src_height) = image.dimensions();

        let src_image = fr::images::ImageRef::new(
            src_width,
            src_height,
            image.as_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ImageError::Format(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Format(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Format("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    /// `image::imageops` 不处理 alpha 预乘，这里手动预乘后缩放再还原，
    /// 与 `fast_image_resize` 的默认行为保持一致。
    fn resize_with_imageops(
        image: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> RgbaImage {
        let mut premultiplied = image.clone();
        for pixel in premultiplied.pixels_mut() {
            let alpha = pixel[3] as u32;
            for channel in 0..3 {
                pixel[channel] = ((pixel[channel] as u32 * alpha + 127) / 255) as u8;
            }
        }

        let mut resized =
            image::imageops::resize(&premultiplied, target_width, target_height, filter);
        for pixel in resized.pixels_mut() {
            let alpha = pixel[3] as u32;
            for channel in 0..3 {
                pixel[channel] = if alpha == 0 {
                    0
                } else {
                    ((pixel[channel] as u32 * 255 + alpha / 2) / alpha).min(255) as u8
                };
            }
        }

        resized
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::ImageConfig;
    use image::{ColorType, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x % 255) as u8;
            let g = (y % 255) as u8;
            let b = ((x + y) % 255) as u8;
            Rgba([r, g, b, 255])
        })
    }

    fn raw(bytes: Vec<u8>) -> RawImageData {
        RawImageData {
            bytes,
            source_hint: "test".to_string(),
        }
    }

    #[test]
    fn decode_reads_png_dimensions() {
        let handler = ImageHandler::new(ImageConfig::default());
        let png = encode(DynamicImage::ImageRgba8(gradient_rgba(64, 32)), ImageFormat::Png);

        let decoded = handler.decode(raw(png)).expect("decode should succeed");

        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[test]
    fn decode_rejects_truncated_png() {
        let handler = ImageHandler::new(ImageConfig::default());
        let mut png = encode(DynamicImage::ImageRgba8(gradient_rgba(64, 64)), ImageFormat::Png);
        png.truncate(png.len() / 2);

        let result = handler.decode(raw(png));

        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let mut config = ImageConfig::default();
        config.max_decoded_pixels = 1_000;
        let handler = ImageHandler::new(config);
        let png = encode(DynamicImage::ImageRgba8(gradient_rgba(40, 40)), ImageFormat::Png);

        let result = handler.decode(raw(png));

        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn decode_rejects_decoded_memory_over_limit() {
        let mut config = ImageConfig::default();
        config.max_decoded_bytes = 1_024;
        let handler = ImageHandler::new(config);
        let png = encode(DynamicImage::ImageRgba8(gradient_rgba(32, 32)), ImageFormat::Png);

        let result = handler.decode(raw(png));

        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn normalize_adds_opaque_alpha_to_rgb() {
        let handler = ImageHandler::new(ImageConfig::default());
        let rgb: RgbImage = ImageBuffer::from_pixel(8, 8, Rgb([200, 100, 50]));

        let rgba = handler
            .normalize(DynamicImage::ImageRgb8(rgb))
            .expect("normalize should succeed");

        assert_eq!(rgba.dimensions(), (8, 8));
        assert!(rgba.pixels().all(|p| *p == Rgba([200, 100, 50, 255])));
    }

    #[test]
    fn normalize_expands_grayscale() {
        let handler = ImageHandler::new(ImageConfig::default());
        let gray: GrayImage = ImageBuffer::from_pixel(3, 5, Luma([77]));

        let rgba = handler
            .normalize(DynamicImage::ImageLuma8(gray))
            .expect("normalize should succeed");

        assert_eq!(rgba.as_raw().len(), 3 * 5 * 4);
        assert!(rgba.pixels().all(|p| *p == Rgba([77, 77, 77, 255])));
    }

    #[test]
    fn normalize_rejects_empty_image() {
        let handler = ImageHandler::new(ImageConfig::default());

        let result = handler.normalize(DynamicImage::new(0, 0, ColorType::Rgb8));

        assert!(matches!(result, Err(ImageError::Format(_))));
    }

    #[test]
    fn resize_produces_exact_target_ignoring_aspect_ratio() {
        let handler = ImageHandler::new(ImageConfig::default());

        for (width, height) in [(512, 512), (640, 120), (7, 300), (100, 100), (1, 1)] {
            let resized = handler
                .resize(&gradient_rgba(width, height))
                .expect("resize should succeed");

            assert_eq!(resized.dimensions(), (100, 100));
            assert_eq!(resized.as_raw().len(), 100 * 100 * 4);
        }
    }

    #[test]
    fn resize_keeps_opaque_alpha() {
        let handler = ImageHandler::new(ImageConfig::default());

        let resized = handler
            .resize(&gradient_rgba(333, 211))
            .expect("resize should succeed");

        assert!(resized.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn resize_rejects_zero_target() {
        let mut config = ImageConfig::default();
        config.target_height = 0;
        let handler = ImageHandler::new(config);

        let result = handler.resize(&gradient_rgba(10, 10));

        assert!(matches!(result, Err(ImageError::Format(_))));
    }

    fn red_transparent_left_blue_opaque_right() -> RgbaImage {
        ImageBuffer::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn imageops_fallback_does_not_bleed_transparent_colour() {
        let resized = ImageHandler::resize_with_imageops(
            &red_transparent_left_blue_opaque_right(),
            10,
            10,
            FilterType::Lanczos3,
        );

        assert_eq!(resized.dimensions(), (10, 10));
        assert!(resized.pixels().all(|p| p[0] == 0 && p[1] == 0));
        assert!(resized.pixels().any(|p| p[3] > 0 && p[2] > 0));
    }

    #[test]
    fn imageops_fallback_keeps_opaque_pixels() {
        let source: RgbaImage = ImageBuffer::from_pixel(30, 17, Rgba([12, 200, 99, 255]));

        let resized = ImageHandler::resize_with_imageops(&source, 100, 100, FilterType::Lanczos3);

        assert!(resized.pixels().all(|p| *p == Rgba([12, 200, 99, 255])));
    }

    #[test]
    fn lanczos_maps_to_fast_lanczos() {
        assert!(matches!(
            ImageHandler::to_fast_filter(FilterType::Lanczos3),
            fr::FilterType::Lanczos3
        ));
    }
}
