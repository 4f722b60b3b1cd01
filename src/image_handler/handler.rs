//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置持有，不关心进程入口。
//! 处理链路固定为：
//! 1. 按来源加载原始字节并解码
//! 2. 归一化为 RGBA8
//! 3. 缩放到目标尺寸
//! 4. 编码 PNG 写入磁盘
//!
//! ## 实现思路
//!
//! - 配置在构造时确定，运行期间只读。
//! - 任一阶段失败立即返回，不重试、不回滚。
//! - 记录 `load/normalize/resize/save/total` 阶段耗时，便于性能诊断。

use std::path::Path;
use std::time::Instant;

use super::source::SavedImage;
use super::{ImageConfig, ImageError, ImageSource};

/// 图片转换器。
pub struct ImageHandler {
    pub(super) config: ImageConfig,
}

impl ImageHandler {
    /// 根据配置创建转换器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use emoji_resize::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// handler.run()?;
    /// # Ok::<(), emoji_resize::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 使用配置中的输入/输出路径执行一次完整转换。
    pub fn run(&self) -> Result<SavedImage, ImageError> {
        let source = ImageSource::FilePath(self.config.input_path.clone());
        self.process(source, &self.config.output_path)
    }

    /// 处理主入口：从任意来源加载图片，转换后写入 `output`。
    pub fn process(&self, source: ImageSource, output: &Path) -> Result<SavedImage, ImageError> {
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = self.load(source)?;
        let decoded = self.decode(raw)?;
        let load_elapsed = load_start.elapsed();

        let normalize_start = Instant::now();
        let rgba = self.normalize(decoded)?;
        let normalize_elapsed = normalize_start.elapsed();

        let resize_start = Instant::now();
        let resized = self.resize(&rgba)?;
        let resize_elapsed = resize_start.elapsed();

        let save_start = Instant::now();
        let saved = self.save_png(&resized, output)?;
        let save_elapsed = save_start.elapsed();

        log::info!(
            "✅ 图片转换完成 - load={}ms normalize={}ms resize={}ms save={}ms total={}ms",
            load_elapsed.as_millis(),
            normalize_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            save_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(saved)
    }
}
