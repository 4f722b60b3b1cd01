//! # 表情图转换工具 — 程序入口
//!
//! 本文件仅负责日志初始化与退出码映射。
//! 转换逻辑见 `image_handler` 模块。

use std::process::ExitCode;

use emoji_resize::image_handler::{ImageConfig, ImageHandler};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let handler = ImageHandler::new(ImageConfig::default());
    match handler.run() {
        Ok(saved) => {
            log::info!(
                "已生成 {}（{}x{}，{} bytes）",
                saved.path.display(),
                saved.width,
                saved.height,
                saved.bytes_written
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("转换失败: {err}");
            ExitCode::FAILURE
        }
    }
}
