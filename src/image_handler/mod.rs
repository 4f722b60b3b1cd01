//! # 图片转换模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“加载校验 → 解码 → RGBA 归一化 → 缩放 → PNG 写入”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件/内存字节加载与签名校验
//! - `pipeline`：负责解码、像素限制、归一化、缩放
//! - `writer`：负责 PNG 编码与落盘
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! main.rs（日志初始化 + 退出码）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（读取 + 体积/签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制 + RGBA + Lanczos 缩放）
//!    └─ writer.rs（PNG 优化编码 + 写文件）
//!    ↓
//! 返回 SavedImage 或 ImageError
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;
mod writer;

pub use config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_TARGET_SIZE, ImageConfig};
pub use error::ImageError;
pub use handler::ImageHandler;
pub use source::{ImageSource, SavedImage};
