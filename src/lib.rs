//! # 表情图转换工具 — 库入口
//!
//! 读取 `input.png`，统一转换为 RGBA，使用 Lanczos 滤镜缩放到 100x100，
//! 再以优化模式编码为 PNG 写入 `emoji.png`。
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`image_handler`] | 加载、解码、归一化、缩放与 PNG 写入 |

pub mod image_handler;
