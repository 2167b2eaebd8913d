//! # 批量处理模块
//!
//! 对多个输入（结构或辐射源）并行计算衍射图谱。
//!
//! ## 功能
//! - 有界线程池并行处理
//! - 单消费者通道回收结果
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/xrd.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod runner;

pub use runner::{BatchResult, BatchRunner};
