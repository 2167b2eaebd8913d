//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `pattern`: 计算衍射图谱
//! - `wavelengths`: 列出标准辐射源
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: xrd

pub mod xrd;

use clap::{Parser, Subcommand};

/// xrdcalc - 粉末 X 射线衍射图谱计算
#[derive(Parser)]
#[command(name = "xrdcalc")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Simulated powder X-ray diffraction patterns from crystal structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Calculate the powder XRD pattern of a structure given on the command line
    Pattern(xrd::PatternArgs),

    /// List the standard characteristic radiation lines
    Wavelengths,
}
