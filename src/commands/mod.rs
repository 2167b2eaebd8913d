//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `utils/` 和 `xrdcalc` 库
//! - 子模块: xrd

pub mod xrd;

use crate::cli::Commands;

use anyhow::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Pattern(args) => xrd::execute(args),
        Commands::Wavelengths => xrd::list_wavelengths(),
    }
}
