//! # xrdcalc - 粉末 X 射线衍射图谱计算
//!
//! 由命令行给出的晶体结构计算模拟粉末 XRD 衍射峰。
//!
//! ## 子命令
//! - `pattern`     - 计算衍射图谱并打印峰位表
//! - `wavelengths` - 列出标准辐射源
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── xrdcalc (计算核心库)
//!   └── utils/      (输出与进度条)
//! ```
//!
//! 日志由 `RUST_LOG` 控制，例如 `RUST_LOG=xrdcalc=debug`。

mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
