//! # XRD 计算模块
//!
//! 提供粉末 X 射线衍射图样计算功能。
//!
//! ## 子模块
//! - `wavelength`: 辐射源波长表
//! - `scattering`: 原子散射因子数据库
//! - `reciprocal`: 倒格子与 (hkl) 枚举
//! - `structure_factor`: 结构因子与 Lorentz 极化校正
//! - `aggregator`: 衍射峰合并
//! - `calculator`: 图谱计算入口
//! - `profile`: 峰形展宽
//!
//! ## 依赖关系
//! - 被 `commands/xrd.rs` 和 `batch/` 使用
//! - 使用 `models/structure.rs`

pub mod aggregator;
pub mod calculator;
pub mod profile;
pub mod reciprocal;
pub mod scattering;
pub mod structure_factor;
pub mod wavelength;

pub use aggregator::{DiffractionPeak, HklFamily, Pattern};
pub use calculator::{calculate_pattern, XrdCalculator};
pub use profile::ProfileShape;
pub use reciprocal::Hkl;
pub use wavelength::Radiation;
