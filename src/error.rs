//! # 统一错误处理模块
//!
//! 定义 xrdcalc 的所有错误类型，使用 `thiserror` 派生。
//!
//! 每种错误只影响单次调用，不会修改共享的散射因子表或波长表。
//! 几何上不可达的单个衍射（sinθ > 1）不是错误，会在计算中直接跳过。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// xrdcalc 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XrdError {
    // ─────────────────────────────────────────────────────────────
    // 波长错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unknown wavelength '{name}'. Use a value in Angstrom or a name such as CuKa, MoKa, CoKa")]
    UnknownWavelength { name: String },

    #[error("Invalid wavelength {0} (must be a positive, finite value in Angstrom)")]
    InvalidWavelength(f64),

    // ─────────────────────────────────────────────────────────────
    // 结构错误
    // ─────────────────────────────────────────────────────────────
    #[error("No atomic scattering factor available for element '{element}'")]
    UnsupportedElement { element: String },

    #[error("Structure has no sites")]
    EmptyStructure,

    #[error("Degenerate lattice: cell volume {volume:.3e} is too small")]
    DegenerateLattice { volume: f64 },

    #[error("Invalid occupancy {occupancy} for site '{element}' (must satisfy 0 < occupancy <= 1)")]
    InvalidOccupancy { element: String, occupancy: f64 },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid 2θ range {min}-{max} (must be 0 < min < max < 180)")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XrdError>;
