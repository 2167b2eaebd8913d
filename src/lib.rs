//! # xrdcalc
//!
//! 由晶体结构（晶格 + 原子位点）与 X 射线波长计算模拟粉末衍射图谱：
//! 衍射角 2θ、强度以及贡献的 Miller 指数。
//!
//! ```no_run
//! use xrdcalc::models::{Lattice, Site, Structure};
//! use xrdcalc::xrd::XrdCalculator;
//!
//! let structure = Structure::new(
//!     Lattice::cubic(4.05),
//!     vec![Site::new("Al", [0.0, 0.0, 0.0])],
//! );
//! let pattern = XrdCalculator::new("CuKa").calculate(&structure, 10.0, 90.0, true)?;
//! for peak in pattern.peaks() {
//!     println!("{:.3} {:.1}", peak.two_theta, peak.intensity);
//! }
//! # Ok::<(), xrdcalc::error::XrdError>(())
//! ```
//!
//! ## 模块
//! - `models`: 晶体结构数据模型
//! - `xrd`: 衍射计算
//! - `batch`: 并行批量计算
//! - `error`: 错误类型

pub mod batch;
pub mod error;
pub mod models;
pub mod xrd;

pub use error::{Result, XrdError};
pub use models::{Lattice, Site, Structure};
pub use xrd::{calculate_pattern, DiffractionPeak, Pattern, XrdCalculator};
