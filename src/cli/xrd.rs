//! # pattern 子命令 CLI 定义
//!
//! 结构直接由命令行给出，不读取任何结构文件：
//! - 晶格：`--cell a,b,c,alpha,beta,gamma` 或 `--lattice` 九个数
//! - 位点：`--site El:x,y,z[:occupancy]`，可重复
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/xrd.rs`

use clap::{ArgGroup, Args, ValueEnum};
use std::collections::HashMap;
use xrdcalc::error::{Result, XrdError};
use xrdcalc::models::{Lattice, Site};
use xrdcalc::xrd::ProfileShape;

/// 峰展宽类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum BroadeningType {
    /// No broadening (stick pattern)
    #[default]
    None,
    /// Gaussian broadening
    Gaussian,
    /// Lorentzian broadening
    Lorentzian,
    /// Pseudo-Voigt (50% Gaussian + 50% Lorentzian)
    PseudoVoigt,
}

impl BroadeningType {
    /// 对应的峰形，None 表示保持线谱
    pub fn shape(self) -> Option<ProfileShape> {
        match self {
            BroadeningType::None => None,
            BroadeningType::Gaussian => Some(ProfileShape::Gaussian),
            BroadeningType::Lorentzian => Some(ProfileShape::Lorentzian),
            BroadeningType::PseudoVoigt => Some(ProfileShape::PseudoVoigt),
        }
    }
}

/// pattern 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("cell_input").required(true).args(["cell", "lattice"])))]
pub struct PatternArgs {
    /// Lattice parameters "a,b,c,alpha,beta,gamma" (Å, degrees)
    #[arg(long)]
    pub cell: Option<String>,

    /// Lattice vectors as nine comma-separated numbers, rows a, b, c (Å)
    #[arg(long)]
    pub lattice: Option<String>,

    /// Atomic site "El:x,y,z[:occupancy]" in fractional coordinates (repeatable)
    #[arg(short, long = "site", required = true)]
    pub sites: Vec<String>,

    /// X-ray wavelength: radiation name (CuKa, MoKa, ...) or value in Å (repeatable)
    #[arg(short, long, default_value = "CuKa", env = "XRDCALC_WAVELENGTH")]
    pub wavelength: Vec<String>,

    /// 2θ range in degrees (e.g., "5-90")
    #[arg(short, long, default_value = "5-90")]
    pub range: String,

    /// Report raw intensities instead of scaling the strongest peak to 100
    #[arg(long, default_value_t = false)]
    pub raw: bool,

    /// 2θ tolerance for merging reflections into one peak (degrees)
    #[arg(long, default_value_t = 1e-3)]
    pub tolerance: f64,

    /// Debye-Waller B factor "El=B" in Å² (repeatable)
    #[arg(long = "debye-waller", value_name = "EL=B")]
    pub debye_waller: Vec<String>,

    /// Peak broadening type; a broadened profile is printed as "2θ intensity" columns
    #[arg(long, value_enum, default_value = "none")]
    pub broadening: BroadeningType,

    /// Full Width at Half Maximum (FWHM) for peak broadening, in degrees 2θ
    #[arg(long, default_value_t = 0.1)]
    pub fwhm: f64,

    /// Step size for the broadened profile (degrees 2θ)
    #[arg(long, default_value_t = 0.02)]
    pub step: f64,

    /// Number of strongest peaks to print
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Number of parallel jobs when several wavelengths are given (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}

/// 解析逗号分隔的 n 个数
fn parse_numbers<const N: usize>(input: &str, what: &str) -> Result<[f64; N]> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| XrdError::InvalidArgument(format!("{} '{}' is not a list of numbers", what, input)))?;

    values.try_into().map_err(|v: Vec<f64>| {
        XrdError::InvalidArgument(format!("{} needs {} numbers, got {}", what, N, v.len()))
    })
}

/// 解析 `--cell a,b,c,alpha,beta,gamma`
pub fn parse_cell(input: &str) -> Result<Lattice> {
    let [a, b, c, alpha, beta, gamma] = parse_numbers::<6>(input, "cell")?;
    Ok(Lattice::from_parameters(a, b, c, alpha, beta, gamma))
}

/// 解析 `--lattice` 九个数
pub fn parse_lattice(input: &str) -> Result<Lattice> {
    let m = parse_numbers::<9>(input, "lattice")?;
    Ok(Lattice::from_vectors([
        [m[0], m[1], m[2]],
        [m[3], m[4], m[5]],
        [m[6], m[7], m[8]],
    ]))
}

/// 解析 `El:x,y,z[:occupancy]`
pub fn parse_site(input: &str) -> Result<Site> {
    let parts: Vec<&str> = input.split(':').collect();
    let (element, coords, occupancy) = match parts.as_slice() {
        [element, coords] => (*element, *coords, None),
        [element, coords, occupancy] => (*element, *coords, Some(*occupancy)),
        _ => {
            return Err(XrdError::InvalidArgument(format!(
                "site '{}' must look like El:x,y,z[:occupancy]",
                input
            )))
        }
    };

    let element = element.trim();
    if element.is_empty() {
        return Err(XrdError::InvalidArgument(format!("site '{}' has no element", input)));
    }

    let site = Site::new(element, parse_numbers::<3>(coords, "site position")?);
    match occupancy {
        Some(occ) => {
            let occ = occ.trim().parse::<f64>().map_err(|_| {
                XrdError::InvalidArgument(format!("invalid occupancy in site '{}'", input))
            })?;
            Ok(site.with_occupancy(occ))
        }
        None => Ok(site),
    }
}

/// 解析 2θ 范围 "min-max"，数值合法性由计算器检查
pub fn parse_range(range: &str) -> Result<(f64, f64)> {
    let invalid = || XrdError::InvalidArgument(format!("2θ range '{}' must look like 5-90", range));

    let (min, max) = range.split_once('-').ok_or_else(invalid)?;
    let min: f64 = min.trim().parse().map_err(|_| invalid())?;
    let max: f64 = max.trim().parse().map_err(|_| invalid())?;

    Ok((min, max))
}

/// 解析 `El=B` 列表
pub fn parse_debye_waller(entries: &[String]) -> Result<HashMap<String, f64>> {
    entries
        .iter()
        .map(|entry| {
            let (element, b) = entry.split_once('=').ok_or_else(|| {
                XrdError::InvalidArgument(format!("Debye-Waller factor '{}' must look like El=B", entry))
            })?;
            let b: f64 = b.trim().parse().map_err(|_| {
                XrdError::InvalidArgument(format!("invalid B factor in '{}'", entry))
            })?;
            Ok((element.trim().to_string(), b))
        })
        .collect()
}
