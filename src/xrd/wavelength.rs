//! # 辐射源波长表
//!
//! 将常用特征辐射名称（CuKa、MoKa 等）映射到波长（Å），
//! 也接受直接给出的数值波长。
//!
//! 名称匹配不区分大小写，忽略 `-`、`_` 和空格，希腊字母 α/β 等价于 a/b，
//! 因此 `Cu-Kα`、`CuKa`、`cuka` 都指同一条谱线。
//!
//! ## 依赖关系
//! - 被 `xrd/calculator.rs` 解析波长
//! - 被 `commands/xrd.rs` 列出可用辐射源
//! - 纯静态数据，无外部依赖

use crate::error::{Result, XrdError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// 特征辐射谱线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationLine {
    /// 规范名称（如 "CuKa1"）
    pub name: &'static str,
    /// 波长（Å）
    pub wavelength: f64,
}

/// 标准特征辐射表
/// Kα 为 Kα1/Kα2 的加权平均，MoKa 例外：取 Kα1 的 0.70930 Å
pub const STANDARD_LINES: &[RadiationLine] = &[
    RadiationLine { name: "CuKa", wavelength: 1.54184 },
    RadiationLine { name: "CuKa1", wavelength: 1.54056 },
    RadiationLine { name: "CuKa2", wavelength: 1.54439 },
    RadiationLine { name: "CuKb1", wavelength: 1.39222 },
    RadiationLine { name: "MoKa", wavelength: 0.70930 },
    RadiationLine { name: "MoKa1", wavelength: 0.70930 },
    RadiationLine { name: "MoKa2", wavelength: 0.71359 },
    RadiationLine { name: "MoKb1", wavelength: 0.63229 },
    RadiationLine { name: "CrKa", wavelength: 2.29100 },
    RadiationLine { name: "CrKa1", wavelength: 2.28970 },
    RadiationLine { name: "CrKa2", wavelength: 2.29361 },
    RadiationLine { name: "CrKb1", wavelength: 2.08487 },
    RadiationLine { name: "FeKa", wavelength: 1.93735 },
    RadiationLine { name: "FeKa1", wavelength: 1.93604 },
    RadiationLine { name: "FeKa2", wavelength: 1.93998 },
    RadiationLine { name: "FeKb1", wavelength: 1.75661 },
    RadiationLine { name: "CoKa", wavelength: 1.79026 },
    RadiationLine { name: "CoKa1", wavelength: 1.78896 },
    RadiationLine { name: "CoKa2", wavelength: 1.79285 },
    RadiationLine { name: "CoKb1", wavelength: 1.63079 },
    RadiationLine { name: "AgKa", wavelength: 0.560885 },
    RadiationLine { name: "AgKa1", wavelength: 0.559421 },
    RadiationLine { name: "AgKa2", wavelength: 0.563813 },
    RadiationLine { name: "AgKb1", wavelength: 0.497082 },
];

/// 辐射源：名称或直接给定的波长
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Radiation {
    /// 标准谱线名称
    Named(String),
    /// 波长数值（Å）
    Angstrom(f64),
}

impl Radiation {
    /// 解析为波长（Å）
    pub fn resolve(&self) -> Result<f64> {
        match self {
            Radiation::Named(name) => parse_wavelength(name),
            Radiation::Angstrom(value) => validate(*value),
        }
    }
}

impl From<&str> for Radiation {
    fn from(name: &str) -> Self {
        Radiation::Named(name.to_string())
    }
}

impl From<String> for Radiation {
    fn from(name: String) -> Self {
        Radiation::Named(name)
    }
}

impl From<f64> for Radiation {
    fn from(value: f64) -> Self {
        Radiation::Angstrom(value)
    }
}

impl fmt::Display for Radiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radiation::Named(name) => write!(f, "{}", name),
            Radiation::Angstrom(value) => write!(f, "{} Å", value),
        }
    }
}

/// 按名称查找标准谱线
pub fn lookup(name: &str) -> Option<&'static RadiationLine> {
    let key = normalize(name);
    STANDARD_LINES
        .iter()
        .find(|line| line.name.to_ascii_lowercase() == key)
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> Result<f64> {
    // 先尝试解析为预定义辐射源
    if let Some(line) = lookup(input) {
        return Ok(line.wavelength);
    }
    // 再尝试解析为数值
    match input.trim().parse::<f64>() {
        Ok(value) => validate(value),
        Err(_) => Err(XrdError::UnknownWavelength {
            name: input.to_string(),
        }),
    }
}

fn validate(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(XrdError::InvalidWavelength(value))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| match c {
            'α' | 'Α' => 'a',
            'β' | 'Β' => 'b',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
