//! # XRD 衍射图谱计算器
//!
//! 实现粉末 X 射线衍射图样计算的公共入口。
//!
//! ## 算法概述
//! 1. 校验输入（位点非空、2θ 范围、容差、波长）
//! 2. 枚举限制球内的 (hkl) 点
//! 3. 计算 Bragg 角、d 间距和结构因子
//! 4. 应用 Lorentz 极化校正
//! 5. 合并相同 2θ 的衍射、截取范围、可选归一化
//!
//! 计算是纯函数：每次调用只读共享的散射因子表和波长表，
//! 可以在多个线程中并发调用。
//!
//! ## 参考
//! - pymatgen.analysis.diffraction.xrd
//! - Structure of Materials by Marc De Graef and Michael E. McHenry
//!
//! ## 依赖关系
//! - 被 `commands/xrd.rs` 和 `batch/` 调用
//! - 使用 `xrd/wavelength.rs` 解析波长
//! - 使用 `xrd/reciprocal.rs` 枚举 (hkl)
//! - 使用 `xrd/structure_factor.rs` 计算强度
//! - 使用 `xrd/aggregator.rs` 合并衍射峰

use crate::error::{Result, XrdError};
use crate::models::Structure;
use crate::xrd::aggregator::{self, MergeOptions, Pattern};
use crate::xrd::reciprocal;
use crate::xrd::structure_factor::{Reflection, StructureFactorCalculator};
use crate::xrd::wavelength::Radiation;

use std::collections::HashMap;

/// XRD 计算器
#[derive(Debug, Clone)]
pub struct XrdCalculator {
    /// X 射线辐射源
    radiation: Radiation,
    /// 2θ 合并容差（度）
    merge_tolerance: f64,
    /// 弱峰阈值（百分比）
    intensity_tolerance: f64,
    /// 元素 -> Debye-Waller B 因子（Å²）
    debye_waller_factors: HashMap<String, f64>,
}

impl XrdCalculator {
    /// 创建新的 XRD 计算器
    ///
    /// 波长在 `calculate` 时才解析，名称错误会在那里报告。
    pub fn new(radiation: impl Into<Radiation>) -> Self {
        Self {
            radiation: radiation.into(),
            merge_tolerance: aggregator::DEFAULT_MERGE_TOLERANCE,
            intensity_tolerance: aggregator::DEFAULT_INTENSITY_TOLERANCE,
            debye_waller_factors: HashMap::new(),
        }
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn with_intensity_tolerance(mut self, tolerance: f64) -> Self {
        self.intensity_tolerance = tolerance;
        self
    }

    pub fn with_debye_waller_factors(mut self, factors: HashMap<String, f64>) -> Self {
        self.debye_waller_factors = factors;
        self
    }

    pub fn radiation(&self) -> &Radiation {
        &self.radiation
    }

    /// 解析后的波长（Å）
    pub fn wavelength(&self) -> Result<f64> {
        self.radiation.resolve()
    }

    /// 计算 XRD 衍射图谱
    pub fn calculate(
        &self,
        structure: &Structure,
        two_theta_min: f64,
        two_theta_max: f64,
        scaled: bool,
    ) -> Result<Pattern> {
        // 先做廉价的校验
        if structure.sites.is_empty() {
            return Err(XrdError::EmptyStructure);
        }
        validate_range(two_theta_min, two_theta_max)?;
        self.validate_tolerances()?;
        let wavelength = self.radiation.resolve()?;

        let calculator =
            StructureFactorCalculator::new(structure, wavelength, &self.debye_waller_factors)?;

        let reflections: Vec<Reflection> =
            reciprocal::enumerate(&structure.lattice, wavelength, two_theta_max)?
                .into_iter()
                .filter_map(|hkl| calculator.reflection(hkl))
                .collect();

        log::debug!(
            "{}: {} accessible reflections at λ = {:.5} Å",
            structure.formula(),
            reflections.len(),
            wavelength
        );

        let options = MergeOptions {
            merge_tolerance: self.merge_tolerance,
            intensity_tolerance: self.intensity_tolerance,
            ..MergeOptions::new(two_theta_min, two_theta_max, scaled)
        };

        Ok(aggregator::merge(reflections, wavelength, &options))
    }

    /// 合并容差必须为正：容差为 0 时相同 2θ 的 Friedel 对无法合并
    fn validate_tolerances(&self) -> Result<()> {
        if !(self.merge_tolerance.is_finite() && self.merge_tolerance > 0.0) {
            return Err(XrdError::InvalidArgument(format!(
                "merge tolerance must be a positive number of degrees, got {}",
                self.merge_tolerance
            )));
        }
        if !(self.intensity_tolerance.is_finite() && self.intensity_tolerance >= 0.0) {
            return Err(XrdError::InvalidArgument(format!(
                "intensity tolerance must be a non-negative percentage, got {}",
                self.intensity_tolerance
            )));
        }
        Ok(())
    }
}

/// 2θ 范围必须满足 0 < min < max < 180
pub fn validate_range(two_theta_min: f64, two_theta_max: f64) -> Result<()> {
    let in_domain = |x: f64| x > 0.0 && x < 180.0;

    if in_domain(two_theta_min) && in_domain(two_theta_max) && two_theta_min < two_theta_max {
        Ok(())
    } else {
        Err(XrdError::InvalidRange {
            min: two_theta_min,
            max: two_theta_max,
        })
    }
}

/// 一次性计算入口
pub fn calculate_pattern(
    structure: &Structure,
    radiation: impl Into<Radiation>,
    two_theta_range: (f64, f64),
    scaled: bool,
) -> Result<Pattern> {
    XrdCalculator::new(radiation).calculate(structure, two_theta_range.0, two_theta_range.1, scaled)
}
