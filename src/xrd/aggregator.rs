//! # 衍射峰合并
//!
//! 把单个 (hkl) 衍射归并为可观测的衍射峰，并生成最终图谱。
//!
//! ## 算法
//! 1. 按 2θ 升序稳定排序（相同 2θ 保持枚举顺序）
//! 2. 依次扫描，与当前组**第一个**衍射的 2θ 相差小于容差的并入该组；
//!    峰位取组内第一个 2θ，强度求和，(hkl) 取并集
//! 3. 丢弃 [2θ_min, 2θ_max] 之外的峰
//! 4. 丢弃相对最强峰不超过 `intensity_tolerance`（百分比）的弱峰，
//!    以去掉数值噪声残留的系统消光
//! 5. 可选：把最强峰归一化为 100
//!
//! 因为分组锚点是组首，相邻峰位之差总是不小于容差。
//!
//! ## 依赖关系
//! - 被 `xrd/calculator.rs` 调用
//! - 使用 `xrd/structure_factor.rs` 的 Reflection

use crate::xrd::reciprocal::Hkl;
use crate::xrd::structure_factor::Reflection;

use serde::{Deserialize, Serialize};

/// 默认 2θ 合并容差（度）
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-3;

/// 默认弱峰阈值（相对最强峰的百分比）
pub const DEFAULT_INTENSITY_TOLERANCE: f64 = 1e-3;

/// 归一化后的最强峰强度
pub const SCALED_MAX_INTENSITY: f64 = 100.0;

/// 衍射峰
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffractionPeak {
    /// 衍射角 2θ（度），取组内第一个衍射的角度
    pub two_theta: f64,
    /// 强度（绝对值或归一化到 0-100）
    pub intensity: f64,
    /// d 间距（Å），取组内第一个衍射
    pub d_spacing: f64,
    /// 并入该峰的所有 Miller 指数（按合并顺序）
    pub hkls: Vec<Hkl>,
}

/// 等效 (hkl) 族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HklFamily {
    /// 代表指数（族内字典序最大者）
    pub hkl: Hkl,
    /// 多重性
    pub multiplicity: usize,
}

impl DiffractionPeak {
    /// 按 |h|,|k|,|l| 的排列把 (hkl) 分组
    pub fn families(&self) -> Vec<HklFamily> {
        let mut families: Vec<(Hkl, HklFamily)> = Vec::new();

        for &hkl in &self.hkls {
            let key = family_key(hkl);
            match families.iter_mut().find(|(k, _)| *k == key) {
                Some((_, family)) => {
                    family.multiplicity += 1;
                    family.hkl = family.hkl.max(hkl);
                }
                None => families.push((
                    key,
                    HklFamily {
                        hkl,
                        multiplicity: 1,
                    },
                )),
            }
        }

        families.into_iter().map(|(_, family)| family).collect()
    }
}

fn family_key(hkl: Hkl) -> Hkl {
    let mut key = hkl.map(i32::abs);
    key.sort_unstable();
    key
}

/// XRD 衍射图谱，构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    peaks: Vec<DiffractionPeak>,
    wavelength: f64,
    two_theta_range: (f64, f64),
    scaled: bool,
}

impl Pattern {
    /// 衍射峰列表（按 2θ 升序）
    pub fn peaks(&self) -> &[DiffractionPeak] {
        &self.peaks
    }

    /// 使用的波长（Å）
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// 2θ 范围（度）
    pub fn two_theta_range(&self) -> (f64, f64) {
        self.two_theta_range
    }

    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn two_thetas(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.two_theta).collect()
    }

    pub fn intensities(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.intensity).collect()
    }

    /// 最强峰（强度相同取 2θ 较小者）
    pub fn strongest(&self) -> Option<&DiffractionPeak> {
        self.peaks
            .iter()
            .reduce(|best, p| if p.intensity > best.intensity { p } else { best })
    }

    pub fn into_peaks(self) -> Vec<DiffractionPeak> {
        self.peaks
    }
}

/// 合并参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    pub two_theta_min: f64,
    pub two_theta_max: f64,
    /// 2θ 合并容差（度）
    pub merge_tolerance: f64,
    /// 弱峰阈值（百分比）
    pub intensity_tolerance: f64,
    /// 是否归一化到 100
    pub scaled: bool,
}

impl MergeOptions {
    pub fn new(two_theta_min: f64, two_theta_max: f64, scaled: bool) -> Self {
        Self {
            two_theta_min,
            two_theta_max,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            intensity_tolerance: DEFAULT_INTENSITY_TOLERANCE,
            scaled,
        }
    }
}

/// 合并衍射并生成图谱
pub fn merge(mut reflections: Vec<Reflection>, wavelength: f64, options: &MergeOptions) -> Pattern {
    reflections.sort_by(|a, b| a.two_theta.total_cmp(&b.two_theta));

    let mut merged: Vec<DiffractionPeak> = Vec::new();
    for reflection in reflections {
        match merged.last_mut() {
            Some(current)
                if (reflection.two_theta - current.two_theta).abs() < options.merge_tolerance =>
            {
                current.intensity += reflection.intensity;
                current.hkls.push(reflection.hkl);
            }
            _ => merged.push(DiffractionPeak {
                two_theta: reflection.two_theta,
                intensity: reflection.intensity,
                d_spacing: reflection.d_spacing,
                hkls: vec![reflection.hkl],
            }),
        }
    }

    let in_range: Vec<DiffractionPeak> = merged
        .into_iter()
        .filter(|p| p.two_theta >= options.two_theta_min && p.two_theta <= options.two_theta_max)
        .collect();

    let max_intensity = in_range
        .iter()
        .map(|p| p.intensity)
        .fold(0.0_f64, f64::max);

    let mut peaks: Vec<DiffractionPeak> = if max_intensity > 0.0 {
        in_range
            .into_iter()
            .filter(|p| {
                p.intensity / max_intensity * SCALED_MAX_INTENSITY > options.intensity_tolerance
            })
            .collect()
    } else {
        Vec::new()
    };

    if options.scaled {
        for p in &mut peaks {
            p.intensity = p.intensity / max_intensity * SCALED_MAX_INTENSITY;
        }
    }

    log::debug!(
        "merged into {} peaks within {:.2}-{:.2}° (tolerance {}°)",
        peaks.len(),
        options.two_theta_min,
        options.two_theta_max,
        options.merge_tolerance
    );

    Pattern {
        peaks,
        wavelength,
        two_theta_range: (options.two_theta_min, options.two_theta_max),
        scaled: options.scaled,
    }
}
