//! # 峰形展宽
//!
//! 把离散的衍射峰（stick pattern）展宽为连续谱。
//!
//! ## 峰形
//! - Gaussian: exp(-Δ²/2σ²)，σ = FWHM / (2√(2 ln 2))
//! - Lorentzian: γ²/(Δ² + γ²)，γ = FWHM/2
//! - Pseudo-Voigt: 50% Gaussian + 50% Lorentzian
//!
//! 三种峰形的峰高都等于峰强度，结果归一化为最大值 100。
//!
//! ## 依赖关系
//! - 使用 `xrd/aggregator.rs` 的 Pattern
//! - 被 `commands/xrd.rs` 调用

use crate::error::{Result, XrdError};
use crate::xrd::aggregator::{Pattern, SCALED_MAX_INTENSITY};

use serde::{Deserialize, Serialize};
use std::fmt;

/// 峰展宽类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileShape {
    #[default]
    Gaussian,
    Lorentzian,
    PseudoVoigt,
}

impl fmt::Display for ProfileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileShape::Gaussian => write!(f, "gaussian"),
            ProfileShape::Lorentzian => write!(f, "lorentzian"),
            ProfileShape::PseudoVoigt => write!(f, "pseudo-voigt"),
        }
    }
}

impl ProfileShape {
    /// 归一化峰形在偏离峰位 delta（度）处的值
    pub fn value(&self, delta: f64, fwhm: f64) -> f64 {
        let sigma = fwhm / (2.0 * (2.0 * 2.0_f64.ln()).sqrt());
        let gamma = fwhm / 2.0;

        let gauss = || (-delta * delta / (2.0 * sigma * sigma)).exp();
        let lorentz = || gamma * gamma / (delta * delta + gamma * gamma);

        match self {
            ProfileShape::Gaussian => gauss(),
            ProfileShape::Lorentzian => lorentz(),
            ProfileShape::PseudoVoigt => 0.5 * (gauss() + lorentz()),
        }
    }
}

/// 在图谱的 2θ 范围内按步长生成展宽谱 (2θ, I)
pub fn broaden(pattern: &Pattern, step: f64, fwhm: f64, shape: ProfileShape) -> Result<Vec<(f64, f64)>> {
    if !(step > 0.0 && step.is_finite()) {
        return Err(XrdError::InvalidArgument(format!("step must be positive, got {}", step)));
    }
    if !(fwhm > 0.0 && fwhm.is_finite()) {
        return Err(XrdError::InvalidArgument(format!("FWHM must be positive, got {}", fwhm)));
    }

    let (theta_min, theta_max) = pattern.two_theta_range();
    let n_points = ((theta_max - theta_min) / step).ceil() as usize + 1;

    let mut profile: Vec<(f64, f64)> = (0..n_points)
        .map(|i| ((theta_min + i as f64 * step).min(theta_max), 0.0))
        .collect();

    for peak in pattern.peaks() {
        for (two_theta, intensity) in profile.iter_mut() {
            *intensity += peak.intensity * shape.value(*two_theta - peak.two_theta, fwhm);
        }
    }

    let max_intensity = profile.iter().map(|(_, i)| *i).fold(0.0_f64, f64::max);
    if max_intensity > 0.0 {
        for (_, intensity) in profile.iter_mut() {
            *intensity = *intensity * SCALED_MAX_INTENSITY / max_intensity;
        }
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site, Structure};
    use crate::xrd::XrdCalculator;

    #[test]
    fn test_half_maximum_at_half_width() {
        let fwhm = 0.2;
        for shape in [
            ProfileShape::Gaussian,
            ProfileShape::Lorentzian,
            ProfileShape::PseudoVoigt,
        ] {
            assert!((shape.value(0.0, fwhm) - 1.0).abs() < 1e-12);
            assert!(
                (shape.value(fwhm / 2.0, fwhm) - 0.5).abs() < 1e-12,
                "{} at half width",
                shape
            );
        }
    }

    #[test]
    fn test_broadened_pattern() {
        let structure = Structure::new(Lattice::cubic(3.61), vec![Site::new("Cu", [0.0, 0.0, 0.0])]);
        let pattern = XrdCalculator::new("CuKa")
            .calculate(&structure, 20.0, 60.0, true)
            .unwrap();

        let profile = broaden(&pattern, 0.02, 0.1, ProfileShape::PseudoVoigt).unwrap();

        assert_eq!(profile.first().unwrap().0, 20.0);
        assert!((profile.last().unwrap().0 - 60.0).abs() < 1e-9);
        let (peak_at, peak_max) = profile
            .iter()
            .copied()
            .fold((0.0, 0.0), |best, p| if p.1 > best.1 { p } else { best });
        assert!((peak_max - 100.0).abs() < 1e-9);

        let strongest = pattern.strongest().unwrap();
        assert!((peak_at - strongest.two_theta).abs() <= 0.02);
    }

    #[test]
    fn test_invalid_parameters() {
        let structure = Structure::new(Lattice::cubic(3.61), vec![Site::new("Cu", [0.0, 0.0, 0.0])]);
        let pattern = XrdCalculator::new("CuKa")
            .calculate(&structure, 20.0, 60.0, true)
            .unwrap();

        assert!(broaden(&pattern, 0.0, 0.1, ProfileShape::Gaussian).is_err());
        assert!(broaden(&pattern, 0.02, -1.0, ProfileShape::Gaussian).is_err());
    }
}
