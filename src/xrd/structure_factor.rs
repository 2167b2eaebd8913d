//! # 结构因子计算
//!
//! 对单个 (hkl) 计算 Bragg 角、复结构因子和 Lorentz 极化校正后的强度。
//!
//! ## 公式
//! F(hkl) = Σⱼ occⱼ · fⱼ(s) · exp(-Bⱼ s²) · exp(2πi(h xⱼ + k yⱼ + l zⱼ))
//! I(hkl) = |F|² · (1 + cos²2θ) / (sin²θ cosθ)
//! 其中 s = sinθ/λ = 1/(2d)
//!
//! ## 依赖关系
//! - 被 `xrd/calculator.rs` 调用
//! - 使用 `xrd/scattering.rs` 获取原子散射因子
//! - 使用 `xrd/reciprocal.rs` 计算 d 间距
//! - 使用 `num-complex` 做复数求和

use crate::error::{Result, XrdError};
use crate::models::Structure;
use crate::xrd::reciprocal::{Hkl, ReciprocalLattice};
use crate::xrd::scattering::{self, ScatteringFactorParams};

use num_complex::Complex64;
use std::collections::HashMap;
use std::f64::consts::PI;

/// 单个 (hkl) 的衍射，只在一次计算内部存在
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    /// Miller 指数
    pub hkl: Hkl,
    /// d 间距（Å）
    pub d_spacing: f64,
    /// Bragg 角 θ（弧度）
    pub theta: f64,
    /// 衍射角 2θ（度）
    pub two_theta: f64,
    /// 复结构因子 F(hkl)
    pub structure_factor: Complex64,
    /// |F|² × LP
    pub intensity: f64,
}

/// 已解析散射参数的位点
#[derive(Debug, Clone)]
struct ResolvedSite {
    params: &'static ScatteringFactorParams,
    position: [f64; 3],
    occupancy: f64,
    /// Debye-Waller B 因子（Å²）
    b_factor: f64,
}

/// 结构因子计算器
///
/// 构造时一次性校验所有位点（元素、占据率、坐标、B 因子），之后逐个 (hkl) 计算不再失败。
#[derive(Debug, Clone)]
pub struct StructureFactorCalculator {
    wavelength: f64,
    recip: ReciprocalLattice,
    sites: Vec<ResolvedSite>,
}

impl StructureFactorCalculator {
    /// `debye_waller_factors` 以元素符号为键，缺省 B = 0
    pub fn new(
        structure: &Structure,
        wavelength: f64,
        debye_waller_factors: &HashMap<String, f64>,
    ) -> Result<Self> {
        if structure.sites.is_empty() {
            return Err(XrdError::EmptyStructure);
        }

        let recip = ReciprocalLattice::from_lattice(&structure.lattice)?;

        let sites = structure
            .sites
            .iter()
            .map(|site| {
                let params = scattering::get_scattering_factor(&site.element)?;

                if !(site.occupancy > 0.0 && site.occupancy <= 1.0) {
                    return Err(XrdError::InvalidOccupancy {
                        element: site.element.clone(),
                        occupancy: site.occupancy,
                    });
                }

                if !site.position.iter().all(|x| x.is_finite()) {
                    return Err(XrdError::InvalidArgument(format!(
                        "site '{}' has a non-finite position {:?}",
                        site.element, site.position
                    )));
                }

                let symbol = scattering::element_symbol(&site.element);
                let b_factor = debye_waller_factors
                    .get(&symbol)
                    .or_else(|| debye_waller_factors.get(&site.element))
                    .copied()
                    .unwrap_or(0.0);

                // B < 0 会让 exp(-B s²) 随 s 发散
                if !(b_factor.is_finite() && b_factor >= 0.0) {
                    return Err(XrdError::InvalidArgument(format!(
                        "Debye-Waller factor for '{}' must be finite and non-negative, got {}",
                        site.element, b_factor
                    )));
                }

                Ok(ResolvedSite {
                    params,
                    position: site.position,
                    occupancy: site.occupancy,
                    b_factor,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            wavelength,
            recip,
            sites,
        })
    }

    /// 计算结构因子 F(hkl)，s = sinθ/λ
    pub fn structure_factor(&self, hkl: Hkl, s: f64) -> Complex64 {
        let [h, k, l] = hkl.map(f64::from);
        let s2 = s * s;

        self.sites
            .iter()
            .map(|site| {
                let [x, y, z] = site.position;
                // 相位 φ = 2π(hx + ky + lz)
                let phase = 2.0 * PI * (h * x + k * y + l * z);
                let amplitude = site.occupancy
                    * site.params.calculate(s)
                    * (-site.b_factor * s2).exp();
                Complex64::from_polar(amplitude, phase)
            })
            .sum()
    }

    /// 计算单个衍射；几何上不可达（sinθ > 1）时返回 None
    pub fn reflection(&self, hkl: Hkl) -> Option<Reflection> {
        let g = self.recip.g_magnitude(hkl);
        if g < 1e-10 {
            return None;
        }

        let d_spacing = 1.0 / g;

        // sin(θ) = λ/(2d)
        let sin_theta = self.wavelength / (2.0 * d_spacing);
        if !(sin_theta <= 1.0) {
            return None;
        }

        let theta = sin_theta.asin();
        let structure_factor = self.structure_factor(hkl, sin_theta / self.wavelength);
        let intensity = structure_factor.norm_sqr() * lorentz_polarization(theta);

        Some(Reflection {
            hkl,
            d_spacing,
            theta,
            two_theta: 2.0 * theta.to_degrees(),
            structure_factor,
            intensity,
        })
    }
}

/// Lorentz 极化校正
pub fn lorentz_polarization(theta: f64) -> f64 {
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();
    let cos_2theta = (2.0 * theta).cos();

    if sin_theta.abs() < 1e-10 || cos_theta.abs() < 1e-10 {
        return 0.0;
    }

    (1.0 + cos_2theta * cos_2theta) / (sin_theta * sin_theta * cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site};

    fn cscl_type(a: f64) -> Structure {
        Structure::new(
            Lattice::cubic(a),
            vec![
                Site::new("Cs", [0.0, 0.0, 0.0]),
                Site::new("Cl", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_structure_factor_sum_and_difference() {
        let calc = StructureFactorCalculator::new(&cscl_type(4.11), 1.54184, &HashMap::new())
            .unwrap();
        let s = 0.2;
        let f_cs = scattering::calculate_scattering_factor("Cs", s).unwrap();
        let f_cl = scattering::calculate_scattering_factor("Cl", s).unwrap();

        // (110): h+k+l 偶数 -> f_Cs + f_Cl
        let f110 = calc.structure_factor([1, 1, 0], s);
        assert!((f110.re - (f_cs + f_cl)).abs() < 1e-9);
        assert!(f110.im.abs() < 1e-9);

        // (100): h+k+l 奇数 -> f_Cs - f_Cl
        let f100 = calc.structure_factor([1, 0, 0], s);
        assert!((f100.re - (f_cs - f_cl)).abs() < 1e-9);
    }

    #[test]
    fn test_friedel_pair_has_equal_intensity() {
        let structure = Structure::new(
            Lattice::from_parameters(4.0, 5.0, 6.0, 90.0, 100.0, 90.0),
            vec![
                Site::new("Fe", [0.1, 0.2, 0.3]),
                Site::new("O", [0.7, 0.15, 0.45]),
            ],
        );
        let calc = StructureFactorCalculator::new(&structure, 1.54184, &HashMap::new()).unwrap();

        let plus = calc.reflection([1, 2, -1]).unwrap();
        let minus = calc.reflection([-1, -2, 1]).unwrap();
        assert_eq!(plus.two_theta, minus.two_theta);
        assert!((plus.intensity - minus.intensity).abs() < 1e-9 * plus.intensity);
        // F(-h) = F(h)*
        assert!((plus.structure_factor - minus.structure_factor.conj()).norm() < 1e-9);
    }

    #[test]
    fn test_occupancy_scales_amplitude() {
        let full = Structure::new(Lattice::cubic(4.0), vec![Site::new("Cu", [0.0, 0.0, 0.0])]);
        let half = Structure::new(
            Lattice::cubic(4.0),
            vec![Site::new("Cu", [0.0, 0.0, 0.0]).with_occupancy(0.5)],
        );
        let no_dw = HashMap::new();
        let i_full = StructureFactorCalculator::new(&full, 1.54184, &no_dw)
            .unwrap()
            .reflection([1, 1, 1])
            .unwrap()
            .intensity;
        let i_half = StructureFactorCalculator::new(&half, 1.54184, &no_dw)
            .unwrap()
            .reflection([1, 1, 1])
            .unwrap()
            .intensity;

        assert!((i_half / i_full - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_debye_waller_damps_intensity() {
        let structure = Structure::new(Lattice::cubic(4.0), vec![Site::new("Cu1", [0.0, 0.0, 0.0])]);
        let cold = StructureFactorCalculator::new(&structure, 1.54184, &HashMap::new()).unwrap();
        let hot = StructureFactorCalculator::new(
            &structure,
            1.54184,
            &HashMap::from([("Cu".to_string(), 1.5)]),
        )
        .unwrap();

        let r_cold = cold.reflection([2, 0, 0]).unwrap();
        let r_hot = hot.reflection([2, 0, 0]).unwrap();
        let s = 1.0 / (2.0 * r_cold.d_spacing);
        let expected = (-2.0 * 1.5 * s * s).exp();
        assert!((r_hot.intensity / r_cold.intensity - expected).abs() < 1e-12);
    }

    #[test]
    fn test_inaccessible_reflection_is_skipped() {
        let calc = StructureFactorCalculator::new(&cscl_type(4.11), 1.54184, &HashMap::new())
            .unwrap();
        // d = 4.11/√(100+100+100) << λ/2
        assert!(calc.reflection([10, 10, 10]).is_none());
        assert!(calc.reflection([0, 0, 0]).is_none());
    }

    #[test]
    fn test_invalid_sites_rejected() {
        let empty = Structure::new(Lattice::cubic(4.0), vec![]);
        assert_eq!(
            StructureFactorCalculator::new(&empty, 1.5, &HashMap::new()).unwrap_err(),
            XrdError::EmptyStructure
        );

        let bad_occ = Structure::new(
            Lattice::cubic(4.0),
            vec![Site::new("Cu", [0.0, 0.0, 0.0]).with_occupancy(1.5)],
        );
        assert!(matches!(
            StructureFactorCalculator::new(&bad_occ, 1.5, &HashMap::new()),
            Err(XrdError::InvalidOccupancy { .. })
        ));

        let unknown = Structure::new(
            Lattice::cubic(4.0),
            vec![
                Site::new("Cu", [0.0, 0.0, 0.0]),
                Site::new("Zz", [0.5, 0.5, 0.5]),
            ],
        );
        assert!(matches!(
            StructureFactorCalculator::new(&unknown, 1.5, &HashMap::new()),
            Err(XrdError::UnsupportedElement { ref element }) if element == "Zz"
        ));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let nan_position = Structure::new(
            Lattice::cubic(4.0),
            vec![Site::new("Cu", [f64::NAN, 0.0, 0.0])],
        );
        assert!(matches!(
            StructureFactorCalculator::new(&nan_position, 1.5, &HashMap::new()),
            Err(XrdError::InvalidArgument(_))
        ));

        let structure = Structure::new(Lattice::cubic(4.0), vec![Site::new("Cu1", [0.0, 0.0, 0.0])]);
        for b in [-500.0, f64::NAN, f64::INFINITY] {
            let factors = HashMap::from([("Cu".to_string(), b)]);
            assert!(
                matches!(
                    StructureFactorCalculator::new(&structure, 1.5, &factors),
                    Err(XrdError::InvalidArgument(_))
                ),
                "B = {} accepted",
                b
            );
        }

        // 只对结构中出现的元素检查
        let unrelated = HashMap::from([("Zn".to_string(), -1.0)]);
        assert!(StructureFactorCalculator::new(&structure, 1.5, &unrelated).is_ok());
    }

    #[test]
    fn test_lorentz_polarization() {
        let theta = 30f64.to_radians();
        // (1 + 0.25) / (0.25 * √3/2)
        let expected = 1.25 / (0.25 * 3f64.sqrt() / 2.0);
        assert!((lorentz_polarization(theta) - expected).abs() < 1e-12);
        assert_eq!(lorentz_polarization(0.0), 0.0);
    }
}
