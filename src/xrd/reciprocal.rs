//! # 倒格子与 (hkl) 枚举
//!
//! 采用晶体学约定（不含 2π）：b₁ = (b×c)/V，b₂ = (c×a)/V，b₃ = (a×b)/V，
//! 满足 aᵢ·bⱼ = δᵢⱼ，因此 |G_hkl| = 1/d_hkl。
//!
//! ## 枚举范围
//! 由 Bragg 定律，2θ_max 对应的限制球半径 g_max = 2 sin(θ_max)/λ。
//! 由于 h = G·a，|h| ≤ |G||a| ≤ g_max·|a|，每个轴的整数范围取
//! ⌊g_max·|a|⌋ + 1，保证不会漏掉任何衍射。
//!
//! 枚举顺序固定为 (h, k, l) 字典序，(0,0,0) 排除在外，
//! (h,k,l) 与 (-h,-k,-l) 分别保留，由 `aggregator` 合并。
//!
//! ## 依赖关系
//! - 被 `xrd/structure_factor.rs` 和 `xrd/calculator.rs` 使用
//! - 使用 `models/structure.rs` 的 Lattice

use crate::error::{Result, XrdError};
use crate::models::structure::{cross, dot, norm};
use crate::models::Lattice;

/// Miller 指数
pub type Hkl = [i32; 3];

/// 倒格子
#[derive(Debug, Clone, PartialEq)]
pub struct ReciprocalLattice {
    /// 倒格矢 b₁, b₂, b₃（行向量，单位 Å⁻¹）
    pub matrix: [[f64; 3]; 3],
}

impl ReciprocalLattice {
    /// 由正格子计算倒格子
    pub fn from_lattice(lattice: &Lattice) -> Result<Self> {
        let [a, b, c] = lattice.matrix;

        // 体积 V = a · (b × c)
        let b_cross_c = cross(&b, &c);
        let volume = dot(&a, &b_cross_c);

        if !volume.is_finite() || volume.abs() < 1e-10 {
            return Err(XrdError::DegenerateLattice { volume });
        }

        let scale = |v: [f64; 3]| v.map(|x| x / volume);

        Ok(ReciprocalLattice {
            matrix: [scale(b_cross_c), scale(cross(&c, &a)), scale(cross(&a, &b))],
        })
    }

    /// 倒格矢 G = h*b1 + k*b2 + l*b3
    pub fn g_vector(&self, hkl: Hkl) -> [f64; 3] {
        let [h, k, l] = hkl.map(f64::from);
        let m = &self.matrix;

        [
            h * m[0][0] + k * m[1][0] + l * m[2][0],
            h * m[0][1] + k * m[1][1] + l * m[2][1],
            h * m[0][2] + k * m[1][2] + l * m[2][2],
        ]
    }

    /// |G_hkl| = 1/d_hkl
    pub fn g_magnitude(&self, hkl: Hkl) -> f64 {
        norm(&self.g_vector(hkl))
    }

    /// 晶面间距 d_hkl（Å）；(0,0,0) 返回无穷大
    pub fn d_spacing(&self, hkl: Hkl) -> f64 {
        1.0 / self.g_magnitude(hkl)
    }
}

/// 给定波长与 2θ 上限的限制球半径 g_max = 2 sin(θ_max)/λ
pub fn limiting_radius(wavelength: f64, two_theta_max: f64) -> f64 {
    2.0 * (two_theta_max.to_radians() / 2.0).sin() / wavelength
}

/// 枚举限制球内的所有 (hkl)
pub fn enumerate(lattice: &Lattice, wavelength: f64, two_theta_max: f64) -> Result<Vec<Hkl>> {
    let recip = ReciprocalLattice::from_lattice(lattice)?;
    let g_max = limiting_radius(wavelength, two_theta_max);
    // 浮点舍入不能把恰好落在球面上的点排除掉
    let g_cut = g_max * (1.0 + 1e-12);

    let [h_max, k_max, l_max] = lattice
        .lengths()
        .map(|len| (g_max * len).floor() as i32 + 1);

    let mut hkls = Vec::new();
    for h in -h_max..=h_max {
        for k in -k_max..=k_max {
            for l in -l_max..=l_max {
                if h == 0 && k == 0 && l == 0 {
                    continue;
                }
                if recip.g_magnitude([h, k, l]) <= g_cut {
                    hkls.push([h, k, l]);
                }
            }
        }
    }

    log::debug!(
        "enumerated {} reciprocal points within |G| <= {:.5} 1/Å (bounds ±{} ±{} ±{})",
        hkls.len(),
        g_max,
        h_max,
        k_max,
        l_max
    );

    Ok(hkls)
}
