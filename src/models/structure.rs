//! # 晶体结构数据模型
//!
//! 定义衍射计算的输入：晶格 + 有序的原子位点列表。
//! 结构由调用方构造并传入，本模块不解析任何文件格式。
//!
//! ## 依赖关系
//! - 被 `xrd/` 和 `commands/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c（单位 Å）
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let gamma_rad = gamma.to_radians();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).max(0.0).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 立方晶格
    pub fn cubic(a: f64) -> Self {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// 三个晶格向量的长度 (a, b, c)
    pub fn lengths(&self) -> [f64; 3] {
        self.matrix.map(|v| norm(&v))
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;
        let [a, b, c] = self.lengths();

        let alpha = (dot(&b_vec, &c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(&a_vec, &c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(&a_vec, &b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 晶格体积（行列式，带符号）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        dot(&a, &cross(&b, &c))
    }
}

/// 原子位点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// 元素符号或标签（如 "Fe"、"Fe1"、"O2-"）
    pub element: String,

    /// 分数坐标 [x, y, z]，概念上取模 1
    pub position: [f64; 3],

    /// 占据率，0 < occupancy <= 1
    pub occupancy: f64,
}

impl Site {
    /// 完全占据的位点
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Site {
            element: element.into(),
            position,
            occupancy: 1.0,
        }
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// 晶格
    pub lattice: Lattice,

    /// 位点列表（顺序即求和顺序）
    pub sites: Vec<Site>,
}

impl Structure {
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Self {
        Structure { lattice, sites }
    }

    /// 计算化学式（按占据率加权，元素按字母序）
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, f64> = BTreeMap::new();

        for site in &self.sites {
            *counts.entry(site.element.as_str()).or_insert(0.0) += site.occupancy;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if (count - 1.0).abs() < 1e-8 {
                    el.to_string()
                } else if (count - count.round()).abs() < 1e-8 {
                    format!("{}{}", el, count.round() as i64)
                } else {
                    format!("{}{:.3}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// 向量叉积
pub(crate) fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 向量点积
pub(crate) fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
