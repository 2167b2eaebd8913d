//! # XRD 子命令实现
//!
//! 由命令行给出的结构计算 X 射线衍射图样，并在终端打印峰位表。
//!
//! ## 功能
//! - 单波长直接计算
//! - 多波长通过 `batch::BatchRunner` 并行计算
//! - 可选的峰形展宽，输出两列连续谱
//! - 列出标准辐射源
//!
//! ## 依赖关系
//! - 使用 `cli/xrd.rs` 定义的 PatternArgs 与解析函数
//! - 使用 `xrdcalc::xrd` 进行计算
//! - 使用 `utils/` 输出

use crate::cli::xrd::{self as xrd_args, PatternArgs};
use crate::utils::{output, progress};

use anyhow::{Context, Result};
use tabled::{Table, Tabled};
use xrdcalc::batch::BatchRunner;
use xrdcalc::models::Structure;
use xrdcalc::xrd::profile;
use xrdcalc::xrd::wavelength::STANDARD_LINES;
use xrdcalc::xrd::{Pattern, XrdCalculator};

/// 执行 pattern 子命令
pub fn execute(args: PatternArgs) -> Result<()> {
    output::print_header("X-Ray Diffraction Pattern Calculation");

    let structure = build_structure(&args)?;
    output::print_success(&format!(
        "Structure: {} ({} sites, V = {:.3} Å³)",
        structure.formula(),
        structure.sites.len(),
        structure.lattice.volume().abs()
    ));

    let (theta_min, theta_max) = xrd_args::parse_range(&args.range).context("invalid --range")?;
    output::print_info(&format!("2θ range: {:.1}° - {:.1}°", theta_min, theta_max));

    let debye_waller =
        xrd_args::parse_debye_waller(&args.debye_waller).context("invalid --debye-waller")?;
    let scaled = !args.raw;

    let calculators: Vec<XrdCalculator> = args
        .wavelength
        .iter()
        .map(|w| {
            XrdCalculator::new(w.as_str())
                .with_merge_tolerance(args.tolerance)
                .with_debye_waller_factors(debye_waller.clone())
        })
        .collect();

    if let [calculator] = calculators.as_slice() {
        let pattern = calculator
            .calculate(&structure, theta_min, theta_max, scaled)
            .with_context(|| format!("XRD calculation failed for {}", calculator.radiation()))?;
        report(&pattern, args.top);
        print_profile(&pattern, &args)?;
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs).with_progress(progress::create_progress_bar(
        calculators.len() as u64,
        "Calculating",
    ));
    output::print_info(&format!(
        "Calculating {} wavelengths on {} threads",
        calculators.len(),
        runner.jobs()
    ));

    let result = runner.run(&calculators, |calculator| {
        calculator.calculate(&structure, theta_min, theta_max, scaled)
    })?;

    for (calculator, pattern) in calculators.iter().zip(&result.results) {
        output::print_separator();
        match pattern {
            Ok(pattern) => {
                report(pattern, args.top);
                print_profile(pattern, &args)?;
            }
            Err(e) => output::print_error(&format!("{}: {}", calculator.radiation(), e)),
        }
    }

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} failed",
        result.success(),
        result.failed()
    ));

    if result.failed() > 0 {
        anyhow::bail!("{} of {} calculations failed", result.failed(), calculators.len());
    }
    Ok(())
}

/// 列出标准辐射源
pub fn list_wavelengths() -> Result<()> {
    #[derive(Tabled)]
    struct LineRow {
        #[tabled(rename = "Name")]
        name: &'static str,
        #[tabled(rename = "λ (Å)")]
        wavelength: String,
    }

    let rows: Vec<LineRow> = STANDARD_LINES
        .iter()
        .map(|line| LineRow {
            name: line.name,
            wavelength: format!("{:.6}", line.wavelength),
        })
        .collect();

    output::print_header("Standard Radiation Lines");
    println!("{}", Table::new(&rows));
    Ok(())
}

fn build_structure(args: &PatternArgs) -> Result<Structure> {
    let lattice = match (&args.cell, &args.lattice) {
        (Some(cell), _) => xrd_args::parse_cell(cell).context("invalid --cell")?,
        (None, Some(lattice)) => xrd_args::parse_lattice(lattice).context("invalid --lattice")?,
        (None, None) => anyhow::bail!("either --cell or --lattice is required"),
    };

    let sites = args
        .sites
        .iter()
        .map(|s| xrd_args::parse_site(s))
        .collect::<xrdcalc::error::Result<Vec<_>>>()
        .context("invalid --site")?;

    Ok(Structure::new(lattice, sites))
}

fn report(pattern: &Pattern, top: usize) {
    output::print_info(&format!("Using wavelength: {:.5} Å", pattern.wavelength()));
    output::print_success(&format!("Calculated {} diffraction peaks", pattern.len()));

    if pattern.is_empty() {
        output::print_warning("No peaks inside the requested 2θ range");
        return;
    }
    print_peak_table(pattern, top);
}

/// 按 --broadening 输出展宽后的连续谱
fn print_profile(pattern: &Pattern, args: &PatternArgs) -> Result<()> {
    let Some(shape) = args.broadening.shape() else {
        return Ok(());
    };

    let curve = profile::broaden(pattern, args.step, args.fwhm, shape)
        .context("peak broadening failed")?;
    output::print_info(&format!(
        "Applied {} broadening (FWHM = {:.3}°, {} points)",
        shape,
        args.fwhm,
        curve.len()
    ));

    println!("# 2theta intensity");
    for (two_theta, intensity) in curve {
        println!("{:.4} {:.4}", two_theta, intensity);
    }
    Ok(())
}

/// 打印最强的若干个峰（按 2θ 排列）
fn print_peak_table(pattern: &Pattern, count: usize) {
    #[derive(Tabled)]
    struct PeakRow {
        #[tabled(rename = "2θ (°)")]
        two_theta: String,
        #[tabled(rename = "d (Å)")]
        d_spacing: String,
        #[tabled(rename = "I")]
        intensity: String,
        #[tabled(rename = "(hkl) × multiplicity")]
        hkl: String,
    }

    let mut strongest: Vec<_> = pattern.peaks().iter().collect();
    strongest.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    strongest.truncate(count);
    strongest.sort_by(|a, b| a.two_theta.total_cmp(&b.two_theta));

    let rows: Vec<PeakRow> = strongest
        .into_iter()
        .map(|p| PeakRow {
            two_theta: format!("{:.3}", p.two_theta),
            d_spacing: format!("{:.4}", p.d_spacing),
            intensity: format!("{:.2}", p.intensity),
            hkl: p
                .families()
                .iter()
                .map(|f| format!("({} {} {})×{}", f.hkl[0], f.hkl[1], f.hkl[2], f.multiplicity))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Top {} XRD Peaks", rows.len()));
        println!("{}", Table::new(&rows));
    }
}
