//! Sample statistics over a trailing window of paired returns.
//!
//! Both estimators use the `n - 1` denominator and fall back to a neutral
//! `1.0` whenever the sample is too small or degenerate.

use crate::scaler::returns::PairedReturn;

/// Benchmark dispersion at or below this is treated as zero.
pub const DEGENERATE_EPS: f64 = 1e-12;

/// Volatility ratio estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolRatio {
    /// `sd(asset) / sd(benchmark)`, or `1.0` when undefined. Not clamped.
    pub ratio: f64,
    /// Points used (window length, or all paired points when too few).
    pub sample_size: usize,
    /// Sample standard deviation of asset returns.
    pub sd_asset: f64,
    /// Sample standard deviation of benchmark returns.
    pub sd_benchmark: f64,
}

/// Beta estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaEstimate {
    /// `cov(asset, benchmark) / var(benchmark)`, or `1.0` when undefined.
    pub beta: f64,
    /// Points used.
    pub sample_size: usize,
}

/// The most recent `min(lookback, len)` points.
pub fn tail(paired: &[PairedReturn], lookback: usize) -> &[PairedReturn] {
    &paired[paired.len().saturating_sub(lookback)..]
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (`n - 1`); `0.0` below two points.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

/// Sample covariance (`n - 1`) of equally long slices; `0.0` below two points.
pub fn sample_cov(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (mx, my) = (mean(&xs[..n]), mean(&ys[..n]));
    let s: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    s / (n - 1) as f64
}

fn split(sample: &[PairedReturn]) -> (Vec<f64>, Vec<f64>) {
    sample.iter().map(|p| (p.asset, p.benchmark)).unzip()
}

/// Volatility ratio over the trailing `lookback` paired points.
///
/// Fewer than `min_samples` paired points (or fewer than two in the window)
/// yields a neutral ratio of `1.0`.
pub fn vol_ratio(paired: &[PairedReturn], lookback: usize, min_samples: usize) -> VolRatio {
    let neutral = |sample_size| VolRatio {
        ratio: 1.0,
        sample_size,
        sd_asset: 0.0,
        sd_benchmark: 0.0,
    };
    if paired.len() < min_samples.max(2) {
        return neutral(paired.len());
    }
    let sample = tail(paired, lookback);
    if sample.len() < 2 {
        return neutral(sample.len());
    }

    let (a, m) = split(sample);
    let (sd_asset, sd_benchmark) = (sample_std(&a), sample_std(&m));
    let ratio = if sd_asset.is_finite() && sd_benchmark.is_finite() && sd_benchmark > DEGENERATE_EPS {
        sd_asset / sd_benchmark
    } else {
        1.0
    };
    VolRatio {
        ratio: if ratio.is_finite() { ratio } else { 1.0 },
        sample_size: sample.len(),
        sd_asset,
        sd_benchmark,
    }
}

/// Beta over the trailing `lookback` paired points.
pub fn beta(paired: &[PairedReturn], lookback: usize, min_samples: usize) -> BetaEstimate {
    if paired.len() < min_samples.max(2) {
        return BetaEstimate { beta: 1.0, sample_size: paired.len() };
    }
    let sample = tail(paired, lookback);
    let n = sample.len();
    if n < 2 {
        return BetaEstimate { beta: 1.0, sample_size: n };
    }

    let (a, m) = split(sample);
    let cov = sample_cov(&a, &m);
    let var = sample_cov(&m, &m);
    let beta = if cov.is_finite() && var.is_finite() && var > DEGENERATE_EPS {
        cov / var
    } else {
        1.0
    };
    BetaEstimate {
        beta: if beta.is_finite() { beta } else { 1.0 },
        sample_size: n,
    }
}

/// Clamp a ratio into `[1 / clamp, clamp]`; non-finite ratios become `1.0`.
///
/// A `clamp` that is not a finite number `>= 1` bounds nothing and the ratio
/// passes through.
pub fn clamp_ratio(ratio: f64, clamp: f64) -> f64 {
    if !ratio.is_finite() {
        return 1.0;
    }
    if !(clamp.is_finite() && clamp >= 1.0) {
        return ratio;
    }
    ratio.clamp(1.0 / clamp, clamp)
}
