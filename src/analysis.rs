use serde::Serialize;

use crate::scenario::ScenarioResult;

/// Distribution of realized IRRs for one scenario.
///
/// Computed over defined values only; `undefined` counts the iterations the
/// solver could not resolve, which are left out of every other field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrStats {
    pub n: usize,
    pub undefined: usize,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Summary of `irrs`; `None` if no value is defined.
pub fn irr_stats(irrs: &[Option<f64>]) -> Option<IrrStats> {
    let mut values: Vec<f64> = irrs.iter().flatten().copied().collect();
    let undefined = irrs.len() - values.len();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();

    let interp = |p: f64| -> f64 {
        let h = p * (n - 1) as f64;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = h - lo as f64;
        values[lo] * (1.0 - frac) + values[hi] * frac
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    Some(IrrStats {
        n,
        undefined,
        min: values[0],
        p5: interp(0.05),
        p25: interp(0.25),
        median: interp(0.50),
        p75: interp(0.75),
        p95: interp(0.95),
        max: values[n - 1],
        mean,
        std_dev: variance.sqrt(),
    })
}

impl ScenarioResult {
    pub fn stats(&self) -> Option<IrrStats> {
        irr_stats(&self.irrs)
    }
}

/// Equal-width bucket `[lower, upper)`; the last bucket also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bucket counts of `values` over `bins` equal-width intervals spanning
/// their range. Empty input or zero bins gives no buckets; a single distinct
/// value gives one bucket holding everything.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return vec![HistogramBin { lower: min, upper: max, count: values.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
