//! Statistical kernels used by the evidence analyzers.
//!
//! Every test returns `None` on degenerate input (too few observations, zero
//! variance, no events, singular information) instead of producing NaN. The
//! analyzers treat `None` as "omit this gene".

use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, DiscreteCDF, StudentsT};

/// Variances at or below this are treated as zero.
const VARIANCE_EPS: f64 = 1e-12;

/// Newton–Raphson iteration cap for the proportional-hazards fit.
const COX_MAX_ITER: usize = 50;
const COX_TOLERANCE: f64 = 1e-9;
/// Step halvings allowed before a Newton step is declared a failure.
const COX_MAX_HALVINGS: usize = 30;

// ── Descriptive ───────────────────────────────────────────────────────────────

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Unbiased (n − 1) variance.
pub fn sample_variance(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    Some(xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64)
}

pub fn sample_std(xs: &[f64]) -> Option<f64> {
    sample_variance(xs).map(f64::sqrt)
}

/// Population (n) standard deviation.
pub fn population_std(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    Some((xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64).sqrt())
}

pub fn median(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ── Two-sample t-test ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Pooled-SD standardised absolute mean difference.
    pub cohens_d: f64,
    pub mean_a: f64,
    pub mean_b: f64,
}

/// Pooled-variance (Student) two-sample t-test, two-sided.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let var_a = sample_variance(a)?;
    let var_b = sample_variance(b)?;
    let (mean_a, mean_b) = (mean(a)?, mean(b)?);

    let df = na + nb - 2.0;
    let pooled_var = ((na - 1.0) * var_a + (nb - 1.0) * var_b) / df;
    if pooled_var <= VARIANCE_EPS {
        return None;
    }

    let se = (pooled_var * (1.0 / na + 1.0 / nb)).sqrt();
    let statistic = (mean_a - mean_b) / se;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = (2.0 * dist.sf(statistic.abs())).clamp(0.0, 1.0);

    Some(TTest {
        statistic,
        p_value,
        cohens_d: (mean_a - mean_b).abs() / pooled_var.sqrt(),
        mean_a,
        mean_b,
    })
}

// ── Pearson correlation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson correlation with a two-sided t-distribution p-value (df = n − 2).
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len();
    if n != y.len() || n < 3 {
        return None;
    }
    let (mx, my) = (mean(x)?, mean(y)?);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx <= VARIANCE_EPS || syy <= VARIANCE_EPS {
        return None;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    let residual = 1.0 - r * r;
    let p_value = if residual <= 0.0 {
        0.0
    } else {
        let t = r * (df / residual).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0)
    };

    Some(Correlation { r, p_value, n })
}

// ── Survival ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRank {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-group log-rank test (chi-square, 1 df).
///
/// `a` and `b` are `(time, event)` observations.
pub fn log_rank(a: &[(f64, bool)], b: &[(f64, bool)]) -> Option<LogRank> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let mut subjects: Vec<(f64, bool, bool)> = a
        .iter()
        .map(|&(t, e)| (t, e, true))
        .chain(b.iter().map(|&(t, e)| (t, e, false)))
        .collect();
    subjects.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut at_risk = subjects.len() as f64;
    let mut at_risk_a = a.len() as f64;
    let (mut observed_a, mut expected_a, mut variance) = (0.0, 0.0, 0.0);

    let mut i = 0;
    while i < subjects.len() {
        let t = subjects[i].0;
        let (mut deaths, mut deaths_a, mut leaving, mut leaving_a) = (0.0, 0.0, 0.0, 0.0);
        let mut j = i;
        while j < subjects.len() && subjects[j].0 == t {
            let (_, event, in_a) = subjects[j];
            leaving += 1.0;
            if in_a {
                leaving_a += 1.0;
            }
            if event {
                deaths += 1.0;
                if in_a {
                    deaths_a += 1.0;
                }
            }
            j += 1;
        }

        if deaths > 0.0 {
            let frac_a = at_risk_a / at_risk;
            observed_a += deaths_a;
            expected_a += deaths * frac_a;
            if at_risk > 1.0 {
                variance += deaths * frac_a * (1.0 - frac_a) * (at_risk - deaths) / (at_risk - 1.0);
            }
        }

        at_risk -= leaving;
        at_risk_a -= leaving_a;
        i = j;
    }

    if variance <= VARIANCE_EPS {
        return None;
    }
    let statistic = (observed_a - expected_a).powi(2) / variance;
    let p_value = ChiSquared::new(1.0).ok()?.sf(statistic).clamp(0.0, 1.0);
    Some(LogRank { statistic, p_value })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardFit {
    /// Log hazard ratio per unit of the covariate.
    pub beta: f64,
    pub hazard_ratio: f64,
}

/// Single-covariate Cox proportional-hazards fit (Breslow ties) by
/// Newton–Raphson with step halving.
///
/// The covariate is standardised for the iteration and `beta` is reported in
/// its original units, so the fit does not depend on the expression scale.
/// `None` if the information vanishes (e.g. perfect separation), the
/// likelihood cannot be improved, or the iteration cap is reached.
pub fn cox_single_covariate(times: &[f64], events: &[bool], x: &[f64]) -> Option<HazardFit> {
    let n = times.len();
    if n < 2 || events.len() != n || x.len() != n || !events.iter().any(|&e| e) {
        return None;
    }
    let x_mean = mean(x)?;
    let scale = sample_std(x)?;
    if scale * scale <= VARIANCE_EPS {
        return None;
    }
    let z: Vec<f64> = x.iter().map(|v| (v - x_mean) / scale).collect();

    // Descending time order: a risk set is a prefix of this ordering.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| times[j].total_cmp(&times[i]));

    let mut beta = 0.0;
    let mut current = cox_partial_likelihood(beta, times, events, &z, &order)?;
    for _ in 0..COX_MAX_ITER {
        if !(current.information.is_finite() && current.information > VARIANCE_EPS) {
            return None;
        }
        let mut step = current.score / current.information;
        let mut next = cox_partial_likelihood(beta + step, times, events, &z, &order)?;
        let mut halvings = 0;
        while !next.log_likelihood.is_finite()
            || next.log_likelihood < current.log_likelihood - COX_TOLERANCE
        {
            halvings += 1;
            if halvings > COX_MAX_HALVINGS {
                return None;
            }
            step /= 2.0;
            next = cox_partial_likelihood(beta + step, times, events, &z, &order)?;
        }
        beta += step;
        current = next;
        if !beta.is_finite() {
            return None;
        }
        if step.abs() < COX_TOLERANCE {
            let beta = beta / scale;
            return Some(HazardFit {
                beta,
                hazard_ratio: beta.exp(),
            });
        }
    }
    None
}

struct CoxState {
    log_likelihood: f64,
    score: f64,
    information: f64,
}

/// Breslow partial log-likelihood with its first and second derivatives at
/// `beta`.
fn cox_partial_likelihood(
    beta: f64,
    times: &[f64],
    events: &[bool],
    x: &[f64],
    order: &[usize],
) -> Option<CoxState> {
    let shift = x
        .iter()
        .map(|v| beta * v)
        .fold(f64::NEG_INFINITY, f64::max);

    let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
    let mut state = CoxState {
        log_likelihood: 0.0,
        score: 0.0,
        information: 0.0,
    };

    let mut i = 0;
    while i < order.len() {
        let t = times[order[i]];
        let mut j = i;
        while j < order.len() && times[order[j]] == t {
            let k = order[j];
            let w = (beta * x[k] - shift).exp();
            s0 += w;
            s1 += w * x[k];
            s2 += w * x[k] * x[k];
            j += 1;
        }
        if s0 <= 0.0 {
            return None;
        }
        let (m1, m2) = (s1 / s0, s2 / s0);
        let log_s0 = s0.ln() + shift;
        for &k in &order[i..j] {
            if events[k] {
                state.log_likelihood += beta * x[k] - log_s0;
                state.score += x[k] - m1;
                state.information += m2 - m1 * m1;
            }
        }
        i = j;
    }
    Some(state)
}

// ── Binomial ──────────────────────────────────────────────────────────────────

/// One-sided binomial test, `P(X >= successes)` for `X ~ Binomial(trials, rate)`.
pub fn binomial_at_least(successes: u64, trials: u64, rate: f64) -> Option<f64> {
    if successes > trials {
        return None;
    }
    if successes == 0 {
        return Some(1.0);
    }
    let dist = Binomial::new(rate, trials).ok()?;
    Some(dist.sf(successes - 1).clamp(0.0, 1.0))
}
