//! Survival association evidence.
//!
//! Each gene's expression is dichotomised at its median; the two survival
//! curves are compared with a log-rank test. The effect size is
//! `|ln(hazard ratio)|` from a single-covariate proportional-hazards fit, or
//! a standardised mean-survival difference when that fit does not converge.

use std::collections::BTreeMap;

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Bernoulli, Exp};
use tracing::warn;

use omicsloop_common::{ClinicalTable, EvidenceType, NumericMatrix, OmicsError, Result};

use super::{collect, AnalysisContext, EvidenceMap};
use crate::stats;

/// Mean of the synthetic exponential survival times.
const SYNTHETIC_MEAN_SURVIVAL: f64 = 1000.0;
/// Event probability of the synthetic survival status.
const SYNTHETIC_EVENT_RATE: f64 = 0.3;

/// Where the survival times came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalSource {
    Clinical,
    /// Seeded placeholder data. Carries no prognostic signal.
    Synthetic,
}

/// Survival observations aligned to expression-matrix columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalCohort {
    /// Expression column of each observation.
    columns: Vec<usize>,
    times: Vec<f64>,
    events: Vec<bool>,
    source: SurvivalSource,
}

impl SurvivalCohort {
    /// Align clinical survival to the expression samples, falling back to
    /// seeded synthetic data when no expression sample has both survival fields.
    pub fn resolve(
        expression: &NumericMatrix,
        clinical: &ClinicalTable,
        seed: u64,
    ) -> Result<Self> {
        let (mut columns, mut times, mut events) = (Vec::new(), Vec::new(), Vec::new());
        for (j, sample) in expression.samples().iter().enumerate() {
            if let Some((time, event)) = clinical.get(sample).and_then(|r| r.survival()) {
                columns.push(j);
                times.push(time);
                events.push(event);
            }
        }

        if columns.is_empty() {
            warn!(
                "No clinical survival data for the {} expression samples; using synthetic \
                 survival (seed {}). Survival evidence carries no prognostic signal.",
                expression.n_samples(),
                seed
            );
            return Self::synthetic(expression, seed);
        }

        Ok(Self {
            columns,
            times,
            events,
            source: SurvivalSource::Clinical,
        })
    }

    /// Exponential(mean 1000) times and Bernoulli(0.3) events for every
    /// expression sample, reproducible for a given seed.
    pub fn synthetic(expression: &NumericMatrix, seed: u64) -> Result<Self> {
        let survival =
            Exp::new(1.0 / SYNTHETIC_MEAN_SURVIVAL).map_err(|e| OmicsError::Other(e.into()))?;
        let status =
            Bernoulli::new(SYNTHETIC_EVENT_RATE).map_err(|e| OmicsError::Other(e.into()))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let n = expression.n_samples();
        let mut times = Vec::with_capacity(n);
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            times.push(survival.sample(&mut rng));
            let event: f64 = status.sample(&mut rng);
            events.push(event > 0.5);
        }
        Ok(Self {
            columns: (0..n).collect(),
            times,
            events,
            source: SurvivalSource::Synthetic,
        })
    }

    pub fn source(&self) -> SurvivalSource {
        self.source
    }
}

pub fn analyze(ctx: &AnalysisContext<'_>) -> EvidenceMap {
    let cohort = ctx.survival;

    collect(ctx, EvidenceType::SurvivalAssociation, |gene| {
        let row = ctx.expression.row(gene)?;
        let values: Vec<f64> = cohort.columns.iter().map(|&j| row[j]).collect();
        let cut = stats::median(&values)?;

        let (mut high, mut low) = (Vec::new(), Vec::new());
        for ((&v, &t), &e) in values.iter().zip(&cohort.times).zip(&cohort.events) {
            if v > cut {
                high.push((t, e));
            } else {
                low.push((t, e));
            }
        }

        let log_rank = stats::log_rank(&high, &low)?;
        let high_times: Vec<f64> = high.iter().map(|o| o.0).collect();
        let low_times: Vec<f64> = low.iter().map(|o| o.0).collect();

        let mut metadata = BTreeMap::from([
            ("logrank_statistic".to_string(), log_rank.statistic),
            ("high_group_median_survival".to_string(), stats::median(&high_times)?),
            ("low_group_median_survival".to_string(), stats::median(&low_times)?),
            ("high_group_size".to_string(), high.len() as f64),
            ("low_group_size".to_string(), low.len() as f64),
        ]);

        let fit = stats::cox_single_covariate(&cohort.times, &cohort.events, &values);
        let effect_size = match fit {
            Some(fit) => {
                metadata.insert("hazard_ratio".to_string(), fit.hazard_ratio);
                fit.beta.abs()
            }
            None => {
                metadata.insert("hazard_fit_fallback".to_string(), 1.0);
                let spread = stats::sample_std(&high_times).filter(|s| *s > 0.0)?;
                (stats::mean(&high_times)? - stats::mean(&low_times)?).abs() / spread
            }
        };

        ctx.normaliser.evidence(
            gene,
            EvidenceType::SurvivalAssociation,
            log_rank.p_value,
            effect_size,
            metadata,
        )
    })
}
