//! Per-sample clinical annotations.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{OmicsError, Result};

/// Clinical annotations for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub sample_id: String,
    /// Time to event or censoring; positive when present.
    pub survival_time: Option<f64>,
    /// `true` when the event was observed, `false` when censored.
    pub survival_status: Option<bool>,
    #[serde(default)]
    pub covariates: BTreeMap<String, f64>,
}

impl ClinicalRecord {
    pub fn new(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            survival_time: None,
            survival_status: None,
            covariates: BTreeMap::new(),
        }
    }

    pub fn with_survival(mut self, time: f64, event: bool) -> Self {
        self.survival_time = Some(time);
        self.survival_status = Some(event);
        self
    }

    pub fn with_covariate(mut self, name: impl Into<String>, value: f64) -> Self {
        self.covariates.insert(name.into(), value);
        self
    }

    /// `(time, event)` when both survival fields are present.
    pub fn survival(&self) -> Option<(f64, bool)> {
        Some((self.survival_time?, self.survival_status?))
    }
}

/// Clinical table keyed by sample identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClinicalTable {
    records: Vec<ClinicalRecord>,
    index: HashMap<String, usize>,
}

impl ClinicalTable {
    /// Fails on duplicate sample ids or a non-positive / non-finite survival time.
    pub fn new(records: Vec<ClinicalRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            if let Some(t) = r.survival_time {
                if !t.is_finite() || t <= 0.0 {
                    return Err(OmicsError::InvalidClinical(format!(
                        "sample {} has survival_time {t}; must be positive",
                        r.sample_id
                    )));
                }
            }
            if index.insert(r.sample_id.clone(), i).is_some() {
                return Err(OmicsError::InvalidClinical(format!(
                    "duplicate sample id: {}",
                    r.sample_id
                )));
            }
        }
        Ok(Self { records, index })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, sample_id: &str) -> Option<&ClinicalRecord> {
        self.index.get(sample_id).map(|&i| &self.records[i])
    }

    /// True if any record carries both survival fields.
    pub fn has_survival_fields(&self) -> bool {
        self.records.iter().any(|r| r.survival().is_some())
    }
}
