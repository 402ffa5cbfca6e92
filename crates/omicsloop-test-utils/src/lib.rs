//! omicsloop-test-utils — Seeded synthetic cohorts for tests.
//!
//! Half of the samples are tumour-like. Planted driver genes are
//! over-expressed, amplified, hypomethylated and recurrently mutated in those
//! samples, and tumour-like samples die earlier. Background genes carry a
//! small global tumour shift plus noise.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Exp, Normal};

use omicsloop_common::{ClinicalRecord, ClinicalTable, NumericMatrix};

/// A generated cohort. Every matrix shares the same sample axis and genes.
#[derive(Debug, Clone)]
pub struct SyntheticCohort {
    pub expression: NumericMatrix,
    pub clinical: ClinicalTable,
    pub cnv: Option<NumericMatrix>,
    pub methylation: Option<NumericMatrix>,
    pub mutation: Option<NumericMatrix>,
    pub drivers: Vec<String>,
    pub background: Vec<String>,
}

impl SyntheticCohort {
    pub fn builder(seed: u64) -> SyntheticCohortBuilder {
        SyntheticCohortBuilder::new(seed)
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticCohortBuilder {
    seed: u64,
    n_samples: usize,
    n_background: usize,
    drivers: Vec<String>,
    cnv: bool,
    methylation: bool,
    mutation: bool,
    clinical_survival: bool,
}

impl SyntheticCohortBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            n_samples: 60,
            n_background: 40,
            drivers: Vec::new(),
            cnv: false,
            methylation: false,
            mutation: false,
            clinical_survival: true,
        }
    }

    pub fn samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn background_genes(mut self, n: usize) -> Self {
        self.n_background = n;
        self
    }

    pub fn driver(mut self, gene: impl Into<String>) -> Self {
        self.drivers.push(gene.into());
        self
    }

    pub fn with_cnv(mut self) -> Self {
        self.cnv = true;
        self
    }

    pub fn with_methylation(mut self) -> Self {
        self.methylation = true;
        self
    }

    pub fn with_mutation(mut self) -> Self {
        self.mutation = true;
        self
    }

    /// All optional layers.
    pub fn multi_omics(self) -> Self {
        self.with_cnv().with_methylation().with_mutation()
    }

    /// Omit survival fields from the clinical table.
    pub fn without_survival(mut self) -> Self {
        self.clinical_survival = false;
        self
    }

    pub fn build(self) -> SyntheticCohort {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = Normal::new(0.0, 1.0).expect("unit normal");
        let samples: Vec<String> = (0..self.n_samples).map(|i| format!("TCGA-{i:03}")).collect();
        let tumour: Vec<bool> = (0..self.n_samples).map(|i| i % 2 == 0).collect();
        let background: Vec<String> =
            (0..self.n_background).map(|i| format!("GENE{i:04}")).collect();

        let mut expression = Vec::new();
        let mut cnv = Vec::new();
        let mut methylation = Vec::new();
        let mut mutation = Vec::new();

        for gene in &self.drivers {
            let row = |rng: &mut StdRng, on: f64, off: f64, sd: f64| -> Vec<f64> {
                tumour
                    .iter()
                    .map(|&t| (if t { on } else { off }) + sd * noise.sample(rng))
                    .collect()
            };
            expression.push((gene.clone(), row(&mut rng, 8.0, 5.0, 0.5)));
            cnv.push((gene.clone(), row(&mut rng, 1.0, 0.0, 0.15)));
            methylation.push((
                gene.clone(),
                row(&mut rng, 0.12, 0.5, 0.04).into_iter().map(|b| b.clamp(0.0, 1.0)).collect(),
            ));
            mutation.push((
                gene.clone(),
                tumour.iter().map(|&t| f64::from(u8::from(t && rng.gen_bool(0.5)))).collect(),
            ));
        }

        for gene in &background {
            expression.push((
                gene.clone(),
                tumour
                    .iter()
                    .map(|&t| 5.0 + (if t { 0.6 } else { 0.0 }) + noise.sample(&mut rng))
                    .collect(),
            ));
            cnv.push((gene.clone(), tumour.iter().map(|_| 0.2 * noise.sample(&mut rng)).collect()));
            methylation.push((
                gene.clone(),
                tumour
                    .iter()
                    .map(|_| (0.5 + 0.05 * noise.sample(&mut rng)).clamp(0.0, 1.0))
                    .collect(),
            ));
            mutation.push((
                gene.clone(),
                tumour.iter().map(|_| f64::from(u8::from(rng.gen_bool(0.01)))).collect(),
            ));
        }

        let records = samples
            .iter()
            .zip(&tumour)
            .map(|(s, &t)| {
                let age = rng.gen_range(40.0..80.0);
                let record = ClinicalRecord::new(s.clone()).with_covariate("age", age);
                if self.clinical_survival {
                    let mean: f64 = if t { 300.0 } else { 2000.0 };
                    let survival = Exp::new(1.0 / mean).expect("positive survival rate");
                    record.with_survival(survival.sample(&mut rng) + 1.0, rng.gen_bool(0.8))
                } else {
                    record
                }
            })
            .collect();

        let matrix =
            |rows| NumericMatrix::from_rows(samples.clone(), rows).expect("synthetic matrix");
        SyntheticCohort {
            expression: matrix(expression),
            clinical: ClinicalTable::new(records).expect("synthetic clinical table"),
            cnv: self.cnv.then(|| matrix(cnv)),
            methylation: self.methylation.then(|| matrix(methylation)),
            mutation: self.mutation.then(|| matrix(mutation)),
            drivers: self.drivers,
            background,
        }
    }
}
