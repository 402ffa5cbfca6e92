//! Dense gene × sample matrices.
//!
//! Rows are genes, columns are samples. Values are stored row-major so a
//! gene's profile across samples is a contiguous slice.

use std::collections::HashMap;

use crate::error::{OmicsError, Result};

/// A dense, immutable table of real values keyed by gene (rows) and sample (columns).
///
/// Holds expression, copy-number log-ratios, methylation beta values or
/// binary mutation indicators; the matrix itself does not know which.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMatrix {
    genes: Vec<String>,
    samples: Vec<String>,
    values: Vec<f64>,
    gene_index: HashMap<String, usize>,
    sample_index: HashMap<String, usize>,
}

impl NumericMatrix {
    /// Build a matrix from row-major values.
    ///
    /// Fails on a shape mismatch, duplicate identifiers or non-finite values.
    pub fn new(genes: Vec<String>, samples: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if genes.len() * samples.len() != values.len() {
            return Err(OmicsError::InvalidMatrix(format!(
                "expected {} x {} = {} values, got {}",
                genes.len(),
                samples.len(),
                genes.len() * samples.len(),
                values.len()
            )));
        }
        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            let width = samples.len().max(1);
            return Err(OmicsError::InvalidMatrix(format!(
                "non-finite value for gene {} / sample {}",
                genes[bad / width],
                samples[bad % width]
            )));
        }

        let gene_index = index_unique(&genes, "gene")?;
        let sample_index = index_unique(&samples, "sample")?;

        Ok(Self {
            genes,
            samples,
            values,
            gene_index,
            sample_index,
        })
    }

    /// Build a matrix from `(gene, profile)` rows sharing one sample axis.
    pub fn from_rows(samples: Vec<String>, rows: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut genes = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len() * samples.len());
        for (gene, row) in rows {
            if row.len() != samples.len() {
                return Err(OmicsError::InvalidMatrix(format!(
                    "gene {} has {} values but the matrix has {} samples",
                    gene,
                    row.len(),
                    samples.len()
                )));
            }
            genes.push(gene);
            values.extend(row);
        }
        Self::new(genes, samples, values)
    }

    /// A matrix with no genes and no samples.
    pub fn empty() -> Self {
        Self {
            genes: Vec::new(),
            samples: Vec::new(),
            values: Vec::new(),
            gene_index: HashMap::new(),
            sample_index: HashMap::new(),
        }
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// True when the matrix has no genes or no samples.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() || self.samples.is_empty()
    }

    pub fn contains_gene(&self, gene: &str) -> bool {
        self.gene_index.contains_key(gene)
    }

    pub fn sample_position(&self, sample: &str) -> Option<usize> {
        self.sample_index.get(sample).copied()
    }

    /// Profile of one gene across all samples.
    pub fn row(&self, gene: &str) -> Option<&[f64]> {
        self.gene_index.get(gene).map(|&i| self.row_at(i))
    }

    /// Profile of the gene at row `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn row_at(&self, i: usize) -> &[f64] {
        let width = self.samples.len();
        &self.values[i * width..(i + 1) * width]
    }

    /// Iterate `(gene, profile)` rows in matrix order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.genes
            .iter()
            .enumerate()
            .map(move |(i, g)| (g.as_str(), self.row_at(i)))
    }

    /// Values of sample column `j` across all genes.
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        let width = self.samples.len();
        (0..self.genes.len()).map(move |i| self.values[i * width + j])
    }

    /// Column alignment against another matrix: `(self_col, other_col)` for
    /// every sample present in both, in this matrix's sample order.
    pub fn aligned_columns(&self, other: &NumericMatrix) -> Vec<(usize, usize)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(j, s)| other.sample_position(s).map(|k| (j, k)))
            .collect()
    }
}

fn index_unique(ids: &[String], what: &str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(OmicsError::InvalidMatrix(format!("duplicate {what} id: {id}")));
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_row_access() {
        let m = NumericMatrix::new(ids("G", 2), ids("S", 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        assert_eq!(m.row("G1"), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(m.row("G9"), None);
        assert_eq!(m.column(2).collect::<Vec<_>>(), vec![3.0, 6.0]);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = NumericMatrix::new(ids("G", 2), ids("S", 2), vec![1.0; 3]);
        assert!(matches!(err, Err(OmicsError::InvalidMatrix(_))));
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let genes = vec!["TP53".to_string(), "TP53".to_string()];
        assert!(NumericMatrix::new(genes, ids("S", 1), vec![0.0, 1.0]).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = NumericMatrix::new(ids("G", 1), ids("S", 2), vec![1.0, f64::NAN]);
        assert!(err.is_err());
    }

    #[test]
    fn test_aligned_columns_follow_self_order() {
        let a_samples = vec!["s1".into(), "s2".into(), "s3".into()];
        let a = NumericMatrix::new(ids("G", 1), a_samples, vec![0.0; 3]).unwrap();
        let b_samples = vec!["s3".into(), "s1".into()];
        let b = NumericMatrix::new(ids("G", 1), b_samples, vec![0.0; 2]).unwrap();
        assert_eq!(a.aligned_columns(&b), vec![(0, 1), (2, 0)]);
    }

    #[test]
    fn test_empty_matrix() {
        assert!(NumericMatrix::empty().is_empty());
        let no_samples = NumericMatrix::new(ids("G", 3), vec![], vec![]).unwrap();
        assert!(no_samples.is_empty());
    }
}
