//! Candidate gene selection.
//!
//! Narrows the gene universe to the genes worth scoring: the most variable
//! expression genes, plus genes frequently altered at the copy-number or
//! mutation level. The union is restricted to genes present in every loaded
//! matrix, so no analyzer ever looks up a gene its layer lacks.

use std::collections::BTreeSet;

use tracing::debug;

use omicsloop_common::NumericMatrix;
use omicsloop_config::SelectionConfig;

use crate::analyzers::mutation::is_mutated;
use crate::stats;

/// The matrices a selection is drawn from. Any of them may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionInputs<'a> {
    pub expression: Option<&'a NumericMatrix>,
    pub cnv: Option<&'a NumericMatrix>,
    pub methylation: Option<&'a NumericMatrix>,
    pub mutation: Option<&'a NumericMatrix>,
}

impl<'a> SelectionInputs<'a> {
    fn loaded(&self) -> Vec<&'a NumericMatrix> {
        [self.expression, self.cnv, self.methylation, self.mutation]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Select candidate genes. The result is sorted and deduplicated.
///
/// Returns an empty list when no matrix is loaded.
pub fn select_candidates(inputs: &SelectionInputs<'_>, config: &SelectionConfig) -> Vec<String> {
    let mut union = BTreeSet::new();

    if let Some(expression) = inputs.expression {
        union.extend(top_variance_genes(expression, config.top_variance_genes));
    }
    if let Some(cnv) = inputs.cnv {
        union.extend(frequent(cnv, config.cnv_frequency_cutoff, |v| {
            v.abs() > config.cnv_alteration_cutoff
        }));
    }
    if let Some(mutation) = inputs.mutation {
        union.extend(frequent(mutation, config.mutation_frequency_cutoff, is_mutated));
    }

    let selected = restrict_to_shared(union, inputs);
    debug!("Selected {} candidate genes", selected.len());
    selected
}

/// Keep only the genes present in every loaded matrix.
pub fn restrict_to_shared<I, S>(genes: I, inputs: &SelectionInputs<'_>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let loaded = inputs.loaded();
    if loaded.is_empty() {
        return Vec::new();
    }
    genes
        .into_iter()
        .filter(|g| loaded.iter().all(|m| m.contains_gene(g.as_ref())))
        .map(|g| g.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The `n` genes with the largest sample variance, ties broken by gene id.
fn top_variance_genes(expression: &NumericMatrix, n: usize) -> Vec<&str> {
    let mut ranked: Vec<(&str, f64)> = expression
        .rows()
        .map(|(gene, row)| (gene, stats::sample_variance(row).unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(gene, _)| gene).collect()
}

/// Genes whose fraction of samples satisfying `altered` exceeds `cutoff`.
fn frequent<F>(matrix: &NumericMatrix, cutoff: f64, altered: F) -> Vec<&str>
where
    F: Fn(f64) -> bool,
{
    let n_samples = matrix.n_samples();
    if n_samples == 0 {
        return Vec::new();
    }
    matrix
        .rows()
        .filter(|(_, row)| {
            let hits = row.iter().filter(|&&v| altered(v)).count();
            hits as f64 / n_samples as f64 > cutoff
        })
        .map(|(gene, _)| gene)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<(&str, Vec<f64>)>) -> NumericMatrix {
        let n = rows.first().map(|r| r.1.len()).unwrap_or(0);
        NumericMatrix::from_rows(
            (0..n).map(|i| format!("S{i}")).collect(),
            rows.into_iter().map(|(g, r)| (g.to_string(), r)).collect(),
        )
        .unwrap()
    }

    fn config(top: usize) -> SelectionConfig {
        SelectionConfig {
            top_variance_genes: top,
            ..SelectionConfig::default()
        }
    }

    #[test]
    fn test_no_matrices_selects_nothing() {
        let selected = select_candidates(&SelectionInputs::default(), &config(10));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_top_variance_cut() {
        let expr = matrix(vec![
            ("LOW", vec![1.0, 1.1, 1.0, 1.1]),
            ("HIGH", vec![0.0, 10.0, 0.0, 10.0]),
            ("MID", vec![0.0, 2.0, 0.0, 2.0]),
        ]);
        let inputs = SelectionInputs {
            expression: Some(&expr),
            ..Default::default()
        };
        assert_eq!(select_candidates(&inputs, &config(2)), vec!["HIGH", "MID"]);
    }

    #[test]
    fn test_altered_genes_join_and_intersection_applies() {
        let expr = matrix(vec![
            ("VAR", vec![0.0, 9.0, 0.0, 9.0]),
            ("AMP", vec![1.0, 1.0, 1.0, 1.1]),
            ("MUT", vec![2.0, 2.0, 2.0, 2.1]),
            ("NOCNV", vec![0.0, 8.0, 0.0, 8.0]),
        ]);
        let cnv = matrix(vec![
            ("VAR", vec![0.0; 4]),
            ("AMP", vec![0.9, 0.0, 0.0, 0.0]),
            ("MUT", vec![0.0; 4]),
        ]);
        let mutation = matrix(vec![
            ("VAR", vec![0.0; 4]),
            ("AMP", vec![0.0; 4]),
            ("MUT", vec![1.0, 0.0, 0.0, 0.0]),
            ("NOCNV", vec![0.0; 4]),
        ]);
        let inputs = SelectionInputs {
            expression: Some(&expr),
            cnv: Some(&cnv),
            methylation: None,
            mutation: Some(&mutation),
        };
        // VAR and NOCNV lead on variance; NOCNV is dropped because the CNV layer lacks it.
        assert_eq!(select_candidates(&inputs, &config(2)), vec!["AMP", "MUT", "VAR"]);
    }

    #[test]
    fn test_restrict_to_shared_dedups() {
        let expr = matrix(vec![("A", vec![1.0, 2.0]), ("B", vec![1.0, 2.0])]);
        let inputs = SelectionInputs {
            expression: Some(&expr),
            ..Default::default()
        };
        let out = restrict_to_shared(["B", "A", "B", "Z"], &inputs);
        assert_eq!(out, vec!["A", "B"]);
    }
}
