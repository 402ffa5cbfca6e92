//! Delimited-file loaders for matrices and clinical tables.
//!
//! Matrix files: header `gene<TAB>sample1<TAB>sample2…`, one gene per row.
//! Clinical files: a `sample_id` column, optional `survival_time` and
//! `survival_status` columns, and any further numeric covariate columns.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use omicsloop_common::{ClinicalRecord, ClinicalTable, NumericMatrix};

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

fn reader(content: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes())
}

pub async fn load_matrix(path: &str) -> Result<NumericMatrix> {
    debug!("Loading matrix from {}", path);
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let matrix = parse_matrix(&content, delimiter_for(Path::new(path)))
        .with_context(|| format!("parsing {path}"))?;
    info!("Loaded {}: {} genes x {} samples", path, matrix.n_genes(), matrix.n_samples());
    Ok(matrix)
}

pub async fn load_clinical(path: &str) -> Result<ClinicalTable> {
    debug!("Loading clinical table from {}", path);
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let table = parse_clinical(&content, delimiter_for(Path::new(path)))
        .with_context(|| format!("parsing {path}"))?;
    info!("Loaded {}: {} samples", path, table.len());
    Ok(table)
}

pub fn parse_matrix(content: &str, delimiter: u8) -> Result<NumericMatrix> {
    let mut reader = reader(content, delimiter);

    // First header cell labels the gene column; the rest are sample ids.
    let samples: Vec<String> = reader.headers()?.iter().skip(1).map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let Some(gene) = record.get(0).filter(|g| !g.is_empty()) else {
            continue;
        };
        let values = record
            .iter()
            .skip(1)
            .map(|v| v.parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .with_context(|| format!("non-numeric value for gene {gene} (row {})", line + 2))?;
        rows.push((gene.to_string(), values));
    }

    Ok(NumericMatrix::from_rows(samples, rows)?)
}

fn parse_status(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "dead" | "deceased" | "event" => Ok(true),
        "0" | "false" | "alive" | "living" | "censored" => Ok(false),
        other => bail!("unrecognised survival_status {other:?}"),
    }
}

pub fn parse_clinical(content: &str, delimiter: u8) -> Result<ClinicalTable> {
    let mut reader = reader(content, delimiter);
    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let Some(id_col) = headers.iter().position(|h| h == "sample_id") else {
        bail!("clinical table has no sample_id column");
    };
    let time_col = headers.iter().position(|h| h == "survival_time");
    let status_col = headers.iter().position(|h| h == "survival_status");

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let Some(sample_id) = row.get(id_col).filter(|s| !s.is_empty()) else {
            continue;
        };
        let mut record = ClinicalRecord::new(sample_id);

        let field = |col: Option<usize>| col.and_then(|c| row.get(c)).filter(|v| !v.is_empty());
        record.survival_time = field(time_col)
            .map(|v| v.parse::<f64>())
            .transpose()
            .with_context(|| format!("survival_time for {sample_id}"))?;
        record.survival_status = field(status_col).map(parse_status).transpose()?;

        for (col, name) in headers.iter().enumerate() {
            if col == id_col || Some(col) == time_col || Some(col) == status_col {
                continue;
            }
            // Non-numeric covariates (stage labels, free text) are not used.
            if let Some(value) = row.get(col).and_then(|v| v.parse::<f64>().ok()) {
                record = record.with_covariate(name.clone(), value);
            }
        }
        records.push(record);
    }

    Ok(ClinicalTable::new(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv_matrix() {
        let m = parse_matrix("gene\tS1\tS2\nTP53\t1.5\t2.0\nKRAS\t0\t-1\n", b'\t').unwrap();
        assert_eq!(m.samples(), ["S1", "S2"]);
        assert_eq!(m.row("KRAS"), Some(&[0.0, -1.0][..]));
    }

    #[test]
    fn test_non_numeric_matrix_value_is_an_error() {
        let err = parse_matrix("gene,S1\nTP53,NA\n", b',').unwrap_err();
        assert!(format!("{err:#}").contains("TP53"));
    }

    #[test]
    fn test_parse_clinical() {
        let csv = "sample_id,survival_time,survival_status,age,stage\n\
                   S1,120,1,61,III\n\
                   S2,300,alive,55,II\n\
                   S3,,,70,I\n";
        let t = parse_clinical(csv, b',').unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("S1").unwrap().survival(), Some((120.0, true)));
        assert_eq!(t.get("S2").unwrap().survival(), Some((300.0, false)));
        assert_eq!(t.get("S3").unwrap().survival(), None);
        assert_eq!(t.get("S3").unwrap().covariates["age"], 70.0);
        assert!(!t.get("S1").unwrap().covariates.contains_key("stage"));
    }

    #[test]
    fn test_clinical_without_id_column() {
        assert!(parse_clinical("patient,age\nP1,50\n", b',').is_err());
    }

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(delimiter_for(Path::new("a/b.CSV")), b',');
        assert_eq!(delimiter_for(Path::new("a/b.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("matrix")), b'\t');
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_matrix("/nonexistent/expression.tsv").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/expression.tsv"));
    }
}
