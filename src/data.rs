//! Feature processing: validation, calendar derivation, and CSV output

use crate::error::PipelineError;
use chrono::Datelike;
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Columns the pipeline cannot run without.
const REQUIRED_COLUMNS: [&str; 3] = ["DT_REGISTRO", "RENDA", "VALOR"];

/// The fixed projection produced by [`process_sales`].
const OUTPUT_COLUMNS: [&str; 8] = [
    "CD_PESSOA_FISICA",
    "RENDA",
    "VALOR",
    "PRODUTO",
    "SEXO",
    "IDADE",
    "Ano",
    "Mes",
];

/// Validate the raw sales frame, derive `Ano`/`Mes` from the registration
/// date, and return the fixed 8-column projection.
///
/// Pure with respect to the caller: the input frame is only read, and the
/// returned frame is an independent copy. Row count is preserved exactly.
///
/// # Errors
/// [`PipelineError::Validation`] when any of `DT_REGISTRO`, `RENDA`, `VALOR`
/// is missing as a column or contains nulls.
pub fn process_sales(df: &DataFrame) -> crate::Result<DataFrame> {
    let columns = df.get_column_names();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains(c))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::validation(format!(
            "required columns not present in the sales table: {}",
            missing.join(", ")
        )));
    }

    for name in REQUIRED_COLUMNS {
        let nulls = column(df, name)?.null_count();
        if nulls > 0 {
            return Err(PipelineError::validation(format!(
                "column '{name}' has {nulls} missing values"
            )));
        }
    }

    // Ano/Mes come straight from the registration timestamp.
    let registros = column(df, "DT_REGISTRO")?
        .datetime()
        .map_err(|e| PipelineError::validation(e.to_string()))?;
    let mut anos: Vec<i32> = Vec::with_capacity(df.height());
    let mut meses: Vec<u32> = Vec::with_capacity(df.height());
    for dt in registros.as_datetime_iter() {
        // Nulls were rejected above.
        let dt = dt.ok_or_else(|| {
            PipelineError::validation("column 'DT_REGISTRO' has missing values")
        })?;
        anos.push(dt.year());
        meses.push(dt.month());
    }

    let mut processed = df.clone();
    processed
        .with_column(Series::new("Ano", anos))
        .and_then(|df| df.with_column(Series::new("Mes", meses)))
        .map_err(|e| PipelineError::validation(e.to_string()))?;

    processed
        .select(OUTPUT_COLUMNS)
        .map_err(|e| PipelineError::validation(e.to_string()))
}

/// Extract the (rows x 3) clustering feature matrix over income, transaction
/// value, and age.
///
/// The features are used raw, without normalization, so the larger-magnitude
/// monetary columns dominate the distance metric over age.
pub fn feature_matrix(df: &DataFrame) -> crate::Result<Array2<f64>> {
    let renda = float_column(df, "RENDA")?;
    let valor = float_column(df, "VALOR")?;
    let idade: Vec<f64> = column(df, "IDADE")?
        .i32()
        .map_err(|e| PipelineError::validation(e.to_string()))?
        .into_no_null_iter()
        .map(f64::from)
        .collect();

    let n_rows = df.height();
    let mut data = Vec::with_capacity(n_rows * 3);
    for i in 0..n_rows {
        data.extend_from_slice(&[renda[i], valor[i], idade[i]]);
    }

    Array2::from_shape_vec((n_rows, 3), data)
        .map_err(|e| PipelineError::validation(e.to_string()))
}

/// Write the segmented frame as CSV. The parent directory must already
/// exist; nothing is created here.
pub fn write_segmented_csv(df: &mut DataFrame, path: &Path) -> crate::Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(file)
        .finish(df)
        .map_err(|e| PipelineError::Persistence(e.to_string()))
}

fn column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Series> {
    df.column(name)
        .map_err(|e| PipelineError::validation(e.to_string()))
}

fn float_column(df: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    Ok(column(df, name)?
        .f64()
        .map_err(|e| PipelineError::validation(e.to_string()))?
        .into_no_null_iter()
        .collect())
}
