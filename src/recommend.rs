//! Product recommendation by purchase frequency among similar customers

use crate::error::PipelineError;
use polars::prelude::*;

/// How many products a recommendation returns at most.
const TOP_N: usize = 5;

/// The customer profile a recommendation is computed for.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    pub idade: i32,
    /// Normalized uppercase, "M" or "F".
    pub sexo: String,
    pub preco_min: f64,
    pub preco_max: f64,
}

/// Outcome of a recommendation query. The empty outcomes are informational,
/// not errors; the pipeline completes normally on them.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Up to five product ids, most purchased first.
    Products(Vec<String>),
    /// No row matched the exact age and sex.
    NoMatchingCustomers,
    /// Customers matched, but none of their purchases fell in the price band.
    NoMatchingProducts,
}

/// Find the products most purchased by customers with the exact same age and
/// sex, restricted to the inclusive price band.
///
/// No fuzzy matching and no band widening: an empty subset at either filter
/// stage short-circuits into the corresponding empty outcome. Ties in the
/// frequency ranking keep first-seen order.
pub fn recommend_products(
    df: &DataFrame,
    profile: &QueryProfile,
) -> crate::Result<Recommendation> {
    let idades: Vec<i32> = int_column(df, "IDADE")?;
    let sexos: Vec<String> = str_column(df, "SEXO")?;
    let valores: Vec<f64> = float_column(df, "VALOR")?;
    let produtos: Vec<String> = str_column(df, "PRODUTO")?;

    // Stage 1: customers with the exact age and sex.
    let similar: Vec<usize> = (0..df.height())
        .filter(|&i| idades[i] == profile.idade && sexos[i] == profile.sexo)
        .collect();
    if similar.is_empty() {
        return Ok(Recommendation::NoMatchingCustomers);
    }

    // Stage 2: their purchases inside the inclusive price band.
    let in_band: Vec<usize> = similar
        .into_iter()
        .filter(|&i| valores[i] >= profile.preco_min && valores[i] <= profile.preco_max)
        .collect();
    if in_band.is_empty() {
        return Ok(Recommendation::NoMatchingProducts);
    }

    // Count frequencies in first-seen order; the stable sort keeps that
    // order among equal counts.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for &i in &in_band {
        match counts.iter_mut().find(|(p, _)| *p == produtos[i]) {
            Some((_, n)) => *n += 1,
            None => counts.push((produtos[i].clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(Recommendation::Products(
        counts.into_iter().take(TOP_N).map(|(p, _)| p).collect(),
    ))
}

fn int_column(df: &DataFrame, name: &str) -> crate::Result<Vec<i32>> {
    Ok(df
        .column(name)
        .and_then(|s| s.i32())
        .map_err(|e| PipelineError::validation(e.to_string()))?
        .into_no_null_iter()
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    Ok(df
        .column(name)
        .and_then(|s| s.f64())
        .map_err(|e| PipelineError::validation(e.to_string()))?
        .into_no_null_iter()
        .collect())
}

fn str_column(df: &DataFrame, name: &str) -> crate::Result<Vec<String>> {
    Ok(df
        .column(name)
        .and_then(|s| s.utf8())
        .map_err(|e| PipelineError::validation(e.to_string()))?
        .into_no_null_iter()
        .map(str::to_string)
        .collect())
}
