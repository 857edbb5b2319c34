//! Data loading from the MySQL sales table
//!
//! The loader runs one fixed query, maps the rows into a polars frame, and
//! closes the connection unconditionally, even when the query fails. The
//! pipeline itself stays synchronous; the async driver runs on a throwaway
//! current-thread runtime inside [`load_sales`].

use crate::config::DbConfig;
use crate::error::PipelineError;
use chrono::NaiveDateTime;
use polars::prelude::*;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, FromRow};
use tracing::info;

const SALES_QUERY: &str = "SELECT * FROM VENDAS";

/// One raw row of the `VENDAS` table. Registration date, income, and value
/// are nullable at the source; the feature processor rejects nulls later.
#[derive(Debug, Clone, FromRow)]
pub struct SalesRow {
    #[sqlx(rename = "CD_PESSOA_FISICA")]
    pub cd_pessoa_fisica: i64,
    #[sqlx(rename = "RENDA")]
    pub renda: Option<f64>,
    #[sqlx(rename = "VALOR")]
    pub valor: Option<f64>,
    #[sqlx(rename = "PRODUTO")]
    pub produto: String,
    #[sqlx(rename = "SEXO")]
    pub sexo: String,
    #[sqlx(rename = "IDADE")]
    pub idade: i32,
    #[sqlx(rename = "DT_REGISTRO")]
    pub dt_registro: Option<NaiveDateTime>,
}

/// Fetch the full sales table as a DataFrame.
///
/// One connection per call, no pooling, no retry. Connection and query
/// failures surface as [`PipelineError::DataSource`].
pub fn load_sales(cfg: &DbConfig) -> crate::Result<DataFrame> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PipelineError::DataSource(e.to_string()))?;

    runtime.block_on(fetch_sales(cfg))
}

async fn fetch_sales(cfg: &DbConfig) -> crate::Result<DataFrame> {
    let options = MySqlConnectOptions::new()
        .host(&cfg.host)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database);

    info!(host = %cfg.host, database = %cfg.database, "connecting to sales database");
    let mut conn = MySqlConnection::connect_with(&options).await?;

    let rows: Result<Vec<SalesRow>, sqlx::Error> =
        sqlx::query_as(SALES_QUERY).fetch_all(&mut conn).await;

    // Release the connection before inspecting the query outcome.
    let _ = conn.close().await;

    let rows = rows?;
    info!(rows = rows.len(), "sales table fetched");
    sales_frame(rows)
}

/// Build the tabular sales frame from raw rows. Public so the pipeline can
/// be exercised without a live database.
pub fn sales_frame(rows: Vec<SalesRow>) -> crate::Result<DataFrame> {
    let ids: Vec<i64> = rows.iter().map(|r| r.cd_pessoa_fisica).collect();
    let rendas: Vec<Option<f64>> = rows.iter().map(|r| r.renda).collect();
    let valores: Vec<Option<f64>> = rows.iter().map(|r| r.valor).collect();
    let produtos: Vec<&str> = rows.iter().map(|r| r.produto.as_str()).collect();
    let sexos: Vec<&str> = rows.iter().map(|r| r.sexo.as_str()).collect();
    let idades: Vec<i32> = rows.iter().map(|r| r.idade).collect();
    let registros = DatetimeChunked::from_naive_datetime_options(
        "DT_REGISTRO",
        rows.iter().map(|r| r.dt_registro),
        TimeUnit::Milliseconds,
    )
    .into_series();

    DataFrame::new(vec![
        Series::new("CD_PESSOA_FISICA", ids),
        Series::new("RENDA", rendas),
        Series::new("VALOR", valores),
        Series::new("PRODUTO", produtos),
        Series::new("SEXO", sexos),
        Series::new("IDADE", idades),
        registros,
    ])
    .map_err(|e| PipelineError::DataSource(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row(id: i64) -> SalesRow {
        SalesRow {
            cd_pessoa_fisica: id,
            renda: Some(2500.0),
            valor: Some(99.9),
            produto: "P001".to_string(),
            sexo: "M".to_string(),
            idade: 30,
            dt_registro: NaiveDate::from_ymd_opt(2023, 5, 17)
                .unwrap()
                .and_hms_opt(10, 30, 0),
        }
    }

    #[test]
    fn test_sales_frame_shape() {
        let df = sales_frame(vec![sample_row(1), sample_row(2)]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names(),
            &[
                "CD_PESSOA_FISICA",
                "RENDA",
                "VALOR",
                "PRODUTO",
                "SEXO",
                "IDADE",
                "DT_REGISTRO"
            ]
        );
    }

    #[test]
    fn test_sales_frame_preserves_nulls() {
        let mut row = sample_row(1);
        row.renda = None;
        row.dt_registro = None;
        let df = sales_frame(vec![row, sample_row(2)]).unwrap();

        assert_eq!(df.column("RENDA").unwrap().null_count(), 1);
        assert_eq!(df.column("DT_REGISTRO").unwrap().null_count(), 1);
        assert_eq!(df.column("VALOR").unwrap().null_count(), 0);
    }

    #[test]
    fn test_sales_frame_empty() {
        let df = sales_frame(Vec::new()).unwrap();
        assert_eq!(df.height(), 0);
    }
}
