//! Command-line interface definitions and interactive query prompts

use crate::error::PipelineError;
use crate::recommend::QueryProfile;
use clap::Parser;
use std::io::{BufRead, Write};

/// Sales segmentation and product recommendation CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output path for the segmented sales CSV (directory must exist)
    #[arg(short, long, default_value = "data/vendas_segmentadas.csv")]
    pub output: String,

    /// Path for the serialized clustering model
    #[arg(long, default_value = "models/segmentacao.json")]
    pub model_path: String,

    /// Config file with database connection settings (overrides vendaseg.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Collect the recommendation query from the interactive prompts: age, sex,
/// minimum price, maximum price, in that order.
pub fn read_query_profile() -> crate::Result<QueryProfile> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    prompt_query_profile(&mut stdin.lock(), &mut stdout)
}

/// Prompt-driven query collection over generic streams, so tests can feed
/// scripted input.
pub fn prompt_query_profile<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> crate::Result<QueryProfile> {
    let idade = parse_age(&prompt(input, output, "Customer age: ")?)?;
    let sexo = parse_sex(&prompt(input, output, "Customer sex (M/F): ")?)?;
    let preco_min = parse_price(&prompt(input, output, "Minimum price: ")?)?;
    let preco_max = parse_price(&prompt(input, output, "Maximum price: ")?)?;

    Ok(QueryProfile {
        idade,
        sexo,
        preco_min,
        preco_max,
    })
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> crate::Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn parse_age(raw: &str) -> crate::Result<i32> {
    raw.parse()
        .map_err(|_| PipelineError::validation(format!("invalid age: '{raw}'")))
}

/// Normalize the sex input to uppercase and validate it is "M" or "F".
pub fn parse_sex(raw: &str) -> crate::Result<String> {
    let normalized = raw.trim().to_uppercase();
    match normalized.as_str() {
        "M" | "F" => Ok(normalized),
        _ => Err(PipelineError::validation(format!(
            "invalid sex: '{raw}' (use 'M' or 'F')"
        ))),
    }
}

pub fn parse_price(raw: &str) -> crate::Result<f64> {
    raw.parse()
        .map_err(|_| PipelineError::validation(format!("invalid price: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_sex_normalizes_casing() {
        assert_eq!(parse_sex("m").unwrap(), "M");
        assert_eq!(parse_sex("M").unwrap(), "M");
        assert_eq!(parse_sex("f").unwrap(), "F");
        assert_eq!(parse_sex(" F ").unwrap(), "F");
    }

    #[test]
    fn test_parse_sex_rejects_other_values() {
        let err = parse_sex("X").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(parse_sex("").is_err());
        assert!(parse_sex("MF").is_err());
    }

    #[test]
    fn test_parse_age_and_price() {
        assert_eq!(parse_age("30").unwrap(), 30);
        assert!(parse_age("thirty").is_err());
        assert_eq!(parse_price("19.9").unwrap(), 19.9);
        assert_eq!(parse_price("20").unwrap(), 20.0);
        assert!(parse_price("").is_err());
    }

    #[test]
    fn test_prompt_query_profile_scripted() {
        let mut input = Cursor::new("30\nm\n5.5\n40\n");
        let mut output = Vec::new();

        let profile = prompt_query_profile(&mut input, &mut output).unwrap();
        assert_eq!(profile.idade, 30);
        assert_eq!(profile.sexo, "M");
        assert_eq!(profile.preco_min, 5.5);
        assert_eq!(profile.preco_max, 40.0);

        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Customer age"));
        assert!(prompts.contains("Maximum price"));
    }

    #[test]
    fn test_prompt_query_profile_invalid_sex_aborts() {
        let mut input = Cursor::new("30\nX\n5.5\n40\n");
        let mut output = Vec::new();

        let err = prompt_query_profile(&mut input, &mut output).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["vendaseg"]);
        assert_eq!(args.output, "data/vendas_segmentadas.csv");
        assert_eq!(args.model_path, "models/segmentacao.json");
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }
}
