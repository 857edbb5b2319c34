//! Vendaseg: single-pass sales segmentation and recommendation pipeline
//!
//! This is the main entrypoint: collect the query profile, load the sales
//! table, process and segment it, persist the artifacts, and print the
//! recommendation.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use vendaseg::{cli, data, db, model, recommend, Args, DbConfig, Recommendation};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendaseg=info".into()),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Erro: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Linear single-pass pipeline; any stage error propagates up and is
/// reported once by `main`.
fn run(args: &Args) -> vendaseg::Result<()> {
    if args.verbose {
        println!("Vendaseg - Customer Segmentation and Recommendation");
        println!("===================================================\n");
    }

    // Query parameters come first, before any database work.
    let profile = cli::read_query_profile()?;

    let config = DbConfig::load(args.config.as_deref())?;

    let start_time = Instant::now();

    // Step 1: Load the sales table
    if args.verbose {
        println!("\nStep 1: Loading sales data from '{}'", config.database);
    }
    let raw = db::load_sales(&config)?;
    println!("✓ Data loaded: {} rows", raw.height());

    // Step 2: Validate and derive features
    let processed = data::process_sales(&raw)?;
    if args.verbose {
        println!("✓ Features processed: {} columns", processed.width());
    }

    // Step 3: Segment customers and persist the model
    if args.verbose {
        println!("\nStep 2: Fitting K-Means model (3 segments, fixed seed)");
    }
    let (mut segmented, kmeans) =
        model::segment_customers(processed, Path::new(&args.model_path))?;
    println!("✓ Model fitted and saved to: {}", args.model_path);

    println!("\n=== Segment Statistics ===");
    for (i, &size) in kmeans.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / segmented.height() as f64) * 100.0;
        println!("Segment {}: {} rows ({:.1}%)", i, size, percentage);
    }
    if args.verbose {
        println!("Within-cluster sum of squares: {:.2}", kmeans.inertia);
    }

    // Step 4: Show and persist the segmented dataset
    println!("\n{segmented}");
    data::write_segmented_csv(&mut segmented, Path::new(&args.output))?;
    println!("✓ Segmented dataset saved to: {}", args.output);

    // Step 5: Recommend products for the requested profile
    match recommend::recommend_products(&segmented, &profile)? {
        Recommendation::Products(products) => {
            println!("\nRecommended products for age {}, sex {}:", profile.idade, profile.sexo);
            for (rank, product) in products.iter().enumerate() {
                println!("  {}. {}", rank + 1, product);
            }
        }
        Recommendation::NoMatchingCustomers => {
            println!(
                "\nNo customers found with age {} and sex {}; no recommendation.",
                profile.idade, profile.sexo
            );
        }
        Recommendation::NoMatchingProducts => {
            println!(
                "\nNo products found in the price range {:.2} - {:.2}; no recommendation.",
                profile.preco_min, profile.preco_max
            );
        }
    }

    if args.verbose {
        println!("\nTotal processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}
