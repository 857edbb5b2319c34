//! Vendaseg: sales segmentation and product recommendation CLI
//!
//! Loads the sales table from MySQL, derives calendar features, clusters
//! customers into three segments with K-Means over income, transaction
//! value, and age, persists the fitted model, writes the segmented dataset
//! to CSV, and recommends the most purchased products for an
//! (age, sex, price-range) customer profile.

pub mod cli;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod model;
pub mod recommend;

// Re-export public items for easier access
pub use cli::Args;
pub use config::DbConfig;
pub use data::{feature_matrix, process_sales, write_segmented_csv};
pub use db::{load_sales, sales_frame, SalesRow};
pub use error::PipelineError;
pub use model::{fit_kmeans, segment_customers, KMeansModel, ModelArtifact};
pub use recommend::{recommend_products, QueryProfile, Recommendation};

/// Common result type used throughout the application
pub type Result<T> = std::result::Result<T, PipelineError>;
