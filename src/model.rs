//! K-Means segmentation: fitting, label assignment, model persistence

use crate::data;
use crate::error::PipelineError;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Customers are always split into three segments.
pub const N_SEGMENTS: usize = 3;

/// Fixed RNG seed so repeated runs on identical input assign identical
/// labels.
const SEED: u64 = 42;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Fitted K-Means model with the per-row assignments for the training data.
#[derive(Debug)]
pub struct KMeansModel {
    pub model: KMeans<f64, L2Dist>,
    pub labels: Array1<usize>,
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares.
    pub inertia: f64,
}

impl KMeansModel {
    /// Number of rows assigned to each segment.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; N_SEGMENTS];
        for &label in self.labels.iter() {
            if label < N_SEGMENTS {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Persistable snapshot of the fitted state.
    pub fn artifact(&self) -> ModelArtifact {
        ModelArtifact {
            n_clusters: N_SEGMENTS,
            centroids: self
                .centroids
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
            inertia: self.inertia,
        }
    }
}

/// Serialized form of the fitted model: the centroids in feature space
/// (income, value, age) plus fit metadata. Written once per run, silently
/// overwriting any previous artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub n_clusters: usize,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

/// Fit the segmentation model over income, value, and age, append the
/// `Segmento` label column, and persist the fitted model.
///
/// The fit is deterministic: fixed cluster count, fixed seed. Every row gets
/// exactly one label in `0..3`.
pub fn segment_customers(
    df: DataFrame,
    model_path: &Path,
) -> crate::Result<(DataFrame, KMeansModel)> {
    let features = data::feature_matrix(&df)?;
    let model = fit_kmeans(&features)?;

    let labels: Vec<u32> = model.labels.iter().map(|&l| l as u32).collect();
    let mut segmented = df;
    segmented
        .with_column(Series::new("Segmento", labels))
        .map_err(|e| PipelineError::validation(e.to_string()))?;

    save_model(&model.artifact(), model_path)?;
    info!(path = %model_path.display(), inertia = model.inertia, "segmentation model persisted");

    Ok((segmented, model))
}

/// Fit K-Means with the fixed cluster count and seed over an unscaled
/// (rows x 3) feature matrix.
pub fn fit_kmeans(features: &Array2<f64>) -> crate::Result<KMeansModel> {
    if features.nrows() < N_SEGMENTS {
        return Err(PipelineError::validation(format!(
            "clustering needs at least {} rows, got {}",
            N_SEGMENTS,
            features.nrows()
        )));
    }

    let rng = Xoshiro256Plus::seed_from_u64(SEED);
    let dataset = DatasetBase::from(features.clone());
    let model = KMeans::params_with(N_SEGMENTS, rng, L2Dist)
        .max_n_iterations(MAX_ITERATIONS)
        .tolerance(TOLERANCE)
        .fit(&dataset)
        .map_err(|e| PipelineError::validation(e.to_string()))?;

    let labels = model.predict(features);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(features, &labels, &centroids);

    Ok(KMeansModel {
        model,
        labels,
        centroids,
        inertia,
    })
}

/// Serialize the model artifact, creating parent directories as needed and
/// overwriting any existing file at the path.
pub fn save_model(artifact: &ModelArtifact, path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let serialized = serde_json::to_string_pretty(artifact)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = features.row(i);
            let centroid = centroids.row(cluster);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }
    inertia
}
