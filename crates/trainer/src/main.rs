//! MPG Model Trainer - Main Entry Point

use anyhow::Context;
use tracing::info;
use trainer::{init_logging, load_config, TrainingPipeline};

fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== MPG Model Trainer v{} ===", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("failed to load training configuration")?;
    info!(
        "Dataset: {}, artifacts: {}",
        config.dataset_path.display(),
        config.artifact_dir.display()
    );

    let report = TrainingPipeline::run(&config).context("training run failed")?;

    info!(
        "Training complete: bundle {}, R² {:.4} ({} rows, {} outliers removed, {} train / {} test)",
        report.meta.bundle_id,
        report.r_squared,
        report.n_rows,
        report.n_outliers,
        report.n_train,
        report.n_test
    );

    Ok(())
}
