use std::path::Path;

use tracing::{error, info};

use crate::commands::Dashboard;
use crate::errors::AppError;
use crate::models::config::DashboardConfig;

use super::dataset::Dataset;

/// Read and decode the dataset file. The only suspension point of a session.
pub async fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<Dataset, AppError> {
    info!("Loading dataset from {}", path.display());
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("Dataset read failed: {}", e);
        AppError::LoadFailure(format!("Cannot read {}: {}", path.display(), e))
    })?;
    Dataset::from_json_str(&text, config)
}

/// One-shot load producing a ready dashboard. No partial state is built when
/// any step fails.
pub async fn load_dashboard(
    path: impl AsRef<Path>,
    config: DashboardConfig,
) -> Result<Dashboard, AppError> {
    config.validate()?;
    let dataset = load_dataset(path.as_ref(), &config).await?;
    Dashboard::new(dataset, config)
}
