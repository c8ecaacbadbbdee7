//! Artifact download and public-location bookkeeping.
//!
//! Outputs land under the configured assets directory at deterministic
//! paths keyed by the remote task id, and the job record receives the
//! matching public URLs. Only outputs the provider actually produced
//! are fetched and recorded.

use std::path::Path;

use meshgen_core::job::JobState;
use meshgen_core::store::JobUpdate;
use meshgen_provider::{GenerationProvider, ProviderError, TaskOutputs};

use crate::config::SchedulerConfig;

/// A download step failure; aborts finalization.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ArtifactError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Public URLs of the artifacts that were downloaded.
#[derive(Debug, Default)]
pub(crate) struct ArtifactLocations {
    pub model_glb: Option<String>,
    pub model_fbx: Option<String>,
    pub model_usdz: Option<String>,
    pub preview_image: Option<String>,
}

impl ArtifactLocations {
    /// The job update that finalizes a successful generation.
    pub fn into_update(self) -> JobUpdate {
        JobUpdate {
            state: Some(JobState::Succeeded),
            remote_task_id: None,
            model_glb: self.model_glb,
            model_fbx: self.model_fbx,
            model_usdz: self.model_usdz,
            preview_image: self.preview_image,
        }
    }
}

/// Fetch every present output and persist it under
/// `{assets_dir}/models/{task}.glb|.fbx|.usdz` and
/// `{assets_dir}/images/{task}.png`.
pub(crate) async fn download_outputs(
    provider: &dyn GenerationProvider,
    outputs: &TaskOutputs,
    remote_task_id: &str,
    config: &SchedulerConfig,
) -> Result<ArtifactLocations, ArtifactError> {
    let models_dir = config.assets_dir.join("models");
    let images_dir = config.assets_dir.join("images");
    tokio::fs::create_dir_all(&models_dir).await?;
    tokio::fs::create_dir_all(&images_dir).await?;

    let base = &config.public_base_url;
    let mut locations = ArtifactLocations::default();

    if let Some(url) = &outputs.glb {
        let file = format!("{remote_task_id}.glb");
        save(provider, url, &models_dir.join(&file)).await?;
        locations.model_glb = Some(format!("{base}/assets/models/{file}"));
    }
    if let Some(url) = &outputs.fbx {
        let file = format!("{remote_task_id}.fbx");
        save(provider, url, &models_dir.join(&file)).await?;
        locations.model_fbx = Some(format!("{base}/assets/models/{file}"));
    }
    if let Some(url) = &outputs.usdz {
        let file = format!("{remote_task_id}.usdz");
        save(provider, url, &models_dir.join(&file)).await?;
        locations.model_usdz = Some(format!("{base}/assets/models/{file}"));
    }
    if let Some(url) = &outputs.thumbnail {
        let file = format!("{remote_task_id}.png");
        save(provider, url, &images_dir.join(&file)).await?;
        locations.preview_image = Some(format!("{base}/assets/images/{file}"));
    }

    Ok(locations)
}

async fn save(
    provider: &dyn GenerationProvider,
    url: &str,
    path: &Path,
) -> Result<(), ArtifactError> {
    let bytes = provider.fetch(url).await?;
    tokio::fs::write(path, &bytes).await?;
    tracing::debug!(path = %path.display(), size = bytes.len(), "Artifact saved");
    Ok(())
}
