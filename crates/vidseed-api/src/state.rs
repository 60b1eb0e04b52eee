//! Application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use vidseed_pipeline::{
    FfmpegToolbox, JsonRegistry, Pipeline, PipelineConfig, PipelineResult, VideoRegistry,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<Pipeline>,
    pub registry: Arc<dyn VideoRegistry>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state with the production toolbox.
    pub async fn new(
        config: ApiConfig,
        pipeline_config: PipelineConfig,
    ) -> PipelineResult<Self> {
        tokio::fs::create_dir_all(&pipeline_config.video_root).await?;
        tokio::fs::create_dir_all(pipeline_config.scratch_root()).await?;

        let registry: Arc<dyn VideoRegistry> =
            JsonRegistry::open(pipeline_config.data_root.join("videos.json")).await?;
        let pipeline = Arc::new(Pipeline::new(
            pipeline_config,
            Arc::clone(&registry),
            Arc::new(FfmpegToolbox),
        ));

        Ok(Self {
            config,
            pipeline,
            registry,
            started_at: Utc::now(),
        })
    }
}
