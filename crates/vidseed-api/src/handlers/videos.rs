//! Video handlers: upload, URL ingestion, delete, listing, diagnostics.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::info;

use vidseed_pipeline::{IngestRequest, StagedFile};

use crate::auth::authorize;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for a successful ingestion.
#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub poster: String,
    pub renditions: usize,
}

/// `POST /upload` — multipart ingestion of one source video.
///
/// Fields: `title`, `description`, `file`, optional `thumbnail` (.jpg),
/// repeated optional `subtitles` (.vtt), optional `encode` flag.
pub async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    authorize(&state.config, &jar)?;

    // Payloads stream into per-request scratch space outside the public
    // static root; an aborted upload is cleaned up with the TempDir.
    let scratch = tempfile::tempdir_in(state.pipeline.config().scratch_root())
        .map_err(|e| ApiError::internal(format!("scratch dir: {e}")))?;

    let mut title = String::new();
    let mut description = String::new();
    let mut transcode = false;
    let mut source: Option<StagedFile> = None;
    let mut thumbnail: Option<StagedFile> = None;
    let mut subtitles: Vec<StagedFile> = Vec::new();
    let mut staged = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "title" => title = read_text(field).await?,
            "description" => description = read_text(field).await?,
            "encode" => {
                let value = read_text(field).await?;
                transcode = value == "1" || value.eq_ignore_ascii_case("true");
            }
            "file" => {
                let name = declared_name(&field, "file")?;
                let path = stage_field(field, scratch.path(), &mut staged).await?;
                source = Some(StagedFile::new(name, path));
            }
            "thumbnail" => {
                let name = declared_name(&field, "thumbnail")?;
                let path = stage_field(field, scratch.path(), &mut staged).await?;
                thumbnail = Some(StagedFile::new(name, path));
            }
            "subtitles" => {
                let name = declared_name(&field, "subtitles")?;
                let path = stage_field(field, scratch.path(), &mut staged).await?;
                subtitles.push(StagedFile::new(name, path));
            }
            other => {
                return Err(ApiError::bad_request(format!(
                    "unexpected multipart field {other}"
                )))
            }
        }
    }

    let source = source.ok_or_else(|| ApiError::bad_request("missing file field"))?;

    info!(title = %title, file = %source.name, transcode, "upload received");

    let outcome = state
        .pipeline
        .ingest(IngestRequest {
            title,
            description,
            source,
            thumbnail,
            subtitles,
            transcode,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: outcome.playback_url,
            poster: outcome.poster_url,
            renditions: outcome.renditions,
        }),
    ))
}

/// Request body for `POST /upload_url`.
#[derive(Deserialize)]
pub struct UploadUrlRequest {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub encode: bool,
}

/// `POST /upload_url` — ingest a video fetched from a remote URL.
pub async fn upload_url(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<UploadUrlRequest>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    authorize(&state.config, &jar)?;

    let source_url = url::Url::parse(&request.url)
        .map_err(|e| ApiError::bad_request(format!("invalid source url: {e}")))?;
    let name = source_url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("download.mp4")
        .to_string();

    let scratch = tempfile::tempdir_in(state.pipeline.config().scratch_root())
        .map_err(|e| ApiError::internal(format!("scratch dir: {e}")))?;
    let path = scratch.path().join("download");

    info!(url = %source_url, "downloading remote source");

    let response = reqwest::get(source_url.clone())
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ApiError::bad_request(format!("download failed: {e}")))?;

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::bad_request(format!("download failed: {e}")))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;

    let outcome = state
        .pipeline
        .ingest(IngestRequest {
            title: request.title,
            description: request.description,
            source: StagedFile::new(name, path),
            thumbnail: None,
            subtitles: Vec::new(),
            transcode: request.encode,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: outcome.playback_url,
            poster: outcome.poster_url,
            renditions: outcome.renditions,
        }),
    ))
}

/// `DELETE /videos/:title` — remove a video and its directory.
pub async fn delete_video(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(title): Path<String>,
) -> ApiResult<&'static str> {
    authorize(&state.config, &jar)?;
    state.pipeline.delete_video(&title).await?;
    Ok("Deleted ok")
}

/// `GET /videos` — newline-separated playback URLs.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<String> {
    let videos = state.registry.list().await?;
    let mut urls: Vec<String> = videos.into_iter().map(|v| v.url).collect();
    urls.sort();
    Ok(urls.join("\n"))
}

/// Diagnostic payload for `GET /info`.
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub launched_at: String,
    pub uptime_secs: i64,
    pub domain: String,
    pub data_root: String,
    pub www_root: String,
    pub video_root: String,
    pub videos: Vec<String>,
    pub links: Vec<String>,
}

/// `GET /info` — gated server diagnostics.
pub async fn info(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Json<InfoResponse>> {
    authorize(&state.config, &jar)?;

    let config = state.pipeline.config();
    let entities = state.registry.list().await?;
    let videos: Vec<String> = entities.iter().map(|v| v.title.clone()).collect();
    let links: Vec<String> = entities.iter().map(|v| v.url.clone()).collect();

    Ok(Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        launched_at: state.started_at.to_rfc3339(),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        domain: config.domain.clone(),
        data_root: config.data_root.display().to_string(),
        www_root: config.www_root.display().to_string(),
        video_root: config.video_root.display().to_string(),
        videos,
        links,
    }))
}

/// `GET /rss` — RSS 2.0 feed of the library.
pub async fn rss_feed(State(state): State<AppState>) -> ApiResult<axum::response::Response> {
    use axum::response::IntoResponse;

    let videos = state.registry.list().await?;
    let feed = crate::rss::render_rss("Video Channel", &videos);
    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        feed,
    )
        .into_response())
}

fn declared_name(field: &axum::extract::multipart::Field<'_>, kind: &str) -> ApiResult<String> {
    field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::bad_request(format!("{kind} field has no file name")))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| ApiError::bad_request(format!("malformed multipart field: {e}")))
}

/// Stream a multipart field into scratch under an opaque name; the declared
/// file name travels separately on the `StagedFile`.
async fn stage_field(
    mut field: axum::extract::multipart::Field<'_>,
    scratch: &FsPath,
    staged: &mut usize,
) -> ApiResult<PathBuf> {
    *staged += 1;
    let path = scratch.join(format!("field-{staged}"));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(format!("upload interrupted: {e}")))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("scratch write: {e}")))?;
    Ok(path)
}
