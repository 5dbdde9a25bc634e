//! Static site build: routes → assemble → write page payloads.
//!
//! Output layout:
//! ```text
//! <out_dir>/
//! ├── manifest.json
//! ├── routes.json
//! ├── 404.json
//! └── <locale>/steps/<id>.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use ragwalk_shared::{AppConfig, Locale, RagwalkError, Result, StepId};

use crate::assembler::{NotFoundPage, PageAssembler};
use crate::locale::LocaleRegistry;
use crate::routes::{RouteParams, enumerate_routes};

/// Current schema version for `manifest.json`.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Configuration for [`build_site`].
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory.
    pub out_dir: PathBuf,
    /// Locales to render, in order.
    pub locales: Vec<Locale>,
    /// Fail when any route resolves to not-found.
    pub strict: bool,
    /// Maximum assemblies in flight (at least one).
    pub concurrency: usize,
    /// Tool version recorded in the manifest.
    pub tool_version: String,
}

impl BuildConfig {
    /// Merge the `[build]` section with the registry: the default locale
    /// only, or every supported locale when `all_locales` is set.
    pub fn from_config(config: &AppConfig, registry: &LocaleRegistry, base_dir: &Path) -> Self {
        let locales = if config.build.all_locales {
            registry.locales().to_vec()
        } else {
            vec![registry.default_locale().clone()]
        };

        Self {
            out_dir: base_dir.join(&config.build.out_dir),
            locales,
            strict: config.build.strict,
            concurrency: config.build.concurrency as usize,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of [`build_site`].
#[derive(Debug)]
pub struct BuildResult {
    pub build_id: Uuid,
    pub out_dir: PathBuf,
    /// Routes enumerated from the catalog.
    pub route_count: usize,
    pub pages_written: usize,
    /// Routes that resolved to not-found (non-strict builds only).
    pub missing: Vec<MissingPage>,
    pub elapsed: Duration,
}

/// `manifest.json` written at the root of the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub schema_version: u32,
    pub build_id: Uuid,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub locales: Vec<Locale>,
    pub pages: Vec<PageEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingPage>,
}

/// One written page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub locale: Locale,
    pub step_id: StepId,
    /// Path relative to the output directory.
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// A route that resolved to not-found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPage {
    pub locale: Locale,
    pub step_id: StepId,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each (route, locale) pair is handled.
    fn page_done(&self, path: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_done(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

enum PageOutcome {
    Written(PageEntry),
    Missing(MissingPage),
}

/// Run the static build.
///
/// 1. Enumerate routes from the catalog
/// 2. Assemble every (route, locale) pair on blocking workers
/// 3. Write each page payload atomically
/// 4. Write `404.json`, `routes.json` and `manifest.json`
/// 5. Swap the staged tree in place of `out_dir`
///
/// Everything is rendered into a sibling staging directory first, so the
/// published tree only ever holds one build. Any worker or write failure,
/// or a strict-mode miss, discards the staging directory and leaves the
/// previous output untouched.
#[instrument(skip_all, fields(out_dir = %config.out_dir.display(), locales = config.locales.len()))]
pub async fn build_site(
    assembler: Arc<PageAssembler>,
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    let build_id = Uuid::now_v7();

    if config.locales.is_empty() {
        return Err(RagwalkError::build("no build locales configured"));
    }

    // --- Phase 1: Routes ---
    progress.phase("Enumerating routes");
    let routes = enumerate_routes(assembler.catalog());
    info!(%build_id, routes = routes.len(), "starting site build");

    ensure_replaceable(&config.out_dir)?;
    let staging = staging_dir(&config.out_dir, build_id)?;
    std::fs::create_dir_all(&staging).map_err(|e| RagwalkError::io(&staging, e))?;

    let manifest = match render_site(assembler, config, &routes, &staging, build_id, progress).await {
        Ok(manifest) => manifest,
        Err(e) => {
            discard_staging(&staging);
            return Err(e);
        }
    };

    // --- Phase 4: Publish ---
    progress.phase("Publishing");
    if let Err(e) = publish(&staging, &config.out_dir) {
        discard_staging(&staging);
        return Err(e);
    }

    let result = BuildResult {
        build_id,
        out_dir: config.out_dir.clone(),
        route_count: routes.len(),
        pages_written: manifest.pages.len(),
        missing: manifest.missing,
        elapsed: start.elapsed(),
    };

    info!(
        pages = result.pages_written,
        missing = result.missing.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "site build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Render pages and site metadata into `staging`.
async fn render_site(
    assembler: Arc<PageAssembler>,
    config: &BuildConfig,
    routes: &[RouteParams],
    staging: &Path,
    build_id: Uuid,
    progress: &dyn ProgressReporter,
) -> Result<BuildManifest> {
    // --- Phase 2: Assemble + write pages ---
    progress.phase("Rendering pages");
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut workers: JoinSet<Result<PageOutcome>> = JoinSet::new();

    for locale in &config.locales {
        for route in routes {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| RagwalkError::build(format!("worker pool closed: {e}")))?;

            let assembler = Arc::clone(&assembler);
            let out_dir = staging.to_path_buf();
            let locale = locale.clone();
            let step_id = route.step_id;

            workers.spawn_blocking(move || {
                let _permit = permit;
                render_page(&assembler, &out_dir, &locale, step_id)
            });
        }
    }

    let total = routes.len() * config.locales.len();
    let mut pages = Vec::with_capacity(total);
    let mut missing = Vec::new();

    while let Some(joined) = workers.join_next().await {
        let outcome = joined.map_err(|e| RagwalkError::build(format!("page worker failed: {e}")))??;
        let done = pages.len() + missing.len() + 1;

        match outcome {
            PageOutcome::Written(entry) => {
                progress.page_done(&entry.path, done, total);
                pages.push(entry);
            }
            PageOutcome::Missing(page) => {
                progress.page_done(&relative_page_path(&page.locale, page.step_id), done, total);
                missing.push(page);
            }
        }
    }

    pages.sort_by(|a, b| (&a.locale, a.step_id).cmp(&(&b.locale, b.step_id)));
    missing.sort_by(|a, b| (&a.locale, a.step_id).cmp(&(&b.locale, b.step_id)));

    if config.strict && !missing.is_empty() {
        let list = missing
            .iter()
            .map(|m| format!("{}/{}", m.locale, m.step_id))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(RagwalkError::build(format!(
            "{} page(s) resolved to not found: {list}",
            missing.len()
        )));
    }

    // --- Phase 3: Site metadata ---
    progress.phase("Writing manifest");
    write_json(&staging.join("404.json"), &NotFoundPage::default())?;
    write_json(&staging.join("routes.json"), &routes)?;

    let manifest = BuildManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        build_id,
        tool_version: config.tool_version.clone(),
        generated_at: Utc::now(),
        locales: config.locales.clone(),
        pages,
        missing,
    };
    write_json(&staging.join("manifest.json"), &manifest)?;

    Ok(manifest)
}

/// Read a manifest written by [`build_site`].
pub fn read_manifest(out_dir: &Path) -> Result<BuildManifest> {
    let path = out_dir.join("manifest.json");
    let content = std::fs::read_to_string(&path).map_err(|e| RagwalkError::io(&path, e))?;
    let manifest: BuildManifest = serde_json::from_str(&content)
        .map_err(|e| RagwalkError::parse(format!("invalid manifest.json: {e}")))?;

    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(RagwalkError::validation(format!(
            "unsupported schema_version: {} (expected {})",
            manifest.schema_version, MANIFEST_SCHEMA_VERSION
        )));
    }
    Ok(manifest)
}

/// Route table as written to `routes.json`.
pub fn routes_json(assembler: &PageAssembler) -> Result<String> {
    let routes: Vec<RouteParams> = enumerate_routes(assembler.catalog());
    serde_json::to_string_pretty(&routes)
        .map_err(|e| RagwalkError::validation(format!("JSON serialization failed: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Output path of a page payload relative to the output directory.
fn relative_page_path(locale: &Locale, step_id: StepId) -> String {
    format!("{locale}/steps/{step_id}.json")
}

/// Hidden sibling of `out_dir` unique to this build.
fn staging_dir(out_dir: &Path, build_id: Uuid) -> Result<PathBuf> {
    let name = out_dir
        .file_name()
        .ok_or_else(|| RagwalkError::build(format!("{} is not a usable output directory", out_dir.display())))?;
    Ok(out_dir.with_file_name(format!(".{}.tmp-{build_id}", name.to_string_lossy())))
}

/// An existing `out_dir` is replaced only when empty or holding an earlier build.
fn ensure_replaceable(out_dir: &Path) -> Result<()> {
    if !out_dir.exists() || out_dir.join("manifest.json").is_file() {
        return Ok(());
    }
    let mut entries = std::fs::read_dir(out_dir).map_err(|e| RagwalkError::io(out_dir, e))?;
    if entries.next().is_some() {
        return Err(RagwalkError::build(format!(
            "{} is not empty and holds no manifest.json; refusing to replace it",
            out_dir.display()
        )));
    }
    Ok(())
}

/// Replace `out_dir` with the finished staging tree.
fn publish(staging: &Path, out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        std::fs::remove_dir_all(out_dir).map_err(|e| RagwalkError::io(out_dir, e))?;
    }
    std::fs::rename(staging, out_dir).map_err(|e| RagwalkError::io(out_dir, e))?;
    debug!(out_dir = %out_dir.display(), "published build output");
    Ok(())
}

fn discard_staging(staging: &Path) {
    if let Err(e) = std::fs::remove_dir_all(staging) {
        warn!(path = %staging.display(), error = %e, "failed to remove staging directory");
    }
}

/// Assemble one page and write it. Runs on a blocking worker.
fn render_page(
    assembler: &PageAssembler,
    out_dir: &Path,
    locale: &Locale,
    step_id: StepId,
) -> Result<PageOutcome> {
    let Some(page) = assembler.assemble(&step_id.to_string(), locale) else {
        warn!(%locale, %step_id, "route resolved to not found, skipping page");
        return Ok(PageOutcome::Missing(MissingPage {
            locale: locale.clone(),
            step_id,
        }));
    };

    let relative = relative_page_path(locale, step_id);
    let json = serde_json::to_string_pretty(&page)
        .map_err(|e| RagwalkError::validation(format!("JSON serialization failed: {e}")))?;

    write_atomic(&out_dir.join(&relative), json.as_bytes())?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(path = %relative, size = json.len(), "wrote page");

    Ok(PageOutcome::Written(PageEntry {
        locale: locale.clone(),
        step_id,
        path: relative,
        sha256,
        size_bytes: json.len(),
    }))
}

/// Write a JSON file (pretty-printed), atomically.
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| RagwalkError::validation(format!("JSON serialization failed: {e}")))?;
    write_atomic(path, json.as_bytes())?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Write to a dot-prefixed temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| RagwalkError::build(format!("{} has no parent", path.display())))?;
    std::fs::create_dir_all(parent).map_err(|e| RagwalkError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| RagwalkError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| RagwalkError::io(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
