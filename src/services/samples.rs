//! Sample fixture cache
//!
//! Downloaded sample archives are unpacked once per problem into
//! `<tmp>/kattis_samples/<id>` and reused on later runs.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::{
    constants::kattis,
    error::AppResult,
    models::ProblemId,
    services::{CaseStore, JudgeClient},
};

/// Per-problem directories of unpacked sample fixtures
pub struct SampleCache {
    root: PathBuf,
}

impl Default for SampleCache {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join(kattis::SAMPLES_CACHE_DIR))
    }
}

impl SampleCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn dir_for(&self, problem: &ProblemId) -> PathBuf {
        self.root.join(problem.as_str())
    }

    /// Directory holding the problem's `*.in` fixtures, downloading them if
    /// the cache has none yet.
    ///
    /// Returns `None` when the judge offers no usable samples.
    pub async fn ensure(
        &self,
        client: &dyn JudgeClient,
        hostname: &str,
        problem: &ProblemId,
    ) -> AppResult<Option<PathBuf>> {
        let dir = self.dir_for(problem);
        if !CaseStore::sample_inputs(&dir).await?.is_empty() {
            tracing::debug!(dir = %dir.display(), "reusing cached samples");
            return Ok(Some(dir));
        }

        let archive = match client.fetch_samples(hostname, problem).await {
            Ok(archive) => archive,
            Err(e) => {
                tracing::warn!(problem = %problem, error = %e, "no samples downloaded");
                return Ok(None);
            }
        };

        tokio::fs::create_dir_all(&dir).await?;
        let extracted = {
            let dir = dir.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive, &dir))
                .await
                .map_err(|e| anyhow::anyhow!("sample extraction task failed: {}", e))??
        };

        let inputs = CaseStore::sample_inputs(&dir).await?.len();
        tracing::info!(problem = %problem, extracted, inputs, "samples unpacked");

        Ok((inputs > 0).then_some(dir))
    }
}

/// Unpack a zip archive into `dest`, returning the number of files written.
///
/// Entries whose path would escape `dest` are skipped.
pub fn extract_archive(archive: &[u8], dest: &Path) -> AppResult<usize> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut written = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "skipping unsafe archive entry");
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&target)?;
        std::io::copy(&mut entry, &mut file)?;
        written += 1;
    }

    Ok(written)
}
