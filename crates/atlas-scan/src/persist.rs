//! Cache persistence (§6 "Cache persistence"): `serialize_cache` /
//! `deserialize_cache`. The on-disk format is opaque to the spec beyond
//! two requirements: every `ModuleInfo` field round-trips verbatim, and
//! entries are keyed by `(name, kind, contextHash)` so a scan under a
//! different configuration never sees a stale entry.
//!
//! This crate picks one JSON-lines file per cache, grounded in
//! `atlas_build::cache::mod::{BuildCache::save, BuildCache::load}`'s
//! `serde_json` file-I/O pattern (see DESIGN.md).

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::ModuleDependencyCache;
use crate::error::Result;
use crate::model::{ModuleId, ModuleInfo};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    context_hash: String,
    id: ModuleId,
    info: ModuleInfo,
}

/// Writes every entry of `cache` to `path` as one JSON object per line,
/// tagged with the cache's context hash.
pub fn serialize_cache(cache: &ModuleDependencyCache, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for (id, info) in cache.iter() {
        let entry = PersistedEntry {
            context_hash: cache.context_hash().to_string(),
            id: id.clone(),
            info: info.clone(),
        };
        serde_json::to_writer(&file, &entry)?;
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Reads `path` into `cache`, skipping any entry whose recorded context
/// hash doesn't match the cache's own — those entries belong to a prior
/// scan run under a different effective configuration and must stay
/// invisible to this one (§4.1).
pub fn deserialize_cache(cache: &mut ModuleDependencyCache, path: &Path) -> Result<usize> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut loaded = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: PersistedEntry = serde_json::from_str(&line)?;
        if entry.context_hash != cache.context_hash() {
            continue;
        }
        if !cache.contains(&entry.id) {
            cache.update(entry.id, entry.info);
            loaded += 1;
        }
    }

    Ok(loaded)
}

/// Convenience used by entries whose `ModuleId` isn't yet known to the
/// caller: looks up every persisted entry for one name, regardless of
/// kind, useful for cache-reuse diagnostics.
pub fn find_persisted_kinds(path: &Path, name: &str) -> Result<Vec<ModuleId>> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut ids = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: PersistedEntry = serde_json::from_str(&line)?;
        if entry.id.name == name {
            ids.push(entry.id);
        }
    }

    Ok(ids)
}
