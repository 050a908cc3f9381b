use super::artifacts::MapArtifact;
use super::{DiscoveredOwner, resolve_owner, resolvable_types};
use crate::client::QueryService;
use crate::dns::enums::DNSResourceType;
use crate::error::{Result, WalkError};
use std::path::Path;
use tracing::{debug, warn};

/// Position of the recovered plaintext within a cracked line; the hash
/// itself is field 0. Matches hashcat's `--outfile` layout for mode 8300
/// (`hash:.zone:salt:iterations:plaintext`).
const PLAINTEXT_FIELD: usize = 4;

/// One hash the external cracker managed to reverse
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrackedEntry {
    pub hash: String,
    pub label: String,
}

pub fn parse_cracked_line(line: &str) -> Option<CrackedEntry> {
    let fields: Vec<&str> = line.trim().split(':').collect();
    if fields.len() <= PLAINTEXT_FIELD {
        return None;
    }
    let hash = fields[0].trim().to_lowercase();
    let label = fields[PLAINTEXT_FIELD].trim().to_string();
    if hash.is_empty() || label.is_empty() {
        return None;
    }
    Some(CrackedEntry { hash, label })
}

pub fn load_cracked(path: impl AsRef<Path>) -> Result<Vec<CrackedEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| WalkError::Artifact(format!("{}: {}", path.display(), e)))?;
    Ok(content.lines().filter_map(parse_cracked_line).collect())
}

/// Re-associate cracked hashes with owner names and the types attested
/// for them. Hashes the map has never seen are skipped with a warning;
/// they belong to a different run.
pub fn build_targets(
    map: &MapArtifact,
    cracked: &[CrackedEntry],
    zone: &str,
) -> Vec<(String, Vec<DNSResourceType>)> {
    let zone = zone.trim_end_matches('.');
    let mut targets = Vec::new();

    for entry in cracked {
        let Some(types) = map.types_for(&entry.hash) else {
            warn!("Cracked hash {} not present in the map artifact", entry.hash);
            continue;
        };
        let name = format!("{}.{}", entry.label, zone);
        targets.push((name, resolvable_types(&types)));
    }

    targets
}

/// Resolve every cracked owner's records, feeding each through `sink`
pub async fn run<Q: QueryService + ?Sized>(
    client: &Q,
    map: &MapArtifact,
    cracked: &[CrackedEntry],
    zone: &str,
    sink: &mut dyn FnMut(DiscoveredOwner),
) -> Result<usize> {
    let targets = build_targets(map, cracked, zone);
    debug!("Aligning {} cracked owners", targets.len());

    for (name, types) in &targets {
        let owner = resolve_owner(client, name, types).await;
        sink(owner);
    }

    Ok(targets.len())
}
