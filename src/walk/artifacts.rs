use crate::dns::enums::DNSResourceType;
use crate::dnssec::records::Nsec3Record;
use crate::error::{Result, WalkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Append-only file of crackable hash lines, one per discovered range:
/// `<hash>:.<zone>:<SALT>:<iterations>` — hashcat mode 8300 input.
/// Created empty up front so a fresh run never mixes with stale data,
/// and appended per discovery so cancellation loses nothing.
#[derive(Debug)]
pub struct HashExport {
    path: PathBuf,
    zone: String,
}

impl HashExport {
    pub fn create(path: impl AsRef<Path>, zone: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::create(&path).map_err(|e| WalkError::Artifact(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            path,
            zone: zone.trim_end_matches('.').to_string(),
        })
    }

    pub fn append(&self, record: &Nsec3Record) -> Result<()> {
        let line = export_line(&record.owner_hash, &self.zone, &record.salt, record.iterations);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| WalkError::Artifact(format!("{}: {}", self.path.display(), e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| WalkError::Artifact(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

pub fn export_line(hash: &str, zone: &str, salt: &str, iterations: u16) -> String {
    format!("{}:.{}:{}:{}", hash, zone, salt.to_uppercase(), iterations)
}

/// One parsed export line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportLine {
    pub hash: String,
    pub zone: String,
    pub salt: String,
    pub iterations: u16,
}

impl ExportLine {
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim().split(':');
        let hash = fields.next()?.to_string();
        let zone = fields.next()?.trim_start_matches('.').to_string();
        let salt = fields.next()?.to_string();
        let iterations = fields.next()?.parse().ok()?;
        Some(Self {
            hash,
            zone,
            salt,
            iterations,
        })
    }
}

/// Versioned map from left-endpoint hash to the record types attested
/// there. The post-crack resolver reads this to know what to query once
/// a hash has been reversed to a plaintext label.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapArtifact {
    pub version: u32,
    pub zone: String,
    pub records: BTreeMap<String, Vec<String>>,
}

impl MapArtifact {
    pub const VERSION: u32 = 1;

    pub fn new(zone: &str) -> Self {
        Self {
            version: Self::VERSION,
            zone: zone.trim_end_matches('.').to_string(),
            records: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, hash: &str, types: &[DNSResourceType]) {
        self.records.insert(
            hash.to_lowercase(),
            types.iter().map(|t| t.mnemonic()).collect(),
        );
    }

    pub fn types_for(&self, hash: &str) -> Option<Vec<DNSResourceType>> {
        self.records.get(&hash.to_lowercase()).map(|names| {
            names
                .iter()
                .filter_map(|n| DNSResourceType::from_mnemonic(n))
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| WalkError::Artifact(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| WalkError::Artifact(format!("{}: {}", path.display(), e)))?;
        info!("Wrote {} hash mappings to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WalkError::Artifact(format!("{}: {}", path.display(), e)))?;
        let artifact: Self =
            serde_json::from_str(&json).map_err(|e| WalkError::Artifact(e.to_string()))?;
        if artifact.version != Self::VERSION {
            return Err(WalkError::Artifact(format!(
                "Unsupported map version {} (expected {})",
                artifact.version,
                Self::VERSION
            )));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_line_round_trip() {
        let line = export_line("0p9mhaveqvm6t7vbl5lop2u3t2rp3tom", "example.com", "aabbccdd", 12);
        assert_eq!(
            line,
            "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom:.example.com:AABBCCDD:12"
        );

        let parsed = ExportLine::parse(&line).unwrap();
        assert_eq!(parsed.hash, "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom");
        assert_eq!(parsed.zone, "example.com");
        assert_eq!(parsed.salt, "AABBCCDD");
        assert_eq!(parsed.iterations, 12);
    }

    #[test]
    fn test_map_artifact_types() {
        let mut map = MapArtifact::new("example.com.");
        assert_eq!(map.zone, "example.com");
        map.insert("ABCD", &[DNSResourceType::A, DNSResourceType::TXT]);

        assert_eq!(
            map.types_for("abcd"),
            Some(vec![DNSResourceType::A, DNSResourceType::TXT])
        );
        assert_eq!(map.types_for("ffff"), None);
    }
}
