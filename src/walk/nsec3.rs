use super::CancelToken;
use super::artifacts::{HashExport, MapArtifact};
use super::coverage::{CoverageStats, hash_covered, range_length};
use crate::client::QueryService;
use crate::config::Nsec3Config;
use crate::dns::enums::DNSResourceType;
use crate::dnssec::hash::nsec3_hash;
use crate::dnssec::records::{Nsec3Param, Nsec3Record};
use crate::error::{Result, WalkError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Only SHA-1 (algorithm 1) is defined for NSEC3
const NSEC3_SHA1: u8 = 1;

/// One enumerated interval of the hashed ordering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashRange {
    pub low: String,
    pub high: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeSummary {
    pub ranges: usize,
    pub coverage: f64,
    pub cancelled: bool,
}

/// Probabilistically enumerates an NSEC3 zone's hash ranges
///
/// NSEC3 cannot be walked like NSEC: the next owner arrives hashed. The
/// prober instead hashes random candidate names locally until one lands
/// in territory not yet covered, queries it, and collects the covering
/// range the server reveals. Repeating this converges on the full set of
/// ranges, whose left endpoints are the zone's hashed owner names.
pub struct RangeProber<'a, Q: QueryService + ?Sized> {
    client: &'a Q,
    config: Nsec3Config,
    cancel: CancelToken,
    zone: String,
    salt: String,
    iterations: u16,
    ranges: Vec<HashRange>,
    stats: CoverageStats,
    map: MapArtifact,
}

impl<'a, Q: QueryService + ?Sized> RangeProber<'a, Q> {
    /// Fetch the zone's hashing parameters; nothing works without them
    pub async fn fetch_params(client: &Q, zone: &str) -> Result<Nsec3Param> {
        let response = client.query(zone, DNSResourceType::NSEC3PARAM).await?;
        let rr = response
            .answers
            .iter()
            .find(|rr| rr.rtype == DNSResourceType::NSEC3PARAM)
            .ok_or(WalkError::MissingNsec3Params)?;
        Nsec3Param::from_resource(rr).ok_or_else(|| {
            WalkError::InvalidNsec3Params(rr.parsed_rdata.clone().unwrap_or_default())
        })
    }

    pub fn new(
        client: &'a Q,
        zone: &str,
        params: &Nsec3Param,
        config: Nsec3Config,
        cancel: CancelToken,
    ) -> Self {
        let zone = zone.trim_end_matches('.').to_lowercase();
        Self {
            client,
            config,
            cancel,
            map: MapArtifact::new(&zone),
            zone,
            salt: params.salt.clone(),
            iterations: params.iterations,
            ranges: Vec::new(),
            stats: CoverageStats::new(),
        }
    }

    /// Run the probe loop, then persist the hash-to-types map — also on
    /// error and on cancellation, so hours of probing survive a Ctrl-C
    pub async fn run(&mut self) -> Result<ProbeSummary> {
        let export = HashExport::create(&self.config.hashes_path, &self.zone)?;
        let result = self.probe_loop(&export).await;

        self.map.save(&self.config.map_path)?;
        info!(
            "Probe finished: {} ranges, {:.1}% of keyspace",
            self.stats.found(),
            self.stats.fraction() * 100.0
        );

        result
    }

    async fn probe_loop(&mut self, export: &HashExport) -> Result<ProbeSummary> {
        for attempt in 0..self.config.max_attempts {
            if self.cancel.is_cancelled() {
                info!("Probe cancelled; flushing {} ranges", self.stats.found());
                return Ok(self.summary(true));
            }

            let fraction = self.stats.fraction();
            if fraction >= self.config.stop_coverage
                || (attempt >= self.config.early_stop_attempts
                    && fraction >= self.config.early_stop_coverage)
            {
                debug!("Coverage target reached at attempt {}", attempt);
                break;
            }

            let candidate = self.generate_candidate()?;

            let response = match self.client.query(&candidate, DNSResourceType::A).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Probe query for {} failed: {}", candidate, e);
                    continue;
                }
            };

            let mut new_ranges = 0;
            for rr in response.denial_records(DNSResourceType::NSEC3) {
                let Some(record) = Nsec3Record::from_resource(rr) else {
                    continue;
                };
                if record.algorithm != NSEC3_SHA1 {
                    warn!("Skipping NSEC3 with unknown algorithm {}", record.algorithm);
                    continue;
                }
                if self.record_range(&record, export)? {
                    new_ranges += 1;
                }
            }

            if new_ranges > 0 {
                info!(
                    "FOUND {}; DONE {:.1}%; LEFT ~{}",
                    self.stats.found(),
                    self.stats.fraction() * 100.0,
                    self.stats.estimated_remaining()
                );
            }
        }

        Ok(self.summary(false))
    }

    /// Hash random labels under the zone until one lands outside every
    /// known range. Bounded: when nothing uncovered turns up the ranges
    /// already blanket the keyspace and there is nothing left to probe.
    fn generate_candidate(&self) -> Result<String> {
        for _ in 0..self.config.max_candidate_attempts {
            let name = format!("{}.{}", Uuid::new_v4(), self.zone);
            let hash = nsec3_hash(&name, &self.salt, self.iterations)?;
            if !self.covered(&hash) {
                return Ok(name);
            }
        }
        Err(WalkError::CandidatesExhausted(
            self.config.max_candidate_attempts,
        ))
    }

    fn covered(&self, hash: &str) -> bool {
        self.ranges
            .iter()
            .any(|r| hash_covered(hash, &r.low, &r.high))
    }

    /// Record a freshly revealed range; returns false for duplicates
    fn record_range(&mut self, record: &Nsec3Record, export: &HashExport) -> Result<bool> {
        let range = HashRange {
            low: record.owner_hash.clone(),
            high: record.next_hash.clone(),
        };
        if self.ranges.contains(&range) {
            return Ok(false);
        }

        let length = match range_length(&range.low, &range.high) {
            Ok(length) => length,
            Err(e) => {
                debug!("Discarding malformed range endpoints: {}", e);
                return Ok(false);
            }
        };

        debug!("Found: ({}, {})", range.low, range.high);
        self.stats.add_range(length);
        self.map.insert(&range.low, &record.types);
        export.append(record)?;
        self.ranges.push(range);

        Ok(true)
    }

    fn summary(&self, cancelled: bool) -> ProbeSummary {
        ProbeSummary {
            ranges: self.stats.found(),
            coverage: self.stats.fraction(),
            cancelled,
        }
    }

    pub fn map(&self) -> &MapArtifact {
        &self.map
    }
}
