use super::{CancelToken, DiscoveredOwner, resolve_owner};
use crate::client::QueryService;
use crate::dns::enums::DNSResourceType;
use crate::dnssec::records::{NsecRecord, normalize_name};
use crate::error::{Result, WalkError};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Bound on loop-break rewrites for a single colliding next-owner
const MAX_ALIAS_REWRITES: usize = 16;

/// A hostname awaiting its turn in the walk
///
/// Synthetic targets are loop-breaking aliases, not zone content: they
/// skip the ownership-match heuristic (their query name is fabricated, so
/// no NSEC owner will contain it), carry no records, and are never
/// reported through the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkTarget {
    pub name: String,
    pub synthetic: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Real owner names confirmed (synthetic aliases excluded)
    pub visited: usize,
    pub cancelled: bool,
}

/// Walks a zone's NSEC linked list owner by owner
///
/// Each pending hostname is coaxed into revealing its successor by
/// querying transformed variants of it; the successor joins the pending
/// set until the chain closes back on the starting name.
pub struct ChainWalker<'a, Q: QueryService + ?Sized> {
    client: &'a Q,
    cancel: CancelToken,
    origin: String,
    pending: VecDeque<WalkTarget>,
    queued: HashSet<String>,
    finished: HashSet<String>,
}

impl<'a, Q: QueryService + ?Sized> ChainWalker<'a, Q> {
    pub fn new(client: &'a Q, zone: &str, cancel: CancelToken) -> Self {
        let origin = normalize_name(zone);
        let mut pending = VecDeque::new();
        let mut queued = HashSet::new();
        pending.push_back(WalkTarget {
            name: origin.clone(),
            synthetic: false,
        });
        queued.insert(origin.clone());

        Self {
            client,
            cancel,
            origin,
            pending,
            queued,
            finished: HashSet::new(),
        }
    }

    /// Run the walk to completion, feeding each confirmed owner (with its
    /// resolved records) through `sink` as it is discovered
    pub async fn run(&mut self, sink: &mut dyn FnMut(DiscoveredOwner)) -> Result<WalkSummary> {
        let mut visited = 0;

        while let Some(target) = self.pending.pop_front() {
            if self.cancel.is_cancelled() {
                info!("Walk cancelled; {} owners already confirmed", visited);
                return Ok(WalkSummary {
                    visited,
                    cancelled: true,
                });
            }

            debug!("Walking {}", target.name);
            let link = self.find_link(&target).await?;
            self.finished.insert(target.name.clone());

            let Some(link) = link else {
                warn!("No pertinent NSEC for {}; dropping it", target.name);
                continue;
            };

            self.enqueue_next(&link.next);

            if !target.synthetic {
                let owner = resolve_owner(self.client, &target.name, &link.types).await;
                visited += 1;
                sink(owner);
            }
        }

        info!("Walk complete: {} owners", visited);
        Ok(WalkSummary {
            visited,
            cancelled: false,
        })
    }

    /// Try each name transformation until one yields an NSEC record that
    /// speaks for the target
    async fn find_link(&self, target: &WalkTarget) -> Result<Option<NsecRecord>> {
        for candidate in super::transform::transformations(&target.name) {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }

            let response = match self.client.query(&candidate, DNSResourceType::NSEC).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Query for {} failed: {}", candidate, e);
                    continue;
                }
            };

            for rr in response.denial_records(DNSResourceType::NSEC) {
                let Some(record) = NsecRecord::from_resource(rr) else {
                    continue;
                };

                // A black-lie zone answers every query this way; the walk
                // cannot make progress and must stop before wasting more
                // queries
                if record.is_tarpit() {
                    return Err(WalkError::Tarpit);
                }

                // Sections come back in arbitrary order; without this
                // check a wildcard-covering NSEC for some other name
                // would send the walk off course. Synthetic aliases have
                // no real owner to match against.
                if !target.synthetic && !record.owner.contains(&target.name) {
                    continue;
                }

                return Ok(Some(record));
            }
        }

        Ok(None)
    }

    /// Queue the discovered next-owner, closing the chain or rewriting
    /// loops as needed
    fn enqueue_next(&mut self, next: &str) {
        if next == self.origin {
            debug!("Chain closed back to {}", self.origin);
            return;
        }

        if !self.finished.contains(next) {
            self.push_target(next.to_string(), false);
            return;
        }

        // Misconfigured zones can point back into already-walked territory.
        // Insert a disambiguating character into the leftmost label so the
        // next query lands just past the collision point and the walk keeps
        // moving.
        warn!("Loop detected at {}; rewriting to break out", next);
        let mut alias = disambiguate(next);
        for _ in 0..MAX_ALIAS_REWRITES {
            if !self.finished.contains(&alias) && !self.queued.contains(&alias) {
                self.push_target(alias, true);
                return;
            }
            alias = disambiguate(&alias);
        }
        warn!("Could not rewrite {} past the loop; dropping it", next);
    }

    fn push_target(&mut self, name: String, synthetic: bool) {
        if self.queued.insert(name.clone()) {
            self.pending.push_back(WalkTarget { name, synthetic });
        }
    }
}

/// Append a character to the leftmost label: "b.example.com" becomes
/// "ba.example.com", which sorts after the original but before its
/// successor in canonical order
fn disambiguate(name: &str) -> String {
    match name.split_once('.') {
        Some((first, rest)) => format!("{}a.{}", first, rest),
        None => format!("{}a", name),
    }
}
