pub mod align;
pub mod artifacts;
pub mod coverage;
pub mod nsec;
pub mod nsec3;
pub mod transform;

use crate::client::QueryService;
use crate::dns::enums::DNSResourceType;
use crate::error::WalkError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Cooperative cancellation handle shared with the Ctrl-C listener.
/// Long probes check it between queries; accumulated discoveries are
/// flushed on the way out.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One record fetched for a discovered owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub rtype: DNSResourceType,
    pub data: String,
}

/// A confirmed owner name and everything resolved for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredOwner {
    pub name: String,
    pub records: Vec<ResolvedRecord>,
}

impl fmt::Display for DiscoveredOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\x1b[1m{}\x1b[0m", self.name)?;
        for record in &self.records {
            write!(f, "\n\t{}\t{}", record.rtype.mnemonic(), record.data)?;
        }
        Ok(())
    }
}

/// Attested types worth fetching: everything except signatures and the
/// denial records themselves, in mnemonic order
pub(crate) fn resolvable_types(types: &[DNSResourceType]) -> Vec<DNSResourceType> {
    let mut kept: Vec<DNSResourceType> = types
        .iter()
        .copied()
        .filter(|t| {
            !matches!(
                t,
                DNSResourceType::RRSIG
                    | DNSResourceType::NSEC
                    | DNSResourceType::NSEC3
                    | DNSResourceType::NSEC3PARAM
            )
        })
        .collect();
    kept.sort_by_key(|t| t.mnemonic());
    kept.dedup();
    kept
}

/// Fetch every attested type for one owner. Absent types and timeouts are
/// expected here and downgraded to debug logs; partial results stand.
pub(crate) async fn resolve_owner<Q: QueryService + ?Sized>(
    client: &Q,
    name: &str,
    types: &[DNSResourceType],
) -> DiscoveredOwner {
    let mut records = Vec::new();

    for rtype in resolvable_types(types) {
        match client.resolve(name, rtype).await {
            Ok(answers) => {
                for rr in answers {
                    records.push(ResolvedRecord {
                        rtype: rr.rtype,
                        data: rr.display_data(),
                    });
                }
            }
            Err(WalkError::NoAnswer { .. }) | Err(WalkError::NxDomain(_)) => {
                debug!("{} has no {} records", name, rtype.mnemonic());
            }
            Err(e) => {
                debug!("Failed to resolve {} {}: {}", name, rtype.mnemonic(), e);
            }
        }
    }

    DiscoveredOwner {
        name: name.to_string(),
        records,
    }
}
