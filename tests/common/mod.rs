//! Shared test doubles for the walk and alignment tests
//!
//! The engines talk to the network only through `QueryService`, so a
//! scripted in-memory implementation is enough to exercise them offline.

#![allow(dead_code)] // Each test binary uses a different subset

use async_trait::async_trait;
use ratatoskr::client::QueryService;
use ratatoskr::dns::DNSPacket;
use ratatoskr::dns::enums::DNSResourceType;
use ratatoskr::dns::resource::DNSResource;
use ratatoskr::error::{Result, WalkError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Scripted resolver: responds from a fixed (name, type) table and logs
/// every query it receives. Unscripted queries time out, which is what the
/// engines are built to shrug off.
pub struct MockDns {
    responses: HashMap<(String, String), DNSPacket>,
    queries: Mutex<Vec<(String, String)>>,
}

impl MockDns {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&mut self, name: &str, rtype: DNSResourceType, packet: DNSPacket) {
        self.responses
            .insert((name.to_string(), rtype.mnemonic()), packet);
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl QueryService for MockDns {
    async fn query(&self, name: &str, rtype: DNSResourceType) -> Result<DNSPacket> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), rtype.mnemonic()));
        self.responses
            .get(&(name.to_string(), rtype.mnemonic()))
            .cloned()
            .ok_or(WalkError::Timeout)
    }

    async fn resolve(&self, name: &str, rtype: DNSResourceType) -> Result<Vec<DNSResource>> {
        let packet = self.query(name, rtype).await?;
        let answers: Vec<DNSResource> = packet
            .answers
            .into_iter()
            .filter(|rr| rr.rtype == rtype)
            .collect();
        if answers.is_empty() {
            return Err(WalkError::NoAnswer {
                name: name.to_string(),
                rtype: rtype.mnemonic(),
            });
        }
        Ok(answers)
    }
}

fn labels(name: &str) -> Vec<String> {
    name.split('.').map(|l| l.to_string()).collect()
}

/// Denial response: one NSEC record in the authority section
pub fn nsec_denial(owner: &str, rdata: &str) -> DNSPacket {
    DNSPacket {
        authorities: vec![DNSResource {
            labels: labels(owner),
            rtype: DNSResourceType::NSEC,
            parsed_rdata: Some(rdata.to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Denial response: NSEC3 records in the authority section, one per
/// (owner hash, rdata) pair
pub fn nsec3_denial(zone: &str, records: &[(&str, &str)]) -> DNSPacket {
    let authorities = records
        .iter()
        .map(|(owner_hash, rdata)| {
            let mut owner_labels = vec![owner_hash.to_string()];
            owner_labels.extend(labels(zone));
            DNSResource {
                labels: owner_labels,
                rtype: DNSResourceType::NSEC3,
                parsed_rdata: Some(rdata.to_string()),
                ..Default::default()
            }
        })
        .collect();
    DNSPacket {
        authorities,
        ..Default::default()
    }
}

/// Positive response: one answer record with presentation-format rdata
pub fn answer(name: &str, rtype: DNSResourceType, data: &str) -> DNSPacket {
    DNSPacket {
        answers: vec![DNSResource {
            labels: labels(name),
            rtype,
            parsed_rdata: Some(data.to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}
