use crate::dns::enums::DNSResourceType;
use crate::dns::resource::DNSResource;

/// First label of the next-owner name in a black-lie response; such zones
/// synthesize a minimal NSEC for every query and cannot be walked.
/// https://blog.cloudflare.com/black-lies/
pub const BLACK_LIE_LABEL: &str = "\\000";

/// One edge of the zone's canonical-order linked list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NsecRecord {
    pub owner: String,
    pub next: String,
    pub types: Vec<DNSResourceType>,
}

impl NsecRecord {
    /// Extract from a parsed resource record; None when the resource is
    /// not an NSEC record or its rdata did not decode
    pub fn from_resource(rr: &DNSResource) -> Option<Self> {
        if rr.rtype != DNSResourceType::NSEC {
            return None;
        }
        let text = rr.parsed_rdata.as_ref()?;
        let mut parts = text.split_whitespace();
        let next = normalize_name(parts.next()?);
        let types = parts
            .filter_map(DNSResourceType::from_mnemonic)
            .collect();

        Some(Self {
            owner: rr.name().to_lowercase(),
            next,
            types,
        })
    }

    /// True when the next-owner points at the black-lie sentinel
    pub fn is_tarpit(&self) -> bool {
        self.next.split('.').next() == Some(BLACK_LIE_LABEL)
    }
}

/// One interval of the hashed name ordering, as revealed by a probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nsec3Record {
    /// Left endpoint: the record's owner hash (first label, lowercase)
    pub owner_hash: String,
    /// Right endpoint: the next-hashed-owner field
    pub next_hash: String,
    pub algorithm: u8,
    pub iterations: u16,
    /// Hex salt, or "-" when the zone hashes unsalted
    pub salt: String,
    pub types: Vec<DNSResourceType>,
}

impl Nsec3Record {
    pub fn from_resource(rr: &DNSResource) -> Option<Self> {
        if rr.rtype != DNSResourceType::NSEC3 {
            return None;
        }
        let owner_hash = rr.labels.first()?.to_lowercase();
        let text = rr.parsed_rdata.as_ref()?;
        let mut parts = text.split_whitespace();

        let algorithm = parts.next()?.parse().ok()?;
        let _flags: u8 = parts.next()?.parse().ok()?;
        let iterations = parts.next()?.parse().ok()?;
        let salt = parts.next()?.to_lowercase();
        let next_hash = parts.next()?.to_lowercase();
        let types = parts
            .filter_map(DNSResourceType::from_mnemonic)
            .collect();

        Some(Self {
            owner_hash,
            next_hash,
            algorithm,
            iterations,
            salt,
            types,
        })
    }
}

/// Zone-wide hashing parameters, published once at the apex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nsec3Param {
    pub algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: String,
}

impl Nsec3Param {
    pub fn from_resource(rr: &DNSResource) -> Option<Self> {
        if rr.rtype != DNSResourceType::NSEC3PARAM {
            return None;
        }
        let text = rr.parsed_rdata.as_ref()?;
        let mut parts = text.split_whitespace();

        Some(Self {
            algorithm: parts.next()?.parse().ok()?,
            flags: parts.next()?.parse().ok()?,
            iterations: parts.next()?.parse().ok()?,
            salt: parts.next()?.to_lowercase(),
        })
    }
}

/// Strip the trailing dot and fold case for set-membership comparisons
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_lowercase()
}
