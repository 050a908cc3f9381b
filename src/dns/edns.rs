/// EDNS0 OPT pseudo-record (RFC 6891), pared down to what DNSSEC queries
/// need: payload-size advertisement and the DO flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdnsOpt {
    /// UDP payload size that can be handled by the requestor
    pub udp_payload_size: u16,
    /// Extended RCODE (high 8 bits)
    pub extended_rcode: u8,
    /// EDNS version (currently 0)
    pub version: u8,
    /// EDNS flags (16 bits)
    pub flags: u16,
}

/// DNSSEC OK flag bit within the EDNS flags word
pub const DO_FLAG: u16 = 0x8000;

impl EdnsOpt {
    /// Create an EDNS OPT record with specified UDP payload size
    pub fn with_payload_size(payload_size: u16) -> Self {
        Self {
            udp_payload_size: payload_size,
            ..Self::default()
        }
    }

    /// Check if DNSSEC OK (DO) flag is set
    pub fn do_flag(&self) -> bool {
        (self.flags & DO_FLAG) != 0
    }

    /// Set the DNSSEC OK (DO) flag
    pub fn set_do_flag(&mut self, value: bool) {
        if value {
            self.flags |= DO_FLAG;
        } else {
            self.flags &= !DO_FLAG;
        }
    }

    pub fn payload_size(&self) -> u16 {
        self.udp_payload_size
    }

    /// Build from the OPT record's overloaded class and TTL fields
    pub fn parse_from_resource(udp_payload_size: u16, ttl: u32) -> Self {
        Self {
            udp_payload_size,
            extended_rcode: (ttl >> 24) as u8,
            version: (ttl >> 16) as u8,
            flags: (ttl & 0xFFFF) as u16,
        }
    }

    /// Pack back into (class, ttl) wire fields
    pub fn to_resource_format(&self) -> (u16, u32) {
        let ttl = ((self.extended_rcode as u32) << 24)
            | ((self.version as u32) << 16)
            | self.flags as u32;
        (self.udp_payload_size, ttl)
    }
}
