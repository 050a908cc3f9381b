pub mod common;
pub mod edns;
pub mod enums;
pub mod header;
pub mod question;
pub mod resource;

use bitstream_io::{BigEndian, BitWrite, BitWriter};
use common::{PacketComponent, PacketCursor};
use edns::EdnsOpt;
use enums::DNSResourceType;
use header::DNSHeader;
use question::DNSQuestion;
use resource::DNSResource;
use tracing::{debug, trace};

/// Payload size advertised on DNSSEC queries (RFC 4035)
pub const DNSSEC_UDP_SIZE: u16 = 4096;

#[derive(Clone, Debug, Default)]
pub struct DNSPacket {
    pub header: DNSHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
    pub resources: Vec<DNSResource>,
    /// EDNS0 OPT record if present (extracted from additional records)
    pub edns: Option<EdnsOpt>,
}

#[derive(Debug)]
pub enum ParseError {
    InvalidLabel,
    UnexpectedEnd,
    InvalidBitStream(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::InvalidBitStream(e.to_string())
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidLabel => write!(f, "Invalid DNS label"),
            ParseError::UnexpectedEnd => write!(f, "Packet truncated"),
            ParseError::InvalidBitStream(e) => write!(f, "Invalid bit stream: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl DNSPacket {
    /// Build a DNSSEC-aware query for one name and type
    pub fn query(id: u16, name: &str, qtype: DNSResourceType) -> Self {
        let mut edns = EdnsOpt::with_payload_size(DNSSEC_UDP_SIZE);
        edns.set_do_flag(true);

        let mut packet = DNSPacket {
            edns: Some(edns),
            ..Default::default()
        };
        packet.header.id = id;
        packet.header.rd = true;
        packet.header.qdcount = 1;
        packet.questions.push(DNSQuestion::new(name, qtype));
        packet
    }

    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        trace!("Parsing DNS packet, size: {} bytes", buf.len());
        let mut cursor = PacketCursor::new(buf);
        let mut packet = DNSPacket::default();
        packet.header = DNSHeader::read(&mut cursor)?;
        debug!(
            "Parsed DNS header: id={}, qr={}, rcode={}, an={}, ns={}",
            packet.header.id,
            packet.header.qr,
            packet.header.rcode,
            packet.header.ancount,
            packet.header.nscount
        );

        for _ in 0..packet.header.qdcount {
            packet.questions.push(DNSQuestion::read(&mut cursor)?);
        }

        for _ in 0..packet.header.ancount {
            packet.answers.push(DNSResource::read(&mut cursor)?);
        }

        for _ in 0..packet.header.nscount {
            packet.authorities.push(DNSResource::read(&mut cursor)?);
        }

        for _ in 0..packet.header.arcount {
            let resource = DNSResource::read(&mut cursor)?;

            // OPT pseudo-records (owned by the root name) carry EDNS state
            // in their class and TTL fields
            if resource.rtype == DNSResourceType::OPT && resource.labels.is_empty() {
                packet.edns = Some(EdnsOpt::parse_from_resource(
                    resource.raw_class,
                    resource.ttl,
                ));
                continue;
            }

            packet.resources.push(resource);
        }

        Ok(packet)
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);

        let mut header = self.header.clone();
        if self.edns.is_some() {
            header.arcount = self.resources.len() as u16 + 1;
        }

        header.write(&mut writer)?;

        for question in self.questions.iter() {
            question.write(&mut writer)?;
        }

        for answer in self.answers.iter() {
            answer.write(&mut writer)?;
        }

        for authority in self.authorities.iter() {
            authority.write(&mut writer)?;
        }

        for resource in self.resources.iter() {
            resource.write(&mut writer)?;
        }

        if let Some(edns) = &self.edns {
            let (udp_payload_size, ttl) = edns.to_resource_format();

            // OPT record with the overloaded class field, written directly:
            // root name, TYPE 41, class = payload size, no rdata
            writer.write_var::<u8>(8, 0)?;
            writer.write_var::<u16>(16, DNSResourceType::OPT.to_u16())?;
            writer.write_var::<u16>(16, udp_payload_size)?;
            writer.write_var::<u32>(32, ttl)?;
            writer.write_var::<u16>(16, 0)?;
        }

        Ok(buf)
    }

    /// All records of one type across the authority and answer sections,
    /// in that order — servers shuffle denial records between the two
    pub fn denial_records(&self, rtype: DNSResourceType) -> impl Iterator<Item = &DNSResource> {
        self.authorities
            .iter()
            .chain(self.answers.iter())
            .filter(move |rr| rr.rtype == rtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_round_trip() {
        let query = DNSPacket::query(0x1234, "example.com", DNSResourceType::NSEC);
        let bytes = query.serialize().unwrap();

        let parsed = DNSPacket::parse(&bytes).unwrap();
        assert_eq!(parsed.header.id, 0x1234);
        assert!(parsed.header.rd);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].name(), "example.com");
        assert_eq!(parsed.questions[0].qtype, DNSResourceType::NSEC);

        let edns = parsed.edns.expect("query carries EDNS");
        assert!(edns.do_flag());
        assert_eq!(edns.payload_size(), DNSSEC_UDP_SIZE);
    }

    #[test]
    fn test_denial_records_order() {
        let mut packet = DNSPacket::default();
        let mut authority = DNSResource::default();
        authority.rtype = DNSResourceType::NSEC;
        authority.labels = vec!["auth".to_string()];
        packet.authorities.push(authority);

        let mut answer = DNSResource::default();
        answer.rtype = DNSResourceType::NSEC;
        answer.labels = vec!["ans".to_string()];
        packet.answers.push(answer);

        let mut other = DNSResource::default();
        other.rtype = DNSResourceType::RRSIG;
        packet.answers.push(other);

        let names: Vec<String> = packet
            .denial_records(DNSResourceType::NSEC)
            .map(|rr| rr.name())
            .collect();
        assert_eq!(names, vec!["auth".to_string(), "ans".to_string()]);
    }
}
