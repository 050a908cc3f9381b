use bitstream_io::{BitWrite, BitWriter, Endianness};
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{
    ParseError,
    common::{PacketComponent, PacketCursor},
    enums::{DNSResourceClass, DNSResourceType},
};

#[derive(Clone, Debug, Default)]
pub struct DNSResource {
    pub labels: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    /// Wire value of the class field; OPT pseudo-records reuse it for the
    /// UDP payload size
    pub raw_class: u16,
    pub ttl: u32,
    pub rdlength: u16,
    pub rdata: Vec<u8>,
    /// Presentation form of the rdata for the types we understand
    pub parsed_rdata: Option<String>,
}

impl DNSResource {
    /// Owner name in presentation form, no trailing dot
    pub fn name(&self) -> String {
        self.labels.join(".")
    }

    /// Rdata for display; falls back to a hex dump for opaque types
    pub fn display_data(&self) -> String {
        match &self.parsed_rdata {
            Some(parsed) => parsed.clone(),
            None => hex::encode(&self.rdata),
        }
    }

    pub fn read(cursor: &mut PacketCursor) -> Result<Self, ParseError> {
        let labels = cursor.read_name()?;
        let rtype = DNSResourceType::from_u16(cursor.read_u16()?);
        let raw_class = cursor.read_u16()?;
        let ttl = cursor.read_u32()?;
        let rdlength = cursor.read_u16()?;
        let rdata_start = cursor.pos();
        let rdata = cursor.read_bytes(rdlength as usize)?.to_vec();
        let parsed_rdata = parse_rdata(rtype, cursor.buffer(), rdata_start, rdlength as usize);

        Ok(Self {
            labels,
            rtype,
            rclass: DNSResourceClass::from(raw_class),
            raw_class,
            ttl,
            rdlength,
            rdata,
            parsed_rdata,
        })
    }
}

impl PacketComponent for DNSResource {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.to_u16())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, self.rdata.len() as u16)?;
        writer.write_bytes(&self.rdata)?;
        Ok(())
    }
}

/// Decode rdata into presentation text for the record types the walker
/// consumes or prints. `start` is the rdata offset within the full packet
/// so compressed names inside rdata resolve correctly.
fn parse_rdata(rtype: DNSResourceType, buf: &[u8], start: usize, len: usize) -> Option<String> {
    let end = start.checked_add(len)?;
    if end > buf.len() {
        return None;
    }
    let rdata = &buf[start..end];

    match rtype {
        DNSResourceType::A => {
            let octets: [u8; 4] = rdata.try_into().ok()?;
            Some(Ipv4Addr::from(octets).to_string())
        }
        DNSResourceType::AAAA => {
            let octets: [u8; 16] = rdata.try_into().ok()?;
            Some(Ipv6Addr::from(octets).to_string())
        }
        DNSResourceType::NS | DNSResourceType::CNAME | DNSResourceType::PTR => {
            let mut cursor = PacketCursor::at(buf, start);
            Some(format!("{}.", cursor.read_name().ok()?.join(".")))
        }
        DNSResourceType::MX => {
            let mut cursor = PacketCursor::at(buf, start);
            let preference = cursor.read_u16().ok()?;
            let exchange = cursor.read_name().ok()?.join(".");
            Some(format!("{} {}.", preference, exchange))
        }
        DNSResourceType::TXT => {
            let mut cursor = PacketCursor::at(buf, start);
            let mut strings = Vec::new();
            while cursor.pos() < end {
                let slen = cursor.read_u8().ok()? as usize;
                let bytes = cursor.read_bytes(slen).ok()?;
                strings.push(format!("\"{}\"", String::from_utf8_lossy(bytes)));
            }
            Some(strings.join(" "))
        }
        DNSResourceType::SOA => {
            let mut cursor = PacketCursor::at(buf, start);
            let mname = cursor.read_name().ok()?.join(".");
            let rname = cursor.read_name().ok()?.join(".");
            let serial = cursor.read_u32().ok()?;
            let refresh = cursor.read_u32().ok()?;
            let retry = cursor.read_u32().ok()?;
            let expire = cursor.read_u32().ok()?;
            let minimum = cursor.read_u32().ok()?;
            Some(format!(
                "{}. {}. {} {} {} {} {}",
                mname, rname, serial, refresh, retry, expire, minimum
            ))
        }
        DNSResourceType::NSEC => {
            let mut cursor = PacketCursor::at(buf, start);
            let next = cursor.read_name().ok()?.join(".");
            let types = decode_type_bitmap(buf.get(cursor.pos()..end)?);
            let mut text = format!("{}.", next);
            for rtype in types {
                text.push(' ');
                text.push_str(&rtype.mnemonic());
            }
            Some(text)
        }
        DNSResourceType::NSEC3 => {
            let mut cursor = PacketCursor::at(buf, start);
            let algorithm = cursor.read_u8().ok()?;
            let flags = cursor.read_u8().ok()?;
            let iterations = cursor.read_u16().ok()?;
            let salt_len = cursor.read_u8().ok()? as usize;
            let salt = present_salt(cursor.read_bytes(salt_len).ok()?);
            let hash_len = cursor.read_u8().ok()? as usize;
            let next_hash = base32::encode(
                base32::Alphabet::Rfc4648HexLower { padding: false },
                cursor.read_bytes(hash_len).ok()?,
            );
            let types = decode_type_bitmap(buf.get(cursor.pos()..end)?);
            let mut text = format!(
                "{} {} {} {} {}",
                algorithm, flags, iterations, salt, next_hash
            );
            for rtype in types {
                text.push(' ');
                text.push_str(&rtype.mnemonic());
            }
            Some(text)
        }
        DNSResourceType::NSEC3PARAM => {
            let mut cursor = PacketCursor::at(buf, start);
            let algorithm = cursor.read_u8().ok()?;
            let flags = cursor.read_u8().ok()?;
            let iterations = cursor.read_u16().ok()?;
            let salt_len = cursor.read_u8().ok()? as usize;
            let salt = present_salt(cursor.read_bytes(salt_len).ok()?);
            Some(format!("{} {} {} {}", algorithm, flags, iterations, salt))
        }
        _ => None,
    }
}

fn present_salt(salt: &[u8]) -> String {
    if salt.is_empty() {
        "-".to_string()
    } else {
        hex::encode(salt)
    }
}

/// Walk the NSEC/NSEC3 type bitmap (RFC 4034 §4.1.2)
fn decode_type_bitmap(bitmap: &[u8]) -> Vec<DNSResourceType> {
    let mut types = Vec::new();
    let mut pos = 0;
    while pos + 2 <= bitmap.len() {
        let window = bitmap[pos] as u16;
        let len = bitmap[pos + 1] as usize;
        pos += 2;
        if len == 0 || len > 32 || pos + len > bitmap.len() {
            break;
        }
        for (octet, &byte) in bitmap[pos..pos + len].iter().enumerate() {
            for bit in 0..8 {
                if byte >> (7 - bit) & 1 == 1 {
                    let value = window * 256 + (octet as u16) * 8 + bit as u16;
                    types.push(DNSResourceType::from_u16(value));
                }
            }
        }
        pos += len;
    }
    types
}
