use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{ParseError, common::PacketCursor};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSHeader {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: u8,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl DNSHeader {
    pub fn read(cursor: &mut PacketCursor) -> Result<Self, ParseError> {
        let id = cursor.read_u16()?;
        let flags = cursor.read_u16()?;
        Ok(Self {
            id,
            qr: flags >> 15 & 1 == 1,
            opcode: (flags >> 11 & 0xF) as u8,
            aa: flags >> 10 & 1 == 1,
            tc: flags >> 9 & 1 == 1,
            rd: flags >> 8 & 1 == 1,
            ra: flags >> 7 & 1 == 1,
            z: (flags >> 4 & 0x7) as u8,
            rcode: (flags & 0xF) as u8,
            qdcount: cursor.read_u16()?,
            ancount: cursor.read_u16()?,
            nscount: cursor.read_u16()?,
            arcount: cursor.read_u16()?,
        })
    }

    pub fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        writer.write_var::<u16>(16, self.id)?;
        writer.write_var::<u8>(1, self.qr as u8)?;
        writer.write_var::<u8>(4, self.opcode)?;
        writer.write_var::<u8>(1, self.aa as u8)?;
        writer.write_var::<u8>(1, self.tc as u8)?;
        writer.write_var::<u8>(1, self.rd as u8)?;
        writer.write_var::<u8>(1, self.ra as u8)?;
        writer.write_var::<u8>(3, self.z)?;
        writer.write_var::<u8>(4, self.rcode)?;
        writer.write_var::<u16>(16, self.qdcount)?;
        writer.write_var::<u16>(16, self.ancount)?;
        writer.write_var::<u16>(16, self.nscount)?;
        writer.write_var::<u16>(16, self.arcount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::BigEndian;

    #[test]
    fn test_header_round_trip() {
        let header = DNSHeader {
            id: 0xBEEF,
            qr: true,
            opcode: 0,
            aa: false,
            tc: true,
            rd: true,
            ra: true,
            z: 0,
            rcode: 3,
            qdcount: 1,
            ancount: 0,
            nscount: 4,
            arcount: 1,
        };

        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);
        header.write(&mut writer).unwrap();
        assert_eq!(buf.len(), 12);

        let mut cursor = PacketCursor::new(&buf);
        let parsed = DNSHeader::read(&mut cursor).unwrap();
        assert_eq!(parsed, header);
    }
}
