use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::{PacketComponent, PacketCursor},
    enums::{DNSResourceClass, DNSResourceType},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSQuestion {
    pub labels: Vec<String>,
    pub qtype: DNSResourceType,
    pub qclass: DNSResourceClass,
}

impl DNSQuestion {
    pub fn new(name: &str, qtype: DNSResourceType) -> Self {
        Self {
            labels: name
                .trim_end_matches('.')
                .split('.')
                .filter(|l| !l.is_empty())
                .map(|l| l.to_string())
                .collect(),
            qtype,
            qclass: DNSResourceClass::IN,
        }
    }

    pub fn name(&self) -> String {
        self.labels.join(".")
    }

    pub fn read(cursor: &mut PacketCursor) -> Result<Self, ParseError> {
        let labels = cursor.read_name()?;
        let qtype = DNSResourceType::from_u16(cursor.read_u16()?);
        let qclass = DNSResourceClass::from(cursor.read_u16()?);
        Ok(Self {
            labels,
            qtype,
            qclass,
        })
    }
}

impl PacketComponent for DNSQuestion {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.qtype.to_u16())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }
}
