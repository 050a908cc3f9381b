#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DNSResourceType {
    #[default]
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    HINFO,
    MX,
    TXT,
    AAAA,
    SRV,
    NAPTR,
    OPT,
    DS,
    SSHFP,
    RRSIG,
    NSEC,
    DNSKEY,
    NSEC3,
    NSEC3PARAM,
    TLSA,
    HTTPS,
    SVCB,
    CAA,
    Unknown(u16),
}

impl DNSResourceType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => DNSResourceType::A,
            2 => DNSResourceType::NS,
            5 => DNSResourceType::CNAME,
            6 => DNSResourceType::SOA,
            12 => DNSResourceType::PTR,
            13 => DNSResourceType::HINFO,
            15 => DNSResourceType::MX,
            16 => DNSResourceType::TXT,
            28 => DNSResourceType::AAAA,
            33 => DNSResourceType::SRV,
            35 => DNSResourceType::NAPTR,
            41 => DNSResourceType::OPT,
            43 => DNSResourceType::DS,
            44 => DNSResourceType::SSHFP,
            46 => DNSResourceType::RRSIG,
            47 => DNSResourceType::NSEC,
            48 => DNSResourceType::DNSKEY,
            50 => DNSResourceType::NSEC3,
            51 => DNSResourceType::NSEC3PARAM,
            52 => DNSResourceType::TLSA,
            64 => DNSResourceType::SVCB,
            65 => DNSResourceType::HTTPS,
            257 => DNSResourceType::CAA,
            x => DNSResourceType::Unknown(x),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            DNSResourceType::A => 1,
            DNSResourceType::NS => 2,
            DNSResourceType::CNAME => 5,
            DNSResourceType::SOA => 6,
            DNSResourceType::PTR => 12,
            DNSResourceType::HINFO => 13,
            DNSResourceType::MX => 15,
            DNSResourceType::TXT => 16,
            DNSResourceType::AAAA => 28,
            DNSResourceType::SRV => 33,
            DNSResourceType::NAPTR => 35,
            DNSResourceType::OPT => 41,
            DNSResourceType::DS => 43,
            DNSResourceType::SSHFP => 44,
            DNSResourceType::RRSIG => 46,
            DNSResourceType::NSEC => 47,
            DNSResourceType::DNSKEY => 48,
            DNSResourceType::NSEC3 => 50,
            DNSResourceType::NSEC3PARAM => 51,
            DNSResourceType::TLSA => 52,
            DNSResourceType::SVCB => 64,
            DNSResourceType::HTTPS => 65,
            DNSResourceType::CAA => 257,
            DNSResourceType::Unknown(x) => x,
        }
    }

    /// Text mnemonic as used in zone files and the map artifact
    pub fn mnemonic(&self) -> String {
        match self {
            DNSResourceType::A => "A".to_string(),
            DNSResourceType::NS => "NS".to_string(),
            DNSResourceType::CNAME => "CNAME".to_string(),
            DNSResourceType::SOA => "SOA".to_string(),
            DNSResourceType::PTR => "PTR".to_string(),
            DNSResourceType::HINFO => "HINFO".to_string(),
            DNSResourceType::MX => "MX".to_string(),
            DNSResourceType::TXT => "TXT".to_string(),
            DNSResourceType::AAAA => "AAAA".to_string(),
            DNSResourceType::SRV => "SRV".to_string(),
            DNSResourceType::NAPTR => "NAPTR".to_string(),
            DNSResourceType::OPT => "OPT".to_string(),
            DNSResourceType::DS => "DS".to_string(),
            DNSResourceType::SSHFP => "SSHFP".to_string(),
            DNSResourceType::RRSIG => "RRSIG".to_string(),
            DNSResourceType::NSEC => "NSEC".to_string(),
            DNSResourceType::DNSKEY => "DNSKEY".to_string(),
            DNSResourceType::NSEC3 => "NSEC3".to_string(),
            DNSResourceType::NSEC3PARAM => "NSEC3PARAM".to_string(),
            DNSResourceType::TLSA => "TLSA".to_string(),
            DNSResourceType::SVCB => "SVCB".to_string(),
            DNSResourceType::HTTPS => "HTTPS".to_string(),
            DNSResourceType::CAA => "CAA".to_string(),
            DNSResourceType::Unknown(x) => format!("TYPE{}", x),
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        let rtype = match text {
            "A" => DNSResourceType::A,
            "NS" => DNSResourceType::NS,
            "CNAME" => DNSResourceType::CNAME,
            "SOA" => DNSResourceType::SOA,
            "PTR" => DNSResourceType::PTR,
            "HINFO" => DNSResourceType::HINFO,
            "MX" => DNSResourceType::MX,
            "TXT" => DNSResourceType::TXT,
            "AAAA" => DNSResourceType::AAAA,
            "SRV" => DNSResourceType::SRV,
            "NAPTR" => DNSResourceType::NAPTR,
            "OPT" => DNSResourceType::OPT,
            "DS" => DNSResourceType::DS,
            "SSHFP" => DNSResourceType::SSHFP,
            "RRSIG" => DNSResourceType::RRSIG,
            "NSEC" => DNSResourceType::NSEC,
            "DNSKEY" => DNSResourceType::DNSKEY,
            "NSEC3" => DNSResourceType::NSEC3,
            "NSEC3PARAM" => DNSResourceType::NSEC3PARAM,
            "TLSA" => DNSResourceType::TLSA,
            "SVCB" => DNSResourceType::SVCB,
            "HTTPS" => DNSResourceType::HTTPS,
            "CAA" => DNSResourceType::CAA,
            other => {
                let num = other.strip_prefix("TYPE")?.parse::<u16>().ok()?;
                DNSResourceType::from_u16(num)
            }
        };
        Some(rtype)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DNSResourceClass {
    #[default]
    IN,
    CS,
    CH,
    HS,
}

impl From<u16> for DNSResourceClass {
    fn from(value: u16) -> Self {
        match value {
            1 => DNSResourceClass::IN,
            2 => DNSResourceClass::CS,
            3 => DNSResourceClass::CH,
            4 => DNSResourceClass::HS,
            _ => DNSResourceClass::IN,
        }
    }
}

impl From<DNSResourceClass> for u16 {
    fn from(value: DNSResourceClass) -> Self {
        match value {
            DNSResourceClass::IN => 1,
            DNSResourceClass::CS => 2,
            DNSResourceClass::CH => 3,
            DNSResourceClass::HS => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ResponseCode {
    #[default]
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Other(u8),
}

impl ResponseCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormatError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            4 => ResponseCode::NotImplemented,
            5 => ResponseCode::Refused,
            x => ResponseCode::Other(x),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(x) => x,
        }
    }
}
