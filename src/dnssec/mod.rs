pub mod hash;
pub mod records;

pub use hash::nsec3_hash;
pub use records::{Nsec3Param, Nsec3Record, NsecRecord};
