mod advisory_port;
mod identifier;

pub use advisory_port::advisory_port;
pub use identifier::IdGenerator;
