pub mod address;
pub mod records;
pub mod username;

pub use address::*;
pub use records::*;
pub use username::*;
