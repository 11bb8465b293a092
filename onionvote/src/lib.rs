#[macro_use]
extern crate serde;

pub mod codec;
pub mod constants;
pub mod elgamal;
pub mod hybrid;
pub mod keygen;

mod ballot;
mod driver;
mod election;
mod error;
mod signed;
mod tally;
mod trail;
mod voter;

pub use ballot::*;
pub use codec::{WireTag, WireValue};
pub use driver::*;
pub use elgamal::{SigningKey, VerifyingKey};
pub use election::*;
pub use error::*;
pub use hybrid::HybridCiphertext;
pub use signed::*;
pub use tally::*;
pub use trail::*;
pub use voter::*;

#[cfg(test)]
mod tests;
