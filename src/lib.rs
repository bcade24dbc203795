//! A toy Diffie-Hellman key exchange between two in-process parties, Alice and Bob.
//!
//! - [`math::number_theory`] vets the domain parameters (primality, primitive roots).
//! - [`cs::security::diffie_hellman`] derives public values and shared keys.
//! - [`cs::security::shift_cipher`] encrypts messages with the shared key.
//! - [`cs::security::exchange_session`] ties it together as a state machine that a
//!   presentation layer drives one step at a time.
//!
//! ```
//! use dh_demo::{ExchangeSession, Party};
//!
//! let mut session = ExchangeSession::default();
//! session.set_domain_parameters("23", "5").unwrap();
//! session.publish_party_key(Party::Alice, "6").unwrap();
//! session.publish_party_key(Party::Bob, "15").unwrap();
//!
//! let keys = session.on_both_published().unwrap();
//! assert_eq!(keys.alice, keys.bob);
//! assert_eq!(session.encrypt("HI").unwrap(), "JK");
//! ```
//!
//! Nothing in this crate is secure. It exists to show the arithmetic.

pub mod cs;
pub mod error;
pub mod math;

pub use cs::security::{
    DomainParameters, ExchangeSession, ParameterValidity, Party, SessionState, SharedExchange,
    SharedKeys, ShiftCipher,
};
pub use error::{Error, Result};
