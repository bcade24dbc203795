pub mod diffie_hellman;
pub mod exchange_session;
pub mod shift_cipher;

// Re-export Diffie-Hellman functionality
pub use diffie_hellman::{
    generate_secret, public_key, shared_key, DomainParameters, ParameterValidity,
    SecretGenConfig,
};

// Re-export shift cipher functionality
pub use shift_cipher::{shift_decode, shift_encode, ShiftCipher, SHIFT_CIPHER_ALPHABET};

// Re-export exchange session functionality
pub use exchange_session::{
    ExchangeSession, Party, PartyState, RekeyPolicy, SessionConfig, SessionObserver,
    SessionState, SharedExchange, SharedKeys, SubscriptionId,
};
