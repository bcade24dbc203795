//! A two-party Diffie-Hellman exchange driven step by step from the outside.
//!
//! [`ExchangeSession`] holds both parties' state in one process and walks through
//!
//! ```text
//! Empty -> ParamsSet -> AlicePublished | BobPublished -> SharedEstablished
//! ```
//!
//! Domain parameters are checked (primality, primitive root) but never enforced: a
//! session happily completes with a composite `p`, and the check results are only
//! reported back. The second publish is the merge point. It derives both shared keys,
//! compares them and commits them together, so no caller ever sees one party keyed and
//! the other not.
//!
//! [`SharedExchange`] wraps a session in a mutex so the two publishes can be issued from
//! different threads.
//!
//! *This is for demonstration only. DO NOT use in real systems.*

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use num_bigint::{BigInt, BigUint};

use crate::cs::security::diffie_hellman::{
    generate_secret, parse_integer, public_key, shared_key, DomainParameters, ParameterValidity,
    SecretGenConfig,
};
use crate::cs::security::shift_cipher::ShiftCipher;
use crate::error::{Field, PreconditionError, Result, ValidationError};

/// Which party of the exchange an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Alice,
    Bob,
}

impl Party {
    /// The other side of the exchange.
    pub fn peer(self) -> Party {
        match self {
            Party::Alice => Party::Bob,
            Party::Bob => Party::Alice,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Alice => f.write_str("Alice"),
            Party::Bob => f.write_str("Bob"),
        }
    }
}

/// Progress of the exchange, see the module docs for the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    ParamsSet,
    AlicePublished,
    BobPublished,
    SharedEstablished,
}

/// What to do with new secrets or parameters once the shared key exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RekeyPolicy {
    /// Refuse with [`PreconditionError::AlreadyEstablished`].
    #[default]
    Reject,
    /// Throw the finished exchange away and start a new one with the new input.
    Reset,
}

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub rekey_policy: RekeyPolicy,
}

/// Everything one party knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyState {
    secret: Option<BigInt>,
    public_value: Option<BigUint>,
    peer_public_value: Option<BigUint>,
    shared_key: Option<BigUint>,
}

impl PartyState {
    pub fn secret(&self) -> Option<&BigInt> {
        self.secret.as_ref()
    }

    pub fn public_value(&self) -> Option<&BigUint> {
        self.public_value.as_ref()
    }

    pub fn peer_public_value(&self) -> Option<&BigUint> {
        self.peer_public_value.as_ref()
    }

    pub fn shared_key(&self) -> Option<&BigUint> {
        self.shared_key.as_ref()
    }
}

/// Both independently derived shared keys. Equal whenever the session hands one out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedKeys {
    pub alice: BigUint,
    pub bob: BigUint,
}

/// Optional notifications for presentation code, e.g. to animate values moving
/// between the parties.
///
/// Hooks run after the state change has been committed and cannot veto it. Every
/// method defaults to doing nothing. [`SharedExchange`] calls them after releasing its
/// lock, so a slow hook never holds up the other party and may call back into the
/// exchange.
pub trait SessionObserver: Send + Sync {
    fn on_public_value_published(&self, _party: Party, _public_value: &BigUint) {}

    fn on_shared_key_established(&self, _keys: &SharedKeys) {}

    fn on_message_encrypted(&self, _plaintext: &str, _cipher: &str) {}

    fn on_message_decrypted(&self, _cipher: &str, _plaintext: &str) {}
}

/// Handle returned by [`ExchangeSession::subscribe`], used to cancel the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A committed event waiting to be handed to the observers.
#[derive(Debug, Clone)]
enum Notification {
    Published(Party, BigUint),
    Established(SharedKeys),
    Encrypted { plaintext: String, cipher: String },
    Decrypted { cipher: String, plaintext: String },
}

impl Notification {
    fn deliver(&self, observer: &dyn SessionObserver) {
        match self {
            Notification::Published(party, value) => {
                observer.on_public_value_published(*party, value)
            }
            Notification::Established(keys) => observer.on_shared_key_established(keys),
            Notification::Encrypted { plaintext, cipher } => {
                observer.on_message_encrypted(plaintext, cipher)
            }
            Notification::Decrypted { cipher, plaintext } => {
                observer.on_message_decrypted(cipher, plaintext)
            }
        }
    }
}

type Observers = Vec<Arc<dyn SessionObserver>>;

fn deliver_all(observers: &[Arc<dyn SessionObserver>], notifications: &[Notification]) {
    for notification in notifications {
        for observer in observers {
            notification.deliver(observer.as_ref());
        }
    }
}

/// Both parties' state for one exchange, plus the domain parameters they share.
pub struct ExchangeSession {
    config: SessionConfig,
    params: Option<DomainParameters>,
    validity: Option<ParameterValidity>,
    alice: PartyState,
    bob: PartyState,
    observers: Vec<(SubscriptionId, Arc<dyn SessionObserver>)>,
    next_subscription: u64,
}

impl Default for ExchangeSession {
    fn default() -> Self {
        ExchangeSession::new(SessionConfig::default())
    }
}

impl fmt::Debug for ExchangeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeSession")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("validity", &self.validity)
            .field("alice", &self.alice)
            .field("bob", &self.bob)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ExchangeSession {
    /// An empty session with no parameters and no subscribers.
    pub fn new(config: SessionConfig) -> Self {
        ExchangeSession {
            config,
            params: None,
            validity: None,
            alice: PartyState::default(),
            bob: PartyState::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Where the exchange currently stands, derived from what has been committed.
    pub fn state(&self) -> SessionState {
        if self.params.is_none() {
            return SessionState::Empty;
        }
        if self.is_established() {
            return SessionState::SharedEstablished;
        }
        match (&self.alice.public_value, &self.bob.public_value) {
            (Some(_), None) => SessionState::AlicePublished,
            (None, Some(_)) => SessionState::BobPublished,
            _ => SessionState::ParamsSet,
        }
    }

    /// The last successfully parsed `(p, g)`, if any.
    pub fn parameters(&self) -> Option<&DomainParameters> {
        self.params.as_ref()
    }

    /// Result of the most recent parameter check.
    pub fn validity(&self) -> Option<ParameterValidity> {
        self.validity
    }

    pub fn party(&self, party: Party) -> &PartyState {
        match party {
            Party::Alice => &self.alice,
            Party::Bob => &self.bob,
        }
    }

    fn party_mut(&mut self, party: Party) -> &mut PartyState {
        match party {
            Party::Alice => &mut self.alice,
            Party::Bob => &mut self.bob,
        }
    }

    /// The session key, once the exchange is complete.
    pub fn shared_key(&self) -> Option<&BigUint> {
        if self.is_established() {
            self.alice.shared_key.as_ref()
        } else {
            None
        }
    }

    fn is_established(&self) -> bool {
        self.alice.shared_key.is_some() && self.bob.shared_key.is_some()
    }

    /// Back to [`SessionState::Empty`]. Configuration and subscriptions are kept.
    pub fn reset(&mut self) {
        debug!("resetting exchange session");
        self.params = None;
        self.validity = None;
        self.clear_exchange();
    }

    fn clear_exchange(&mut self) {
        self.alice = PartyState::default();
        self.bob = PartyState::default();
    }

    /// Whether new input must start a fresh exchange, per the rekey policy.
    fn rekey_required(&self) -> Result<bool> {
        if !self.is_established() {
            return Ok(false);
        }
        match self.config.rekey_policy {
            RekeyPolicy::Reject => Err(PreconditionError::AlreadyEstablished.into()),
            RekeyPolicy::Reset => Ok(true),
        }
    }

    fn observer_handles(&self) -> Observers {
        self.observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    fn notify(&self, notifications: &[Notification]) {
        deliver_all(&self.observer_handles(), notifications);
    }

    /// Parse and check `p` and `g`.
    ///
    /// The returned flags are advisory; the parameters are stored either way. Changing
    /// the parameters mid-exchange discards public values computed under the old ones.
    ///
    /// # Errors
    /// - [`ValidationError`] if either field is empty or not an integer.
    /// - [`crate::Error::InvalidInput`] if either value is negative.
    /// - [`PreconditionError::AlreadyEstablished`] when changing parameters after the
    ///   exchange completed under [`RekeyPolicy::Reject`].
    pub fn set_domain_parameters(&mut self, p_text: &str, g_text: &str) -> Result<ParameterValidity> {
        let params = DomainParameters::parse(p_text, g_text)?;
        let changed = self.params.as_ref() != Some(&params);
        if changed {
            self.rekey_required()?;
        }

        let validity = params.validate();
        if !validity.p_valid {
            warn!("p = {} is not a prime", params.p);
        } else if !validity.g_valid {
            warn!("g = {} is not a primitive root of {}", params.g, params.p);
        }

        if changed {
            if self.alice.public_value.is_some() || self.bob.public_value.is_some() {
                debug!("domain parameters changed, discarding published values");
                self.clear_exchange();
            }
            debug!("domain parameters set: p = {}, g = {}", params.p, params.g);
            self.params = Some(params);
        }
        self.validity = Some(validity);
        Ok(validity)
    }

    /// Parse `party`'s secret and publish its public value `g^secret mod p` to the peer.
    ///
    /// The secret may be any integer; a negative one works through the inverse of the
    /// base modulo `p`. If the peer has already published, this also completes the
    /// exchange.
    ///
    /// # Errors
    /// - [`ValidationError`] if no parameters are set or the secret is missing or not an
    ///   integer.
    /// - [`crate::Error::InvalidInput`] if the secret is negative and the base has no
    ///   inverse modulo `p`.
    /// - [`PreconditionError`] per the rekey policy, or if the derived keys disagree.
    pub fn publish_party_key(&mut self, party: Party, secret_text: &str) -> Result<BigUint> {
        let (public_value, notifications) = self.commit_party_key(party, secret_text)?;
        self.notify(&notifications);
        Ok(public_value)
    }

    fn commit_party_key(
        &mut self,
        party: Party,
        secret_text: &str,
    ) -> Result<(BigUint, Vec<Notification>)> {
        if self.params.is_none() {
            return Err(ValidationError::Missing(Field::Prime).into());
        }
        let secret = parse_integer(secret_text, Field::Secret(party))?;
        self.commit_secret(party, secret)
    }

    /// Publish with a freshly drawn secret in `[1, p-1]`.
    pub fn publish_random_party_key(
        &mut self,
        party: Party,
        config: &SecretGenConfig,
    ) -> Result<BigUint> {
        let (public_value, notifications) = self.commit_random_party_key(party, config)?;
        self.notify(&notifications);
        Ok(public_value)
    }

    fn commit_random_party_key(
        &mut self,
        party: Party,
        config: &SecretGenConfig,
    ) -> Result<(BigUint, Vec<Notification>)> {
        let secret = match &self.params {
            Some(params) => generate_secret(params, config)?,
            None => return Err(ValidationError::Missing(Field::Prime).into()),
        };
        self.commit_secret(party, secret)
    }

    /// Store the party's values and, when the peer is already published, both shared
    /// keys. Returns what the observers should hear about; nothing is delivered here.
    fn commit_secret(
        &mut self,
        party: Party,
        secret: BigInt,
    ) -> Result<(BigUint, Vec<Notification>)> {
        let restart = self.rekey_required()?;
        let Some(params) = self.params.as_ref() else {
            return Err(ValidationError::Missing(Field::Prime).into());
        };
        let public_value = public_key(&params.g, &secret, &params.p)?;

        // Merge point: derive both keys before touching any state.
        let peer = self.party(party.peer());
        let keys = match (&peer.public_value, &peer.secret) {
            _ if restart => None,
            (Some(peer_public), Some(peer_secret)) => {
                let own = shared_key(peer_public, &secret, &params.p)?;
                let theirs = shared_key(&public_value, peer_secret, &params.p)?;
                if own != theirs {
                    return Err(PreconditionError::SharedKeyMismatch.into());
                }
                Some((peer_public.clone(), own, theirs))
            }
            _ => None,
        };

        if restart {
            debug!("shared key already established, starting a new exchange");
            self.clear_exchange();
        }
        let me = self.party_mut(party);
        me.secret = Some(secret);
        me.public_value = Some(public_value.clone());
        me.shared_key = None;
        self.party_mut(party.peer()).peer_public_value = Some(public_value.clone());
        debug!("{} published public value {}", party, public_value);

        let mut notifications = vec![Notification::Published(party, public_value.clone())];
        if let Some((peer_public, own, theirs)) = keys {
            let me = self.party_mut(party);
            me.peer_public_value = Some(peer_public);
            me.shared_key = Some(own.clone());
            self.party_mut(party.peer()).shared_key = Some(theirs.clone());
            debug!("shared key established");

            let keys = match party {
                Party::Alice => SharedKeys {
                    alice: own,
                    bob: theirs,
                },
                Party::Bob => SharedKeys {
                    alice: theirs,
                    bob: own,
                },
            };
            notifications.push(Notification::Established(keys));
        }
        Ok((public_value, notifications))
    }

    /// Both parties' shared keys.
    ///
    /// # Errors
    /// [`PreconditionError::NotBothPublished`] until both public values are known.
    pub fn on_both_published(&self) -> Result<SharedKeys> {
        match (&self.alice.shared_key, &self.bob.shared_key) {
            (Some(alice), Some(bob)) => Ok(SharedKeys {
                alice: alice.clone(),
                bob: bob.clone(),
            }),
            _ => Err(PreconditionError::NotBothPublished.into()),
        }
    }

    fn cipher(&self) -> Result<ShiftCipher> {
        self.shared_key()
            .map(ShiftCipher::from)
            .ok_or_else(|| PreconditionError::NoSharedKey.into())
    }

    /// Encrypt with the session key.
    ///
    /// # Errors
    /// [`PreconditionError::NoSharedKey`] before the exchange completes.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let (cipher, notifications) = self.transform_encrypt(plaintext)?;
        self.notify(&notifications);
        Ok(cipher)
    }

    fn transform_encrypt(&self, plaintext: &str) -> Result<(String, Vec<Notification>)> {
        let cipher = self.cipher()?.encode(plaintext);
        let notification = Notification::Encrypted {
            plaintext: plaintext.to_string(),
            cipher: cipher.clone(),
        };
        Ok((cipher, vec![notification]))
    }

    /// Decrypt with the session key.
    ///
    /// # Errors
    /// [`PreconditionError::NoSharedKey`] before the exchange completes.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let (plaintext, notifications) = self.transform_decrypt(ciphertext)?;
        self.notify(&notifications);
        Ok(plaintext)
    }

    fn transform_decrypt(&self, ciphertext: &str) -> Result<(String, Vec<Notification>)> {
        let plaintext = self.cipher()?.decode(ciphertext);
        let notification = Notification::Decrypted {
            cipher: ciphertext.to_string(),
            plaintext: plaintext.clone(),
        };
        Ok((plaintext, vec![notification]))
    }

    /// Register an observer for every later commit; hooks fire in subscription order.
    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Cancel a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }
}

/// A session shared between threads.
///
/// Every call holds the lock for its whole state change, so the merge point in the
/// second publish is a single critical section. Observers are notified after the lock
/// is released.
#[derive(Clone, Default)]
pub struct SharedExchange {
    inner: Arc<Mutex<ExchangeSession>>,
}

impl SharedExchange {
    pub fn new(session: ExchangeSession) -> Self {
        SharedExchange {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExchangeSession> {
        // state is only written after every fallible step, so a poisoned session is intact
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `op` under the lock, then deliver its notifications with the lock released.
    fn commit<T>(
        &self,
        op: impl FnOnce(&mut ExchangeSession) -> Result<(T, Vec<Notification>)>,
    ) -> Result<T> {
        let (value, notifications, observers) = {
            let mut session = self.lock();
            let (value, notifications) = op(&mut *session)?;
            (value, notifications, session.observer_handles())
        };
        deliver_all(&observers, &notifications);
        Ok(value)
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// Observers triggered from inside `f` run before the lock is released.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut ExchangeSession) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn subscribe(&self, observer: Arc<dyn SessionObserver>) -> SubscriptionId {
        self.lock().subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    pub fn set_domain_parameters(&self, p_text: &str, g_text: &str) -> Result<ParameterValidity> {
        self.lock().set_domain_parameters(p_text, g_text)
    }

    pub fn publish_party_key(&self, party: Party, secret_text: &str) -> Result<BigUint> {
        self.commit(|session| session.commit_party_key(party, secret_text))
    }

    pub fn publish_random_party_key(
        &self,
        party: Party,
        config: &SecretGenConfig,
    ) -> Result<BigUint> {
        self.commit(|session| session.commit_random_party_key(party, config))
    }

    pub fn on_both_published(&self) -> Result<SharedKeys> {
        self.lock().on_both_published()
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.commit(|session| session.transform_encrypt(plaintext))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        self.commit(|session| session.transform_decrypt(ciphertext))
    }

    /// Publish both parties' keys concurrently and return the resulting shared keys.
    ///
    /// Errors from either publish are reported, Alice's first.
    pub fn exchange(&self, alice_secret: &str, bob_secret: &str) -> Result<SharedKeys> {
        let (alice, bob) = rayon::join(
            || self.publish_party_key(Party::Alice, alice_secret),
            || self.publish_party_key(Party::Bob, bob_secret),
        );
        alice?;
        bob?;
        self.on_both_published()
    }
}
