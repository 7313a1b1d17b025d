//! Request/response exchange state.

use crate::{Error, Result, config::{CipherAlgorithm, Config}, kdf};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use core::task::Poll;
use hmac::{Hmac, Mac};
use rand_core::CryptoRngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use weierstrass::{AccelerationCache, Engine, Key};
use zeroize::Zeroizing;

/// Length of each side's exchange salt.
pub const SALT_LEN: usize = 16;

const HALF_SALT: usize = SALT_LEN / 2;

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Side of the exchange a [`Context`] plays.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// Sends the request, receives the response.
    Client,
    /// Receives the request, sends the response.
    Server,
}

/// Protocol state of a client.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClientState {
    /// Nothing done yet.
    Init,
    /// Own salt generated and handed out.
    SaltGenerated,
    /// Server salt received.
    PeerSaltSet,
    /// Request encrypted.
    RequestSent,
    /// Response decrypted; the exchange is over.
    Done,
}

/// Protocol state of a server.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ServerState {
    /// Nothing done yet.
    Init,
    /// Own salt generated and handed out.
    SaltGenerated,
    /// Client salt received.
    PeerSaltSet,
    /// Request decrypted.
    RequestReceived,
    /// Response encrypted; the exchange is over.
    Done,
}

/// Protocol state of either role.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// Client state machine.
    Client(ClientState),
    /// Server state machine.
    Server(ServerState),
}

/// Which direction a message travels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Leg {
    Request,
    Response,
}

/// One side of an encrypted request/response exchange.
///
/// Both sides generate a salt with [`Context::own_salt`] and hand it to the
/// other, which passes it to [`Context::set_peer_salt`]. The client then
/// encrypts a request which the server decrypts, and the server encrypts a
/// response which the client decrypts. Request and response are protected
/// with independent keys. Calls made out of this order fail with
/// [`Error::BadState`].
#[derive(Debug)]
pub struct Context {
    role: Role,
    config: Config,
    state: State,
    own_salt: [u8; SALT_LEN],
    kdf_salt: [u8; SALT_LEN],
    mac_salt: [u8; SALT_LEN],
}

impl Context {
    /// Creates a context for `role`.
    pub fn new(role: Role, config: Config) -> Self {
        Self {
            role,
            config,
            state: Self::initial_state(role),
            own_salt: [0; SALT_LEN],
            kdf_salt: [0; SALT_LEN],
            mac_salt: [0; SALT_LEN],
        }
    }

    /// Creates a client context.
    pub fn client(config: Config) -> Self {
        Self::new(Role::Client, config)
    }

    /// Creates a server context.
    pub fn server(config: Config) -> Self {
        Self::new(Role::Server, config)
    }

    fn initial_state(role: Role) -> State {
        match role {
            Role::Client => State::Client(ClientState::Init),
            Role::Server => State::Server(ServerState::Init),
        }
    }

    /// Side of the exchange.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Negotiated algorithms.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current protocol state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Discards salts and derived state so a new exchange can start.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(self.role);
        self.own_salt = [0; SALT_LEN];
        self.kdf_salt = [0; SALT_LEN];
        self.mac_salt = [0; SALT_LEN];
    }

    /// Generates this side's salt. Allowed once per exchange.
    pub fn own_salt(&mut self, rng: &mut impl CryptoRngCore) -> Result<[u8; SALT_LEN]> {
        let next = match self.state {
            State::Client(ClientState::Init) => State::Client(ClientState::SaltGenerated),
            State::Server(ServerState::Init) => State::Server(ServerState::SaltGenerated),
            _ => return Err(Error::BadState),
        };
        rng.try_fill_bytes(&mut self.own_salt)?;
        self.state = next;
        Ok(self.own_salt)
    }

    /// Records the other side's salt and derives the KDF and MAC salts.
    ///
    /// With `c` the client salt and `s` the server salt, the KDF salt is
    /// `c[..8] ∥ s[..8]` and the MAC salt is `c[8..] ∥ s[8..]`.
    pub fn set_peer_salt(&mut self, peer: &[u8]) -> Result<()> {
        let next = match self.state {
            State::Client(ClientState::SaltGenerated) => State::Client(ClientState::PeerSaltSet),
            State::Server(ServerState::SaltGenerated) => State::Server(ServerState::PeerSaltSet),
            _ => return Err(Error::BadState),
        };
        if peer.len() != SALT_LEN {
            return Err(Error::BadArgument);
        }

        let (client, server) = match self.role {
            Role::Client => (&self.own_salt[..], peer),
            Role::Server => (peer, &self.own_salt[..]),
        };
        let mut kdf_salt = [0u8; SALT_LEN];
        let mut mac_salt = [0u8; SALT_LEN];
        kdf_salt[..HALF_SALT].copy_from_slice(&client[..HALF_SALT]);
        kdf_salt[HALF_SALT..].copy_from_slice(&server[..HALF_SALT]);
        mac_salt[..HALF_SALT].copy_from_slice(&client[HALF_SALT..]);
        mac_salt[HALF_SALT..].copy_from_slice(&server[HALF_SALT..]);

        self.kdf_salt = kdf_salt;
        self.mac_salt = mac_salt;
        self.state = next;
        Ok(())
    }

    /// Encrypts `msg` from `private` to `peer`, returning `ciphertext ∥ tag`.
    ///
    /// The client encrypts the request and the server the response.
    /// `Poll::Pending` is returned, with the protocol state unchanged, while
    /// the shared secret is with the key's accelerator.
    pub fn encrypt<A: AccelerationCache>(
        &mut self,
        engine: &Engine<A>,
        private: &mut Key,
        peer: &Key,
        msg: &[u8],
    ) -> Result<Poll<Vec<u8>>> {
        let (leg, next) = match self.state {
            State::Client(ClientState::PeerSaltSet) => {
                (Leg::Request, State::Client(ClientState::RequestSent))
            }
            State::Server(ServerState::RequestReceived) => {
                (Leg::Response, State::Server(ServerState::Done))
            }
            _ => return Err(Error::BadState),
        };

        let keys = match self.derive_keys(engine, private, peer, leg)? {
            Poll::Ready(keys) => keys,
            Poll::Pending => return Ok(Poll::Pending),
        };

        let mut out = encrypt_body(self.config.cipher, &keys, msg)?;
        let tag = self.tag(&keys, &out)?;
        out.extend_from_slice(&tag);

        tracing::trace!(role = ?self.role, leg = ?leg, len = msg.len(), "message encrypted");
        self.state = next;
        Ok(Poll::Ready(out))
    }

    /// Authenticates and decrypts `ciphertext ∥ tag` from `peer`.
    ///
    /// The server decrypts the request and the client the response. Any
    /// failure of authentication, length or padding is reported as
    /// [`Error::MacMismatch`]. The tag is checked before decryption.
    pub fn decrypt<A: AccelerationCache>(
        &mut self,
        engine: &Engine<A>,
        private: &mut Key,
        peer: &Key,
        msg: &[u8],
    ) -> Result<Poll<Zeroizing<Vec<u8>>>> {
        let (leg, next) = match self.state {
            State::Server(ServerState::PeerSaltSet) => {
                (Leg::Request, State::Server(ServerState::RequestReceived))
            }
            State::Client(ClientState::RequestSent) => {
                (Leg::Response, State::Client(ClientState::Done))
            }
            _ => return Err(Error::BadState),
        };

        let keys = match self.derive_keys(engine, private, peer, leg)? {
            Poll::Ready(keys) => keys,
            Poll::Pending => return Ok(Poll::Pending),
        };

        let tag_len = self.config.mac.tag_len();
        let block = self.config.cipher.iv_len();
        if msg.len() < tag_len + block {
            return Err(Error::MacMismatch);
        }
        let (body, tag) = msg.split_at(msg.len() - tag_len);

        let expected = self.tag(&keys, body)?;
        if !bool::from(expected.ct_eq(tag)) {
            tracing::debug!(role = ?self.role, leg = ?leg, "message authentication failed");
            return Err(Error::MacMismatch);
        }
        let plaintext = decrypt_body(self.config.cipher, &keys, body)?;

        self.state = next;
        Ok(Poll::Ready(plaintext))
    }

    /// Derives the keyset for `leg` from the ECDH shared secret.
    fn derive_keys<A: AccelerationCache>(
        &self,
        engine: &Engine<A>,
        private: &mut Key,
        peer: &Key,
        leg: Leg,
    ) -> Result<Poll<Keyset>> {
        let secret = match engine.shared_secret_vec(private, peer)? {
            Poll::Ready(secret) => secret,
            Poll::Pending => return Ok(Poll::Pending),
        };

        let len = self.config.keyset_len();
        // the response keyset follows the request keyset
        let total = match leg {
            Leg::Request => len,
            Leg::Response => 2 * len,
        };
        let mut material = Zeroizing::new(vec![0u8; total]);
        kdf::derive(
            self.config.kdf,
            &secret,
            &self.kdf_salt,
            &self.config.info,
            &mut material,
        )?;

        Ok(Poll::Ready(Keyset::split(&self.config, &material[total - len..])))
    }

    /// `HMAC(mac_key, ciphertext ∥ mac_salt)`.
    fn tag(&self, keys: &Keyset, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&keys.mac_key)
            .map_err(|_| Error::BadArgument)?;
        mac.update(ciphertext);
        mac.update(&self.mac_salt);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Encryption key, IV and MAC key of one leg.
struct Keyset {
    enc_key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    mac_key: Zeroizing<Vec<u8>>,
}

impl Keyset {
    fn split(config: &Config, material: &[u8]) -> Self {
        let (enc_key, rest) = material.split_at(config.cipher.key_len());
        let (iv, mac_key) = rest.split_at(config.cipher.iv_len());
        Self {
            enc_key: Zeroizing::new(enc_key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            mac_key: Zeroizing::new(mac_key.to_vec()),
        }
    }
}

fn encrypt_body(cipher: CipherAlgorithm, keys: &Keyset, msg: &[u8]) -> Result<Vec<u8>> {
    let out = match cipher {
        CipherAlgorithm::Aes128Cbc => Aes128CbcEnc::new_from_slices(&keys.enc_key, &keys.iv)
            .map_err(|_| Error::BadArgument)?
            .encrypt_padded_vec_mut::<Pkcs7>(msg),
        CipherAlgorithm::Aes256Cbc => Aes256CbcEnc::new_from_slices(&keys.enc_key, &keys.iv)
            .map_err(|_| Error::BadArgument)?
            .encrypt_padded_vec_mut::<Pkcs7>(msg),
    };
    Ok(out)
}

fn decrypt_body(
    cipher: CipherAlgorithm,
    keys: &Keyset,
    body: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let plaintext = match cipher {
        CipherAlgorithm::Aes128Cbc => Aes128CbcDec::new_from_slices(&keys.enc_key, &keys.iv)
            .map_err(|_| Error::MacMismatch)?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        CipherAlgorithm::Aes256Cbc => Aes256CbcDec::new_from_slices(&keys.enc_key, &keys.iv)
            .map_err(|_| Error::MacMismatch)?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
    };
    plaintext.map(Zeroizing::new).map_err(|_| Error::MacMismatch)
}
