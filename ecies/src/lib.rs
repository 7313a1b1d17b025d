#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! ## Wire format
//!
//! Each message is `ciphertext ∥ tag`, where the ciphertext is the
//! PKCS#7-padded message under the negotiated block cipher and the tag is
//! the MAC over `ciphertext ∥ mac_salt`.

mod config;
mod context;
mod error;
mod kdf;

pub use crate::{
    config::{CipherAlgorithm, Config, KdfAlgorithm, MacAlgorithm},
    context::{ClientState, Context, Role, SALT_LEN, ServerState, State},
    error::{Error, Result},
};
pub use weierstrass;
