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

//! ## Usage
//!
//! An [`Engine`] owns the curve parameter cache and the fixed-point
//! acceleration cache. Keys are generated or imported through it, and every
//! key operation is a method on it:
//!
//! - [`Engine::generate_key`], [`Engine::import_x963`],
//!   [`Engine::import_private`], [`Engine::import_raw_hex`]
//! - [`Engine::sign`] / [`Engine::verify`] (ECDSA)
//! - [`Engine::shared_secret`] (ECDH)
//! - [`Engine::validate`]
//!
//! Signing, verification and shared secret derivation return
//! [`core::task::Poll`]. They only return `Pending` when an [`Accelerator`]
//! is attached to the key, in which case the same call is repeated until it
//! completes.

pub mod curve;
pub mod sec1;

mod accelerator;
mod affine;
mod arithmetic;
mod ecdh;
mod ecdsa;
mod engine;
mod error;
mod key;
mod lookup_table;
mod monty;
mod mul;
mod point_arithmetic;
mod projective;
mod secret;
mod sqrt;
mod uint;
mod validate;

pub use crate::{
    accelerator::{Accelerator, DeferredAccelerator, MulJob},
    affine::AffinePoint,
    arithmetic::Curve,
    curve::{CurveCache, CurveId, CurveInfo},
    ecdsa::Signature,
    engine::{DefaultCache, Engine, EngineConfig},
    error::{Error, Result},
    key::{
        Key, KeyFlags, KeyType, Operation, OperationState, SharedSecretState, SignState,
        VerifyState,
    },
    lookup_table::{AccelerationCache, CombTable, FixedPointCache, LocalFixedPointCache, NoCache},
    point_arithmetic::EquationA,
    projective::ProjectivePoint,
    secret::SecretScalar,
};

pub use num_bigint::BigUint;
