//! ECDH tests.

use core::task::Poll;
use proptest::prelude::*;
use rand_core::OsRng;
use weierstrass::{CurveId, Engine, EngineConfig, Error, FixedPointCache};

fn engine() -> Engine<FixedPointCache> {
    Engine::with_config(EngineConfig::default()).unwrap()
}

prop_compose! {
    fn curve_id()(index in 0usize..9) -> CurveId {
        [
            CurveId::Secp192r1,
            CurveId::Secp224r1,
            CurveId::Secp256r1,
            CurveId::Secp384r1,
            CurveId::Secp521r1,
            CurveId::Secp256k1,
            CurveId::BrainpoolP256r1,
            CurveId::BrainpoolP384r1,
            CurveId::Sm2p256v1,
        ][index]
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn shared_secret_is_symmetric(id in curve_id()) {
        let engine = engine();
        let mut alice = engine.generate_key(id, &mut OsRng).unwrap();
        let mut bob = engine.generate_key(id, &mut OsRng).unwrap();
        let size = alice.curve().field_size();

        let mut ab = vec![0u8; size + 3];
        let mut ba = vec![0u8; size];
        let written = engine.shared_secret(&mut alice, &bob, &mut ab).unwrap();
        prop_assert_eq!(written, Poll::Ready(size));
        let written = engine.shared_secret(&mut bob, &alice, &mut ba).unwrap();
        prop_assert_eq!(written, Poll::Ready(size));
        prop_assert_eq!(&ab[..size], &ba[..]);
        prop_assert_eq!(&ab[size..], &[0u8; 3][..]);
    }
}

#[test]
fn curves_must_match() {
    let engine = engine();
    let mut alice = engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap();
    let bob = engine.generate_key(CurveId::Secp256k1, &mut OsRng).unwrap();
    let mut out = [0u8; 32];
    assert_eq!(
        engine.shared_secret(&mut alice, &bob, &mut out).unwrap_err(),
        Error::CurveMismatch
    );
}

#[test]
fn short_buffer_reports_required_size() {
    let engine = engine();
    let mut alice = engine.generate_key(CurveId::Secp384r1, &mut OsRng).unwrap();
    let bob = engine.generate_key(CurveId::Secp384r1, &mut OsRng).unwrap();
    let mut out = [0u8; 47];
    assert_eq!(
        engine.shared_secret(&mut alice, &bob, &mut out).unwrap_err(),
        Error::BufferTooSmall { required: 48 }
    );
}

#[test]
fn both_halves_required() {
    let engine = engine();
    let mut alice = engine.generate_key(CurveId::Secp224r1, &mut OsRng).unwrap();
    let bob = engine.generate_key(CurveId::Secp224r1, &mut OsRng).unwrap();

    let mut public_only = engine
        .import_x963(CurveId::Secp224r1, &alice.export_x963(false).unwrap())
        .unwrap();
    let private_only = engine
        .import_private(CurveId::Secp224r1, &bob.export_private().unwrap(), None)
        .unwrap();

    assert_eq!(
        engine.shared_secret_vec(&mut public_only, &bob).unwrap_err(),
        Error::BadArgument
    );
    // imported private keys carry their derived public point
    assert!(engine.shared_secret_vec(&mut alice, &private_only).is_ok());
}
