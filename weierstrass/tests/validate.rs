//! Key validation tests.

use rand_core::OsRng;
use weierstrass::{AffinePoint, CurveId, Engine, EngineConfig, Error, NoCache};

fn engine() -> Engine<NoCache> {
    Engine::with_config(EngineConfig::default()).unwrap()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn generated_keys_are_valid() {
    let engine = engine();
    for id in [
        CurveId::Secp192r1,
        CurveId::Secp384r1,
        CurveId::Secp521r1,
        CurveId::BrainpoolP256r1,
        CurveId::BrainpoolP384r1,
    ] {
        let key = engine.generate_key(id, &mut OsRng).unwrap();
        engine.validate(&key).unwrap();

        let public_only = engine
            .import_x963(id, &key.export_x963(true).unwrap())
            .unwrap();
        engine.validate(&public_only).unwrap();
    }
}

#[test]
fn private_key_mismatch() {
    let engine = engine();
    let a = engine.generate_key(CurveId::Sm2p256v1, &mut OsRng).unwrap();
    let b = engine.generate_key(CurveId::Sm2p256v1, &mut OsRng).unwrap();
    let (qx, qy) = a.export_public_raw().unwrap();
    let d = b.export_private().unwrap();

    let mixed = engine
        .import_raw_hex(
            CurveId::Sm2p256v1,
            &to_hex(&qx),
            &to_hex(&qy),
            Some(&to_hex(&d)),
        )
        .unwrap();
    assert_eq!(engine.validate(&mixed).unwrap_err(), Error::PrivateKeyMismatch);
}

#[test]
fn raw_import_checks_point() {
    let engine = engine();
    let curve = engine.curve(CurveId::Secp256r1).unwrap();
    let g = curve.generator();
    let p = curve.prime();

    let unreduced = (g.x() + p).to_str_radix(16);
    assert_eq!(
        engine
            .import_raw_hex(
                CurveId::Secp256r1,
                &unreduced,
                &g.y().to_str_radix(16),
                None
            )
            .unwrap_err(),
        Error::OutOfRange
    );

    assert!(!engine
        .point_is_on_curve(CurveId::Secp256r1, &AffinePoint::identity())
        .unwrap());
    assert!(engine.point_is_on_curve(CurveId::Secp256r1, g).unwrap());
    assert!(engine
        .point_is_on_curve(CurveId::Secp256r1, &curve.negate(g))
        .unwrap());
}
