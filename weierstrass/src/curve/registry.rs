//! Static table of named curve domain parameters.
//!
//! All values are big-endian byte strings as published in SEC 2, RFC 5639
//! and GM/T 0003.5.

use crate::{Error, Result};
use core::fmt;
use hex_literal::hex;

/// Identifier of a registered curve.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CurveId {
    /// NIST P-192
    Secp192r1,
    /// NIST P-224
    Secp224r1,
    /// NIST P-256
    Secp256r1,
    /// NIST P-384
    Secp384r1,
    /// NIST P-521
    Secp521r1,
    /// SEC 2 secp256k1
    Secp256k1,
    /// RFC 5639 brainpoolP256r1
    BrainpoolP256r1,
    /// RFC 5639 brainpoolP384r1
    BrainpoolP384r1,
    /// GM/T 0003 SM2 recommended curve
    Sm2p256v1,
}

impl CurveId {
    /// Registry entry for this curve.
    pub fn info(self) -> &'static CurveInfo {
        // entries are listed in declaration order
        &CURVES[self as usize]
    }

    /// First registered curve whose field elements are `size` bytes long.
    pub fn for_size(size: usize) -> Result<CurveId> {
        CURVES
            .iter()
            .find(|info| info.size == size)
            .map(|info| info.id)
            .ok_or(Error::CurveNotFound)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

/// Domain parameters of a short Weierstrass curve `y² = x³ + a·x + b` over `GF(p)`.
#[derive(Debug)]
pub struct CurveInfo {
    /// Curve identifier.
    pub id: CurveId,
    /// Canonical name.
    pub name: &'static str,
    /// Dotted-decimal object identifier.
    pub oid: &'static str,
    /// Field element size in bytes.
    pub size: usize,
    /// Prime modulus `p`.
    pub prime: &'static [u8],
    /// Coefficient `a`.
    pub a: &'static [u8],
    /// Coefficient `b`.
    pub b: &'static [u8],
    /// Order `n` of the base point.
    pub order: &'static [u8],
    /// Base point x-coordinate.
    pub gx: &'static [u8],
    /// Base point y-coordinate.
    pub gy: &'static [u8],
    /// Cofactor `h`.
    pub cofactor: u32,
}

/// All registered curves, indexed by [`CurveId`].
pub static CURVES: [CurveInfo; 9] = [
    CurveInfo {
        id: CurveId::Secp192r1,
        name: "SECP192R1",
        oid: "1.2.840.10045.3.1.1",
        size: 24,
        prime: &hex!("fffffffffffffffffffffffffffffffeffffffffffffffff"),
        a: &hex!("fffffffffffffffffffffffffffffffefffffffffffffffc"),
        b: &hex!("64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1"),
        order: &hex!("ffffffffffffffffffffffff99def836146bc9b1b4d22831"),
        gx: &hex!("188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012"),
        gy: &hex!("07192b95ffc8da78631011ed6b24cdd573f977a11e794811"),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Secp224r1,
        name: "SECP224R1",
        oid: "1.3.132.0.33",
        size: 28,
        prime: &hex!("ffffffffffffffffffffffffffffffff000000000000000000000001"),
        a: &hex!("fffffffffffffffffffffffffffffffefffffffffffffffffffffffe"),
        b: &hex!("b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4"),
        order: &hex!("ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d"),
        gx: &hex!("b70e0cbd6bb4bf7f321390b94a03c1d356c21122343280d6115c1d21"),
        gy: &hex!("bd376388b5f723fb4c22dfe6cd4375a05a07476444d5819985007e34"),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Secp256r1,
        name: "SECP256R1",
        oid: "1.2.840.10045.3.1.7",
        size: 32,
        prime: &hex!("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"),
        a: &hex!("ffffffff00000001000000000000000000000000fffffffffffffffffffffffc"),
        b: &hex!("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
        order: &hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"),
        gx: &hex!("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
        gy: &hex!("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Secp384r1,
        name: "SECP384R1",
        oid: "1.3.132.0.34",
        size: 48,
        prime: &hex!(
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
            "ffffffff0000000000000000ffffffff"
        ),
        a: &hex!(
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
            "ffffffff0000000000000000fffffffc"
        ),
        b: &hex!(
            "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a"
            "c656398d8a2ed19d2a85c8edd3ec2aef"
        ),
        order: &hex!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf"
            "581a0db248b0a77aecec196accc52973"
        ),
        gx: &hex!(
            "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a38"
            "5502f25dbf55296c3a545e3872760ab7"
        ),
        gy: &hex!(
            "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c0"
            "0a60b1ce1d7e819d7a431d7c90ea0e5f"
        ),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Secp521r1,
        name: "SECP521R1",
        oid: "1.3.132.0.35",
        size: 66,
        prime: &hex!(
            "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        ),
        a: &hex!(
            "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffc"
        ),
        b: &hex!(
            "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef1"
            "09e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b50"
            "3f00"
        ),
        order: &hex!(
            "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            "fffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e9138"
            "6409"
        ),
        gx: &hex!(
            "00c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d"
            "3dbaa14b5e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5"
            "bd66"
        ),
        gy: &hex!(
            "011839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e"
            "662c97ee72995ef42640c550b9013fad0761353c7086a272c24088be94769fd1"
            "6650"
        ),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Secp256k1,
        name: "SECP256K1",
        oid: "1.3.132.0.10",
        size: 32,
        prime: &hex!("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"),
        a: &hex!("0000000000000000000000000000000000000000000000000000000000000000"),
        b: &hex!("0000000000000000000000000000000000000000000000000000000000000007"),
        order: &hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
        gx: &hex!("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
        gy: &hex!("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::BrainpoolP256r1,
        name: "BRAINPOOLP256R1",
        oid: "1.3.36.3.3.2.8.1.1.7",
        size: 32,
        prime: &hex!("a9fb57dba1eea9bc3e660a909d838d726e3bf623d52620282013481d1f6e5377"),
        a: &hex!("7d5a0975fc2c3057eef67530417affe7fb8055c126dc5c6ce94a4b44f330b5d9"),
        b: &hex!("26dc5c6ce94a4b44f330b5d9bbd77cbf958416295cf7e1ce6bccdc18ff8c07b6"),
        order: &hex!("a9fb57dba1eea9bc3e660a909d838d718c397aa3b561a6f7901e0e82974856a7"),
        gx: &hex!("8bd2aeb9cb7e57cb2c4b482ffc81b7afb9de27e1e3bd23c23a4453bd9ace3262"),
        gy: &hex!("547ef835c3dac4fd97f8461a14611dc9c27745132ded8e545c1d54c72f046997"),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::BrainpoolP384r1,
        name: "BRAINPOOLP384R1",
        oid: "1.3.36.3.3.2.8.1.1.11",
        size: 48,
        prime: &hex!(
            "8cb91e82a3386d280f5d6f7e50e641df152f7109ed5456b412b1da197fb71123"
            "acd3a729901d1a71874700133107ec53"
        ),
        a: &hex!(
            "7bc382c63d8c150c3c72080ace05afa0c2bea28e4fb22787139165efba91f90f"
            "8aa5814a503ad4eb04a8c7dd22ce2826"
        ),
        b: &hex!(
            "04a8c7dd22ce28268b39b55416f0447c2fb77de107dcd2a62e880ea53eeb62d5"
            "7cb4390295dbc9943ab78696fa504c11"
        ),
        order: &hex!(
            "8cb91e82a3386d280f5d6f7e50e641df152f7109ed5456b31f166e6cac0425a7"
            "cf3ab6af6b7fc3103b883202e9046565"
        ),
        gx: &hex!(
            "1d1c64f068cf45ffa2a63a81b7c13f6b8847a3e77ef14fe3db7fcafe0cbd10e8"
            "e826e03436d646aaef87b2e247d4af1e"
        ),
        gy: &hex!(
            "8abe1d7520f9c2a45cb1eb8e95cfd55262b70b29feec5864e19c054ff9912928"
            "0e4646217791811142820341263c5315"
        ),
        cofactor: 1,
    },
    CurveInfo {
        id: CurveId::Sm2p256v1,
        name: "SM2P256V1",
        oid: "1.2.156.10197.1.301",
        size: 32,
        prime: &hex!("fffffffeffffffffffffffffffffffffffffffff00000000ffffffffffffffff"),
        a: &hex!("fffffffeffffffffffffffffffffffffffffffff00000000fffffffffffffffc"),
        b: &hex!("28e9fa9e9d9f5e344d5a9e4bcf6509a7f39789f515ab8f92ddbcbd414d940e93"),
        order: &hex!("fffffffeffffffffffffffffffffffff7203df6b21c6052b53bbf40939d54123"),
        gx: &hex!("32c4ae2c1f1981195f9904466a39c9948fe30bbff2660be1715a4589334c74c7"),
        gy: &hex!("bc3736a2f4f6779c59bdcee36b692153d0a9877cc62a474002df32e52139f0a0"),
        cofactor: 1,
    },
];

/// Looks up a curve by identifier.
pub fn lookup(id: CurveId) -> &'static CurveInfo {
    id.info()
}

/// Looks up a curve by its canonical name, ignoring ASCII case.
pub fn find_by_name(name: &str) -> Result<&'static CurveInfo> {
    CURVES
        .iter()
        .find(|info| info.name.eq_ignore_ascii_case(name))
        .ok_or(Error::CurveNotFound)
}

/// Looks up a curve by dotted-decimal OID.
pub fn find_by_oid(oid: &str) -> Result<&'static CurveInfo> {
    CURVES
        .iter()
        .find(|info| info.oid == oid)
        .ok_or(Error::CurveNotFound)
}
