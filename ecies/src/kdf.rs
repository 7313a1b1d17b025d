//! Key derivation.

use crate::{Error, Result, config::KdfAlgorithm};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};

/// Fills `out` with key material derived from `secret`.
pub(crate) fn derive(
    algorithm: KdfAlgorithm,
    secret: &[u8],
    salt: &[u8],
    info: &[u8],
    out: &mut [u8],
) -> Result<()> {
    match algorithm {
        KdfAlgorithm::HkdfSha256 => Hkdf::<Sha256>::new(Some(salt), secret)
            .expand(info, out)
            .map_err(|_| Error::BadArgument),
        KdfAlgorithm::X963Sha256 => {
            x963_kdf(secret, &[salt, info], out);
            Ok(())
        }
    }
}

/// ANSI X9.63 KDF: `Hash(Z ∥ counter ∥ SharedInfo)` for counter = 1, 2, ...
fn x963_kdf(secret: &[u8], shared_info: &[&[u8]], out: &mut [u8]) {
    let mut counter: u32 = 1;
    for block in out.chunks_mut(<Sha256 as Digest>::output_size()) {
        let mut hasher = Sha256::new();
        hasher.update(secret);
        hasher.update(counter.to_be_bytes());
        for part in shared_info {
            hasher.update(part);
        }
        let digest = hasher.finalize();
        block.copy_from_slice(&digest[..block.len()]);
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn hkdf_rfc5869_case_1() {
        let ikm = [0x0bu8; 22];
        let salt = hex!("000102030405060708090a0b0c");
        let info = hex!("f0f1f2f3f4f5f6f7f8f9");
        let mut okm = [0u8; 42];
        derive(KdfAlgorithm::HkdfSha256, &ikm, &salt, &info, &mut okm).unwrap();
        assert_eq!(
            okm,
            hex!(
                "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf"
                "34007208d5b887185865"
            )
        );
    }

    #[test]
    fn x963_blocks_follow_counter() {
        let secret = b"shared secret";
        let mut long = [0u8; 70];
        derive(KdfAlgorithm::X963Sha256, secret, b"salt", b"", &mut long).unwrap();

        let mut first = Sha256::new();
        first.update(secret);
        first.update(1u32.to_be_bytes());
        first.update(b"salt");
        assert_eq!(&long[..32], &first.finalize()[..]);

        let mut short = [0u8; 40];
        derive(KdfAlgorithm::X963Sha256, secret, b"salt", b"", &mut short).unwrap();
        assert_eq!(&long[..40], &short[..]);
    }

    #[test]
    fn oversized_hkdf_output() {
        let mut okm = vec![0u8; 255 * 32 + 1];
        assert_eq!(
            derive(KdfAlgorithm::HkdfSha256, b"ikm", b"salt", b"", &mut okm),
            Err(Error::BadArgument)
        );
    }
}
