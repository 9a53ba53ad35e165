//! Record signing.
//!
//! The canonical hash is SHA-256 over the raw unsigned record bytes (the
//! binary transaction, not its hex text). Signatures are deterministic
//! (RFC 6979) P-256 ECDSA; the wire stores `r` and `s` little-endian,
//! reversed from the primitive's big-endian output. That asymmetry with the
//! rest of the format is load-bearing for node compatibility.

use crate::codec;
use crate::types::{RecordSignature, TransactionRecord};
use crate::TxError;
use p256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};
use signature::hazmat::PrehashSigner;
use upow_types::Address;

/// SHA-256 of raw record bytes. The node also identifies transactions by
/// this hash over the signed form.
pub fn record_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Holds the signing key, if any. A key-less signer can still be used for
/// building and decoding but refuses to sign.
pub struct Signer {
    key: Option<SigningKey>,
}

impl Signer {
    /// Build from a hex-encoded P-256 scalar. Shorter keys are accepted and
    /// left-padded, as wallet exports commonly strip leading zeros.
    pub fn from_private_key_hex(key_hex: &str) -> Result<Self, TxError> {
        let trimmed = key_hex.trim().trim_start_matches("0x");
        if trimmed.is_empty()
            || trimmed.len() > 64
            || !trimmed.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(TxError::InvalidPrivateKey);
        }
        let padded = format!("{trimmed:0>64}");
        let bytes = hex::decode(&padded).map_err(|_| TxError::InvalidPrivateKey)?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| TxError::InvalidPrivateKey)?;
        Ok(Self { key: Some(key) })
    }

    /// A signer without a key, for watch-only use.
    pub fn watch_only() -> Self {
        Self { key: None }
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// The address belonging to the configured key.
    pub fn address(&self) -> Result<Address, TxError> {
        let key = self.key.as_ref().ok_or(TxError::MissingPrivateKey)?;
        Ok(Address::from_verifying_key(key.verifying_key()))
    }

    /// Sign an unsigned record, returning a copy with the signature
    /// attached. Any existing signature is discarded and recomputed.
    pub fn sign_record(&self, record: &TransactionRecord) -> Result<TransactionRecord, TxError> {
        let key = self.key.as_ref().ok_or(TxError::MissingPrivateKey)?;

        let mut signed = record.clone();
        signed.signature = None;
        let bytes = codec::encode(&signed)?;
        let hash = record_hash(&bytes);

        let sig: Signature = key.sign_prehash(&hash).map_err(|_| TxError::SigningFailed)?;
        let (r, s) = sig.split_bytes();

        let mut wire = RecordSignature { r: [0u8; 32], s: [0u8; 32] };
        for (dst, src) in wire.r.iter_mut().zip(r.iter().rev()) {
            *dst = *src;
        }
        for (dst, src) in wire.s.iter_mut().zip(s.iter().rev()) {
            *dst = *src;
        }

        signed.signature = Some(wire);
        Ok(signed)
    }

    /// Sign and return the final hex string, ready for broadcast.
    pub fn sign_to_hex(&self, record: &TransactionRecord) -> Result<String, TxError> {
        codec::encode_hex(&self.sign_record(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TxInput, TxOutput};
    use num_bigint::BigUint;
    use p256::ecdsa::signature::hazmat::PrehashVerifier;
    use upow_types::OutputKind;

    const KEY_HEX: &str = "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721";

    fn sample_record() -> TransactionRecord {
        let mut addr_bytes = [0x44u8; 33];
        addr_bytes[0] = 42;
        let address = Address::from_bytes(&addr_bytes).unwrap();
        TransactionRecord::new(
            vec![TxInput { tx_hash: [0xAB; 32], index: 0 }],
            vec![TxOutput::new(address, BigUint::from(1_000u64), OutputKind::Regular)],
            None,
        )
    }

    #[test]
    fn test_watch_only_refuses_to_sign() {
        let signer = Signer::watch_only();
        assert!(!signer.has_key());
        assert!(matches!(signer.address(), Err(TxError::MissingPrivateKey)));
        assert!(matches!(
            signer.sign_record(&sample_record()),
            Err(TxError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_key_parsing() {
        assert!(Signer::from_private_key_hex(KEY_HEX).unwrap().has_key());
        // Unpadded short keys are accepted.
        assert!(Signer::from_private_key_hex("1").unwrap().has_key());
        assert!(Signer::from_private_key_hex("0x1").unwrap().has_key());

        assert!(matches!(
            Signer::from_private_key_hex(""),
            Err(TxError::InvalidPrivateKey)
        ));
        assert!(matches!(
            Signer::from_private_key_hex("not hex"),
            Err(TxError::InvalidPrivateKey)
        ));
        // Zero is not a valid scalar.
        assert!(matches!(
            Signer::from_private_key_hex("00"),
            Err(TxError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_signed_record_layout() {
        let signer = Signer::from_private_key_hex(KEY_HEX).unwrap();
        let record = sample_record();
        let signed = signer.sign_record(&record).unwrap();
        assert!(signed.is_signed());

        let unsigned_len = codec::encode(&record).unwrap().len();
        let signed_len = codec::encode(&signed).unwrap().len();
        assert_eq!(signed_len, unsigned_len + 64);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = Signer::from_private_key_hex(KEY_HEX).unwrap();
        let record = sample_record();
        let a = signer.sign_record(&record).unwrap();
        let b = signer.sign_record(&record).unwrap();
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_wire_signature_is_reversed_and_verifies() {
        let signer = Signer::from_private_key_hex(KEY_HEX).unwrap();
        let record = sample_record();
        let signed = signer.sign_record(&record).unwrap();
        let wire = signed.signature.unwrap();

        // Undo the wire reversal to recover the primitive's big-endian form.
        let mut r_be = wire.r;
        let mut s_be = wire.s;
        r_be.reverse();
        s_be.reverse();
        let sig = Signature::from_scalars(r_be, s_be).unwrap();

        let hash = record_hash(&codec::encode(&record).unwrap());
        let key = SigningKey::from_slice(&hex::decode(KEY_HEX).unwrap()).unwrap();
        assert!(key.verifying_key().verify_prehash(&hash, &sig).is_ok());
    }

    #[test]
    fn test_sign_to_hex_appends_signature() {
        let signer = Signer::from_private_key_hex(KEY_HEX).unwrap();
        let record = sample_record();
        let unsigned_hex = codec::encode_hex(&record).unwrap();
        let signed_hex = signer.sign_to_hex(&record).unwrap();
        assert!(signed_hex.starts_with(&unsigned_hex));
        assert_eq!(signed_hex.len(), unsigned_hex.len() + 128);
    }

    #[test]
    fn test_resigning_discards_old_signature() {
        let signer = Signer::from_private_key_hex(KEY_HEX).unwrap();
        let mut record = sample_record();
        record.signature = Some(RecordSignature { r: [9; 32], s: [9; 32] });
        let signed = signer.sign_record(&record).unwrap();
        assert_ne!(signed.signature.unwrap().r, [9; 32]);
    }

    #[test]
    fn test_record_hash_is_sha256_of_bytes() {
        // SHA-256 of the empty input is a fixed vector.
        let empty = record_hash(&[]);
        assert_eq!(
            hex::encode(empty),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
