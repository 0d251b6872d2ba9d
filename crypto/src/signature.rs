// Copyright (C) 2024 The ferrocoin developers
// This file is part of the ferrocoin library.

// The ferrocoin library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The ferrocoin library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the ferrocoin library. If not, see <https://www.gnu.org/licenses/>.

use crate::{decode_private_key, decode_public_key, CryptoError};

use rsa::{
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    signature::{SignatureEncoding, Signer, Verifier},
};
use sha2::Sha256;
use tracing::trace;

/// Produces a detached RSA-PKCS#1-v1.5-SHA256 signature over `message`,
/// hex-encoded.
pub fn sign(private_key_pem: &str, message: &[u8]) -> Result<String, CryptoError> {
    let private = decode_private_key(private_key_pem)?;
    let signing_key = SigningKey::<Sha256>::new(private);
    let signature = signing_key.try_sign(message)?;

    Ok(hex::encode(signature.to_bytes()))
}

/// Verifies a detached hex-encoded signature against `message`.
///
/// Any decoding failure counts as an invalid signature: the wire is assumed
/// adversarial, so this never returns an error and never panics.
pub fn verify(public_key_pem: &str, message: &[u8], signature_hex: &str) -> bool {
    match try_verify(public_key_pem, message, signature_hex) {
        Ok(valid) => valid,
        Err(error) => {
            trace!("signature rejected during decode: {}", error);
            false
        }
    }
}

fn try_verify(public_key_pem: &str, message: &[u8], signature_hex: &str) -> Result<bool, CryptoError> {
    let public = decode_public_key(public_key_pem)?;
    let verifying_key = VerifyingKey::<Sha256>::new(public);

    let signature_bytes = hex::decode(signature_hex)?;
    let signature =
        Signature::try_from(signature_bytes.as_slice()).map_err(|_| CryptoError::InvalidSignature)?;

    Ok(verifying_key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPair;

    #[test]
    fn sign_verify_roundtrip() {
        let pair = KeyPair::generate().unwrap();
        let message = b"{\"amount\":50.0}";

        let signature = sign(&pair.private_key, message).unwrap();
        assert!(verify(&pair.public_key, message, &signature));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let pair = KeyPair::generate().unwrap();

        let signature = sign(&pair.private_key, b"amount=50").unwrap();
        assert!(!verify(&pair.public_key, b"amount=51", &signature));
    }

    #[test]
    fn foreign_key_fails_verification() {
        let pair = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();

        let signature = sign(&pair.private_key, b"message").unwrap();
        assert!(!verify(&other.public_key, b"message", &signature));
    }

    #[test]
    fn garbage_signature_is_rejected_not_fatal() {
        let pair = KeyPair::generate().unwrap();

        assert!(!verify(&pair.public_key, b"message", "not-hex"));
        assert!(!verify(&pair.public_key, b"message", "deadbeef"));
        assert!(!verify("not a pem key", b"message", "deadbeef"));
    }
}
