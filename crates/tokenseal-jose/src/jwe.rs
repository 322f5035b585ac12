//! Encrypted compact tokens.
//!
//! Encryption generates (or derives) a CEK, transports it according to the
//! key-management algorithm, then seals the payload with the content cipher using
//! the encoded protected header as AAD. Decryption is the inverse; nothing is
//! returned unless the content tag verifies.
//!
//! Key agreement (RFC 7518 §4.6) derives with Concat KDF over SHA-256. For
//! `ECDH-ES` the AlgorithmID is the `enc` value and the derived key is the CEK;
//! for `ECDH-ES+A*KW` it is the `alg` value and the derived key wraps the CEK.

use tokenseal_crypto::{
    aes_kw_unwrap, aes_kw_wrap, base64url_encode, concat_kdf, content_decrypt, content_encrypt,
    ephemeral_agree, jwa_other_info, random_bytes, recipient_agree, rsa_oaep_decrypt,
    rsa_oaep_encrypt, CryptoError, EcKeyPair, ShaVariant,
};
use zeroize::Zeroizing;

use crate::alg::{ContentEncryptionAlgorithm, KeyManagementAlgorithm};
use crate::compact::{join, parse_jwe, EphemeralPublicKey, Header};
use crate::error::JoseError;
use crate::key::Key;

/// Encrypt `payload` under `header`, whose `alg`/`enc` must name `alg` and `enc`.
pub fn encrypt_compact(
    alg: KeyManagementAlgorithm,
    enc: ContentEncryptionAlgorithm,
    header: &Header,
    payload: &[u8],
    key: &Key,
) -> Result<String, JoseError> {
    if header.alg() != alg.name() || header.enc() != Some(enc.name()) {
        return Err(JoseError::Config(format!(
            "header does not describe {alg} with {enc}"
        )));
    }
    let cipher = enc.cipher();

    let (cek, encrypted_key, header) = match (alg, key) {
        (KeyManagementAlgorithm::Direct, Key::Symmetric(shared)) => (
            Zeroizing::new(shared.as_bytes().to_vec()),
            Vec::new(),
            header.clone(),
        ),
        (KeyManagementAlgorithm::A128KW
        | KeyManagementAlgorithm::A192KW
        | KeyManagementAlgorithm::A256KW, Key::Symmetric(kek)) => {
            let cek = cipher.generate_key()?;
            let wrapped = aes_kw_wrap(kek.as_bytes(), &cek)?;
            (cek, wrapped, header.clone())
        }
        (KeyManagementAlgorithm::RsaOaep256, Key::Rsa(recipient)) => {
            let cek = cipher.generate_key()?;
            let encrypted = rsa_oaep_encrypt(recipient, &cek)?;
            (cek, encrypted, header.clone())
        }
        (agreement, Key::Ec(recipient)) if agreement.is_key_agreement() => {
            let exchange = ephemeral_agree(recipient.public_key())?;
            let header = header
                .clone()
                .with_epk(EphemeralPublicKey::from_public_key(&exchange.ephemeral_public));
            let derived = derive_agreement_key(agreement, enc, &exchange.shared_secret, &header)?;

            match agreement.wrap_key_len() {
                None => (derived, Vec::new(), header),
                Some(_) => {
                    let cek = cipher.generate_key()?;
                    let wrapped = aes_kw_wrap(&derived, &cek)?;
                    (cek, wrapped, header)
                }
            }
        }
        _ => {
            return Err(JoseError::KeyShapeInvalid(format!(
                "{alg} cannot use a {}",
                key.describe()
            )))
        }
    };

    let encoded_header = header.encode()?;
    let iv = cipher.generate_iv()?;
    let (ciphertext, tag) = content_encrypt(cipher, &cek, &iv, encoded_header.as_bytes(), payload)?;

    Ok(join(&[
        &encoded_header,
        &base64url_encode(&encrypted_key),
        &base64url_encode(&iv),
        &base64url_encode(&ciphertext),
        &base64url_encode(&tag),
    ]))
}

/// Decrypt an encrypted token whose header must name `expected_alg` and
/// `expected_enc`.
pub fn decrypt_compact(
    token: &str,
    expected_alg: KeyManagementAlgorithm,
    expected_enc: ContentEncryptionAlgorithm,
    key: &Key,
) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let parts = parse_jwe(token)?;
    if parts.header.alg() != expected_alg.name() || parts.header.enc() != Some(expected_enc.name()) {
        return Err(JoseError::AlgorithmMismatch);
    }
    let cipher = expected_enc.cipher();
    if parts.iv.len() != cipher.iv_len() {
        return Err(JoseError::MalformedToken(format!(
            "iv must be {} bytes, got {}",
            cipher.iv_len(),
            parts.iv.len()
        )));
    }
    if expected_alg.has_empty_encrypted_key() && !parts.encrypted_key.is_empty() {
        return Err(JoseError::MalformedToken(format!(
            "{expected_alg} carries no encrypted key"
        )));
    }

    let cek = match (expected_alg, key) {
        (KeyManagementAlgorithm::Direct, Key::Symmetric(shared)) => {
            Zeroizing::new(shared.as_bytes().to_vec())
        }
        (KeyManagementAlgorithm::A128KW
        | KeyManagementAlgorithm::A192KW
        | KeyManagementAlgorithm::A256KW, Key::Symmetric(kek)) => {
            recovered_or_random(aes_kw_unwrap(kek.as_bytes(), &parts.encrypted_key), expected_enc)?
        }
        (KeyManagementAlgorithm::RsaOaep256, Key::Rsa(recipient)) => {
            recovered_or_random(rsa_oaep_decrypt(recipient, &parts.encrypted_key), expected_enc)?
        }
        (agreement, Key::Ec(recipient)) if agreement.is_key_agreement() => {
            let derived = recipient_derive(agreement, expected_enc, recipient, &parts.header)?;
            match agreement.wrap_key_len() {
                None => derived,
                Some(_) => recovered_or_random(
                    aes_kw_unwrap(&derived, &parts.encrypted_key),
                    expected_enc,
                )?,
            }
        }
        _ => {
            return Err(JoseError::KeyShapeInvalid(format!(
                "{expected_alg} cannot use a {}",
                key.describe()
            )))
        }
    };

    let plaintext = content_decrypt(
        cipher,
        &cek,
        &parts.iv,
        parts.encoded_header.as_bytes(),
        &parts.ciphertext,
        &parts.tag,
    )?;
    Ok(plaintext)
}

/// A CEK that fails to unwrap, or unwraps to the wrong length, is replaced by a
/// random one so the failure surfaces as a tag mismatch (RFC 7516 §11.5).
fn recovered_or_random(
    unwrapped: Result<Zeroizing<Vec<u8>>, CryptoError>,
    enc: ContentEncryptionAlgorithm,
) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let expected_len = enc.cipher().key_len();
    match unwrapped {
        Ok(cek) if cek.len() == expected_len => Ok(cek),
        Ok(_) | Err(CryptoError::VerificationFailed) | Err(CryptoError::MalformedInput(_)) => {
            Ok(random_bytes(expected_len)?)
        }
        Err(other) => Err(other.into()),
    }
}

fn recipient_derive(
    alg: KeyManagementAlgorithm,
    enc: ContentEncryptionAlgorithm,
    recipient: &EcKeyPair,
    header: &Header,
) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let epk = header
        .epk()
        .ok_or_else(|| JoseError::MalformedToken(format!("{alg} requires epk")))?
        .to_public_key()?;
    if epk.curve() != recipient.curve() {
        return Err(JoseError::MalformedToken(format!(
            "epk is on {}, key is on {}",
            epk.curve(),
            recipient.curve()
        )));
    }
    let shared_secret = recipient_agree(recipient, &epk)?;
    derive_agreement_key(alg, enc, &shared_secret, header)
}

/// Concat KDF step shared by both directions.
fn derive_agreement_key(
    alg: KeyManagementAlgorithm,
    enc: ContentEncryptionAlgorithm,
    shared_secret: &[u8],
    header: &Header,
) -> Result<Zeroizing<Vec<u8>>, JoseError> {
    let (algorithm_id, key_len) = match alg.wrap_key_len() {
        Some(len) => (alg.name(), len),
        None => (enc.name(), enc.cipher().key_len()),
    };
    let key_len_bits = key_len * 8;
    let other_info = jwa_other_info(
        algorithm_id,
        &header.party_u_info()?,
        &header.party_v_info()?,
        key_len_bits as u32,
    )?;
    Ok(concat_kdf(ShaVariant::Sha256, shared_secret, key_len_bits, &other_info)?)
}
