//! Encryption envelope for the pension endpoints
//!
//! Wire format: `hex(salt) ‖ hex(iv) ‖ base64(ciphertext)` with no delimiter,
//! so decoding slices fixed widths (64 hex chars of salt, 32 of IV).
//!
//! The key is derived with PBKDF2-HMAC-SHA256 (1000 iterations, 16 bytes)
//! from the session passphrase and a fresh 32-byte salt; the payload is
//! AES-128-CBC with PKCS#7 padding and a fresh 16-byte IV.

use crate::{Error, Result, session::SessionContext};
use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const KEY_LEN: usize = 16;
pub const BLOCK_SIZE: usize = 16;
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// Hex width of the salt prefix
pub const SALT_HEX_LEN: usize = SALT_LEN * 2;
/// Hex width of the IV following the salt
pub const IV_HEX_LEN: usize = IV_LEN * 2;
/// Fixed-width hex prefix preceding the base64 ciphertext
pub const PREFIX_LEN: usize = SALT_HEX_LEN + IV_HEX_LEN;

/// Envelope codec bound to one passphrase
#[derive(Clone)]
pub struct Envelope {
    passphrase: String,
}

impl Envelope {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    /// Codec keyed by the session's passphrase
    pub fn for_session(session: &SessionContext) -> Self {
        Self::new(session.passphrase())
    }

    /// Encrypt `plaintext` under a fresh random salt and IV
    pub fn encode(&self, plaintext: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        self.encode_with(plaintext, &salt, &iv)
    }

    fn encode_with(&self, plaintext: &str, salt: &[u8; SALT_LEN], iv: &[u8; IV_LEN]) -> String {
        let key = self.derive_key(salt);
        let ciphertext = Aes128CbcEnc::new(&key.into(), &(*iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        format!(
            "{}{}{}",
            hex::encode(salt),
            hex::encode(iv),
            STANDARD.encode(ciphertext)
        )
    }

    /// Decrypt an envelope string; never yields partial plaintext
    pub fn decode(&self, envelope: &str) -> Result<String> {
        let envelope = envelope.trim();
        if envelope.len() < PREFIX_LEN {
            return Err(Error::envelope(format!(
                "envelope has {} chars, expected at least {}",
                envelope.len(),
                PREFIX_LEN
            )));
        }

        let salt_hex = envelope
            .get(..SALT_HEX_LEN)
            .ok_or_else(|| Error::envelope("salt is not ASCII hex"))?;
        let iv_hex = envelope
            .get(SALT_HEX_LEN..PREFIX_LEN)
            .ok_or_else(|| Error::envelope("iv is not ASCII hex"))?;
        let body = envelope
            .get(PREFIX_LEN..)
            .ok_or_else(|| Error::envelope("ciphertext is not ASCII"))?;

        let mut salt = [0u8; SALT_LEN];
        hex::decode_to_slice(salt_hex, &mut salt)
            .map_err(|e| Error::envelope(format!("invalid salt hex: {}", e)))?;
        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(iv_hex, &mut iv)
            .map_err(|e| Error::envelope(format!("invalid iv hex: {}", e)))?;

        let ciphertext = STANDARD
            .decode(body)
            .map_err(|e| Error::envelope(format!("invalid ciphertext base64: {}", e)))?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::envelope(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }

        let key = self.derive_key(&salt);
        let plaintext = Aes128CbcDec::new(&key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| Error::envelope("invalid padding"))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::envelope(format!("plaintext is not UTF-8: {}", e)))
    }

    fn derive_key(&self, salt: &[u8]) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(self.passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
        key
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope").finish_non_exhaustive()
    }
}
