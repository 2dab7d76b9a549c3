// src/mcp/encryption.rs
//
// Password-based sealing of wallet keys for the session store.
// Sealed format: "<salt b64>.<nonce|ciphertext b64>" (unpadded standard base64).

use aes_gcm::{
    aead::{Aead, OsRng},
    AeadCore, Aes256Gcm, Key, KeyInit, Nonce,
};
use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;

/// AES-256-GCM key stretched from the master password with Argon2.
struct SealingKey(Key<Aes256Gcm>);

impl SealingKey {
    fn derive(password: &SecretString, salt: &SaltString) -> Result<Self> {
        let hash = Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), salt)
            .map_err(|e| anyhow!("key derivation failed: {}", e))?;
        let output = hash.hash.ok_or_else(|| anyhow!("key derivation produced no output"))?;
        if output.len() != 32 {
            return Err(anyhow!("unexpected derived key length {}", output.len()));
        }
        Ok(Self(Key::<Aes256Gcm>::clone_from_slice(output.as_bytes())))
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(&self.0);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| anyhow!("encryption failed: {}", e))?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if sealed.len() <= NONCE_LEN {
            return Err(anyhow!("sealed data is truncated"));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        Aes256Gcm::new(&self.0)
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| anyhow!("decryption failed (wrong master password?)"))
    }
}

/// Encrypts `private_key` under `password` with a fresh salt and nonce.
pub fn seal_private_key(private_key: &SecretString, password: &SecretString) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let key = SealingKey::derive(password, &salt)?;
    let sealed = key.seal(private_key.expose_secret().as_bytes())?;

    Ok(format!(
        "{}.{}",
        STANDARD_NO_PAD.encode(salt.as_str()),
        STANDARD_NO_PAD.encode(sealed)
    ))
}

pub fn open_private_key(sealed: &str, password: &SecretString) -> Result<SecretString> {
    let (salt_b64, payload_b64) = sealed
        .split_once('.')
        .ok_or_else(|| anyhow!("sealed key has no salt separator"))?;

    let salt_raw = STANDARD_NO_PAD.decode(salt_b64).context("salt is not base64")?;
    let salt_str = std::str::from_utf8(&salt_raw).context("salt is not UTF-8")?;
    let salt = SaltString::from_b64(salt_str).map_err(|e| anyhow!("invalid salt: {}", e))?;
    let payload = STANDARD_NO_PAD.decode(payload_b64).context("payload is not base64")?;

    let plaintext = SealingKey::derive(password, &salt)?.open(&payload)?;
    let key = std::str::from_utf8(&plaintext).context("decrypted key is not UTF-8")?;
    Ok(SecretString::new(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn sealed_keys_open_with_the_same_password() {
        let sealed = seal_private_key(&secret("0xdeadbeef"), &secret("correct horse")).unwrap();
        assert!(!sealed.contains("deadbeef"));
        let opened = open_private_key(&sealed, &secret("correct horse")).unwrap();
        assert_eq!(opened.expose_secret(), "0xdeadbeef");
    }

    #[test]
    fn wrong_password_or_tampering_fails() {
        let sealed = seal_private_key(&secret("0xdeadbeef"), &secret("correct horse")).unwrap();
        assert!(open_private_key(&sealed, &secret("battery staple")).is_err());
        assert!(open_private_key("no-separator", &secret("correct horse")).is_err());

        let (salt, _) = sealed.split_once('.').unwrap();
        let truncated = format!("{}.{}", salt, STANDARD_NO_PAD.encode([0u8; 4]));
        assert!(open_private_key(&truncated, &secret("correct horse")).is_err());
    }

    #[test]
    fn each_seal_uses_fresh_randomness() {
        let a = seal_private_key(&secret("k"), &secret("password1")).unwrap();
        let b = seal_private_key(&secret("k"), &secret("password1")).unwrap();
        assert_ne!(a, b);
    }
}
