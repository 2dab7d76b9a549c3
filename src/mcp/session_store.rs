//! Persisted wallet session
//!
//! Remembers the last connected wallet between restarts. The private key is
//! sealed with the master password (see [`super::encryption`]); the file
//! itself only exposes the address, wallet name and active chain.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use ethers_signers::{LocalWallet, Signer};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::encryption::{open_private_key, seal_private_key};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub wallet_name: String,
    /// Address derived from the sealed key.
    pub address: Address,
    /// "salt.payload", see `encryption::seal_private_key`.
    pub sealed_private_key: String,
    pub chain_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    session: Option<StoredSession>,
}

impl SessionStore {
    /// Reads the store at `path`; a missing file is an empty store.
    pub fn load(path: PathBuf) -> Result<Self> {
        let session = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session store {}", path.display()))?;
            serde_json::from_str::<Option<StoredSession>>(&content)
                .context("Failed to parse session store")?
        } else {
            None
        };
        Ok(Self { path, session })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Option<&StoredSession> {
        self.session.as_ref()
    }

    /// Seals `private_key` and writes it to disk, replacing any previous
    /// session.
    pub fn store(
        &mut self,
        wallet_name: &str,
        private_key: &SecretString,
        chain_id: u64,
        master_password: &SecretString,
    ) -> Result<Address> {
        if master_password.expose_secret().len() < MIN_PASSWORD_LEN {
            return Err(anyhow!(
                "Master password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ));
        }
        if wallet_name.trim().is_empty() {
            return Err(anyhow!("Wallet name cannot be empty"));
        }
        let wallet = wallet_from_key(private_key)?;

        let now = Utc::now();
        let session = StoredSession {
            wallet_name: wallet_name.trim().to_string(),
            address: wallet.address(),
            sealed_private_key: seal_private_key(private_key, master_password)?,
            chain_id,
            created_at: self.session.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };
        self.session = Some(session);
        self.save()?;
        Ok(wallet.address())
    }

    /// Decrypts the stored key. Returns the wallet and the chain it was last
    /// used on.
    pub fn unlock(&self, master_password: &SecretString) -> Result<(LocalWallet, u64)> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| anyhow!("No stored wallet session; pass a private_key to connect"))?;
        let key = open_private_key(&session.sealed_private_key, master_password)?;
        let wallet = wallet_from_key(&key)?;
        if wallet.address() != session.address {
            return Err(anyhow!("Stored session is corrupted: address mismatch"));
        }
        Ok((wallet, session.chain_id))
    }

    /// Records a chain switch. No-op when nothing is stored.
    pub fn set_chain(&mut self, chain_id: u64) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => {
                session.chain_id = chain_id;
                session.updated_at = Utc::now();
            }
            None => return Ok(()),
        }
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.session = None;
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    // Written to a sibling temp file first so a crash never leaves half a
    // session on disk.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session store directory")?;
        }
        let content = serde_json::to_string_pretty(&self.session)
            .context("Failed to serialize session store")?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write session store")?;
        fs::rename(&temp_path, &self.path).context("Failed to finalize session store")?;
        Ok(())
    }
}

pub fn wallet_from_key(private_key: &SecretString) -> Result<LocalWallet> {
    private_key
        .expose_secret()
        .trim()
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|_| anyhow!("Invalid private key format"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn store_and_unlock_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = SessionStore::load(path.clone()).unwrap();
        assert!(store.session().is_none());
        let address = store
            .store("main", &secret(KEY), 228, &secret("hunter2hunter2"))
            .unwrap();
        assert!(path.exists());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains(&KEY[2..]));

        let reloaded = SessionStore::load(path).unwrap();
        let (wallet, chain_id) = reloaded.unlock(&secret("hunter2hunter2")).unwrap();
        assert_eq!(wallet.address(), address);
        assert_eq!(chain_id, 228);
        assert!(reloaded.unlock(&secret("wrong-password")).is_err());
    }

    #[test]
    fn chain_switches_persist_and_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = SessionStore::load(path.clone()).unwrap();
        store.store("main", &secret(KEY), 228, &secret("hunter2hunter2")).unwrap();

        store.set_chain(56).unwrap();
        let reloaded = SessionStore::load(path.clone()).unwrap();
        assert_eq!(reloaded.session().unwrap().chain_id, 56);

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.unlock(&secret("hunter2hunter2")).is_err());
    }

    #[test]
    fn rejects_short_passwords_and_bad_keys() {
        let dir = tempdir().unwrap();
        let mut store = SessionStore::load(dir.path().join("s.json")).unwrap();
        assert!(store.store("main", &secret(KEY), 228, &secret("short")).is_err());
        assert!(store
            .store("main", &secret("0xnothex"), 228, &secret("hunter2hunter2"))
            .is_err());
        assert!(store.session().is_none());
    }
}
