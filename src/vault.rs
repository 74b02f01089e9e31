//! Credential sealing
//!
//! API secrets are stored in the database sealed with AES-256-GCM. The key is
//! derived from machine-specific identifiers, so a copied database cannot be
//! opened on another machine. A random 12-byte nonce is prefixed to every
//! ciphertext and the result is base64 encoded.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

const NONCE_SIZE: usize = 12;
const APP_SALT: &[u8] = b"warp-planner-credentials-v1";

/// Seals and opens secrets with a fixed 256-bit key
#[derive(Clone)]
pub struct Vault {
    key: [u8; 32],
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault").finish_non_exhaustive()
    }
}

impl Vault {
    /// Vault keyed to this machine
    pub fn machine() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(machine_id().as_bytes());
        if let Some(home) = dirs::home_dir() {
            hasher.update(home.to_string_lossy().as_bytes());
        }
        hasher.update(APP_SALT);
        Self {
            key: hasher.finalize().into(),
        }
    }

    /// Vault keyed from an arbitrary passphrase (tests, portable stores)
    pub fn with_key(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        hasher.update(APP_SALT);
        Self {
            key: hasher.finalize().into(),
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|_| anyhow::anyhow!("Invalid key length"))
    }

    /// Encrypt `plaintext` into a base64 string
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| anyhow::anyhow!("Failed to encrypt secret"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);
        Ok(STANDARD.encode(output))
    }

    /// Decrypt a string produced by [`Self::seal`]
    pub fn open(&self, sealed: &str) -> Result<String> {
        let bytes = STANDARD
            .decode(sealed.trim())
            .context("Sealed secret is not valid base64")?;
        if bytes.len() <= NONCE_SIZE {
            bail!("Sealed secret is truncated");
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| anyhow::anyhow!("Failed to decrypt secret (wrong machine key?)"))?;

        String::from_utf8(plaintext).context("Invalid UTF-8 in decrypted secret")
    }

    /// Serialize to JSON and seal
    pub fn seal_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = serde_json::to_string(value).context("Failed to serialize secret")?;
        self.seal(&json)
    }

    /// Open and deserialize JSON
    pub fn open_json<T: DeserializeOwned>(&self, sealed: &str) -> Result<T> {
        let json = self.open(sealed)?;
        serde_json::from_str(&json).context("Failed to parse decrypted secret")
    }
}

/// Machine identifier used for key derivation
fn machine_id() -> String {
    #[cfg(target_os = "linux")]
    {
        for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = std::fs::read_to_string(path) {
                let id = id.trim();
                if !id.is_empty() {
                    return id.to_string();
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(uuid) = stdout
                .lines()
                .find(|line| line.contains("IOPlatformUUID"))
                .and_then(|line| line.split('"').nth(3))
            {
                return uuid.to_string();
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(output) = std::process::Command::new("reg")
            .args([
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(guid) = stdout
                .lines()
                .find(|line| line.contains("MachineGuid"))
                .and_then(|line| line.split_whitespace().last())
            {
                return guid.to_string();
            }
        }
    }

    // Fallback: home directory path
    dirs::home_dir().map_or_else(
        || "warp-planner-fallback-key".to_string(),
        |p| p.to_string_lossy().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CredentialFields;

    #[test]
    fn test_seal_and_open() {
        let vault = Vault::with_key("test");
        let sealed = vault.seal("EAAB-token").unwrap();
        assert_ne!(sealed, "EAAB-token");
        assert_eq!(vault.open(&sealed).unwrap(), "EAAB-token");
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let vault = Vault::with_key("test");
        assert_ne!(vault.seal("same").unwrap(), vault.seal("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = Vault::with_key("one").seal("secret").unwrap();
        assert!(Vault::with_key("two").open(&sealed).is_err());
    }

    #[test]
    fn test_garbage_is_an_error() {
        let vault = Vault::with_key("test");
        assert!(vault.open("not base64 !!").is_err());
        assert!(vault.open("AAAA").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let vault = Vault::with_key("test");
        let mut fields = CredentialFields::default();
        fields.set("waba_id", "1029384756");
        let sealed = vault.seal_json(&fields).unwrap();
        let opened: CredentialFields = vault.open_json(&sealed).unwrap();
        assert_eq!(opened, fields);
    }
}
