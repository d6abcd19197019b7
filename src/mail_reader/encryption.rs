use anyhow::{Result};
use std::fs;
use std::path::{Path, PathBuf};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::info;
use rand::RngCore;

use crate::settings::Account;

const PASSWORD_FILE_PREFIX: &str = ".encrypted_password";
const KEY_FILE: &str = ".encryption_key";
const NONCE_LEN: usize = 12;

pub fn get_encryption_key(dir: &Path) -> Result<Aes256Gcm> {
    let key_path = dir.join(KEY_FILE);
    let key = if key_path.exists() {
        // Read existing key
        let key_bytes = fs::read(key_path)?;
        Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to create cipher from key: {}", e))?
    } else {
        // Generate new key
        let mut key_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key_bytes);
        fs::write(key_path, key_bytes)?;
        Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to create cipher from new key: {}", e))?
    };
    Ok(key)
}

pub fn encrypt_password(cipher: &Aes256Gcm, password: &str) -> Result<String> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher.encrypt(nonce, password.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to encrypt password: {}", e))?;

    let mut combined = Vec::new();
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(&combined))
}

pub fn decrypt_password(cipher: &Aes256Gcm, encrypted: &str) -> Result<String> {
    let combined = BASE64.decode(encrypted.trim())
        .map_err(|e| anyhow::anyhow!("Failed to decode base64: {}", e))?;

    if combined.len() < NONCE_LEN {
        anyhow::bail!("Encrypted password is truncated");
    }
    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher.decrypt(nonce, ciphertext)
        .map_err(|e| anyhow::anyhow!("Failed to decrypt password: {}", e))?;

    String::from_utf8(plaintext)
        .map_err(|e| anyhow::anyhow!("Failed to convert decrypted bytes to string: {}", e))
}

fn password_path(dir: &Path, account_name: &str) -> PathBuf {
    dir.join(format!("{PASSWORD_FILE_PREFIX}.{account_name}"))
}

// Password stored in the config wins, then the encrypted store, then a prompt
pub fn get_credentials(dir: &Path, account_name: &str, account: &Account) -> Result<(String, String)> {
    if let Some(password) = &account.password {
        return Ok((account.account.clone(), password.clone()));
    }

    let cipher = get_encryption_key(dir)?;
    let password_path = password_path(dir, account_name);

    let password = if password_path.exists() {
        // Read and decrypt stored password
        let encrypted = fs::read_to_string(password_path)?;
        decrypt_password(&cipher, &encrypted)?
    } else {
        // Get new password and store it
        let password = rpassword::prompt_password(format!("Password for {}: ", account.account))?;
        let encrypted = encrypt_password(&cipher, &password)?;
        fs::write(&password_path, encrypted)?;
        info!("-- stored encrypted password in {}", password_path.display());
        password
    };

    Ok((account.account.clone(), password))
}
