//! Key material and primitive transforms for FastFile sections.
//!
//! Key lookup:  platform → 32-byte Salsa20 key (static, read-only registry)
//! Decryption:  Salsa20/20, 256-bit key, 64-bit nonce, block counter starts at 0
//! Digest:      SHA-1 over the section *ciphertext*, folded into the IV table
//!
//! The signature region of the container is never checked; no private key
//! exists to verify it.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

use crate::error::{FastFileError, Result};
use crate::platform::Platform;

pub const KEY_LEN:    usize = 32;
pub const NONCE_LEN:  usize = 8;
pub const DIGEST_LEN: usize = 20;

pub type Key   = [u8; KEY_LEN];
pub type Nonce = [u8; NONCE_LEN];
pub type SectionDigest = [u8; DIGEST_LEN];

/// Salsa20 key for WiiU containers.
pub const WIIU_KEY: Key = [
    0xB3, 0xBD, 0x6B, 0x2C, 0x82, 0x42, 0x8D, 0x11,
    0xB8, 0x88, 0x2D, 0x4C, 0x6D, 0x18, 0xCC, 0x79,
    0xE2, 0x70, 0x9F, 0x6B, 0xD4, 0x39, 0x91, 0x35,
    0xFD, 0xDE, 0x14, 0xE6, 0x8F, 0x3A, 0xBC, 0xCE,
];

/// Read-only platform → key table, passed into the decoder.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: HashMap<Platform, Key>,
}

impl KeyRegistry {
    /// A registry with no key material at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The keys shipped with this build. Only WiiU is provisioned.
    pub fn builtin() -> Self {
        Self::empty().with_key(Platform::WiiU, WIIU_KEY)
    }

    pub fn with_key(mut self, platform: Platform, key: Key) -> Self {
        self.keys.insert(platform, key);
        self
    }

    /// Resolve the key for `platform`.
    ///
    /// Returns `Err(FastFileError::UnsupportedPlatform)` when nothing is
    /// provisioned; decoding cannot proceed without key material.
    pub fn key_for(&self, platform: Platform) -> Result<&Key> {
        self.keys
            .get(&platform)
            .ok_or(FastFileError::UnsupportedPlatform(platform))
    }
}

/// XOR the Salsa20/20 keystream for (`key`, `nonce`) into `data` in place.
/// Encryption and decryption are the same operation.
pub fn apply_keystream(key: &Key, nonce: &Nonce, data: &mut [u8]) {
    let mut cipher = Salsa20::new(&(*key).into(), &(*nonce).into());
    cipher.apply_keystream(data);
}

/// SHA-1 of a section's ciphertext.
pub fn section_digest(ciphertext: &[u8]) -> SectionDigest {
    Sha1::digest(ciphertext).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_only_wiiu() {
        let reg = KeyRegistry::builtin();
        assert_eq!(reg.key_for(Platform::WiiU).unwrap(), &WIIU_KEY);
        assert!(matches!(
            reg.key_for(Platform::Pc),
            Err(FastFileError::UnsupportedPlatform(Platform::Pc))
        ));
    }

    #[test]
    fn injected_key_is_returned() {
        let reg = KeyRegistry::empty().with_key(Platform::Pc, [7u8; KEY_LEN]);
        assert_eq!(reg.key_for(Platform::Pc).unwrap(), &[7u8; KEY_LEN]);
        assert!(matches!(
            reg.key_for(Platform::WiiU),
            Err(FastFileError::UnsupportedPlatform(Platform::WiiU))
        ));
    }

    #[test]
    fn keystream_is_an_involution() {
        let key = [0x11u8; KEY_LEN];
        let nonce = *b"tttteeee";
        let plain = b"section payload bytes".to_vec();
        let mut buf = plain.clone();
        apply_keystream(&key, &nonce, &mut buf);
        assert_ne!(buf, plain);
        apply_keystream(&key, &nonce, &mut buf);
        assert_eq!(buf, plain);
    }

    #[test]
    fn sha1_known_vector() {
        assert_eq!(
            hex::encode(section_digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}
