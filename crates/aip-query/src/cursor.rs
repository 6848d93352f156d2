//! Encrypted, order-bound page tokens.
//!
//! A page token carries the last record of a page, projected down to the
//! fields the order sorts on. It is serialized as MessagePack, which
//! keeps every float bit pattern including NaN and infinities, sealed with an authenticated cipher whose associated data binds it to the
//! caller's context and the order's canonical text, then base64url encoded.
//!
//! Decoding under a different order, a different context or a different
//! key fails with [`Error::InvalidPageToken`], as does any tampering. The
//! failure carries no detail; the cause is logged at debug level only.
//!
//! # Example
//!
//! ```
//! use aip_query::{cursor_filter, ChaChaAead, CursorCodec, Order, Record};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Record, Default, Serialize, Deserialize)]
//! struct Book {
//!     title: String,
//!     page_count: i64,
//! }
//!
//! let codec = CursorCodec::new(ChaChaAead::generate());
//! let order = Order::parse("title").unwrap();
//!
//! let last = Book { title: "Dune".into(), page_count: 412 };
//! let token = codec.encode(&last, &order, b"shelf/1").unwrap();
//!
//! let cursor: Book = codec.decode(&token, &order, b"shelf/1").unwrap();
//! assert_eq!(cursor.title, "Dune");
//! assert_eq!(cursor.page_count, 0);
//!
//! let after = cursor_filter(cursor, &order).unwrap();
//! assert!(after.matches(&Book { title: "Emma".into(), page_count: 0 }));
//! assert!(!after.matches(&Book { title: "Dune".into(), page_count: 0 }));
//! ```

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chacha20poly1305::aead::{Aead as _, AeadCore, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::ordering::{Comparator, Order};
use crate::record::Record;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Opaque failure of an [`Aead`] operation.
#[derive(Debug, Clone, Copy, Error)]
#[error("authenticated encryption failed")]
pub struct AeadError;

/// Authenticated encryption with associated data.
///
/// Implementations must be deterministic functions of key, input and
/// associated data (apart from nonce generation) and safe to call from many
/// threads at once.
pub trait Aead: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> std::result::Result<Vec<u8>, AeadError>;

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> std::result::Result<Vec<u8>, AeadError>;
}

/// ChaCha20-Poly1305 with a random 96-bit nonce prepended to each ciphertext.
#[derive(Clone)]
pub struct ChaChaAead {
    cipher: ChaCha20Poly1305,
}

impl ChaChaAead {
    /// Uses a 32-byte key. The caller keeps ownership of the key bytes.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        ChaChaAead {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Uses a key given as a byte slice; it must be 32 bytes long.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| {
            Error::Config(format!(
                "page token key must be {KEY_LEN} bytes, got {}",
                key.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// Uses a standard base64 encoded 32-byte key.
    pub fn from_base64(text: &str) -> Result<Self> {
        let mut bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| Error::Config(format!("page token key is not base64: {e}")))?;
        let aead = Self::from_slice(&bytes);
        bytes.zeroize();
        aead
    }

    /// Uses a fresh random key. Tokens will not survive a restart.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        let aead = Self::new(&key);
        key.zeroize();
        aead
    }

    /// Produces a fresh random key as standard base64 text.
    pub fn generate_key_base64() -> String {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        let text = STANDARD.encode(key);
        key.zeroize();
        text
    }
}

impl Aead for ChaChaAead {
    fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> std::result::Result<Vec<u8>, AeadError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError)?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], associated_data: &[u8]) -> std::result::Result<Vec<u8>, AeadError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(AeadError);
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError)
    }
}

impl fmt::Debug for ChaChaAead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChaChaAead(..)")
    }
}

/// Encodes and decodes page tokens with a caller-supplied [`Aead`].
#[derive(Debug, Clone)]
pub struct CursorCodec<A> {
    aead: A,
}

impl<A: Aead> CursorCodec<A> {
    pub fn new(aead: A) -> Self {
        CursorCodec { aead }
    }

    /// Creates a token for resuming after `record` under `order`.
    pub fn encode<R>(&self, record: &R, order: &Order, context: &[u8]) -> Result<String>
    where
        R: Record + Default + Serialize,
    {
        let projected = project(record, order)?;
        let plaintext = rmp_serde::to_vec_named(&projected)?;
        let sealed = self
            .aead
            .encrypt(&plaintext, &associated_data(order, context))
            .map_err(|_| Error::Encryption)?;
        let token = URL_SAFE_NO_PAD.encode(sealed);
        tracing::debug!(order = %order, bytes = token.len(), "created page token");
        Ok(token)
    }

    /// Recovers the projected record from a token made by [`encode`].
    ///
    /// `order` and `context` must be exactly those used to create it.
    ///
    /// [`encode`]: CursorCodec::encode
    pub fn decode<R>(&self, token: &str, order: &Order, context: &[u8]) -> Result<R>
    where
        R: Record + Default + DeserializeOwned,
    {
        order.comparator::<R>()?;
        let sealed = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| rejected("base64", e))?;
        let plaintext = self
            .aead
            .decrypt(&sealed, &associated_data(order, context))
            .map_err(|e| rejected("authentication", e))?;
        rmp_serde::from_slice(&plaintext).map_err(|e| rejected("deserialization", e))
    }
}

fn rejected(stage: &str, cause: impl fmt::Display) -> Error {
    tracing::debug!(stage, %cause, "rejected page token");
    Error::InvalidPageToken
}

/// `context ‖ 0x00 ‖ canonical order text`
fn associated_data(order: &Order, context: &[u8]) -> Vec<u8> {
    let canonical = order.canonical_text();
    let mut ad = Vec::with_capacity(context.len() + 1 + canonical.len());
    ad.extend_from_slice(context);
    ad.push(0);
    ad.extend_from_slice(canonical.as_bytes());
    ad
}

/// Copies only the fields named by `order` into a fresh default record.
///
/// Embedded records on a path are created only when the source has them.
pub fn project<R: Record + Default>(record: &R, order: &Order) -> Result<R> {
    order.comparator::<R>()?;
    let mut projected = R::default();
    for key in order.keys() {
        copy_path(record, &mut projected, key.field.segments())?;
    }
    Ok(projected)
}

fn copy_path(src: &dyn Record, dst: &mut dyn Record, segments: &[String]) -> Result<()> {
    let Some((name, rest)) = segments.split_first() else {
        return Ok(());
    };
    let Some(field) = src.field(name) else {
        return Ok(());
    };
    if rest.is_empty() {
        if let Some(target) = dst.field_mut(name) {
            target.assign(&field.value())?;
        }
        return Ok(());
    }
    if !field.is_set() {
        return Ok(());
    }
    let (Some(child), Some(target)) = (
        field.value().as_record(),
        dst.field_mut(name).and_then(|f| f.record_mut()),
    ) else {
        return Ok(());
    };
    copy_path(child, target, rest)
}

/// Builds the "strictly after the cursor" predicate for `order`.
pub fn cursor_filter<R: Record>(cursor: R, order: &Order) -> Result<CursorFilter<R>> {
    Ok(CursorFilter {
        less: order.comparator()?,
        cursor,
    })
}

/// Matches records that sort strictly after a cursor record.
pub struct CursorFilter<R> {
    cursor: R,
    less: Comparator<R>,
}

impl<R: Record> CursorFilter<R> {
    pub fn matches(&self, record: &R) -> bool {
        self.less.less(&self.cursor, record)
    }

    pub fn cursor(&self) -> &R {
        &self.cursor
    }
}

impl<R: fmt::Debug> fmt::Debug for CursorFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorFilter")
            .field("cursor", &self.cursor)
            .field("order", &self.less)
            .finish()
    }
}
