#![deny(missing_docs)]

//! A library for hashing passwords and deriving encryption keys using
//! [Argon2](https://en.wikipedia.org/wiki/Argon2). Argon2 is a memory-hard
//! [key derivation function](https://en.wikipedia.org/wiki/Key_derivation_function) and was
//! the winner of the [Password Hashing Competition](https://www.password-hashing.net). It is
//! specified in [RFC 9106](https://www.rfc-editor.org/rfc/rfc9106).
//!
//! The whole algorithm is implemented in Rust: the Blake2b-based initial and variable-length
//! hashes, the BlaMka compression function, both addressing modes, and a lane scheduler that
//! fills independent lanes on separate threads. Working memory and intermediate digests are
//! zeroed before they are released.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! argon2-engine = "0.1.0"
//! ```
//!
//! Progress is reported through [`tracing`](https://docs.rs/tracing) at the `debug` and
//! `trace` levels. Install a subscriber to see it; nothing is logged otherwise, and no event
//! carries passwords, keys, salts, or block contents.
//!
//! # Examples
//!
//! Derive raw bytes:
//!
//! ```rust
//! use argon2_engine::{derive, Algorithm};
//!
//! let mut key = [0u8; 32];
//! derive(&mut key, b"password", b"somesalt", None, None, Algorithm::Argon2id, 2, 64, 2)
//!     .unwrap();
//! ```
//!
//! Validate parameters once and reuse them:
//!
//! ```rust
//! use argon2_engine::{derive_with_params, Algorithm, Params, Version};
//!
//! let params = Params::new(Algorithm::Argon2i, Version::V0x13, 1, 32, 3, 16).unwrap();
//!
//! let mut out = [0u8; 16];
//! derive_with_params(&mut out, b"password", b"somesalt", b"pepper", b"context", &params)
//!     .unwrap();
//! ```
//!
//! Hash a password, then verify the hash:
//!
//! ```rust
//! use argon2_engine::Hasher;
//!
//! let password = b"password";
//! let hash = Hasher::default()
//!         .memory_cost_kib(256)
//!         .iterations(2)
//!         .hash(password)
//!         .unwrap();
//! assert!(hash.verify(password));
//! ```
//!
//! Change the parameters used for hashing:
//!
//! ```rust
//! use argon2_engine::{Algorithm, Hasher};
//!
//! let password = b"password";
//!
//! let hash = Hasher::new()
//!         .algorithm(Algorithm::Argon2id)
//!         .salt_length(24)
//!         .hash_length(42)
//!         .iterations(3)
//!         .memory_cost_kib(512)
//!         .threads(2)
//!         .hash(password)
//!         .unwrap();
//!
//! assert!(hash.verify(password));
//! assert_eq!(hash.as_bytes().len(), 42);
//! assert_eq!(hash.salt_bytes().len(), 24);
//! ```
//!
//! Verify a hash from a hash string:
//!
//! ```rust
//! use argon2_engine::Hash;
//! use std::str::FromStr;
//!
//! let password = b"password";
//! let hash_string = "$argon2id$v=19$m=128,t=2,p=1$VnZ3ZFNhZkc$djHLRc+4K/DqQL0f8DMAQQ";
//!
//! let hash = Hash::from_str(hash_string).unwrap();
//! assert!(hash.verify(password));
//! ```
//!
//! Verify a hash from bytes:
//!
//! ```rust
//! use argon2_engine::{Algorithm, Hash};
//!
//! let salt = b"testsalt";
//! let hash_bytes = [155, 147, 76, 205, 220, 49, 114, 102];
//!
//! let hash = Hash::from_parts(
//!     &hash_bytes,
//!     salt,
//!     Algorithm::Argon2id,
//!     16, // memory cost in kibibytes
//!     1, // iterations
//!     1, // parallelism
//! );
//!
//! assert!(hash.verify(b"password"));
//! ```
//!
//! Use a secret (sometimes called a
//! "[pepper](https://en.wikipedia.org/wiki/Pepper_(cryptography))") for hashing and
//! verification:
//!
//! ```rust
//! use argon2_engine::{Hash, Hasher, Secret};
//! use std::str::FromStr;
//!
//! let password = b"password";
//! let secret = b"secret";
//!
//! let hash = Hasher::default()
//!         .memory_cost_kib(256)
//!         .iterations(2)
//!         .secret(secret.into())
//!         .hash(password)
//!         .unwrap();
//!
//! let hash_string = hash.to_string();
//! let hash = Hash::from_str(&hash_string).unwrap();
//!
//! assert!(hash.verify_with_secret(password, secret.into()));
//! assert!(!hash.verify(password));
//! ```

mod addressing;
mod block;
mod digest;
mod error;
mod fill;
mod hasher;
mod kdf;
mod lexer;
mod memory;
mod params;

pub use error::Argon2Error;
pub use hasher::{Hash, Hasher, Secret};
pub use kdf::{derive, derive_with_params};
pub use params::{
    Algorithm, Params, Version, MAX_MEMORY_COST_KIB, MAX_PARALLELISM, MIN_OUTPUT_LEN,
    MIN_PARALLELISM, MIN_TIME_COST,
};
