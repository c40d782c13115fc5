use crate::error::Argon2Error;
use crate::kdf::derive_with_params;
use crate::lexer::TokenizedHash;
use crate::params::{Algorithm, Params, Version};

use base64::engine::general_purpose::STANDARD_NO_PAD as b64_stdnopad;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

/// A secret that mixes with a password (and a salt) to create a hash. This is sometimes
/// referred to as a "[pepper](https://en.wikipedia.org/wiki/Pepper_(cryptography))."
///
/// A 32-byte key is recommended. Do not use an alphanumeric password or passphrase; the
/// entrophy of a 32-character password is much lower than the entrophy of a 32-byte key. This
/// key should be generated with a cryptographically-secure random number generator and stored
/// securely.
#[derive(Clone, Copy, Debug)]
pub struct Secret<'a>(&'a [u8]);

impl<'a> Secret<'a> {
    /// Wraps a reference to a slice containing a secret key
    pub fn using<T: AsRef<[u8]>>(secret: &'a T) -> Self {
        Self(secret.as_ref())
    }
}

impl<'a> From<&'a [u8]> for Secret<'a> {
    fn from(secret: &'a [u8]) -> Self {
        Self(secret)
    }
}

impl<'a> From<&'a Vec<u8>> for Secret<'a> {
    fn from(secret: &'a Vec<u8>) -> Self {
        Self(secret)
    }
}

impl<'a, const SIZE: usize> From<&'a [u8; SIZE]> for Secret<'a> {
    fn from(secret: &'a [u8; SIZE]) -> Self {
        Self(secret)
    }
}

impl<'a> From<&'a str> for Secret<'a> {
    fn from(secret: &'a str) -> Self {
        Self(secret.as_bytes())
    }
}

impl<'a> From<&'a String> for Secret<'a> {
    fn from(secret: &'a String) -> Self {
        Self(secret.as_bytes())
    }
}

/// A builder for a hash. Parameters for hashing, such as the algorithm, the memory cost and
/// the salt, are set with chained calls before [`Hasher::hash`] consumes the builder.
#[derive(Clone, Debug)]
pub struct Hasher<'a> {
    alg: Algorithm,
    version: Version,
    custom_salt: Option<&'a [u8]>,
    salt_len: u32,
    hash_len: u32,
    iterations: u32,
    mem_cost_kib: u32,
    threads: u32,
    secret: Option<Secret<'a>>,
}

impl Default for Hasher<'_> {
    /// Create a new `Hasher` with default values.
    ///
    /// This provides some reasonable defaults, but it is recommended that you tinker with
    /// these parameters to find the best settings for your application. The more resources the
    /// hashing requires, the stronger the hash. Increase the memory cost (and perhaps the
    /// parallelization factor) as high as your application can afford, then likewise raise the
    /// iteration count.
    ///
    /// The defaults are as follows:
    ///
    /// * Algorithm: Argon2id
    /// * Version: 0x13
    /// * Salt Length: 16 bytes
    /// * Hash Length: 32 bytes
    /// * Iterations: 18
    /// * Memory Cost: 62500 kibibytes (equal to 64 megabytes)
    /// * Parallelization Factor: 1 thread
    fn default() -> Self {
        Self {
            alg: Algorithm::Argon2id,
            version: Version::V0x13,
            custom_salt: None,
            salt_len: 16,
            hash_len: 32,
            iterations: 18,
            mem_cost_kib: 62500,
            threads: 1,
            secret: None,
        }
    }
}

impl<'a> Hasher<'a> {
    /// Create a new `Hasher` with default values. See [`Hasher::default`] for the values.
    ///
    /// `Hasher` allows for a secret, sometimes called a
    /// "[pepper](https://en.wikipedia.org/wiki/Pepper_(cryptography))," to be mixed with the
    /// password before hashing. `Hasher` can be used securely without a secret, though
    /// high-security applications might consider using one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the hashing algorithm to use.
    ///
    /// Unless you are _absolutely positive_ you want to use a different algorithm, use
    /// the default argon2id algorithm for password hashing and key derivation.
    pub fn algorithm(mut self, alg: Algorithm) -> Self {
        self.alg = alg;
        self
    }

    /// Specifies the Argon2 version. Version 0x13 is the default and should be used for new
    /// hashes; version 0x10 exists to reproduce hashes made by older implementations.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// When left unspecified, a salt is generated using a cryptographically-secure random
    /// number generator. In most cases, this function should not be used. Only use this
    /// function if you are trying to generate a hash deterministically with a known salt and
    /// a randomly generated salt will not suffice.
    pub fn custom_salt<SLT>(mut self, salt: &'a SLT) -> Self
    where
        SLT: AsRef<[u8]> + ?Sized,
    {
        self.custom_salt = Some(salt.as_ref());
        self
    }

    /// The length of the salt for the hash, in bytes. Using salt that is too short can lower
    /// the strength of the generated hash. 16 bytes is a reasonable default salt length.
    ///
    /// If a salt is specified manually using [`Hasher::custom_salt`], the length of the
    /// provided salt will override the length specified here.
    pub fn salt_length(mut self, salt_len: u32) -> Self {
        self.salt_len = salt_len;
        self
    }

    /// The length of the resulting hash, in bytes. Must be at least 4.
    ///
    /// Note that the length of the hash _string_ will be different; the hash string specifies
    /// parameters and the salt used to generate the hash, and base64-encodes the hash itself.
    /// A hash string looks something like this:
    ///
    /// _$argon2id$v=19$m=62500,t=18,p=2$AQIDBAUGBwg$ypJ3pKxN4aWGkwMv0TOb08OIzwrfK1SZWy64vyTLKo8_
    pub fn hash_length(mut self, hash_len: u32) -> Self {
        self.hash_len = hash_len;
        self
    }

    /// The number of passes over memory.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// The amount of memory required to compute a hash, in kibibytes. It must be at least
    /// `8 * threads` and is rounded down to a multiple of `4 * threads`.
    ///
    /// Set this parameter as high as you can afford to. Be cautious setting this lower than
    /// 62500 KiB (64 MB).
    pub fn memory_cost_kib(mut self, cost: u32) -> Self {
        self.mem_cost_kib = cost;
        self
    }

    /// The number of lanes memory is split into. Lanes are computed on separate threads, up
    /// to the number of logical cores available.
    ///
    /// Aim to increase the memory cost before increasing the thread count. With a high memory
    /// cost, just 1 thread can still provide excellent security.
    pub fn threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// A secret that mixes with a password (and a salt) to create a hash.
    ///
    /// Many argon2 libraries don't expose this parameter, so using a secret can limit
    /// interoperability with other languages/libraries.
    pub fn secret(mut self, secret: Secret<'a>) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Consumes the `Hasher` and returns a hash.
    ///
    /// This is an expensive operation. For some appliations, it might make sense to move this
    /// operation to a separate thread to avoid blocking main threads.
    pub fn hash<P>(self, password: &P) -> Result<Hash, Argon2Error>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        let hash_len_usize = match usize::try_from(self.hash_len) {
            Ok(l) => l,
            Err(_) => return Err(Argon2Error::InvalidParameter("Hash length is too big")),
        };

        let params = Params::new(
            self.alg,
            self.version,
            self.threads,
            self.mem_cost_kib,
            self.iterations,
            hash_len_usize,
        )?;

        let salt = match self.custom_salt {
            Some(s) => Vec::from(s),
            None => {
                let salt_len_usize = match usize::try_from(self.salt_len) {
                    Ok(l) => l,
                    Err(_) => return Err(Argon2Error::InvalidParameter("Salt length is too big")),
                };

                let mut rand_salt = vec![0u8; salt_len_usize];
                OsRng.fill_bytes(&mut rand_salt);
                rand_salt
            }
        };

        let secret = self.secret.map(|s| s.0).unwrap_or_default();

        let mut hash_buffer = vec![0u8; hash_len_usize];
        derive_with_params(
            &mut hash_buffer,
            password.as_ref(),
            &salt,
            secret,
            &[],
            &params,
        )?;

        Ok(Hash {
            alg: self.alg,
            version: self.version,
            mem_cost_kib: self.mem_cost_kib,
            iterations: self.iterations,
            threads: self.threads,
            salt,
            hash: hash_buffer,
        })
    }
}

/// A container for an Argon2 hash, the corresponding salt, and the parameters used for
/// hashing. The hash bytes are zeroed when the container is dropped.
#[derive(Clone, Debug)]
pub struct Hash {
    alg: Algorithm,
    version: Version,
    mem_cost_kib: u32,
    iterations: u32,
    threads: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl fmt::Display for Hash {
    /// Formats the hash string. Aside from the hash, the hash string also includes the salt
    /// and paramters used to generate the hash, making it easy to store in a database or a
    /// cache. This string is formatted to a standard shared by most implementations of argon2,
    /// so other argon2 libraries should be able to use this hash string.
    ///
    /// A hash string looks something like this:
    ///
    /// _$argon2id$v=19$m=62500,t=18,p=2$AQIDBAUGBwg$ypJ3pKxN4aWGkwMv0TOb08OIzwrfK1SZWy64vyTLKo8_
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}$v={}$m={},t={},p={}${}${}",
            self.alg.as_str(),
            self.version.as_u32(),
            self.mem_cost_kib,
            self.iterations,
            self.threads,
            b64_stdnopad.encode(&self.salt),
            b64_stdnopad.encode(&self.hash),
        )
    }
}

impl FromStr for Hash {
    type Err = Argon2Error;

    /// Deserializes a hash string into parts (e.g. the hash, the salt, parameters) that can
    /// be used for purposes such as verification or encryption. Parameters may appear in any
    /// order, but each of `m`, `t` and `p` must appear exactly once.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokenized_hash = TokenizedHash::from_str(s)?;

        let version = match Version::try_from(tokenized_hash.v) {
            Ok(v) => v,
            Err(_) => return Err(Argon2Error::InvalidHash("Hash version is unsupported")),
        };

        let decoded_salt = match b64_stdnopad.decode(tokenized_hash.b64_salt) {
            Ok(s) => s,
            Err(_) => {
                return Err(Argon2Error::InvalidHash(
                    "Invalid character in base64-encoded salt",
                ))
            }
        };

        let decoded_hash = match b64_stdnopad.decode(tokenized_hash.b64_hash) {
            Ok(h) => h,
            Err(_) => {
                return Err(Argon2Error::InvalidHash(
                    "Invalid character in base64-encoded hash",
                ))
            }
        };

        Ok(Self {
            alg: tokenized_hash.alg,
            version,
            mem_cost_kib: tokenized_hash.mem_cost_kib,
            iterations: tokenized_hash.iterations,
            threads: tokenized_hash.threads,
            salt: decoded_salt,
            hash: decoded_hash,
        })
    }
}

impl Drop for Hash {
    fn drop(&mut self) {
        self.hash.zeroize();
    }
}

impl Hash {
    /// Assembles a version 0x13 `Hash` from a raw hash, the salt it was computed with, and
    /// its parameters.
    pub fn from_parts(
        hash: &[u8],
        salt: &[u8],
        alg: Algorithm,
        mem_cost_kib: u32,
        iterations: u32,
        threads: u32,
    ) -> Self {
        Self {
            alg,
            version: Version::V0x13,
            mem_cost_kib,
            iterations,
            threads,
            salt: Vec::from(salt),
            hash: Vec::from(hash),
        }
    }

    /// Returns a reference to a byte slice of the computed hash/key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.hash
    }

    /// Returns a reference to a byte slice of the salt used to generate the hash.
    pub fn salt_bytes(&self) -> &[u8] {
        &self.salt
    }

    /// Checks if the hash matches the provided password.
    ///
    /// Because verification requires re-hashing the password, this is an expensive operation.
    pub fn verify<P>(&self, password: &P) -> bool
    where
        P: AsRef<[u8]> + ?Sized,
    {
        self.verify_with_or_without_secret::<P>(password, None)
    }

    /// Checks if the hash matches the provided password using the provided secret.
    ///
    /// Because verification requires re-hashing the password, this is an expensive operation.
    pub fn verify_with_secret<P>(&self, password: &P, secret: Secret) -> bool
    where
        P: AsRef<[u8]> + ?Sized,
    {
        self.verify_with_or_without_secret::<P>(password, Some(secret))
    }

    #[inline]
    fn verify_with_or_without_secret<P>(&self, password: &P, secret: Option<Secret>) -> bool
    where
        P: AsRef<[u8]> + ?Sized,
    {
        let hash_length: u32 = match self.hash.len().try_into() {
            Ok(l) => l,
            Err(_) => return false,
        };

        let mut hash_builder = Hasher::default()
            .algorithm(self.alg)
            .version(self.version)
            .custom_salt(&self.salt)
            .hash_length(hash_length)
            .iterations(self.iterations)
            .memory_cost_kib(self.mem_cost_kib)
            .threads(self.threads);

        if let Some(s) = secret {
            hash_builder = hash_builder.secret(s);
        }

        let hashed_password = match hash_builder.hash(password) {
            Ok(h) => h,
            Err(_) => return false,
        };

        if self.hash.len() != hashed_password.hash.len() || self.hash.is_empty() {
            return false;
        }

        // The entire length is always compared so timing does not reveal the first mismatch
        let hashes_dont_match = hashed_password
            .hash
            .iter()
            .zip(self.hash.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        hashes_dont_match == 0
    }
}
