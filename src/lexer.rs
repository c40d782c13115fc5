use crate::error::Argon2Error;
use crate::params::Algorithm;

use std::str::FromStr;

/// The fields of a hash string such as
/// `$argon2id$v=19$m=128,t=3,p=2$AQIDBAUGBwg$7OU7S/azjYpnXXySR52cFWeisxk1VVjNeXqtQ8ZM/Oc`,
/// split out but not yet decoded.
pub struct TokenizedHash {
    pub v: u32,
    pub alg: Algorithm,
    pub mem_cost_kib: u32,
    pub iterations: u32,
    pub threads: u32,
    pub b64_salt: String,
    pub b64_hash: String,
}

impl FromStr for TokenizedHash {
    type Err = Argon2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sections = s.split('$');

        if sections.next() != Some("") {
            return Err(Argon2Error::InvalidHash("Must begin with $argon2"));
        }

        let alg = match sections.next() {
            Some("argon2d") => Algorithm::Argon2d,
            Some("argon2i") => Algorithm::Argon2i,
            Some("argon2id") => Algorithm::Argon2id,
            _ => return Err(Argon2Error::InvalidHash("Must begin with $argon2")),
        };

        let v = match sections.next().and_then(|v| v.strip_prefix("v=")) {
            Some(v) => v,
            None => return Err(Argon2Error::InvalidHash("Missing algorithm version")),
        };

        let v: u32 = match v.parse() {
            Ok(v) => v,
            Err(_) => return Err(Argon2Error::InvalidHash("Invalid version")),
        };

        let params = match sections.next() {
            Some(p) => p,
            None => return Err(Argon2Error::InvalidHash("Hash is incomplete")),
        };

        let mut m = None;
        let mut t = None;
        let mut p = None;

        for param in params.split(',') {
            let (key, value) = match param.split_once('=') {
                Some(kv) => kv,
                None => {
                    return Err(Argon2Error::InvalidHash(
                        "Unrecognized or missing parameter",
                    ))
                }
            };

            let (slot, invalid, duplicate) = match key {
                "m" => (&mut m, "Invalid m", "Duplicate key 'm'"),
                "t" => (&mut t, "Invalid t", "Duplicate key 't'"),
                "p" => (&mut p, "Invalid p", "Duplicate key 'p'"),
                _ => {
                    return Err(Argon2Error::InvalidHash(
                        "Unrecognized or missing parameter",
                    ))
                }
            };

            if slot.is_some() {
                return Err(Argon2Error::InvalidHash(duplicate));
            }

            *slot = match value.parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => return Err(Argon2Error::InvalidHash(invalid)),
            };
        }

        let (mem_cost_kib, iterations, threads) = match (m, t, p) {
            (Some(m), Some(t), Some(p)) => (m, t, p),
            (None, _, _) => return Err(Argon2Error::InvalidHash("Missing 'm' parameter")),
            (_, None, _) => return Err(Argon2Error::InvalidHash("Missing 't' parameter")),
            (_, _, None) => return Err(Argon2Error::InvalidHash("Missing 'p' parameter")),
        };

        let (b64_salt, b64_hash) = match (sections.next(), sections.next(), sections.next()) {
            (Some(salt), Some(hash), None) => (salt, hash),
            _ => return Err(Argon2Error::InvalidHash("Hash is incomplete")),
        };

        if b64_hash.is_empty() {
            return Err(Argon2Error::InvalidHash("Missing hash after salt"));
        }

        Ok(Self {
            v,
            alg,
            mem_cost_kib,
            iterations,
            threads,
            b64_salt: String::from(b64_salt),
            b64_hash: String::from(b64_hash),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens = TokenizedHash::from_str(
            "$argon2i$v=16$p=4,t=7,m=4096$c2FsdHNhbHQ$3Cbbv2uHlqmYg1wdiUDVhQ",
        )
        .unwrap();

        assert_eq!(tokens.v, 16);
        assert_eq!(tokens.alg, Algorithm::Argon2i);
        assert_eq!(tokens.mem_cost_kib, 4096);
        assert_eq!(tokens.iterations, 7);
        assert_eq!(tokens.threads, 4);
        assert_eq!(tokens.b64_salt, "c2FsdHNhbHQ");
        assert_eq!(tokens.b64_hash, "3Cbbv2uHlqmYg1wdiUDVhQ");
    }

    #[test]
    fn test_tokenize_errors() {
        let cases = [
            ("$argon2x$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA", "Must begin with $argon2"),
            ("$argon2d$m=8,t=1,p=1$c2FsdA$aGFzaA", "Missing algorithm version"),
            ("$argon2d$v=x$m=8,t=1,p=1$c2FsdA$aGFzaA", "Invalid version"),
            ("$argon2d$v=19$m=8,m=8,t=1,p=1$c2FsdA$aGFzaA", "Duplicate key 'm'"),
            ("$argon2d$v=19$m=8,t=-1,p=1$c2FsdA$aGFzaA", "Invalid t"),
            ("$argon2d$v=19$m=8,t=1,q=1$c2FsdA$aGFzaA", "Unrecognized or missing parameter"),
            ("$argon2d$v=19$m=8,t=1$c2FsdA$aGFzaA", "Missing 'p' parameter"),
            ("$argon2d$v=19$m=8,t=1,p=1$c2FsdA", "Hash is incomplete"),
            ("$argon2d$v=19$m=8,t=1,p=1$c2FsdA$", "Missing hash after salt"),
        ];

        for (hash, msg) in cases {
            match TokenizedHash::from_str(hash) {
                Err(Argon2Error::InvalidHash(m)) => assert_eq!(m, msg, "{}", hash),
                _ => panic!("expected an error for {}", hash),
            }
        }
    }
}
