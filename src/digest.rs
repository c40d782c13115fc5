use blake2::digest::{Digest, VariableOutput};
use blake2::{Blake2b512, Blake2bVar};
use zeroize::{Zeroize, Zeroizing};

use crate::params::Params;

/// Length of a full BLAKE2b digest and of H0.
pub(crate) const DIGEST_LEN: usize = 64;

const HALF_DIGEST_LEN: usize = DIGEST_LEN / 2;

/// Secret and public byte strings mixed into H0.
///
/// Lengths are checked to fit a 32-bit prefix when the inputs are constructed.
#[derive(Clone, Copy)]
pub(crate) struct Inputs<'a> {
    pub(crate) password: &'a [u8],
    pub(crate) salt: &'a [u8],
    pub(crate) key: &'a [u8],
    pub(crate) associated_data: &'a [u8],
}

/// Computes H0 over the parameters and the length-prefixed inputs.
pub(crate) fn initial_hash(params: &Params, inputs: &Inputs<'_>) -> Zeroizing<[u8; DIGEST_LEN]> {
    let mut digest = Blake2b512::new();

    Digest::update(&mut digest, params.parallelism().to_le_bytes());
    Digest::update(&mut digest, params.output_len().to_le_bytes());
    Digest::update(&mut digest, params.memory_cost_kib().to_le_bytes());
    Digest::update(&mut digest, params.time_cost().to_le_bytes());
    Digest::update(&mut digest, params.version().as_u32().to_le_bytes());
    Digest::update(&mut digest, params.algorithm().type_id().to_le_bytes());

    for field in [
        inputs.password,
        inputs.salt,
        inputs.key,
        inputs.associated_data,
    ] {
        Digest::update(&mut digest, (field.len() as u32).to_le_bytes());
        Digest::update(&mut digest, field);
    }

    Zeroizing::new(digest.finalize().into())
}

/// The variable-length hash H'.
///
/// Fills `out` with `out.len()` pseudorandom bytes derived from the concatenation of
/// `inputs`, prefixed by the little-endian output length. Outputs of up to 64 bytes come
/// from a single BLAKE2b invocation of that width; longer outputs chain 64-byte digests,
/// emitting the first half of each, and finish with one digest of the remaining width.
pub(crate) fn hash_long(inputs: &[&[u8]], out: &mut [u8]) {
    assert!(
        !out.is_empty() && out.len() <= u32::MAX as usize,
        "H' output length out of range"
    );

    let len_prefix = (out.len() as u32).to_le_bytes();

    if out.len() <= DIGEST_LEN {
        let mut digest = Blake2bVar::new(out.len()).expect("BLAKE2b accepts widths 1..=64");
        blake2::digest::Update::update(&mut digest, &len_prefix);
        for input in inputs {
            blake2::digest::Update::update(&mut digest, input);
        }
        digest
            .finalize_variable(out)
            .expect("output buffer matches the digest width");
        return;
    }

    let mut digest = Blake2b512::new();
    Digest::update(&mut digest, len_prefix);
    for input in inputs {
        Digest::update(&mut digest, input);
    }
    let mut chain: [u8; DIGEST_LEN] = digest.finalize().into();

    let mut remaining = out;
    while remaining.len() > DIGEST_LEN {
        let (emitted, rest) = remaining.split_at_mut(HALF_DIGEST_LEN);
        emitted.copy_from_slice(&chain[..HALF_DIGEST_LEN]);
        remaining = rest;

        if remaining.len() > DIGEST_LEN {
            chain = Blake2b512::digest(chain).into();
        }
    }

    let mut digest = Blake2bVar::new(remaining.len()).expect("BLAKE2b accepts widths 1..=64");
    blake2::digest::Update::update(&mut digest, &chain);
    digest
        .finalize_variable(remaining)
        .expect("output buffer matches the digest width");

    chain.zeroize();
}
