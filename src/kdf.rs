use zeroize::Zeroizing;

use crate::block::{Block, BLOCK_SIZE};
use crate::digest::{hash_long, initial_hash, Inputs};
use crate::error::Argon2Error;
use crate::fill::fill_memory;
use crate::memory::Memory;
use crate::params::{Algorithm, Layout, Params, Version};

/// Derives `out.len()` bytes from a password and salt using Argon2 version 0x13.
///
/// * `key` is an optional secret (sometimes called a pepper) and `associated_data` is
///   optional public context; both are mixed into the initial hash.
/// * `parallelism` is the number of lanes, `memory_cost_kib` the memory size in kibibytes
///   (rounded down to a multiple of `4 * parallelism`), and `time_cost` the number of passes.
///
/// All parameters are validated before any memory is allocated. On error, `out` is left
/// untouched.
///
/// ```rust
/// use argon2_engine::{derive, Algorithm};
///
/// let password = b"password";
/// let salt = b"somesalt";
///
/// let mut key = [0u8; 32];
/// derive(&mut key, password, salt, None, None, Algorithm::Argon2id, 1, 64, 2).unwrap();
///
/// let mut too_short = [0u8; 3];
/// let result = derive(&mut too_short, password, salt, None, None, Algorithm::Argon2id, 1, 64, 2);
/// assert!(result.is_err());
/// ```
#[allow(clippy::too_many_arguments)]
pub fn derive(
    out: &mut [u8],
    password: &[u8],
    salt: &[u8],
    key: Option<&[u8]>,
    associated_data: Option<&[u8]>,
    algorithm: Algorithm,
    parallelism: u32,
    memory_cost_kib: u32,
    time_cost: u32,
) -> Result<(), Argon2Error> {
    let params = Params::new(
        algorithm,
        Version::default(),
        parallelism,
        memory_cost_kib,
        time_cost,
        out.len(),
    )?;

    derive_with_params(
        out,
        password,
        salt,
        key.unwrap_or_default(),
        associated_data.unwrap_or_default(),
        &params,
    )
}

/// Like [`derive`], with a pre-validated parameter set. `params.output_len()` must equal
/// `out.len()`.
pub fn derive_with_params(
    out: &mut [u8],
    password: &[u8],
    salt: &[u8],
    key: &[u8],
    associated_data: &[u8],
    params: &Params,
) -> Result<(), Argon2Error> {
    if out.len() != params.output_len() as usize {
        return Err(Argon2Error::InvalidParameter(
            "Output buffer length does not match the output length parameter",
        ));
    }

    let inputs = Inputs {
        password: check_len(password, "Password is too long")?,
        salt: check_len(salt, "Salt is too long")?,
        key: check_len(key, "Secret is too long")?,
        associated_data: check_len(associated_data, "Associated data is too long")?,
    };

    let layout = Layout::new(params);

    tracing::debug!(
        algorithm = params.algorithm().as_str(),
        version = params.version().as_u32(),
        lanes = layout.lanes,
        blocks = layout.block_count,
        passes = params.time_cost(),
        "deriving argon2 output"
    );

    let mut memory = Memory::new(&layout);

    {
        let seed = initial_hash(params, &inputs);
        seed_lanes(&mut memory, &layout, &seed[..]);
    }

    fill_memory(&mut memory, params, &layout);

    let final_block = memory.last_column_xor();
    drop(memory);

    let mut final_bytes = Zeroizing::new([0u8; BLOCK_SIZE]);
    final_block.write_bytes(&mut final_bytes);
    hash_long(&[&final_bytes[..]], out);

    Ok(())
}

fn check_len<'a>(field: &'a [u8], msg: &'static str) -> Result<&'a [u8], Argon2Error> {
    match u32::try_from(field.len()) {
        Ok(_) => Ok(field),
        Err(_) => Err(Argon2Error::InvalidParameter(msg)),
    }
}

/// Fills columns 0 and 1 of every lane with `H'(H0 || column || lane)`.
fn seed_lanes(memory: &mut Memory, layout: &Layout, seed: &[u8]) {
    let mut bytes = Zeroizing::new([0u8; BLOCK_SIZE]);

    for lane in 0..layout.lanes {
        for column in 0..2u32 {
            hash_long(
                &[seed, &column.to_le_bytes(), &lane.to_le_bytes()],
                &mut bytes[..],
            );
            *memory.block_mut(lane, column) = Block::from_bytes(&bytes);
        }
    }
}
