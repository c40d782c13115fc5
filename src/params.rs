use crate::error::Argon2Error;

/// Number of synchronization points (slices) per pass.
pub(crate) const SYNC_POINTS: u32 = 4;

/// Shortest output the algorithm will produce, in bytes.
pub const MIN_OUTPUT_LEN: usize = 4;

/// Smallest accepted degree of parallelism (number of lanes).
pub const MIN_PARALLELISM: u32 = 1;

/// Largest accepted degree of parallelism (number of lanes).
pub const MAX_PARALLELISM: u32 = 128;

/// Smallest accepted number of passes over memory.
pub const MIN_TIME_COST: u32 = 1;

/// Largest accepted memory cost, in kibibytes (8 GiB).
pub const MAX_MEMORY_COST_KIB: u32 = 8 * 1024 * 1024;

/// Argon2 consists of 3 different algorithms: one that aims to be resistant to GPU
/// cracking attacks (argon2d), one that aims to be resistant to side-channel attacks
/// (argon2i), and a hybrid algorithm that aims to be resistant to both types of attacks.
/// See <https://en.wikipedia.org/wiki/Argon2> for more information.
///
/// Argon2id is a good default. The other algorithms should only be used in rare cases,
/// preferably only when a cryptography expert can validate that using one of the other two
/// algorithms is safe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// GPU-cracking attack resistant/memory-hard. Reference blocks are selected from the
    /// contents of previously computed blocks.
    Argon2d,

    /// Side-channel attack resistant. Reference blocks are selected from a counter-seeded
    /// stream that does not depend on the password.
    Argon2i,

    /// GPU-cracking attack resistant/memory-hard and side-channel attack resistant. Uses
    /// Argon2i addressing for the first half of the first pass and Argon2d addressing after.
    #[default]
    Argon2id,
}

impl Algorithm {
    /// The numeric type identifier that is mixed into the initial hash.
    pub fn type_id(self) -> u32 {
        match self {
            Algorithm::Argon2d => 0,
            Algorithm::Argon2i => 1,
            Algorithm::Argon2id => 2,
        }
    }

    /// The identifier used in hash strings, e.g. `argon2id`.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Argon2d => "argon2d",
            Algorithm::Argon2i => "argon2i",
            Algorithm::Argon2id => "argon2id",
        }
    }

    /// Whether the segment at `(pass, slice)` draws its reference indices from the
    /// data-independent address stream rather than from block contents.
    pub(crate) fn is_data_independent(self, pass: u32, slice: u32) -> bool {
        match self {
            Algorithm::Argon2d => false,
            Algorithm::Argon2i => true,
            Algorithm::Argon2id => pass == 0 && slice < SYNC_POINTS / 2,
        }
    }
}

impl TryFrom<u32> for Algorithm {
    type Error = Argon2Error;

    fn try_from(type_id: u32) -> Result<Self, Self::Error> {
        match type_id {
            0 => Ok(Algorithm::Argon2d),
            1 => Ok(Algorithm::Argon2i),
            2 => Ok(Algorithm::Argon2id),
            _ => Err(Argon2Error::InvalidParameter("Unknown algorithm")),
        }
    }
}

/// Version of the Argon2 algorithm.
///
/// Version 0x13 (19) is the current version and the one described in RFC 9106. Version 0x10
/// (16) overwrites memory blocks on every pass instead of XOR-ing new blocks into the old
/// ones, and exists for compatibility with older hashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Version {
    /// Version 16
    V0x10,

    /// Version 19
    #[default]
    V0x13,
}

impl Version {
    /// The numeric version as it appears in the initial hash and in hash strings.
    pub fn as_u32(self) -> u32 {
        match self {
            Version::V0x10 => 0x10,
            Version::V0x13 => 0x13,
        }
    }
}

impl TryFrom<u32> for Version {
    type Error = Argon2Error;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        match version {
            0x10 => Ok(Version::V0x10),
            0x13 => Ok(Version::V0x13),
            _ => Err(Argon2Error::InvalidParameter("Unsupported version")),
        }
    }
}

/// A validated set of Argon2 cost parameters.
///
/// A `Params` can only be constructed through [`Params::new`], so holding one means every
/// limit has already been checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    algorithm: Algorithm,
    version: Version,
    parallelism: u32,
    memory_cost_kib: u32,
    time_cost: u32,
    output_len: u32,
}

impl Params {
    /// Validates and bundles cost parameters.
    ///
    /// * `parallelism` must be within `[1, 128]`
    /// * `memory_cost_kib` must be within `[8 * parallelism, 8 GiB]`
    /// * `time_cost` must be at least 1
    /// * `output_len` must be at least 4 bytes and fit in 32 bits
    pub fn new(
        algorithm: Algorithm,
        version: Version,
        parallelism: u32,
        memory_cost_kib: u32,
        time_cost: u32,
        output_len: usize,
    ) -> Result<Self, Argon2Error> {
        if output_len < MIN_OUTPUT_LEN {
            return Err(Argon2Error::InvalidParameter(
                "Output length must be at least 4 bytes",
            ));
        }

        let output_len = match u32::try_from(output_len) {
            Ok(l) => l,
            Err(_) => return Err(Argon2Error::InvalidParameter("Output length is too big")),
        };

        if !(MIN_PARALLELISM..=MAX_PARALLELISM).contains(&parallelism) {
            return Err(Argon2Error::InvalidParameter(
                "Parallelism must be between 1 and 128",
            ));
        }

        // parallelism <= 128, so this cannot overflow
        if memory_cost_kib < 2 * SYNC_POINTS * parallelism {
            return Err(Argon2Error::InvalidParameter(
                "Memory cost must be at least 8 KiB per lane",
            ));
        }

        if memory_cost_kib > MAX_MEMORY_COST_KIB {
            return Err(Argon2Error::InvalidParameter(
                "Memory cost must not exceed 8 GiB",
            ));
        }

        if time_cost < MIN_TIME_COST {
            return Err(Argon2Error::InvalidParameter(
                "Time cost must be at least 1",
            ));
        }

        Ok(Self {
            algorithm,
            version,
            parallelism,
            memory_cost_kib,
            time_cost,
            output_len,
        })
    }

    /// The algorithm variant.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The algorithm version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The number of lanes.
    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    /// The requested memory cost in kibibytes, before rounding.
    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    /// The number of passes over memory.
    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    /// The output length in bytes.
    pub fn output_len(&self) -> u32 {
        self.output_len
    }
}

/// Shape of the block matrix for one derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) lanes: u32,
    pub(crate) lane_len: u32,
    pub(crate) segment_len: u32,
    pub(crate) block_count: u32,
}

impl Layout {
    pub(crate) fn new(params: &Params) -> Self {
        let lanes = params.parallelism();
        let block_count =
            (params.memory_cost_kib() / (SYNC_POINTS * lanes)) * (SYNC_POINTS * lanes);
        let lane_len = block_count / lanes;

        Self {
            lanes,
            lane_len,
            segment_len: lane_len / SYNC_POINTS,
            block_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        parallelism: u32,
        memory_cost_kib: u32,
        time_cost: u32,
        output_len: usize,
    ) -> Result<Params, Argon2Error> {
        Params::new(
            Algorithm::Argon2id,
            Version::V0x13,
            parallelism,
            memory_cost_kib,
            time_cost,
            output_len,
        )
    }

    #[test]
    fn test_rejects_short_output() {
        assert!(matches!(
            params(1, 8, 1, 3),
            Err(Argon2Error::InvalidParameter(_))
        ));
        assert!(params(1, 8, 1, 4).is_ok());
    }

    #[test]
    fn test_rejects_parallelism_out_of_range() {
        assert!(matches!(
            params(0, 64, 1, 32),
            Err(Argon2Error::InvalidParameter(_))
        ));
        assert!(matches!(
            params(129, 8 * 129, 1, 32),
            Err(Argon2Error::InvalidParameter(_))
        ));
        assert!(params(128, 8 * 128, 1, 32).is_ok());
    }

    #[test]
    fn test_rejects_zero_time_cost() {
        assert!(matches!(
            params(1, 8, 0, 32),
            Err(Argon2Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_memory_out_of_range() {
        assert!(matches!(
            params(4, 31, 1, 32),
            Err(Argon2Error::InvalidParameter(_))
        ));
        assert!(params(4, 32, 1, 32).is_ok());
        assert!(matches!(
            params(1, MAX_MEMORY_COST_KIB + 1, 1, 32),
            Err(Argon2Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_algorithm_id() {
        assert_eq!(Algorithm::try_from(2), Ok(Algorithm::Argon2id));
        assert!(matches!(
            Algorithm::try_from(3),
            Err(Argon2Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_version_ids() {
        assert_eq!(Version::try_from(19), Ok(Version::V0x13));
        assert_eq!(Version::try_from(16), Ok(Version::V0x10));
        assert!(Version::try_from(18).is_err());
        assert_eq!(Version::default().as_u32(), 0x13);
    }

    #[test]
    fn test_layout_rounds_memory_down() {
        let layout = Layout::new(&params(2, 37, 1, 32).unwrap());

        assert_eq!(layout.block_count, 32);
        assert_eq!(layout.lane_len, 16);
        assert_eq!(layout.segment_len, 4);

        let layout = Layout::new(&params(1, 8, 1, 32).unwrap());

        assert_eq!(layout.block_count, 8);
        assert_eq!(layout.segment_len, 2);
    }

    #[test]
    fn test_data_independent_segments() {
        assert!(!Algorithm::Argon2d.is_data_independent(0, 0));
        assert!(Algorithm::Argon2i.is_data_independent(3, 3));
        assert!(Algorithm::Argon2id.is_data_independent(0, 1));
        assert!(!Algorithm::Argon2id.is_data_independent(0, 2));
        assert!(!Algorithm::Argon2id.is_data_independent(1, 0));
    }
}
