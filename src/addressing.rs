use crate::block::{Block, QWORDS_IN_BLOCK};
use crate::params::{Layout, Params, SYNC_POINTS};

/// The block being computed: pass, slice, lane, and index within the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) pass: u32,
    pub(crate) slice: u32,
    pub(crate) lane: u32,
    pub(crate) index: u32,
}

impl Position {
    /// Column of this block within its lane.
    pub(crate) fn column(&self, layout: &Layout) -> u32 {
        self.slice * layout.segment_len + self.index
    }

    /// Column of the block preceding this one in its lane, wrapping to the last column.
    pub(crate) fn prev_column(&self, layout: &Layout) -> u32 {
        match self.column(layout) {
            0 => layout.lane_len - 1,
            column => column - 1,
        }
    }
}

/// Source of the pseudo-random value for each block of one segment.
pub(crate) enum Addressing {
    DataDependent,
    DataIndependent(AddressStream),
}

impl Addressing {
    pub(crate) fn for_segment(
        params: &Params,
        layout: &Layout,
        pass: u32,
        slice: u32,
        lane: u32,
    ) -> Self {
        if params.algorithm().is_data_independent(pass, slice) {
            Addressing::DataIndependent(AddressStream::new(params, layout, pass, slice, lane))
        } else {
            Addressing::DataDependent
        }
    }

    /// The pseudo-random value for the block at `index`, whose predecessor is `prev`.
    pub(crate) fn pseudo_rand(&mut self, index: u32, prev: &Block) -> u64 {
        match self {
            Addressing::DataDependent => prev.word(0),
            Addressing::DataIndependent(stream) => stream.next(index),
        }
    }
}

/// Counter-mode address blocks for data-independent addressing.
///
/// The input block carries the segment coordinates and a counter; each refill increments
/// the counter and sets the address block to `G(0, G(0, input))`. One address block serves
/// 128 consecutive indices.
pub(crate) struct AddressStream {
    input: Block,
    addresses: Block,
    counter: u64,
}

impl AddressStream {
    pub(crate) fn new(
        params: &Params,
        layout: &Layout,
        pass: u32,
        slice: u32,
        lane: u32,
    ) -> Self {
        let mut input = Block::zero();
        input.set_word(0, u64::from(pass));
        input.set_word(1, u64::from(lane));
        input.set_word(2, u64::from(slice));
        input.set_word(3, u64::from(layout.block_count));
        input.set_word(4, u64::from(params.time_cost()));
        input.set_word(5, u64::from(params.algorithm().type_id()));

        Self {
            input,
            addresses: Block::zero(),
            counter: 0,
        }
    }

    fn refill(&mut self) {
        self.counter += 1;
        self.input.set_word(6, self.counter);

        let zero = Block::zero();
        let once = Block::compress(&zero, &self.input);
        self.addresses = Block::compress(&zero, &once);
    }

    pub(crate) fn next(&mut self, index: u32) -> u64 {
        let slot = index as usize % QWORDS_IN_BLOCK;
        if self.counter == 0 || slot == 0 {
            self.refill();
        }
        self.addresses.word(slot)
    }
}

/// Maps a pseudo-random value to the `(lane, column)` of the reference block.
///
/// The low 32 bits (`J1`) choose the column and the high 32 bits (`J2`) choose the lane.
/// On the first slice of the first pass the reference always stays in the current lane.
pub(crate) fn reference_block(
    layout: &Layout,
    position: Position,
    pseudo_rand: u64,
) -> (u32, u32) {
    let j1 = pseudo_rand as u32;
    let j2 = (pseudo_rand >> 32) as u32;

    let ref_lane = if position.pass == 0 && position.slice == 0 {
        position.lane
    } else {
        j2 % layout.lanes
    };

    let (start, size) = reference_window(layout, position, ref_lane == position.lane);

    (ref_lane, skewed_column(layout, start, size, j1))
}

/// First column and size of the range the reference may be drawn from.
///
/// In its own lane a block may reference anything already written except its immediate
/// predecessor. In another lane it may only reference blocks of finished slices, minus the
/// last of them when the block opens its segment. On the first pass only the slices
/// computed so far are eligible.
pub(crate) fn reference_window(
    layout: &Layout,
    position: Position,
    same_lane: bool,
) -> (u32, u32) {
    let Position {
        pass, slice, index, ..
    } = position;
    let segment_len = layout.segment_len;

    let finished = if pass == 0 {
        slice * segment_len
    } else {
        layout.lane_len - segment_len
    };

    let size = if same_lane {
        finished + index - 1
    } else if index == 0 {
        finished - 1
    } else {
        finished
    };

    let start = if pass == 0 || slice == SYNC_POINTS - 1 {
        0
    } else {
        (slice + 1) * segment_len
    };

    (start, size)
}

/// Picks a column from the window `[start, start + size)` (wrapping around the lane),
/// biased towards the most recently written end.
pub(crate) fn skewed_column(layout: &Layout, start: u32, size: u32, j1: u32) -> u32 {
    assert!(size > 0, "empty reference window");

    let size = u64::from(size);
    let x = (u64::from(j1) * u64::from(j1)) >> 32;
    let y = (size * x) >> 32;
    let relative = size - 1 - y;

    ((u64::from(start) + relative) % u64::from(layout.lane_len)) as u32
}
