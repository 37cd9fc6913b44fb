pub mod parser;

/// Amount of pixels the EPC901 line sensor produces per exposure. Frames are not checked against
/// it, only against each other within a session.
pub const SENSOR_PIXEL_COUNT: usize = 1024;

/// Fields of the metadata line which precedes every frame's pixel data
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct FrameMeta {
    /// Frame number as reported by the board
    pub index: u32,
    pub timestamp_ms: u64,
    pub exposure_us: u32,
}

/// Single decoded exposure
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Frame {
    index: u32,
    timestamp_ms: u64,
    exposure_us: u32,
    pixels: Vec<u16>,
}

impl Frame {
    pub fn new(meta: FrameMeta, pixels: Vec<u16>) -> Self {
        Frame {
            index: meta.index,
            timestamp_ms: meta.timestamp_ms,
            exposure_us: meta.exposure_us,
            pixels,
        }
    }

    /// Position of a frame within a burst
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn exposure_us(&self) -> u32 {
        self.exposure_us
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn min(&self) -> Option<u16> {
        self.pixels.iter().copied().min()
    }

    pub fn max(&self) -> Option<u16> {
        self.pixels.iter().copied().max()
    }

    pub(crate) fn renumbered(self, index: u32) -> Self {
        Frame { index, ..self }
    }
}

/// Outcome of a single `@transfer` round-trip
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Transfer {
    Frame(Frame),
    /// Board has no more captured frames
    Exhausted,
}
