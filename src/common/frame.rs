// src/common/frame.rs

/// Diagnostic counters kept by every frame decoder.
///
/// Decoders never report malformed input as an error; these counters are the
/// only place a discard shows up.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct DecoderStats {
    /// Frames that passed every integrity check and were emitted.
    pub frames_decoded: u32,
    /// Frames that were started (header matched) but failed validation.
    pub frames_discarded: u32,
    /// Bytes dropped while looking for the start of a frame.
    pub bytes_skipped: u32,
}

impl DecoderStats {
    pub(crate) fn decoded(&mut self) {
        self.frames_decoded = self.frames_decoded.wrapping_add(1);
    }

    pub(crate) fn discarded(&mut self) {
        self.frames_discarded = self.frames_discarded.wrapping_add(1);
    }

    pub(crate) fn skipped(&mut self) {
        self.bytes_skipped = self.bytes_skipped.wrapping_add(1);
    }
}

/// A byte-at-a-time decoder that turns a raw stream into validated frames.
///
/// Bytes are consumed exactly once. A decoder holds at most one partially
/// received frame and resynchronizes on its own after garbage.
pub trait FrameDecoder {
    /// The validated unit this decoder produces.
    type Frame;

    /// Consumes one byte. Returns a frame when this byte completed one.
    fn feed(&mut self, byte: u8) -> Option<Self::Frame>;

    /// Drops any partial frame and goes back to seeking a frame start.
    fn reset(&mut self);

    /// True while no partial frame is buffered.
    fn is_idle(&self) -> bool;

    fn stats(&self) -> DecoderStats;
}
