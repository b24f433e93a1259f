//! Sources of successive frames.
//!
//! Two flavours exist. [`FrameTable`] replays a fixed list of frames round
//! robin forever. [`ByteDecoder`] turns a raw byte buffer into frames, one
//! chunk of `take` bytes per frame, mapping each byte linearly onto a position
//! range. [`SequenceSource`] wraps either one behind a single `next_frame`.

use crate::easing::Easing;
use crate::frame::{ChannelTarget, Frame};
use crate::types::{ChannelId, MotionError, position_in_range};
use heapless::Vec;

/// A fixed, cyclic table of frames.
///
/// Frames play in insertion order. Reading a frame advances an index modulo
/// the table length; frames are never removed or reordered.
///
/// # Type Parameters
/// * `C` - Maximum channels per frame
/// * `F` - Maximum frames in the table
#[derive(Debug, Clone)]
pub struct FrameTable<const C: usize, const F: usize> {
    frames: Vec<Frame<C>, F>,
    index: usize,
}

impl<const C: usize, const F: usize> FrameTable<C, F> {
    /// Creates a table positioned at its first frame.
    ///
    /// # Errors
    /// * `EmptySource` - `frames` is empty
    pub fn new(frames: Vec<Frame<C>, F>) -> Result<Self, MotionError> {
        if frames.is_empty() {
            return Err(MotionError::EmptySource);
        }
        Ok(Self { frames, index: 0 })
    }

    /// Creates a table from a slice of frames.
    ///
    /// # Errors
    /// * `EmptySource` - `frames` is empty
    /// * `CapacityExceeded` - More than `F` frames were given
    pub fn from_slice(frames: &[Frame<C>]) -> Result<Self, MotionError> {
        let frames = Vec::from_slice(frames).map_err(|_| MotionError::CapacityExceeded)?;
        Self::new(frames)
    }

    /// Returns the current head frame and rotates it to the tail.
    pub fn next_frame(&mut self) -> &Frame<C> {
        let index = self.index;
        self.index = (index + 1) % self.frames.len();
        &self.frames[index]
    }

    /// Returns the frame that the next call to `next_frame` will yield.
    pub fn peek(&self) -> &Frame<C> {
        &self.frames[self.index]
    }

    /// Returns the first frame of the table regardless of rotation.
    pub fn first(&self) -> &Frame<C> {
        &self.frames[0]
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Number of frames in one cycle.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decodes byte buffers into frames.
///
/// Each byte `b` becomes the position `(b / 255) * (max - min) + min` and the
/// bytes of one chunk are assigned to channels `0..take` in order.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ByteDecoder {
    take: usize,
    min: f32,
    max: f32,
    duration_ms: u32,
    easing: Easing,
}

impl ByteDecoder {
    /// Default number of bytes per frame.
    pub const DEFAULT_TAKE: usize = 8;

    /// Creates a decoder producing `take` channels per frame.
    ///
    /// # Errors
    /// * `ZeroTake` - `take` is zero
    /// * `InvalidRange` - `min > max`, or either bound lies outside `[-1.0, 1.0]`
    /// * `ZeroDuration` - `duration_ms` is zero
    pub fn new(take: usize, min: f32, max: f32, duration_ms: u32) -> Result<Self, MotionError> {
        if take == 0 {
            return Err(MotionError::ZeroTake);
        }
        if !position_in_range(min) || !position_in_range(max) || min > max {
            return Err(MotionError::InvalidRange { min, max });
        }
        if duration_ms == 0 {
            return Err(MotionError::ZeroDuration);
        }

        Ok(Self {
            take,
            min,
            max,
            duration_ms,
            easing: Easing::Linear,
        })
    }

    /// Sets the easing curve of decoded frames.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Maps one byte onto the position range.
    #[inline]
    pub fn position(&self, value: u8) -> f32 {
        let normal = f32::from(value) / 255.0;
        normal * (self.max - self.min) + self.min
    }

    /// Returns a lazy, finite pass over `bytes`.
    ///
    /// The final frame is shorter when `bytes.len()` is not a multiple of
    /// `take`. Call again for another pass.
    ///
    /// # Errors
    /// * `EmptySource` - `bytes` is empty
    /// * `CapacityExceeded` - `take` exceeds the frame capacity `C`
    pub fn frames<'a, const C: usize>(&self, bytes: &'a [u8]) -> Result<ByteFrames<'a, C>, MotionError> {
        if bytes.is_empty() {
            return Err(MotionError::EmptySource);
        }
        if self.take > C {
            return Err(MotionError::CapacityExceeded);
        }

        Ok(ByteFrames {
            decoder: *self,
            chunks: bytes.chunks(self.take),
        })
    }

    /// Bytes consumed per frame.
    pub fn take(&self) -> usize {
        self.take
    }
}

/// Iterator over the frames of one byte buffer pass.
#[derive(Debug, Clone)]
pub struct ByteFrames<'a, const C: usize> {
    decoder: ByteDecoder,
    chunks: core::slice::Chunks<'a, u8>,
}

impl<const C: usize> Iterator for ByteFrames<'_, C> {
    type Item = Frame<C>;

    fn next(&mut self) -> Option<Frame<C>> {
        let chunk = self.chunks.next()?;
        let targets = chunk
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                ChannelTarget::new(
                    ChannelId(index as u8),
                    self.decoder.position(value),
                    self.decoder.duration_ms,
                )
            })
            .collect();
        Some(Frame::from_validated(targets, self.decoder.easing))
    }
}

/// A byte buffer replayed through a [`ByteDecoder`].
#[derive(Debug, Clone)]
pub struct ByteStream<'a, const C: usize> {
    decoder: ByteDecoder,
    bytes: &'a [u8],
    frames: ByteFrames<'a, C>,
    looping: bool,
}

impl<'a, const C: usize> ByteStream<'a, C> {
    /// Creates a stream over `bytes`.
    ///
    /// A looping stream starts a fresh pass when the buffer runs out; a
    /// one-shot stream ends.
    ///
    /// # Errors
    /// Same as [`ByteDecoder::frames`].
    pub fn new(decoder: ByteDecoder, bytes: &'a [u8], looping: bool) -> Result<Self, MotionError> {
        let frames = decoder.frames(bytes)?;
        Ok(Self {
            decoder,
            bytes,
            frames,
            looping,
        })
    }

    /// Next decoded frame, or `None` once a one-shot stream is exhausted.
    pub fn next_frame(&mut self) -> Option<Frame<C>> {
        if let Some(frame) = self.frames.next() {
            return Some(frame);
        }
        if !self.looping {
            return None;
        }

        self.rewind();
        self.frames.next()
    }

    /// Starts a fresh pass from the beginning of the buffer.
    pub fn rewind(&mut self) {
        self.frames = ByteFrames {
            decoder: self.decoder,
            chunks: self.bytes.chunks(self.decoder.take),
        };
    }
}

/// Supplies frames to the scheduler.
#[derive(Debug, Clone)]
pub enum SequenceSource<'a, const C: usize, const F: usize> {
    /// Endless round robin over a fixed table.
    Table(FrameTable<C, F>),
    /// Frames decoded from a byte buffer.
    Bytes(ByteStream<'a, C>),
}

impl<const C: usize, const F: usize> SequenceSource<'_, C, F> {
    /// Next frame to play, or `None` once a one-shot byte stream runs dry.
    pub fn next_frame(&mut self) -> Option<Frame<C>> {
        match self {
            SequenceSource::Table(table) => Some(table.next_frame().clone()),
            SequenceSource::Bytes(stream) => stream.next_frame(),
        }
    }

    /// Checks that every frame this source can produce stays inside
    /// `channels` servos.
    ///
    /// # Errors
    /// * `UnknownChannel` - Some frame addresses a channel id `>= channels`
    pub fn check_channels(&self, channels: usize) -> Result<(), MotionError> {
        match self {
            SequenceSource::Table(table) => table
                .frames
                .iter()
                .try_for_each(|frame| frame.check_channels(channels)),
            SequenceSource::Bytes(stream) if stream.decoder.take > channels => {
                Err(MotionError::UnknownChannel {
                    channel: ChannelId((stream.decoder.take - 1) as u8),
                    channels,
                })
            }
            SequenceSource::Bytes(_) => Ok(()),
        }
    }
}

impl<const C: usize, const F: usize> From<FrameTable<C, F>> for SequenceSource<'_, C, F> {
    fn from(table: FrameTable<C, F>) -> Self {
        SequenceSource::Table(table)
    }
}

impl<'a, const C: usize, const F: usize> From<ByteStream<'a, C>> for SequenceSource<'a, C, F> {
    fn from(stream: ByteStream<'a, C>) -> Self {
        SequenceSource::Bytes(stream)
    }
}
