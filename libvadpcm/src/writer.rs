use crate::core::{AdpcmEncodedData, Frame, BYTES_PER_FRAME};

/// writer for raw vadpcm frame streams
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// concatenate frames as 9-byte records
    pub fn write_frames(mut self, frames: &[Frame]) -> Vec<u8> {
        self.buffer.reserve(frames.len() * BYTES_PER_FRAME);
        for frame in frames {
            self.buffer.extend_from_slice(&frame.to_bytes());
        }
        self.buffer
    }

    /// frame bytes of an encoded stream (codebook and loop travel separately)
    pub fn write(self, data: &AdpcmEncodedData) -> Vec<u8> {
        self.write_frames(&data.frames)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
