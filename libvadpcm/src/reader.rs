use crate::core::{
    number_samples, AdpcmEncodedData, Codebook, Frame, VadpcmResult, BYTES_PER_FRAME,
};

/// reader for raw vadpcm frame streams
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// split into 9-byte frames; a trailing partial record is ignored
    pub fn read_frames(&self, data: &[u8]) -> Vec<Frame> {
        data.chunks_exact(BYTES_PER_FRAME)
            .map(|chunk| {
                let mut bytes = [0u8; BYTES_PER_FRAME];
                bytes.copy_from_slice(chunk);
                Frame::from_bytes(&bytes)
            })
            .collect()
    }

    /// read a frame stream and pair it with its codebook
    ///
    /// The sample count is the whole number of frames times 16; pass the
    /// real count on to the decoder if the sound is shorter.
    pub fn read(
        &self,
        data: &[u8],
        codebook: Codebook,
        sample_rate: f64,
    ) -> VadpcmResult<AdpcmEncodedData> {
        let encoded = AdpcmEncodedData {
            sample_count: number_samples(data.len()),
            sample_rate,
            codebook,
            loop_point: None,
            frames: self.read_frames(data),
        };
        encoded.validate()?;
        Ok(encoded)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}
