use crate::{
    consts::*,
    decode::{
        ops::{apply_diff, apply_luma},
        DecodeError, RunOverrunSnafu,
    },
    utils::hash,
    Rgba,
};
use snafu::ensure;

/// Decodes a bare QOI chunk stream that arrives in arbitrary splits.
///
/// The context carries a partially received chunk across calls, so the
/// input may be cut at any byte position. Header and end marker are not
/// part of the chunk stream; the caller strips both (the pixel data of a
/// whole file is `data[14..data.len() - 8]`).
#[derive(Debug, Clone, Copy)]
pub struct QoiStreamingDecodeContext {
    state: QoiStreamingDecodeState,
    prev: Rgba,
    arr: [Rgba; 64],
}

/// Which payload byte of a multi-byte chunk is expected next.
#[derive(Debug, Clone, Copy)]
enum QoiStreamingDecodeState {
    Default,
    RgbByte1,
    RgbByte2(u8),
    RgbByte3(u8, u8),
    RgbaByte1,
    RgbaByte2(u8),
    RgbaByte3(u8, u8),
    RgbaByte4(u8, u8, u8),
    LumaByte2(u8),
}

impl Default for QoiStreamingDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

fn set_pixel(
    ctx: &mut QoiStreamingDecodeContext,
    pixel: Rgba,
    output: &mut [Rgba],
    output_idx: &mut usize,
) -> Result<(), DecodeError> {
    ensure!(
        *output_idx < output.len(),
        RunOverrunSnafu {
            count: 1usize,
            remaining: 0usize,
        }
    );
    ctx.prev = pixel;
    output[*output_idx] = pixel;
    *output_idx += 1;
    Ok(())
}

impl QoiStreamingDecodeContext {
    pub const fn new() -> Self {
        Self {
            state: QoiStreamingDecodeState::Default,
            prev: Rgba::START,
            arr: [Rgba::ZERO; 64],
        }
    }

    /// Decodes a piece of a chunk stream into a buffer.
    ///
    /// Returns the number of pixels written to the output buffer. Note that
    /// this doesn't accumulate over multiple calls. You'll need to keep
    /// track of the number of pixels written and pass the correct output
    /// slice to the next call.
    pub fn streaming_decode(
        &mut self,
        input: &[u8],
        output: &mut [Rgba],
    ) -> Result<usize, DecodeError> {
        use QoiStreamingDecodeState as State;

        let mut output_idx = 0;

        for &byte in input {
            let pixel = match self.state {
                State::Default => match byte >> 6 {
                    0b00 => {
                        let pixel = self.arr[usize::from(byte)];
                        set_pixel(self, pixel, output, &mut output_idx)?;
                        continue;
                    }
                    0b01 => {
                        let pixel = apply_diff(self.prev, byte);
                        self.arr[usize::from(hash(pixel))] = pixel;
                        set_pixel(self, pixel, output, &mut output_idx)?;
                        continue;
                    }
                    0b10 => {
                        self.state = State::LumaByte2(byte);
                        continue;
                    }
                    _ => {
                        if byte == QOI_OP_RGB {
                            self.state = State::RgbByte1;
                        } else if byte == QOI_OP_RGBA {
                            self.state = State::RgbaByte1;
                        } else {
                            let count = usize::from((byte & 0b0011_1111) + 1);
                            let remaining = output.len() - output_idx;
                            ensure!(count <= remaining, RunOverrunSnafu { count, remaining });
                            output[output_idx..output_idx + count].fill(self.prev);
                            output_idx += count;

                            // the run value may be the start pixel, which
                            // no earlier chunk has inserted
                            self.arr[usize::from(hash(self.prev))] = self.prev;
                        }
                        continue;
                    }
                },
                State::RgbByte1 => {
                    self.state = State::RgbByte2(byte);
                    continue;
                }
                State::RgbByte2(r) => {
                    self.state = State::RgbByte3(r, byte);
                    continue;
                }
                State::RgbByte3(r, g) => Rgba::new(r, g, byte, self.prev.a),
                State::RgbaByte1 => {
                    self.state = State::RgbaByte2(byte);
                    continue;
                }
                State::RgbaByte2(r) => {
                    self.state = State::RgbaByte3(r, byte);
                    continue;
                }
                State::RgbaByte3(r, g) => {
                    self.state = State::RgbaByte4(r, g, byte);
                    continue;
                }
                State::RgbaByte4(r, g, b) => Rgba::new(r, g, b, byte),
                State::LumaByte2(first) => apply_luma(self.prev, first, byte),
            };

            self.arr[usize::from(hash(pixel))] = pixel;
            set_pixel(self, pixel, output, &mut output_idx)?;
            self.state = State::Default;
        }

        Ok(output_idx)
    }
}
