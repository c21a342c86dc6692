use crate::{
    consts::*,
    decode::ops::{apply_diff, apply_luma},
    utils::hash,
    Channels, ColorSpace, Header, Rgba,
};
use snafu::{ensure, OptionExt, Snafu};

pub(crate) mod ops;
pub mod streaming_no_header;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "std")]
mod std_api;

/// Everything that can go wrong while decoding a stream.
///
/// Encoded streams are never trusted: the header fields, every chunk and
/// the end marker are validated, and the first violation aborts the decode.
#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("bad magic bytes {found:?}"))]
    BadMagic { found: [u8; 4] },
    #[snafu(display("bad channels value {value}, expected 3 or 4"))]
    BadChannels { value: u8 },
    #[snafu(display("bad colorspace value {value}, expected 0 or 1"))]
    BadColorSpace { value: u8 },
    #[snafu(display("an image of {width}x{height} pixels is not addressable on this target"))]
    DimensionOverflow { width: u32, height: u32 },
    #[snafu(display("stream too short for the 14-byte header"))]
    TruncatedHeader,
    #[snafu(display("stream ended inside a chunk"))]
    TruncatedChunk,
    #[snafu(display("chunk produces {count} pixels but only {remaining} remain in the image"))]
    RunOverrun { count: usize, remaining: usize },
    #[snafu(display("stream ended without an end marker"))]
    EndMarkerMissing,
    #[snafu(display("stream ended {got} bytes into the end marker"))]
    EndMarkerPartial { got: usize },
    #[snafu(display("bad end marker {found:?}"))]
    EndMarkerBad { found: [u8; 8] },
    #[snafu(display("output buffer holds {len} pixels, the image has {expected}"))]
    OutputTooSmall { len: usize, expected: usize },
    #[cfg(feature = "std")]
    #[snafu(display("reading the stream failed"))]
    ReadIo { source: std::io::Error },
}

pub(crate) fn parse_header(data: &[u8]) -> Result<(Header, &[u8]), DecodeError> {
    ensure!(data.len() >= QOI_HEADER_LEN, TruncatedHeaderSnafu);
    let (header, rest) = data.split_at(QOI_HEADER_LEN);

    let found = [header[0], header[1], header[2], header[3]];
    ensure!(found == QOI_MAGIC, BadMagicSnafu { found });

    let width = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let height = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    let channels = Channels::from_u8(header[12]).context(BadChannelsSnafu { value: header[12] })?;
    let colorspace =
        ColorSpace::from_u8(header[13]).context(BadColorSpaceSnafu { value: header[13] })?;

    Ok((
        Header {
            width,
            height,
            channels,
            colorspace,
        },
        rest,
    ))
}

fn check_end_marker(data: &[u8]) -> Result<(), DecodeError> {
    ensure!(!data.is_empty(), EndMarkerMissingSnafu);
    ensure!(data.len() >= 8, EndMarkerPartialSnafu { got: data.len() });
    let mut found = [0; 8];
    found.copy_from_slice(&data[..8]);
    ensure!(found == QOI_END_MARKER, EndMarkerBadSnafu { found });
    Ok(())
}

fn next(data: &mut &[u8]) -> Result<u8, DecodeError> {
    let (&byte, rest) = data.split_first().ok_or(DecodeError::TruncatedChunk)?;
    *data = rest;
    Ok(byte)
}

/// The running state shared by every chunk of one stream.
#[derive(Debug, Clone, Copy)]
pub struct QoiDecodeContext {
    pub prev: Rgba,
    pub arr: [Rgba; 64],
}

impl QoiDecodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Rgba::START,
            arr: [Rgba::ZERO; 64],
        }
    }
}

impl Default for QoiDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiDecodeContext {
    /// Decodes a whole QOI stream into a caller-provided pixel buffer.
    ///
    /// The buffer must hold at least `width * height` pixels. Returns the
    /// parsed header, if successful.
    pub fn decode_to_slice(data: &[u8], output: &mut [Rgba]) -> Result<Header, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_to_slice_with_state(data, output)
    }

    /// Decodes a whole QOI stream into a caller-provided pixel buffer, with
    /// the given state as starting state.
    pub fn decode_to_slice_with_state(
        &mut self,
        data: &[u8],
        output: &mut [Rgba],
    ) -> Result<Header, DecodeError> {
        let (header, mut data) = parse_header(data)?;
        let pixel_count = header.pixel_count().context(DimensionOverflowSnafu {
            width: header.width,
            height: header.height,
        })?;
        ensure!(
            output.len() >= pixel_count,
            OutputTooSmallSnafu {
                len: output.len(),
                expected: pixel_count,
            }
        );

        let mut written = 0;
        while written < pixel_count {
            let byte = next(&mut data)?;

            let pixel = match byte >> 6 {
                // the two 8-bit tags share the b11 prefix with runs and win
                0b11 => match byte {
                    QOI_OP_RGB => {
                        let (r, g, b) = (next(&mut data)?, next(&mut data)?, next(&mut data)?);
                        Rgba::new(r, g, b, self.prev.a)
                    }
                    QOI_OP_RGBA => {
                        let (r, g, b) = (next(&mut data)?, next(&mut data)?, next(&mut data)?);
                        Rgba::new(r, g, b, next(&mut data)?)
                    }
                    _ => {
                        let count = usize::from((byte & 0b0011_1111) + 1);
                        ensure!(
                            count <= pixel_count - written,
                            RunOverrunSnafu {
                                count,
                                remaining: pixel_count - written,
                            }
                        );
                        output[written..written + count].fill(self.prev);
                        written += count;

                        // the run value may be the start pixel, which no
                        // earlier chunk has inserted
                        self.arr[usize::from(hash(self.prev))] = self.prev;
                        continue;
                    }
                },
                0b00 => {
                    let pixel = self.arr[usize::from(byte)];
                    self.prev = pixel;
                    output[written] = pixel;
                    written += 1;
                    continue;
                }
                0b01 => apply_diff(self.prev, byte),
                0b10 => {
                    let second = next(&mut data)?;
                    apply_luma(self.prev, byte, second)
                }
                _ => unreachable!(),
            };

            self.arr[usize::from(hash(pixel))] = pixel;
            self.prev = pixel;
            output[written] = pixel;
            written += 1;
        }

        check_end_marker(data)?;

        Ok(header)
    }
}
