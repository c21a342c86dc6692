use crate::{
    consts::*,
    encode::QoiEncodeContext,
    utils::{diff, hash, luma_diff},
    Header, Rgba,
};
use byteorder::{BigEndian, WriteBytesExt};
use snafu::{ensure, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display(
        "header says {width}x{height} == {} pixels, but {pixel_count} pixels were given",
        width * height
    ))]
    InvalidDimensions {
        width: u64,
        height: u64,
        pixel_count: usize,
    },
    WriteIo {
        source: std::io::Error,
    },
}

impl QoiEncodeContext {
    /// Encodes an image as a complete QOI stream written to `w`.
    ///
    /// `pixels` are in row-major order. Produces the same bytes as
    /// [`QoiEncodeContext::encode_to_vec`]; the only errors are a
    /// header/pixel-count mismatch and failures of the sink itself.
    pub fn encode<W: Write>(header: Header, pixels: &[Rgba], w: W) -> Result<(), EncodeError> {
        let mut ctx = QoiEncodeContext::new();
        ctx.encode_with_state(header, pixels, w)
    }

    pub fn encode_header<W: Write>(header: Header, mut w: W) -> Result<(), EncodeError> {
        w.write_all(&QOI_MAGIC).context(WriteIoSnafu)?;
        w.write_u32::<BigEndian>(header.width).context(WriteIoSnafu)?;
        w.write_u32::<BigEndian>(header.height).context(WriteIoSnafu)?;
        w.write_u8(header.channels as u8).context(WriteIoSnafu)?;
        w.write_u8(header.colorspace as u8).context(WriteIoSnafu)
    }

    pub fn encode_with_state<W: Write>(
        &mut self,
        header: Header,
        pixels: &[Rgba],
        mut w: W,
    ) -> Result<(), EncodeError> {
        ensure!(
            header.pixel_count() == Some(pixels.len()),
            InvalidDimensionsSnafu {
                width: u64::from(header.width),
                height: u64::from(header.height),
                pixel_count: pixels.len(),
            }
        );

        Self::encode_header(header, &mut w)?;
        self.encode_pixels(pixels, w)?;

        Ok(())
    }

    /// Encodes the chunk stream and the end marker, without the header.
    pub fn encode_pixels<W: Write>(&mut self, pixels: &[Rgba], mut w: W) -> Result<(), EncodeError> {
        macro_rules! w {
            ($bytes:expr) => {
                w.write_all($bytes).context(WriteIoSnafu)
            };
        }

        let mut pixels = pixels.iter();

        loop {
            let Some(&pixel) = pixels.next() else {
                break;
            };

            if pixel == self.prev {
                let slice = pixels.as_slice();
                let repeats = slice.iter().take_while(|&&p| p == self.prev).count();
                pixels = slice[repeats..].iter();

                // account for initial `pixel` from above
                let count = repeats + 1;

                let full_runs = count / 62;
                let rest_count = count % 62;
                for _ in 0..full_runs {
                    w!(&[QOI_OP_RUN | (62 - 1)])?;
                }
                if rest_count > 0 {
                    w!(&[QOI_OP_RUN | (rest_count - 1) as u8])?;
                }

                // already same as prev; refresh the array slot so an index
                // chunk may refer to the run value even when it is the
                // never-emitted start pixel
                self.arr[usize::from(hash(pixel))] = pixel;
                continue;
            }

            let index = hash(pixel);
            if self.arr[usize::from(index)] == pixel {
                w!(&[QOI_OP_INDEX | index])?;
                self.prev = pixel;
                // already in arr
                continue;
            }

            if pixel.a == self.prev.a {
                let (dr, dg, db) = diff(self.prev, pixel);

                if dr < 4 && dg < 4 && db < 4 {
                    w!(&[QOI_OP_DIFF | dr << 4 | dg << 2 | db])?;
                } else {
                    let (dg, dr_dg, db_dg) = luma_diff(self.prev, pixel);

                    if dg < 64 && dr_dg < 16 && db_dg < 16 {
                        w!(&[QOI_OP_LUMA | dg, dr_dg << 4 | db_dg])?;
                    } else {
                        w!(&[QOI_OP_RGB, pixel.r, pixel.g, pixel.b])?;
                    }
                }
            } else {
                w!(&[QOI_OP_RGBA, pixel.r, pixel.g, pixel.b, pixel.a])?;
            }

            // add to color array
            self.arr[usize::from(index)] = pixel;
            self.prev = pixel;
        }

        w!(&QOI_END_MARKER)?;

        Ok(())
    }
}
