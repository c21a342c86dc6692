use crate::{
    consts::*,
    utils::{diff, hash, luma_diff},
    Header, Rgba,
};
use alloc::vec::Vec;

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

/// The running state shared by every chunk of one stream.
#[derive(Debug, Clone, Copy)]
pub struct QoiEncodeContext {
    pub prev: Rgba,
    pub arr: [Rgba; 64],
}

impl QoiEncodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Rgba::START,
            arr: [Rgba::ZERO; 64],
        }
    }
}

impl Default for QoiEncodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiEncodeContext {
    /// Encodes an image as a complete QOI stream appended to `w`.
    ///
    /// `pixels` are in row-major order. Returns `false` if the header
    /// dimensions don't match the number of pixels given.
    pub fn encode_to_vec(header: Header, pixels: &[Rgba], w: &mut Vec<u8>) -> bool {
        let mut state = QoiEncodeContext::new();
        state.encode_to_vec_with_state(header, pixels, w)
    }

    pub fn encode_to_vec_with_state(
        &mut self,
        header: Header,
        pixels: &[Rgba],
        w: &mut Vec<u8>,
    ) -> bool {
        if header.pixel_count() != Some(pixels.len()) {
            return false;
        }

        w.extend_from_slice(&header.to_bytes());

        let mut pixels = pixels.iter();

        loop {
            let Some(&pixel) = pixels.next() else {
                break;
            };

            if pixel == self.prev {
                let slice = pixels.as_slice();
                let repeats = slice.iter().take_while(|&&p| p == self.prev).count();
                pixels = slice[repeats..].iter();

                // initial pixel
                let count = repeats + 1;

                let full_runs = count / 62;
                let rest_count = count % 62;
                for _ in 0..full_runs {
                    w.push(QOI_OP_RUN | (62 - 1));
                }
                if rest_count > 0 {
                    w.push(QOI_OP_RUN | (rest_count - 1) as u8);
                }

                // already same as prev; refresh the array slot so an index
                // chunk may refer to the run value even when it is the
                // never-emitted start pixel
                self.arr[usize::from(hash(pixel))] = pixel;
                continue;
            }

            let index = hash(pixel);
            if self.arr[usize::from(index)] == pixel {
                w.push(QOI_OP_INDEX | index);
                self.prev = pixel;
                // already in arr
                continue;
            }

            if pixel.a == self.prev.a {
                let (dr, dg, db) = diff(self.prev, pixel);

                if dr < 4 && dg < 4 && db < 4 {
                    w.push(QOI_OP_DIFF | dr << 4 | dg << 2 | db);
                } else {
                    let (dg, dr_dg, db_dg) = luma_diff(self.prev, pixel);

                    if dg < 64 && dr_dg < 16 && db_dg < 16 {
                        w.extend_from_slice(&[QOI_OP_LUMA | dg, dr_dg << 4 | db_dg]);
                    } else {
                        w.extend_from_slice(&[QOI_OP_RGB, pixel.r, pixel.g, pixel.b]);
                    }
                }
            } else {
                w.extend_from_slice(&[QOI_OP_RGBA, pixel.r, pixel.g, pixel.b, pixel.a]);
            }

            // add to color array
            self.arr[usize::from(index)] = pixel;
            self.prev = pixel;
        }

        w.extend_from_slice(&QOI_END_MARKER);

        true
    }
}
