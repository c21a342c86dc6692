//! Encoder and decoder for the [QOI image format](https://qoiformat.org/).
//!
//! QOI losslessly compresses a raster of 8-bit straight-alpha RGBA pixels
//! into a stream of one-to-five-byte chunks. Compression comes from three
//! pieces of running state shared by the encoder and the decoder:
//!
//! - the previously seen pixel, which starts out as `(0, 0, 0, 255)`,
//! - a 64-entry array of recently seen pixels, indexed by a fixed hash of
//!   the pixel's channels, which starts out all-zero,
//! - a run-length counter for repetitions of the previous pixel.
//!
//! All channel arithmetic wraps modulo 256. Both sides update the running
//! state the same way chunk by chunk, so the encoder never has to transmit
//! it.
//!
//! # Stream format
//!
//! A stream is a fixed 14-byte header, a sequence of chunks and an 8-byte
//! end marker.
//!
//! ```plain
//! .- Header ------------------------------------------------.
//! | magic "qoif" | width u32be | height u32be | chan | csp  |
//! `---------------------------------------------------------`
//! ```
//!
//! `chan` (3 or 4) and `csp` (0 = sRGB with linear alpha, 1 = all channels
//! linear) are purely advisory; they never change how the chunk stream is
//! encoded or decoded.
//!
//! See [consts] for the different chunk operation types. The end of the
//! pixel data is determined by `width * height` alone; the end marker that
//! follows it exists so that consumers can detect truncation.
//!
//! # APIs
//!
//! The crate is `no_std` by default. The `alloc` feature enables the
//! `Vec`-based entry points ([`encode::QoiEncodeContext::encode_to_vec`],
//! [`decode::QoiDecodeContext::decode_to_vec`]), the `std` feature (on by
//! default) additionally enables the `std::io::Write`- and
//! `std::io::Read`-based ones. [`decode::streaming_no_header`] decodes a
//! bare chunk stream that arrives in arbitrary splits.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
pub mod encode;

pub mod decode;
pub mod utils;

pub use decode::{DecodeError, QoiDecodeContext};
#[cfg(feature = "alloc")]
pub use encode::QoiEncodeContext;

/// A straight-alpha RGBA pixel.
///
/// Channel arithmetic performed by the codec wraps modulo 256.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// The implicit previous pixel at the start of every chunk stream.
    pub const START: Rgba = Rgba::new(0, 0, 0, 255);

    /// The value filling the color array at the start of a stream. Note
    /// that the alpha differs from [`Rgba::START`].
    pub const ZERO: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// The advisory channel count carried in the header.
///
/// A QOI chunk stream always describes RGBA pixels; this field only records
/// whether the alpha channel carries information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

impl Channels {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }
}

/// The advisory colorspace carried in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorSpace {
    /// sRGB with linear alpha.
    Srgb = 0,
    /// All channels linear.
    Linear = 1,
}

impl ColorSpace {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Srgb),
            1 => Some(Self::Linear),
            _ => None,
        }
    }
}

/// The fixed 14-byte stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: ColorSpace,
}

impl Header {
    /// A header for a `width` by `height` image with the default advisory
    /// fields ([`Channels::Rgba`], [`ColorSpace::Srgb`]).
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: Channels::Rgba,
            colorspace: ColorSpace::Srgb,
        }
    }

    /// The number of pixels in the image, or `None` if `width * height`
    /// does not fit in memory on this target.
    pub fn pixel_count(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)
    }

    /// The header in wire layout, all integers big-endian.
    pub const fn to_bytes(&self) -> [u8; consts::QOI_HEADER_LEN] {
        let [m0, m1, m2, m3] = consts::QOI_MAGIC;
        let [w0, w1, w2, w3] = self.width.to_be_bytes();
        let [h0, h1, h2, h3] = self.height.to_be_bytes();
        [
            m0, m1, m2, m3, w0, w1, w2, w3, h0, h1, h2, h3,
            self.channels as u8,
            self.colorspace as u8,
        ]
    }
}

pub mod consts {
    /// The magic bytes opening every stream: `"qoif"`.
    pub const QOI_MAGIC: [u8; 4] = *b"qoif";

    /// Size of the wire header in bytes.
    pub const QOI_HEADER_LEN: usize = 14;

    /// The 8 bytes closing every stream.
    pub const QOI_END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

    /// Re-emit a pixel from the color array.
    ///
    /// ```plain
    /// .- QOI_OP_INDEX ----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  0  0 |     index       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b00
    /// - 6-bit index into the color array: 0..63
    ///
    /// The re-emitted pixel is already in the array, so the array is not
    /// touched.
    pub const QOI_OP_INDEX: u8 = 0b0000_0000;

    /// Calculate a pixel from a 2-bit per-channel difference to the
    /// previous pixel. Alpha is carried over unchanged.
    ///
    /// ```plain
    /// .- QOI_OP_DIFF -----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----+-----+-----|
    /// |  0  1 |  dr |  dg |  db |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b01
    /// - 2-bit red, green and blue channel differences from the previous
    ///   pixel between -2..1, stored with a bias of 2
    ///
    /// Differences wrap modulo 256, so 0 to 255 is a valid difference of
    /// -1.
    pub const QOI_OP_DIFF: u8 = 0b0100_0000;

    /// Calculate a pixel from a 6-bit green-channel difference to the
    /// previous pixel, and 4-bit differences to the green-channel
    /// difference for red and blue. Alpha is carried over unchanged.
    ///
    /// ```plain
    /// .- QOI_OP_LUMA -------------------------------------.
    /// |         Byte[0]         |         Byte[1]         |
    /// |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------+-------------+-----------|
    /// |  1  0 |   green diff    |   dr - dg   |  db - dg  |
    /// `---------------------------------------------------`
    /// ```
    ///
    /// - 2-bit tag b10
    /// - 6-bit green channel difference from the previous pixel (-32..31),
    ///   stored with a bias of 32
    /// - 4-bit red and blue channel differences minus the green channel
    ///   difference (-8..7), stored with a bias of 8
    ///
    /// All differences wrap modulo 256.
    pub const QOI_OP_LUMA: u8 = 0b1000_0000;

    /// Repeat the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RUN ------------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  1  1 |       run       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b11
    /// - 6-bit run-length repeating the previous pixel: 1..62
    /// - The run-length is stored with a bias of -1. The run-lengths 63 and
    ///   64 (`b111110` and `b111111`) are illegal as those bytes are
    ///   occupied by the QOI_OP_RGB and QOI_OP_RGBA tags.
    pub const QOI_OP_RUN: u8 = 0b1100_0000;

    /// Emit a full pixel, carrying alpha over from the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RGB ------------------------------------.
    /// |         Byte[0]         | Byte[1] | B[2] | B[3] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7..0 | 7..0 |
    /// |-------------------------+---------+------+------|
    /// |  1  1  1  1  1  1  1  0 |   red   | green| blue |
    /// `-------------------------------------------------`
    /// ```
    ///
    /// - 8-bit tag b11111110, to be matched before the 2-bit b11 run tag
    pub const QOI_OP_RGB: u8 = 0b1111_1110;

    /// Emit a full pixel including alpha.
    ///
    /// ```plain
    /// .- QOI_OP_RGBA -------------------------------------------.
    /// |         Byte[0]         | Byte[1] | B[2] | B[3] | B[4]  |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7..0 | 7..0 | 7..0  |
    /// |-------------------------+---------+------+------+-------|
    /// |  1  1  1  1  1  1  1  1 |   red   | green| blue | alpha |
    /// `---------------------------------------------------------`
    /// ```
    ///
    /// - 8-bit tag b11111111, to be matched before the 2-bit b11 run tag
    pub const QOI_OP_RGBA: u8 = 0b1111_1111;
}
