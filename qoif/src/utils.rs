use crate::Rgba;

/// Position of a pixel in the 64-entry color array.
///
/// The multiplications wrap modulo 256 before the low 6 bits are kept.
pub const fn hash(pixel: Rgba) -> u8 {
    pixel
        .r
        .wrapping_mul(3)
        .wrapping_add(pixel.g.wrapping_mul(5))
        .wrapping_add(pixel.b.wrapping_mul(7))
        .wrapping_add(pixel.a.wrapping_mul(11))
        & 0b111111 // % 64
}

/// QOI_OP_DIFF channel deltas from `prev` to `pixel`, biased by 2.
///
/// A delta is representable iff its biased form is below 4.
#[cfg(feature = "alloc")]
pub(crate) const fn diff(prev: Rgba, pixel: Rgba) -> (u8, u8, u8) {
    (
        pixel.r.wrapping_sub(prev.r).wrapping_add(2),
        pixel.g.wrapping_sub(prev.g).wrapping_add(2),
        pixel.b.wrapping_sub(prev.b).wrapping_add(2),
    )
}

/// QOI_OP_LUMA deltas: the green delta biased by 32, and the red and blue
/// deltas relative to the green delta, biased by 8.
///
/// Representable iff the biased forms are below 64, 16 and 16.
#[cfg(feature = "alloc")]
pub(crate) const fn luma_diff(prev: Rgba, pixel: Rgba) -> (u8, u8, u8) {
    let dg = pixel.g.wrapping_sub(prev.g);
    (
        dg.wrapping_add(32),
        pixel.r.wrapping_sub(prev.r).wrapping_sub(dg).wrapping_add(8),
        pixel.b.wrapping_sub(prev.b).wrapping_sub(dg).wrapping_add(8),
    )
}
