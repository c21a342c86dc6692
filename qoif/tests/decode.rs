//! Byte-level checks of chunk decoding.

use qoif::{consts::QOI_END_MARKER, Header, QoiDecodeContext, Rgba};

/// A full stream for `width` x `height` around the given chunk bytes.
fn qoi(width: u32, height: u32, chunks: &[u8]) -> Vec<u8> {
    let mut data = Header::new(width, height).to_bytes().to_vec();
    data.extend_from_slice(chunks);
    data.extend_from_slice(&QOI_END_MARKER);
    data
}

fn decode(data: &[u8]) -> Vec<Rgba> {
    let mut pixels = Vec::new();
    QoiDecodeContext::decode_to_vec(data, &mut pixels).unwrap();
    pixels
}

#[test]
fn rgb_chunk_keeps_previous_alpha() {
    let pixels = decode(&qoi(1, 1, &[0xFE, 128, 0, 0]));
    assert_eq!(pixels, [Rgba::new(128, 0, 0, 255)]);
}

#[test]
fn rgba_chunk_replaces_alpha() {
    let pixels = decode(&qoi(1, 1, &[0xFF, 128, 0, 0, 128]));
    assert_eq!(pixels, [Rgba::new(128, 0, 0, 128)]);
}

#[test]
fn alpha_carries_over_into_later_chunks() {
    let pixels = decode(&qoi(2, 1, &[0xFF, 10, 10, 10, 128, 0xFE, 20, 20, 20]));
    assert_eq!(
        pixels,
        [Rgba::new(10, 10, 10, 128), Rgba::new(20, 20, 20, 128)]
    );
}

#[test]
fn index_chunk_reads_the_color_array() {
    let pixels = decode(&qoi(
        3,
        1,
        &[0xFE, 128, 0, 0, 0xFE, 0, 127, 0, 0b00_110101],
    ));
    assert_eq!(
        pixels,
        [
            Rgba::new(128, 0, 0, 255),
            Rgba::new(0, 127, 0, 255),
            Rgba::new(128, 0, 0, 255),
        ]
    );
}

#[test]
fn diff_chunk() {
    let pixels = decode(&qoi(2, 1, &[0xFE, 128, 0, 0, 0b01_11_10_10]));
    assert_eq!(
        pixels,
        [Rgba::new(128, 0, 0, 255), Rgba::new(129, 0, 0, 255)]
    );
}

#[test]
fn diff_chunk_wraps_modulo_256() {
    let pixels = decode(&qoi(2, 1, &[0xFE, 128, 255, 0, 0b01_10_11_01]));
    assert_eq!(
        pixels,
        [Rgba::new(128, 255, 0, 255), Rgba::new(128, 0, 255, 255)]
    );
}

#[test]
fn luma_chunk() {
    let pixels = decode(&qoi(2, 1, &[0xFE, 128, 0, 0, 0b10_111111, 0b0000_1111]));
    assert_eq!(
        pixels,
        [Rgba::new(128, 0, 0, 255), Rgba::new(151, 31, 38, 255)]
    );
}

#[test]
fn luma_chunk_wraps_modulo_256() {
    let pixels = decode(&qoi(2, 1, &[0xFE, 128, 255, 0, 0b10_100010, 0b0110_0101]));
    assert_eq!(
        pixels,
        [Rgba::new(128, 255, 0, 255), Rgba::new(128, 1, 255, 255)]
    );
}

#[test]
fn run_chunk_repeats_the_previous_pixel() {
    let pixels = decode(&qoi(
        5,
        1,
        &[0xFE, 128, 0, 0, 0b11_000010, 0xFE, 128, 129, 0],
    ));
    assert_eq!(
        pixels,
        [
            Rgba::new(128, 0, 0, 255),
            Rgba::new(128, 0, 0, 255),
            Rgba::new(128, 0, 0, 255),
            Rgba::new(128, 0, 0, 255),
            Rgba::new(128, 129, 0, 255),
        ]
    );
}

#[test]
fn run_chunk_may_open_the_stream() {
    // 0xFD is run 62, not an 8-bit tag; the repeated value is the implicit
    // start pixel
    let pixels = decode(&qoi(62, 1, &[0b11_111101]));
    assert_eq!(pixels, vec![Rgba::new(0, 0, 0, 255); 62]);
}

#[test]
fn index_chunk_right_after_opening_run() {
    let pixels = decode(&qoi(
        4,
        1,
        &[0b11_000001, 0xFE, 127, 0, 0, 0b00_110101],
    ));
    assert_eq!(
        pixels,
        [
            Rgba::new(0, 0, 0, 255),
            Rgba::new(0, 0, 0, 255),
            Rgba::new(127, 0, 0, 255),
            Rgba::new(0, 0, 0, 255),
        ]
    );
}

#[test]
fn untouched_color_array_slots_decode_to_zero() {
    let pixels = decode(&qoi(1, 1, &[0b00_001111]));
    assert_eq!(pixels, [Rgba::ZERO]);
}

#[test]
fn slice_and_reader_apis_agree() {
    let data = qoi(4, 1, &[0b11_000001, 0xFE, 127, 0, 0, 0b00_110101]);

    let mut to_slice = [Rgba::ZERO; 4];
    let header = QoiDecodeContext::decode_to_slice(&data, &mut to_slice).unwrap();
    assert_eq!(header, Header::new(4, 1));

    let mut from_reader = Vec::new();
    QoiDecodeContext::decode_read(&data[..], &mut from_reader).unwrap();

    assert_eq!(to_slice[..], from_reader[..]);
    assert_eq!(decode(&data)[..], from_reader[..]);
}
