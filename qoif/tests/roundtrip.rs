use qoif::{
    consts::{QOI_END_MARKER, QOI_HEADER_LEN},
    decode::streaming_no_header::QoiStreamingDecodeContext,
    Channels, Header, QoiDecodeContext, QoiEncodeContext, Rgba,
};

/// Deterministic pseudo-random bytes, so the corpus is stable across runs.
struct Lcg(u32);

impl Lcg {
    fn next_u8(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(1664525).wrapping_add(1013904223);
        (self.0 >> 24) as u8
    }
}

fn images() -> Vec<(Header, Vec<Rgba>)> {
    let mut images = Vec::new();

    images.push((Header::new(0, 0), Vec::new()));

    images.push((Header::new(1, 1), vec![Rgba::new(128, 0, 0, 255)]));

    // long runs, including several maximum-length ones
    let flat = Header::new(64, 64);
    images.push((flat, vec![Rgba::new(30, 60, 90, 255); 64 * 64]));

    // smooth gradients favor the diff and luma chunks
    let gradient = Header::new(128, 64);
    let mut pixels = Vec::with_capacity(128 * 64);
    for y in 0..64u32 {
        for x in 0..128u32 {
            pixels.push(Rgba::new(x as u8, y as u8, (x ^ y) as u8, 255));
        }
    }
    images.push((gradient, pixels));

    // two alternating row colors exercise the color array
    let stripes = Header {
        channels: Channels::Rgb,
        ..Header::new(32, 33)
    };
    let mut pixels = Vec::with_capacity(32 * 33);
    for y in 0..33 {
        let color = if y % 2 == 0 {
            Rgba::new(200, 10, 10, 255)
        } else {
            Rgba::new(10, 10, 200, 255)
        };
        pixels.extend(std::iter::repeat(color).take(32));
    }
    images.push((stripes, pixels));

    // noise with a varying alpha channel forces rgba chunks
    let noise = Header::new(77, 33);
    let mut rng = Lcg(0x51_6f_49_66);
    let mut pixels = Vec::with_capacity(77 * 33);
    for _ in 0..77 * 33 {
        pixels.push(Rgba::new(
            rng.next_u8(),
            rng.next_u8(),
            rng.next_u8(),
            rng.next_u8() | 0x80,
        ));
    }
    images.push((noise, pixels));

    images
}

#[test]
fn roundtrip() {
    for (header, input) in images() {
        let mut encoded = Vec::with_capacity(input.len() * 5 + 22);
        assert!(QoiEncodeContext::encode_to_vec(header, &input, &mut encoded));

        let mut encoded2 = Vec::with_capacity(encoded.len());
        QoiEncodeContext::encode(header, &input, &mut encoded2).unwrap();
        assert_eq!(encoded, encoded2, "encoding mismatch");

        assert_eq!(&encoded[..QOI_HEADER_LEN], &header.to_bytes()[..]);
        assert_eq!(&encoded[encoded.len() - 8..], &QOI_END_MARKER[..]);

        let mut decoded_to_vec = Vec::with_capacity(input.len());
        let parsed = QoiDecodeContext::decode_to_vec(&encoded, &mut decoded_to_vec).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(input, decoded_to_vec, "vec decoding failed");

        let mut decoded_to_slice = vec![Rgba::ZERO; input.len()];
        QoiDecodeContext::decode_to_slice(&encoded, &mut decoded_to_slice).unwrap();
        assert_eq!(input, decoded_to_slice, "slice decoding failed");

        let mut decoded_from_reader = Vec::with_capacity(input.len());
        QoiDecodeContext::decode_read(&encoded[..], &mut decoded_from_reader).unwrap();
        assert_eq!(input, decoded_from_reader, "reader decoding failed");

        let mut streaming_decoded = vec![Rgba::ZERO; input.len()];
        let mut state = QoiStreamingDecodeContext::new();
        let mut streaming_output_buf = &mut streaming_decoded[..];
        for chunk in encoded[QOI_HEADER_LEN..encoded.len() - 8].chunks(512) {
            let pixels_written = state.streaming_decode(chunk, streaming_output_buf).unwrap();
            streaming_output_buf = &mut streaming_output_buf[pixels_written..];
        }
        assert_eq!(input, streaming_decoded, "streaming decoding failed");
    }
}

#[test]
fn encoding_is_deterministic() {
    for (header, input) in images() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        assert!(QoiEncodeContext::encode_to_vec(header, &input, &mut first));
        assert!(QoiEncodeContext::encode_to_vec(header, &input, &mut second));
        assert_eq!(first, second);
    }
}

#[test]
fn color_array_slots_match_their_hash() {
    use qoif::utils::hash;

    for (header, input) in images() {
        let mut encoded = Vec::new();
        let mut encoder = QoiEncodeContext::new();
        assert!(encoder.encode_to_vec_with_state(header, &input, &mut encoded));

        let mut decoded = Vec::new();
        let mut decoder = QoiDecodeContext::new();
        decoder
            .decode_to_vec_with_state(&encoded, &mut decoded)
            .unwrap();

        for (i, arr) in [encoder.arr, decoder.arr].into_iter().enumerate() {
            for (slot, &pixel) in arr.iter().enumerate() {
                assert!(
                    pixel == Rgba::ZERO || usize::from(hash(pixel)) == slot,
                    "side {i}: slot {slot} holds {pixel:?}"
                );
            }
        }
    }
}

#[test]
fn streaming_decode_survives_any_split() {
    let (header, input) = images().pop().unwrap();

    let mut encoded = Vec::new();
    assert!(QoiEncodeContext::encode_to_vec(header, &input, &mut encoded));
    let chunk_stream = &encoded[QOI_HEADER_LEN..encoded.len() - 8];

    // single-byte feeding cuts every multi-byte chunk apart
    for chunk_len in [1, 2, 3, 7] {
        let mut decoded = vec![Rgba::ZERO; input.len()];
        let mut state = QoiStreamingDecodeContext::new();
        let mut output_buf = &mut decoded[..];
        for chunk in chunk_stream.chunks(chunk_len) {
            let pixels_written = state.streaming_decode(chunk, output_buf).unwrap();
            output_buf = &mut output_buf[pixels_written..];
        }
        assert_eq!(input, decoded, "chunk_len {chunk_len} failed");
    }
}
