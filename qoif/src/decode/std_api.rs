use crate::{
    consts::*,
    decode::{
        ops::{apply_diff, apply_luma},
        BadChannelsSnafu, BadColorSpaceSnafu, BadMagicSnafu, DecodeError, DimensionOverflowSnafu,
        EndMarkerBadSnafu, EndMarkerMissingSnafu, EndMarkerPartialSnafu, QoiDecodeContext,
        ReadIoSnafu, RunOverrunSnafu,
    },
    utils::hash,
    Channels, ColorSpace, Header, Rgba,
};
use byteorder::{BigEndian, ReadBytesExt};
use snafu::{ensure, OptionExt, ResultExt};
use std::io::{ErrorKind, Read};

fn read_header<R: Read>(r: &mut R) -> Result<Header, DecodeError> {
    let mut found = [0; 4];
    r.read_exact(&mut found).context(ReadIoSnafu)?;
    ensure!(found == QOI_MAGIC, BadMagicSnafu { found });

    let width = r.read_u32::<BigEndian>().context(ReadIoSnafu)?;
    let height = r.read_u32::<BigEndian>().context(ReadIoSnafu)?;

    let value = r.read_u8().context(ReadIoSnafu)?;
    let channels = Channels::from_u8(value).context(BadChannelsSnafu { value })?;

    let value = r.read_u8().context(ReadIoSnafu)?;
    let colorspace = ColorSpace::from_u8(value).context(BadColorSpaceSnafu { value })?;

    Ok(Header {
        width,
        height,
        channels,
        colorspace,
    })
}

/// A short read inside the pixel data means a truncated chunk, not an I/O
/// failure.
fn read_chunk_bytes<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), DecodeError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => DecodeError::TruncatedChunk,
        _ => DecodeError::ReadIo { source: e },
    })
}

fn read_end_marker<R: Read>(r: &mut R) -> Result<(), DecodeError> {
    let mut found = [0; 8];
    let mut got = 0;
    while got < 8 {
        match r.read(&mut found[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::ReadIo { source: e }),
        }
    }
    ensure!(got != 0, EndMarkerMissingSnafu);
    ensure!(got == 8, EndMarkerPartialSnafu { got });
    ensure!(found == QOI_END_MARKER, EndMarkerBadSnafu { found });
    Ok(())
}

impl QoiDecodeContext {
    /// Decodes a QOI stream from a byte source, appending the pixels to
    /// `w`.
    ///
    /// Reads the header, exactly `width * height` pixels worth of chunks
    /// and the end marker; nothing past the marker is read. Returns the
    /// parsed header, if successful.
    pub fn decode_read<R: Read>(reader: R, w: &mut Vec<Rgba>) -> Result<Header, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_read_with_state(reader, w)
    }

    /// Decodes a QOI stream from a byte source, with the given state as
    /// starting state.
    pub fn decode_read_with_state<R: Read>(
        &mut self,
        mut r: R,
        w: &mut Vec<Rgba>,
    ) -> Result<Header, DecodeError> {
        let header = read_header(&mut r)?;
        let pixel_count = header.pixel_count().context(DimensionOverflowSnafu {
            width: header.width,
            height: header.height,
        })?;
        w.reserve(pixel_count);

        let mut remaining = pixel_count;
        while remaining > 0 {
            let mut byte = [0; 1];
            read_chunk_bytes(&mut r, &mut byte)?;
            let byte = byte[0];

            let pixel = match byte >> 6 {
                // the two 8-bit tags share the b11 prefix with runs and win
                0b11 => match byte {
                    QOI_OP_RGB => {
                        let mut rgb = [0; 3];
                        read_chunk_bytes(&mut r, &mut rgb)?;
                        Rgba::new(rgb[0], rgb[1], rgb[2], self.prev.a)
                    }
                    QOI_OP_RGBA => {
                        let mut rgba = [0; 4];
                        read_chunk_bytes(&mut r, &mut rgba)?;
                        Rgba::from_array(rgba)
                    }
                    _ => {
                        let count = usize::from((byte & 0b0011_1111) + 1);
                        ensure!(count <= remaining, RunOverrunSnafu { count, remaining });
                        w.extend(core::iter::repeat(self.prev).take(count));
                        remaining -= count;

                        // the run value may be the start pixel, which no
                        // earlier chunk has inserted
                        self.arr[usize::from(hash(self.prev))] = self.prev;
                        continue;
                    }
                },
                0b00 => {
                    let pixel = self.arr[usize::from(byte)];
                    self.prev = pixel;
                    w.push(pixel);
                    remaining -= 1;
                    continue;
                }
                0b01 => apply_diff(self.prev, byte),
                0b10 => {
                    let mut second = [0; 1];
                    read_chunk_bytes(&mut r, &mut second)?;
                    apply_luma(self.prev, byte, second[0])
                }
                _ => unreachable!(),
            };

            self.arr[usize::from(hash(pixel))] = pixel;
            self.prev = pixel;
            w.push(pixel);
            remaining -= 1;
        }

        read_end_marker(&mut r)?;

        Ok(header)
    }
}
