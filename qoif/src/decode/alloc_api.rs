use crate::{
    decode::{parse_header, DecodeError, DimensionOverflowSnafu, QoiDecodeContext},
    Header, Rgba,
};
use alloc::vec::Vec;
use snafu::OptionExt;

impl QoiDecodeContext {
    /// Decodes a whole QOI stream, appending the pixels to `w`.
    ///
    /// The pixel buffer is grown once, up front, to the size announced by
    /// the header. Returns the parsed header, if successful.
    pub fn decode_to_vec(data: &[u8], w: &mut Vec<Rgba>) -> Result<Header, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_to_vec_with_state(data, w)
    }

    /// Decodes a whole QOI stream, appending the pixels to `w`, with the
    /// given state as starting state.
    pub fn decode_to_vec_with_state(
        &mut self,
        data: &[u8],
        w: &mut Vec<Rgba>,
    ) -> Result<Header, DecodeError> {
        let (header, _) = parse_header(data)?;
        let pixel_count = header.pixel_count().context(DimensionOverflowSnafu {
            width: header.width,
            height: header.height,
        })?;

        let start = w.len();
        w.resize(start + pixel_count, Rgba::ZERO);
        self.decode_to_slice_with_state(data, &mut w[start..])?;

        Ok(header)
    }
}
