use argh::FromArgs;
use image::{ImageFormat, RgbaImage};
use qoif::{Header, QoiDecodeContext, QoiEncodeContext, Rgba};
use std::{fs::File, io::BufReader, num::NonZeroU32, str::FromStr};

/// QOI cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    EncodeRaw(EncodeRaw),
    Decode(Decode),
    DecodeRaw(DecodeRaw),
}

#[derive(Debug)]
enum Format {
    Png,
    Jpg,
    Bmp,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
        else { return Err("invalid string"); };

        Ok(format)
    }
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::EncodeRaw(options) => encode_raw(options),
        Command::Decode(options) => decode(options),
        Command::DecodeRaw(options) => decode_raw(options),
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp)
    #[argh(option)]
    format: Option<Format>,

    /// the input file; a PNG, JPG, or BMP
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        format,
        input,
        output,
    } = options;

    let image = match format {
        Some(format) => image::io::Reader::with_format(
            BufReader::new(File::open(&input)?),
            ImageFormat::from(format),
        )
        .decode()?,
        None => image::io::Reader::open(input)?
            .with_guessed_format()?
            .decode()?,
    };

    let width = image.width();
    let height = image.height();

    println!("Encoding {width}x{height} image");

    let pixels = image
        .into_rgba8()
        .pixels()
        .map(|p| Rgba::from_array(p.0))
        .collect::<Vec<_>>();

    let mut v = Vec::with_capacity(1024 * 1024);
    assert!(QoiEncodeContext::encode_to_vec(
        Header::new(width, height),
        &pixels,
        &mut v
    ));

    std::fs::write(&output, &v)?;
    println!("Written {} bytes to `{output}`", v.len());

    Ok(())
}

/// Encodes a raw RGBA8 image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode-raw")]
struct EncodeRaw {
    /// image width
    #[argh(option)]
    width: NonZeroU32,
    /// image height
    #[argh(option)]
    height: NonZeroU32,

    /// the input file, tightly packed RGBA bytes in row-major order
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode_raw(options: EncodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let EncodeRaw {
        width,
        height,
        input,
        output,
    } = options;

    println!("Encoding {width}x{height} image");

    let raw = std::fs::read(input)?;
    let pixels: Vec<_> = raw
        .chunks_exact(4)
        .map(|c| {
            let &[r, g, b, a] = c else { unreachable!() };

            Rgba::new(r, g, b, a)
        })
        .collect();

    let expected_size = width.get() as usize * height.get() as usize;
    if pixels.len() != expected_size || raw.len() % 4 != 0 {
        return Err(format!(
            "input file size is not correct, expected {} bytes, got {}",
            expected_size * 4,
            raw.len()
        )
        .into());
    }

    let mut v = Vec::with_capacity(1024 * 1024);
    assert!(QoiEncodeContext::encode_to_vec(
        Header::new(width.get(), height.get()),
        &pixels,
        &mut v
    ));

    std::fs::write(&output, &v)?;
    println!("Written {} bytes to `{output}`", v.len());

    Ok(())
}

/// Decodes a QOI image into a PNG, JPG, or BMP.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp)
    #[argh(option)]
    format: Format,

    /// the input file, a QOI image
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode {
        format,
        input,
        output,
    } = options;

    let qoi_input = std::fs::read(&input)?;

    println!("Decoding `{input}`");

    let mut v = Vec::with_capacity(1024 * 1024);
    let Header { width, height, .. } = QoiDecodeContext::decode_to_vec(&qoi_input, &mut v)?;

    let mut rgba_raw = Vec::with_capacity(v.len() * 4);
    for pixel in v {
        rgba_raw.extend_from_slice(&pixel.to_array());
    }

    RgbaImage::from_vec(width, height, rgba_raw)
        .ok_or("failed to create image")?
        .save_with_format(&output, ImageFormat::from(format))?;

    println!("Written {width}x{height} image to `{output}`");

    Ok(())
}

/// Decodes a QOI image into raw RGBA8 bytes.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode-raw")]
struct DecodeRaw {
    /// the input file, a QOI image
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode_raw(options: DecodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let DecodeRaw { input, output } = options;

    let qoi_input = std::fs::read(&input)?;

    println!("Decoding `{input}`");

    let mut v = Vec::with_capacity(1024 * 1024);
    let Header { width, height, .. } = QoiDecodeContext::decode_to_vec(&qoi_input, &mut v)?;

    let mut bytes = Vec::with_capacity(v.len() * 4);
    for pixel in v {
        bytes.extend_from_slice(&pixel.to_array());
    }
    std::fs::write(&output, &bytes)?;

    println!("Written {width}x{height} image to `{output}`");

    Ok(())
}
