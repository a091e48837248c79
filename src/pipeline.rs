use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use log::info;
use crate::bmp::{self, BitmapFileHeader, BitmapInfoHeader};
use crate::common::BgrImage;
use crate::error::BmpError;
use crate::grayscale::grayscale;


/// A decoded bitmap: the headers exactly as read, plus the pixel rows in file order.
#[derive(Debug, Clone)]
pub struct DecodedBitmap {
    pub file_header: BitmapFileHeader,
    pub info_header: BitmapInfoHeader,
    pub image: BgrImage
}

/// Reads and validates a 24-bit bitmap. The input file is closed before this returns, on every path.
pub fn decode_file<P: AsRef<Path>>(input_path: P) -> Result<DecodedBitmap, BmpError> {
    let input_path = input_path.as_ref();
    let file = File::open(input_path)
        .map_err(|source| BmpError::InputOpen { path: input_path.to_path_buf(), source })?;
    let file_len = file.metadata()?.len();
    let mut input = BufReader::new(file);

    let (file_header, info_header) = bmp::read_headers(&mut input)?;
    let (width, height) = info_header.dimensions()?;
    bmp::check_pixel_data_len(file_len, file_header.bitmap_offset, width, height)?;
    let mut image = BgrImage::try_new(width, height)?;
    bmp::read_pixels(&mut input, &mut image, file_header.bitmap_offset)?;
    info!("Read {width}x{height} pixels from {}", input_path.display());

    Ok(DecodedBitmap { file_header, info_header, image })
}

/// Writes the headers unchanged followed by the pixel rows. Whatever was written before a
/// failure stays on disk.
pub fn encode_file<P: AsRef<Path>>(output_path: P, bitmap: &DecodedBitmap) -> Result<(), BmpError> {
    let output_path = output_path.as_ref();
    let file = File::create(output_path)
        .map_err(|source| BmpError::OutputOpen { path: output_path.to_path_buf(), source })?;
    let mut output = BufWriter::new(file);

    bmp::write_headers(&mut output, &bitmap.file_header, &bitmap.info_header)?;
    bmp::write_pixels(&mut output, &bitmap.image)?;
    info!("Wrote {}", output_path.display());

    Ok(())
}

/// Converts `input_path` to grayscale and saves it as `output_path`.
///
/// The output file is only created once the input has been fully read, so a bad input never
/// leaves an output file behind.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input_path: P, output_path: Q) -> Result<(), BmpError> {
    let mut bitmap = decode_file(input_path)?;
    grayscale(&mut bitmap.image);
    encode_file(output_path, &bitmap)
}
