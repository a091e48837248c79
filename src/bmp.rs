use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::io;
use bytemuck::{cast_slice, cast_slice_mut};
use log::{debug, warn};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::common::{BgrImage, Pixel};
use crate::error::{BmpError, HeaderKind};


/*
File headers
 */

pub const BITMAP_FILE_HEADER_SIZE: usize = 14;
pub const BITMAP_INFO_HEADER_SIZE: usize = 40;
pub const BITMAP_MAGIC_NUMBER: [u8; 2] = [0x42, 0x4d];

const PIXEL_SIZE: usize = std::mem::size_of::<Pixel>();
const PADDING_BYTES: [u8; 3] = [0; 3];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BitmapFileHeader {
    pub magic_number: [u8; 2],
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub bitmap_offset: u32
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BitmapInfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_depth: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub important_colors_used: u32
}


/*
Bit depths
 */

#[derive(Debug, IntoPrimitive, TryFromPrimitive, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum BitDepth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
    TwentyFour = 24,
    ThirtyTwo = 32
}


/*
Compression types
 */

// constants documented in https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-wmf/4e588f70-bd92-4a6f-b77f-35d0feaf7a57
// Only RGB is meaningful for 24-bit rows; anything else is decoded as RGB anyway.
#[derive(Debug, IntoPrimitive, TryFromPrimitive, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum Compression {
    RGB = 0x0,
    RLE8 = 0x1,
    RLE4 = 0x2,
    Bitfields = 0x3,
    JPEG = 0x4,
    PNG = 0x5
}


/*
Scanline order, as declared by the sign of the height
 */

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScanlineOrder {
    TopDown,
    BottomUp
}


/*
Little-endian field codecs. Headers are decoded field by field so the in-memory layout of the
structs never matters.
 */

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at+1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at+1], bytes[at+2], bytes[at+3]])
}

fn le_i32(bytes: &[u8], at: usize) -> i32 {
    le_u32(bytes, at) as i32
}

fn put(bytes: &mut [u8], at: usize, field: &[u8]) {
    bytes[at..at+field.len()].copy_from_slice(field);
}

impl BitmapFileHeader {
    pub fn from_le_bytes(bytes: &[u8; BITMAP_FILE_HEADER_SIZE]) -> BitmapFileHeader {
        BitmapFileHeader {
            magic_number: [bytes[0], bytes[1]],
            file_size: le_u32(bytes, 2),
            reserved1: le_u16(bytes, 6),
            reserved2: le_u16(bytes, 8),
            bitmap_offset: le_u32(bytes, 10)
        }
    }

    pub fn to_le_bytes(&self) -> [u8; BITMAP_FILE_HEADER_SIZE] {
        let mut bytes = [0; BITMAP_FILE_HEADER_SIZE];
        put(&mut bytes, 0, &self.magic_number);
        put(&mut bytes, 2, &self.file_size.to_le_bytes());
        put(&mut bytes, 6, &self.reserved1.to_le_bytes());
        put(&mut bytes, 8, &self.reserved2.to_le_bytes());
        put(&mut bytes, 10, &self.bitmap_offset.to_le_bytes());
        bytes
    }
}

impl BitmapInfoHeader {
    pub fn from_le_bytes(bytes: &[u8; BITMAP_INFO_HEADER_SIZE]) -> BitmapInfoHeader {
        BitmapInfoHeader {
            header_size: le_u32(bytes, 0),
            width: le_i32(bytes, 4),
            height: le_i32(bytes, 8),
            planes: le_u16(bytes, 12),
            bit_depth: le_u16(bytes, 14),
            compression: le_u32(bytes, 16),
            image_size: le_u32(bytes, 20),
            x_pixels_per_meter: le_i32(bytes, 24),
            y_pixels_per_meter: le_i32(bytes, 28),
            colors_used: le_u32(bytes, 32),
            important_colors_used: le_u32(bytes, 36)
        }
    }

    pub fn to_le_bytes(&self) -> [u8; BITMAP_INFO_HEADER_SIZE] {
        let mut bytes = [0; BITMAP_INFO_HEADER_SIZE];
        put(&mut bytes, 0, &self.header_size.to_le_bytes());
        put(&mut bytes, 4, &self.width.to_le_bytes());
        put(&mut bytes, 8, &self.height.to_le_bytes());
        put(&mut bytes, 12, &self.planes.to_le_bytes());
        put(&mut bytes, 14, &self.bit_depth.to_le_bytes());
        put(&mut bytes, 16, &self.compression.to_le_bytes());
        put(&mut bytes, 20, &self.image_size.to_le_bytes());
        put(&mut bytes, 24, &self.x_pixels_per_meter.to_le_bytes());
        put(&mut bytes, 28, &self.y_pixels_per_meter.to_le_bytes());
        put(&mut bytes, 32, &self.colors_used.to_le_bytes());
        put(&mut bytes, 36, &self.important_colors_used.to_le_bytes());
        bytes
    }

    pub fn scanline_order(&self) -> ScanlineOrder {
        if self.height < 0 { ScanlineOrder::TopDown } else { ScanlineOrder::BottomUp }
    }

    /// Pixel dimensions as `(width, rows)`. The row count is the absolute height.
    pub fn dimensions(&self) -> Result<(usize, usize), BmpError> {
        let invalid = || BmpError::InvalidDimensions { width: self.width, height: self.height };

        if self.width <= 0 || self.height == 0 {
            return Err(invalid());
        }
        let width = usize::try_from(self.width).map_err(|_| invalid())?;
        let height = usize::try_from(self.height.unsigned_abs()).map_err(|_| invalid())?;
        Ok((width, height))
    }
}


/*
Header codec
 */

// Like read_exact, but reports how many bytes were available before the stream ran dry.
fn read_fully<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err)
        }
    }
    Ok(filled)
}

fn read_header_bytes<R: Read>(input: &mut R, buf: &mut [u8], header: HeaderKind) -> Result<(), BmpError> {
    let actual = read_fully(input, buf)?;
    if actual != buf.len() {
        return Err(BmpError::TruncatedHeader { header, expected: buf.len(), actual });
    }
    Ok(())
}

fn check_bit_depth(bit_count: u16) -> Result<(), BmpError> {
    match BitDepth::try_from(bit_count) {
        Ok(BitDepth::TwentyFour) => Ok(()),
        Ok(depth) => {
            debug!("Bit depth {depth:?} is a valid BMP depth but is not supported");
            Err(BmpError::UnsupportedFormat { bit_count })
        }
        Err(_) => {
            warn!("Bit count {bit_count} is not a BMP bit depth at all");
            Err(BmpError::UnsupportedFormat { bit_count })
        }
    }
}

/// Reads the 14-byte file header and the 40-byte info header, leaving the stream 54 bytes in.
///
/// Only the bit depth is validated here. Other oddities (wrong magic number, compression,
/// top-down rows) are logged and otherwise ignored.
pub fn read_headers<R: Read>(input: &mut R) -> Result<(BitmapFileHeader, BitmapInfoHeader), BmpError> {
    let mut file_header_bytes = [0; BITMAP_FILE_HEADER_SIZE];
    read_header_bytes(input, &mut file_header_bytes, HeaderKind::File)?;
    let file_header = BitmapFileHeader::from_le_bytes(&file_header_bytes);
    if file_header.magic_number != BITMAP_MAGIC_NUMBER {
        warn!("Incorrect magic number of {:?}", file_header.magic_number);
    }

    let mut info_header_bytes = [0; BITMAP_INFO_HEADER_SIZE];
    read_header_bytes(input, &mut info_header_bytes, HeaderKind::Info)?;
    let info_header = BitmapInfoHeader::from_le_bytes(&info_header_bytes);
    debug!(
        "Header: {}x{}, {} bpp, compression {}, data offset {}, file size {}",
        info_header.width, info_header.height, info_header.bit_depth,
        info_header.compression, file_header.bitmap_offset, file_header.file_size
    );

    check_bit_depth(info_header.bit_depth)?;

    match Compression::try_from(info_header.compression) {
        Ok(Compression::RGB) => {}
        Ok(compression) => warn!("Compression {compression:?} ignored, rows are read as uncompressed"),
        Err(_) => warn!("Unknown compression code {:#x} ignored", info_header.compression)
    }
    if info_header.header_size as usize != BITMAP_INFO_HEADER_SIZE {
        debug!("Info header declares size {}, extension fields are left to the data offset", info_header.header_size);
    }
    if info_header.scanline_order() == ScanlineOrder::TopDown {
        warn!("Top-down bitmap (negative height), rows are kept in file order");
    }

    Ok((file_header, info_header))
}

/// Writes both headers back exactly as they were read. No field is recomputed.
pub fn write_headers<W: Write>(output: &mut W, file_header: &BitmapFileHeader, info_header: &BitmapInfoHeader) -> Result<(), BmpError> {
    output.write_all(&file_header.to_le_bytes())
        .map_err(|source| BmpError::Write { header: HeaderKind::File, source })?;
    output.write_all(&info_header.to_le_bytes())
        .map_err(|source| BmpError::Write { header: HeaderKind::Info, source })?;
    Ok(())
}


/*
Pixel plane codec. Bit depth of 24, RGB compression: a full byte per channel, rows padded to 4
bytes. Row i of the buffer is row i of the file; nothing is flipped.
 */

pub fn row_stride(width: usize) -> usize {
    let data_bytes = width*PIXEL_SIZE;
    data_bytes.div_ceil(4)*4
}

pub fn row_padding(width: usize) -> usize {
    row_stride(width) - width*PIXEL_SIZE
}

/// Fills `image` from the rows starting at `data_offset` bytes from the start of the stream.
/// Padding bytes are consumed without being looked at.
pub fn read_pixels<R: Read + Seek>(input: &mut R, image: &mut BgrImage, data_offset: u32) -> Result<(), BmpError> {
    input.seek(SeekFrom::Start(u64::from(data_offset)))?;

    let width = image.width;
    // padding is read and dropped rather than seeked over, so a buffered reader keeps its buffer
    let mut padding = [0; 3];
    let padding = &mut padding[..row_padding(width)];
    for row_index in 0..image.height {
        let row_bytes: &mut [u8] = cast_slice_mut(image.row_mut(row_index));
        let read = read_fully(input, row_bytes)?;
        if read != row_bytes.len() {
            return Err(BmpError::ShortRowRead { row_index, expected: width, actual: read / PIXEL_SIZE });
        }

        // missing padding after the final row is tolerated; mid-image it shows up as a short row
        read_fully(input, padding)?;
    }

    Ok(())
}

/// Checks that a stream of `stream_len` bytes can hold every row before the buffer is allocated.
///
/// Fails with the same `ShortRowRead` that `read_pixels` would eventually report, so a header
/// declaring a huge image over a tiny file never gets to reserve memory for it.
pub fn check_pixel_data_len(stream_len: u64, data_offset: u32, width: usize, height: usize) -> Result<(), BmpError> {
    let row_bytes = (width as u64).saturating_mul(PIXEL_SIZE as u64);
    let stride = (row_stride(width) as u64).max(1);
    let available = stream_len.saturating_sub(u64::from(data_offset));

    let rows_that_fit = if available >= row_bytes { (available - row_bytes) / stride + 1 } else { 0 };
    if rows_that_fit >= height as u64 {
        return Ok(());
    }

    let remaining = available.saturating_sub(rows_that_fit * stride);
    Err(BmpError::ShortRowRead {
        row_index: rows_that_fit as usize,
        expected: width,
        actual: (remaining / PIXEL_SIZE as u64) as usize
    })
}

/// Writes every row followed by zeroed padding, then flushes. A failed flush is charged to the
/// last row, since that is where the unflushed bytes belong.
pub fn write_pixels<W: Write>(output: &mut W, image: &BgrImage) -> Result<(), BmpError> {
    let padding = &PADDING_BYTES[..row_padding(image.width)];
    for row_index in 0..image.height {
        let row_bytes: &[u8] = cast_slice(image.row(row_index));
        output.write_all(row_bytes)
            .and_then(|()| output.write_all(padding))
            .map_err(|source| BmpError::ShortRowWrite { row_index, source })?;
    }

    output.flush()
        .map_err(|source| BmpError::ShortRowWrite { row_index: image.height.saturating_sub(1), source })
}


/*
Unit tests
 */
