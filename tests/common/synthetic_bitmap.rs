use bmp_grayscale::bmp::{row_stride, BitmapFileHeader, BitmapInfoHeader, BITMAP_MAGIC_NUMBER};

/// Builds a 24-bit bitmap from BGR rows, padding each row with `pad_byte`.
/// `gap` extra bytes are inserted between the headers and the pixel data.
pub fn bitmap_bytes(width: usize, height: i32, bit_depth: u16, rows: &[Vec<u8>], pad_byte: u8, gap: usize) -> Vec<u8> {
    let stride = row_stride(width);
    let data_offset = 54 + gap;
    let file_header = BitmapFileHeader {
        magic_number: BITMAP_MAGIC_NUMBER,
        file_size: (data_offset + stride * rows.len()) as u32,
        reserved1: 0,
        reserved2: 0,
        bitmap_offset: data_offset as u32
    };
    let info_header = BitmapInfoHeader {
        header_size: 40,
        width: width as i32,
        height,
        planes: 1,
        bit_depth,
        compression: 0,
        image_size: (stride * rows.len()) as u32,
        x_pixels_per_meter: 3780,
        y_pixels_per_meter: 3780,
        colors_used: 0,
        important_colors_used: 0
    };

    let mut bytes = file_header.to_le_bytes().to_vec();
    bytes.extend_from_slice(&info_header.to_le_bytes());
    bytes.extend(std::iter::repeat(0x77).take(gap));
    for row in rows {
        assert_eq!(row.len(), width * 3);
        bytes.extend_from_slice(row);
        bytes.extend(std::iter::repeat(pad_byte).take(stride - width * 3));
    }
    bytes
}
