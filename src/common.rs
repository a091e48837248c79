use bytemuck::{Pod, Zeroable};
use crate::error::BmpError;

/// One 24-bit pixel as stored in a bitmap: blue, green, red, no padding.
#[derive(Pod, Zeroable, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct Pixel {
    pub b: u8,
    pub g: u8,
    pub r: u8
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8) -> Pixel {
        Pixel { b, g, r }
    }
}


/// Row-major pixel buffer. Rows are kept in file order and never carry padding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BgrImage {
    pub width: usize,
    pub height: usize,
    pub data: Box<[Pixel]>
}

impl BgrImage {
    /// Allocates a zeroed `width * height` buffer, reporting failure instead of aborting.
    pub fn try_new(width: usize, height: usize) -> Result<BgrImage, BmpError> {
        let allocation_error = || BmpError::Allocation { width, height };

        let len = width.checked_mul(height).ok_or_else(allocation_error)?;
        let mut data: Vec<Pixel> = Vec::new();
        data.try_reserve_exact(len).map_err(|_| allocation_error())?;
        data.resize(len, Pixel::default());

        Ok(BgrImage { width, height, data: data.into_boxed_slice() })
    }

    pub fn row(&self, index: usize) -> &[Pixel] {
        &self.data[index*self.width..(index+1)*self.width]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [Pixel] {
        &mut self.data[index*self.width..(index+1)*self.width]
    }
}
