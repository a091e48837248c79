use crate::common::{BgrImage, Pixel};

// ITU-R BT.601 luma weights, scaled by 1000 so the floor is taken on the exact sum.
const RED_WEIGHT: u32 = 299;
const GREEN_WEIGHT: u32 = 587;
const BLUE_WEIGHT: u32 = 114;
const WEIGHT_SCALE: u32 = 1000;

/// `floor(0.299 R + 0.587 G + 0.114 B)`, truncated rather than rounded.
pub fn luminance(pixel: Pixel) -> u8 {
    let weighted = RED_WEIGHT*u32::from(pixel.r)
        + GREEN_WEIGHT*u32::from(pixel.g)
        + BLUE_WEIGHT*u32::from(pixel.b);
    // the weights sum to the scale, so the quotient never exceeds 255
    (weighted / WEIGHT_SCALE) as u8
}

/// Replaces every pixel with its luminance in all three channels.
pub fn grayscale(image: &mut BgrImage) {
    for pixel in image.data.iter_mut() {
        let gray = luminance(*pixel);
        *pixel = Pixel { b: gray, g: gray, r: gray };
    }
}
