use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

pub const GLYPH_SIZE: u32 = 8;

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` with its top-left corner at `(x, y)` using the 8x8 bitmap font.
/// Pixels falling outside the image are dropped.
pub fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let (width, height) = img.dimensions();
    for (i, c) in text.chars().enumerate() {
        let gx = x + i as u32 * GLYPH_SIZE;
        if gx >= width {
            break;
        }
        for (row, bits) in glyph(c).iter().enumerate() {
            let py = y + row as u32;
            if py >= height {
                break;
            }
            // least significant bit is the leftmost pixel
            for col in 0..GLYPH_SIZE {
                let px = gx + col;
                if bits & (1 << col) != 0 && px < width {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }
}
