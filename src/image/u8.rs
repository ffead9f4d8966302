use image::GrayImage;

/// Borrowed 8-bit single-channel view (card intensity).
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Borrow a decoded grayscale buffer.
    pub fn from_gray(gray: &'a GrayImage) -> Self {
        let w = gray.width() as usize;
        Self {
            w,
            h: gray.height() as usize,
            stride: w,
            data: gray.as_raw(),
        }
    }

    /// 256-bin intensity histogram over the visible pixels.
    pub fn histogram(&self) -> [u32; 256] {
        let mut hist = [0u32; 256];
        for y in 0..self.h {
            let start = y * self.stride;
            for &v in &self.data[start..start + self.w] {
                hist[v as usize] += 1;
            }
        }
        hist
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_pixel_once() {
        let data = [0u8, 0, 10, 255, 9, 9, 10, 0];
        // stride 4 with only the first 3 columns visible
        let view = ImageU8 {
            w: 3,
            h: 2,
            stride: 4,
            data: &data,
        };
        let hist = view.histogram();
        assert_eq!(hist.iter().sum::<u32>(), 6);
        assert_eq!(hist[0], 2);
        assert_eq!(hist[9], 2);
        assert_eq!(hist[10], 2);
        assert_eq!(hist[255], 0);
    }
}
