//! Owned binary raster (`1` = stain, `0` = background) in row-major layout.

use super::traits::ImageView;

const NEIGH4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    /// All-background mask of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Build a mask by evaluating `is_stain` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut is_stain: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(u8::from(is_stain(x, y)));
            }
        }
        Self { w, h, data }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[self.idx(x, y)] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        let i = self.idx(x, y);
        self.data[i] = u8::from(on);
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Mark as stain every background pixel that cannot reach the image border
    /// through 4-connected background. After this, each 8-connected region
    /// covers the full area enclosed by its outer boundary.
    pub fn fill_holes(&mut self) {
        let n = self.w * self.h;
        if n == 0 {
            return;
        }
        let mut outside = vec![false; n];
        let mut stack = Vec::with_capacity(self.w + self.h);
        for y in 0..self.h {
            for x in 0..self.w {
                if self.on_border(x, y) && !self.get(x, y) {
                    let i = self.idx(x, y);
                    if !outside[i] {
                        outside[i] = true;
                        stack.push(i);
                    }
                }
            }
        }
        while let Some(i) = stack.pop() {
            let x = (i % self.w) as isize;
            let y = (i / self.w) as isize;
            for (dx, dy) in NEIGH4 {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= self.w as isize || ny >= self.h as isize {
                    continue;
                }
                let j = ny as usize * self.w + nx as usize;
                if self.data[j] == 0 && !outside[j] {
                    outside[j] = true;
                    stack.push(j);
                }
            }
        }
        for (v, out) in self.data.iter_mut().zip(outside) {
            if *v == 0 && !out {
                *v = 1;
            }
        }
    }
}

impl ImageView for BinaryMask {
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
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}
