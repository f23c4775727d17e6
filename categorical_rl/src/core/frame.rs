//! Single-channel preprocessed observation frames.

use super::error::C51Error;

/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 84;
/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 84;
/// Pixels per frame.
pub const FRAME_PIXELS: usize = FRAME_HEIGHT * FRAME_WIDTH;
/// Number of consecutive frames in a stacked state.
pub const STACK_DEPTH: usize = 4;

/// A preprocessed 84×84 grayscale image.
///
/// Intensities are stored as `u8` and normalized to `[0, 1]` by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Box<[u8]>,
}

impl Frame {
    /// All-black frame.
    pub fn zeros() -> Self {
        Self {
            pixels: vec![0u8; FRAME_PIXELS].into_boxed_slice(),
        }
    }

    /// Frame with every pixel set to `value`.
    pub fn filled(value: u8) -> Self {
        Self {
            pixels: vec![value; FRAME_PIXELS].into_boxed_slice(),
        }
    }

    /// Wrap row-major pixels. Fails unless exactly `FRAME_PIXELS` are given.
    pub fn from_pixels(pixels: Vec<u8>) -> Result<Self, C51Error> {
        if pixels.len() != FRAME_PIXELS {
            return Err(C51Error::shape("frame pixels", FRAME_PIXELS, pixels.len()));
        }
        Ok(Self {
            pixels: pixels.into_boxed_slice(),
        })
    }

    /// Row-major pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.pixels[row * FRAME_WIDTH + col]
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::zeros()
    }
}

impl TryFrom<Vec<u8>> for Frame {
    type Error = C51Error;

    fn try_from(pixels: Vec<u8>) -> Result<Self, Self::Error> {
        Frame::from_pixels(pixels)
    }
}

/// Borrowed view of `STACK_DEPTH` consecutive frames, oldest first.
///
/// Never stored; built on demand by the frame store.
#[derive(Debug, Clone, Copy)]
pub struct StackedState<'a> {
    planes: [&'a [u8]; STACK_DEPTH],
    slots: [usize; STACK_DEPTH],
}

impl<'a> StackedState<'a> {
    pub(crate) fn new(planes: [&'a [u8]; STACK_DEPTH], slots: [usize; STACK_DEPTH]) -> Self {
        Self { planes, slots }
    }

    /// Pixels of channel `k` (0 = oldest, `STACK_DEPTH - 1` = newest).
    #[inline]
    pub fn plane(&self, k: usize) -> &'a [u8] {
        self.planes[k]
    }

    /// Ring slots the planes were read from, oldest first.
    #[inline]
    pub fn slots(&self) -> [usize; STACK_DEPTH] {
        self.slots
    }

    /// Iterate planes oldest to newest.
    pub fn planes(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.planes.iter().copied()
    }

    /// Write the stack channel-last, shape `(84, 84, 4)`, into `out`.
    ///
    /// # Panics
    /// Panics if `out.len() != FRAME_PIXELS * STACK_DEPTH`.
    pub fn write_hwc(&self, out: &mut [u8]) {
        assert_eq!(out.len(), FRAME_PIXELS * STACK_DEPTH);
        for (p, chunk) in out.chunks_exact_mut(STACK_DEPTH).enumerate() {
            for (k, plane) in self.planes.iter().enumerate() {
                chunk[k] = plane[p];
            }
        }
    }

    /// Owned channel-last copy, shape `(84, 84, 4)`.
    pub fn to_hwc(&self) -> Vec<u8> {
        let mut out = vec![0u8; FRAME_PIXELS * STACK_DEPTH];
        self.write_hwc(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Frame::from_pixels(vec![0; FRAME_PIXELS]).is_ok());
        assert_eq!(
            Frame::from_pixels(vec![0; 10]),
            Err(C51Error::ShapeMismatch {
                what: "frame pixels",
                expected: FRAME_PIXELS,
                got: 10
            })
        );
    }

    #[test]
    fn test_get_is_row_major() {
        let mut pixels = vec![0u8; FRAME_PIXELS];
        pixels[2 * FRAME_WIDTH + 5] = 77;
        let frame = Frame::try_from(pixels).unwrap();
        assert_eq!(frame.get(2, 5), 77);
        assert_eq!(frame.get(5, 2), 0);
    }

    #[test]
    fn test_stacked_state_hwc_layout() {
        let frames: Vec<Frame> = (0..STACK_DEPTH as u8).map(Frame::filled).collect();
        let stack = StackedState::new(
            [
                frames[0].pixels(),
                frames[1].pixels(),
                frames[2].pixels(),
                frames[3].pixels(),
            ],
            [0, 1, 2, 3],
        );

        let hwc = stack.to_hwc();
        assert_eq!(hwc.len(), FRAME_PIXELS * STACK_DEPTH);
        // Every pixel carries channels oldest..newest.
        assert_eq!(&hwc[0..4], &[0, 1, 2, 3]);
        assert_eq!(&hwc[hwc.len() - 4..], &[0, 1, 2, 3]);
        assert_eq!(stack.planes().count(), STACK_DEPTH);
    }
}
