use crate::shared::constants::RGB_BYTES_PER_PIXEL;

/// A single video frame: contiguous packed RGB24 bytes in row-major order.
///
/// Pixel data is opaque to the recording engine; callers needing another
/// layout convert before submission.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn rgb24(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            Self::rgb24_len(width, height),
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A zero-sized frame, the "unallocated" placeholder rejected at the
    /// recording boundary.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte length of an RGB24 frame at the given resolution.
    pub fn rgb24_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * RGB_BYTES_PER_PIXEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![7u8; 12]; // 2x2x3
        let frame = Frame::rgb24(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.height(), 0);
    }

    #[test]
    fn test_rgb24_len() {
        assert_eq!(Frame::rgb24_len(640, 480), 640 * 480 * 3);
        assert_eq!(Frame::rgb24_len(0, 480), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::rgb24(vec![100u8; 12], 2, 2);
        let cloned = frame.clone();
        assert_eq!(frame.data(), cloned.data());
        drop(frame);
        assert_eq!(cloned.data()[0], 100);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::rgb24(vec![0u8; 10], 2, 2);
    }
}
