//! Video frame types and processing

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl Frame {
    /// Create a new frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create a black frame of the given size, useful for stub sources
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; (width * height * 3) as usize],
            width,
            height,
            timestamp_ns: 0,
            sequence: 0,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Resize frame (nearest neighbor)
    pub fn resize(&self, new_width: u32, new_height: u32) -> Frame {
        let mut resized = Vec::with_capacity((new_width * new_height * 3) as usize);

        let x_ratio = self.width as f32 / new_width as f32;
        let y_ratio = self.height as f32 / new_height as f32;

        for y in 0..new_height {
            for x in 0..new_width {
                let src_x = ((x as f32 * x_ratio) as u32).min(self.width - 1);
                let src_y = ((y as f32 * y_ratio) as u32).min(self.height - 1);

                if let Some(pixel) = self.get_pixel(src_x, src_y) {
                    resized.extend_from_slice(&pixel);
                } else {
                    resized.extend_from_slice(&[0, 0, 0]);
                }
            }
        }

        Frame {
            data: resized,
            width: new_width,
            height: new_height,
            timestamp_ns: self.timestamp_ns,
            sequence: self.sequence,
        }
    }

    /// Freeze a copy of this frame onto the snapshot surface.
    ///
    /// The snapshot surface is capped per axis; a frame already within the
    /// cap is copied unscaled.
    pub fn fit_within(&self, max_width: u32, max_height: u32) -> Frame {
        let target_w = self.width.min(max_width);
        let target_h = self.height.min(max_height);
        if target_w == self.width && target_h == self.height {
            return self.clone();
        }
        self.resize(target_w, target_h)
    }
}
