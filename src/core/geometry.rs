/// Axis-aligned pixel window, inclusive on both ends, clipped to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    /// Square window of half-size `radius` around (`cx`, `cy`), clipped to a
    /// `width` x `height` image. `None` when the window misses the image.
    pub fn around(cx: i32, cy: i32, radius: i32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || radius < 0 {
            return None;
        }
        let x0 = (cx - radius).max(0);
        let y0 = (cy - radius).max(0);
        let x1 = (cx + radius).min(width as i32 - 1);
        let y1 = (cy + radius).min(height as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0 + 1
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Squared distance between two pixel positions.
pub fn distance_sq(ax: i32, ay: i32, bx: i32, by: i32) -> i64 {
    let dx = (ax - bx) as i64;
    let dy = (ay - by) as i64;
    dx * dx + dy * dy
}

/// Pixels of the filled disc of `radius` centred on (`cx`, `cy`) that fall
/// inside the image.
pub fn disc_pixels(cx: i32, cy: i32, radius: i32, width: u32, height: u32) -> Vec<(u32, u32)> {
    let Some(bounds) = PixelBounds::around(cx, cy, radius, width, height) else {
        return Vec::new();
    };
    let r_sq = radius as i64 * radius as i64;
    let mut pixels = Vec::with_capacity(bounds.area() as usize);
    for y in bounds.y0..=bounds.y1 {
        for x in bounds.x0..=bounds.x1 {
            if distance_sq(x as i32, y as i32, cx, cy) <= r_sq {
                pixels.push((x, y));
            }
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clips_bounds_to_image() {
        let b = PixelBounds::around(2, 3, 5, 20, 20).unwrap();
        assert_eq!(b, PixelBounds { x0: 0, y0: 0, x1: 7, y1: 8 });
        assert!(PixelBounds::around(-10, -10, 3, 20, 20).is_none());
    }

    #[test]
    fn disc_matches_radius() {
        assert_eq!(disc_pixels(10, 10, 0, 20, 20), vec![(10, 10)]);
        assert_eq!(disc_pixels(10, 10, 1, 20, 20).len(), 5);
        // Quarter disc survives at the corner.
        assert_eq!(disc_pixels(0, 0, 1, 20, 20).len(), 3);
    }
}
