//! Gradient Hough search for answer bubbles.
//!
//! Every Canny edge pixel votes along its gradient direction (both ways) at
//! each radius of the configured band. Bubble outlines make those votes
//! converge on the bubble center. Peaks of the accumulator become center
//! candidates, and each candidate's radius is read off the histogram of edge
//! distances around it.

use std::f32::consts::PI;

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::core::config::SheetConfig;
use crate::core::geometry::PixelBounds;
use crate::core::model::Circle;

/// Angular sectors used to check that edge support surrounds the center.
const SECTORS: usize = 16;
/// Sectors that must contain edge pixels at the chosen radius.
const MIN_SECTORS_HIT: usize = 12;

/// Find bubble-like circles. Returns an empty list when nothing qualifies.
pub fn detect_circles(gray: &GrayImage, config: &SheetConfig) -> Vec<Circle> {
    let (w, h) = gray.dimensions();
    let (r_min, r_max) = config.radius_band();
    if w < 8 || h < 8 || r_max < r_min {
        return Vec::new();
    }

    let blurred = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(gray, config.blur_sigma)
    } else {
        gray.clone()
    };
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let gx = horizontal_sobel(&blurred);
    let gy = vertical_sobel(&blurred);

    let accum = Accumulator::vote(&edges, gx.as_raw(), gy.as_raw(), r_min, r_max, config.accumulator_dp);
    let candidates = accum.peaks(config.vote_threshold);

    let min_dist_sq = config.center_distance().powi(2);
    let mut circles: Vec<Circle> = Vec::new();
    for peak in candidates {
        let (cx, cy) = accum.refined_center(peak.idx);
        let too_close = circles.iter().any(|c| {
            let dx = c.x as f32 - cx;
            let dy = c.y as f32 - cy;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(&edges, cx, cy, r_min, r_max, config.min_edge_support) {
            circles.push(Circle::new(cx.round() as i32, cy.round() as i32, radius));
        }
    }

    tracing::debug!(count = circles.len(), "circle detection finished");
    circles
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    idx: usize,
    score: u32,
}

struct Accumulator {
    cells: Vec<u32>,
    width: usize,
    height: usize,
    dp: f32,
}

impl Accumulator {
    fn vote(edges: &GrayImage, gx: &[i16], gy: &[i16], r_min: i32, r_max: i32, dp: f32) -> Self {
        let (w, h) = edges.dimensions();
        let dp = dp.max(1.0);
        let width = (w as f32 / dp).ceil() as usize + 1;
        let height = (h as f32 / dp).ceil() as usize + 1;
        let mut cells = vec![0u32; width * height];
        let x_limit = w as f32;
        let y_limit = h as f32;

        for (x, y, px) in edges.enumerate_pixels() {
            if px[0] == 0 {
                continue;
            }
            let idx = y as usize * w as usize + x as usize;
            let gxv = gx[idx] as f32;
            let gyv = gy[idx] as f32;
            let mag = (gxv * gxv + gyv * gyv).sqrt();
            if mag < 1e-3 {
                continue;
            }
            let dx = gxv / mag;
            let dy = gyv / mag;
            let xf = x as f32;
            let yf = y as f32;

            for sign in [1.0f32, -1.0] {
                let mut last = usize::MAX;
                for r in r_min..=r_max {
                    let vx = xf + sign * dx * r as f32;
                    let vy = yf + sign * dy * r as f32;
                    if vx < 0.0 || vy < 0.0 || vx >= x_limit || vy >= y_limit {
                        break;
                    }
                    let cell = (vy / dp).round() as usize * width + (vx / dp).round() as usize;
                    // One vote per cell and direction.
                    if cell != last {
                        cells[cell] += 1;
                        last = cell;
                    }
                }
            }
        }

        Self {
            cells,
            width,
            height,
            dp,
        }
    }

    fn neighborhood(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let cx = (idx % self.width) as i64;
        let cy = (idx / self.width) as i64;
        (-1i64..=1).flat_map(move |dy| {
            (-1i64..=1).filter_map(move |dx| {
                let x = cx + dx;
                let y = cy + dy;
                (x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height)
                    .then(|| y as usize * self.width + x as usize)
            })
        })
    }

    fn box_sum(&self) -> Vec<u32> {
        (0..self.cells.len())
            .map(|idx| self.neighborhood(idx).map(|n| self.cells[n]).sum())
            .collect()
    }

    /// Local maxima of the 3x3 vote sum, strongest first. Equal scores are
    /// resolved by cell index so the output does not depend on float noise.
    fn peaks(&self, threshold: u32) -> Vec<Peak> {
        let sums = self.box_sum();
        let mut peaks: Vec<Peak> = sums
            .iter()
            .enumerate()
            .filter(|&(idx, &score)| {
                score >= threshold.max(1)
                    && self.cells[idx] > 0
                    && self.neighborhood(idx).all(|n| {
                        n == idx || sums[n] < score || (sums[n] == score && n > idx)
                    })
            })
            .map(|(idx, &score)| Peak { idx, score })
            .collect();
        peaks.sort_by(|a, b| b.score.cmp(&a.score).then(a.idx.cmp(&b.idx)));
        peaks
    }

    /// Vote-weighted centroid of the 3x3 neighbourhood, in image pixels.
    fn refined_center(&self, idx: usize) -> (f32, f32) {
        let mut total = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for n in self.neighborhood(idx) {
            let v = self.cells[n] as f32;
            total += v;
            sx += v * (n % self.width) as f32;
            sy += v * (n / self.width) as f32;
        }
        if total <= 0.0 {
            let x = (idx % self.width) as f32;
            let y = (idx / self.width) as f32;
            return (x * self.dp, y * self.dp);
        }
        (sx / total * self.dp, sy / total * self.dp)
    }
}

/// Pick the radius best backed by edge pixels around (`cx`, `cy`).
///
/// Scans the band from the inside out and stops at the first local peak of
/// edge support that clears `min_support` and surrounds the center. For an
/// outlined empty bubble this is the inner edge of the outline; for a filled
/// one it is the outer edge. A partly shaded bubble only keeps the inner edge
/// on its unshaded side, so that peak fails the coverage check and the scan
/// moves on to the intact outer edge.
fn estimate_radius(
    edges: &GrayImage,
    cx: f32,
    cy: f32,
    r_min: i32,
    r_max: i32,
    min_support: f32,
) -> Option<i32> {
    let (w, h) = edges.dimensions();
    let bounds = PixelBounds::around(cx.round() as i32, cy.round() as i32, r_max + 2, w, h)?;

    // Bins cover r_min-1 ..= r_max+1 so smoothing has neighbours at the ends.
    let lo = r_min - 1;
    let mut bins = vec![0u32; (r_max - lo + 2) as usize];
    let mut samples: Vec<(f32, f32)> = Vec::new();
    for y in bounds.y0..=bounds.y1 {
        for x in bounds.x0..=bounds.x1 {
            if edges.get_pixel(x, y)[0] == 0 {
                continue;
            }
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let bin = dist.round() as i32;
            if bin < lo || bin > r_max + 1 {
                continue;
            }
            bins[(bin - lo) as usize] += 1;
            samples.push((dist, dy.atan2(dx)));
        }
    }

    let support = |r: i32| -> f32 {
        let at = |r: i32| bins.get((r - lo) as usize).copied().unwrap_or(0) as f32;
        let smoothed = at(r - 1) * 0.5 + at(r) + at(r + 1) * 0.5;
        smoothed / (2.0 * PI * r as f32)
    };

    let mut r = r_min;
    while r <= r_max {
        if support(r) < min_support {
            r += 1;
            continue;
        }
        while r < r_max && support(r + 1) > support(r) {
            r += 1;
        }
        if sectors_hit(&samples, r) >= MIN_SECTORS_HIT {
            return Some(r);
        }
        // Walk down the far side of the rejected peak.
        r += 1;
        while r <= r_max && support(r) >= min_support && support(r) <= support(r - 1) {
            r += 1;
        }
    }
    None
}

/// Angular sectors holding at least one edge sample within 1.5 px of `radius`.
fn sectors_hit(samples: &[(f32, f32)], radius: i32) -> usize {
    let mut hit = [false; SECTORS];
    for &(dist, angle) in samples {
        if (dist - radius as f32).abs() <= 1.5 {
            let sector = ((angle + PI) / (2.0 * PI) * SECTORS as f32) as usize;
            hit[sector.min(SECTORS - 1)] = true;
        }
    }
    hit.iter().filter(|&&h| h).count()
}
