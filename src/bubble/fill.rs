use image::GrayImage;

use crate::core::geometry::disc_pixels;
use crate::core::model::{Circle, Row};

/// Intensity reported for a disc that lies completely outside the image.
const EMPTY_SAMPLE: f32 = 255.0;

/// Mean gray level inside the circle, shrunk by `border` pixels so the
/// printed outline does not count. 0 is black, 255 is white.
pub fn fill_score(gray: &GrayImage, circle: &Circle, border: i32) -> f32 {
    let radius = (circle.radius - border).max(1);
    let (w, h) = gray.dimensions();
    let pixels = disc_pixels(circle.x, circle.y, radius, w, h);
    if pixels.is_empty() {
        return EMPTY_SAMPLE;
    }
    let total: u64 = pixels
        .iter()
        .map(|&(x, y)| gray.get_pixel(x, y)[0] as u64)
        .sum();
    total as f32 / pixels.len() as f32
}

/// Score every circle of `row` in place.
pub fn score_row(gray: &GrayImage, row: &mut Row, border: i32) {
    for circle in &mut row.circles {
        circle.fill_score = Some(fill_score(gray, circle, border));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn filled_disc_scores_dark() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([255u8]));
        for (x, y, px) in img.enumerate_pixels_mut() {
            let d = ((x as f32 - 30.0).powi(2) + (y as f32 - 30.0).powi(2)).sqrt();
            if d <= 12.0 {
                *px = Luma([0u8]);
            }
        }
        let score = fill_score(&img, &Circle::new(30, 30, 12), 2);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn outline_is_excluded_from_sample() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([255u8]));
        for (x, y, px) in img.enumerate_pixels_mut() {
            let d = ((x as f32 - 30.0).powi(2) + (y as f32 - 30.0).powi(2)).sqrt();
            if d > 10.5 && d <= 12.5 {
                *px = Luma([0u8]);
            }
        }
        let score = fill_score(&img, &Circle::new(30, 30, 12), 2);
        assert_eq!(score, 255.0);
    }

    #[test]
    fn off_image_circle_reads_as_white() {
        let img = GrayImage::from_pixel(20, 20, Luma([0u8]));
        assert_eq!(fill_score(&img, &Circle::new(-50, -50, 10), 2), EMPTY_SAMPLE);
    }

    #[test]
    fn scores_whole_row() {
        let img = GrayImage::from_pixel(100, 40, Luma([128u8]));
        let mut row = Row::new(vec![Circle::new(20, 20, 9), Circle::new(60, 20, 9)]);
        score_row(&img, &mut row, 2);
        assert!(row.circles.iter().all(|c| c.fill_score == Some(128.0)));
    }
}
