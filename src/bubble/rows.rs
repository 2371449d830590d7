use crate::core::model::{Circle, Row};

/// Options per question on the printed template.
pub const OPTIONS_PER_ROW: usize = 4;
/// Largest row that is still salvaged by keeping its rightmost bubbles; the
/// extra circle is usually the question-number cell.
const MAX_SALVAGE_LEN: usize = OPTIONS_PER_ROW + 1;

/// Single pass over circles sorted by (y, x): a circle joins the current row
/// while its y stays within `tolerance` of the row's first circle.
pub fn group_into_rows(circles: &[Circle], tolerance: f32) -> Vec<Row> {
    let mut sorted = circles.to_vec();
    sorted.sort_by_key(|c| (c.y, c.x));

    let mut rows = Vec::new();
    let mut current: Vec<Circle> = Vec::new();
    for circle in sorted {
        match current.first() {
            Some(anchor) if ((circle.y - anchor.y).abs() as f32) > tolerance => {
                rows.push(Row::new(std::mem::take(&mut current)));
                current.push(circle);
            }
            _ => current.push(circle),
        }
    }
    if !current.is_empty() {
        rows.push(Row::new(current));
    }
    rows
}

/// Break rows wherever neighbouring circles are more than `gap` apart, so two
/// question rows that share a baseline in different columns come apart.
pub fn split_at_gaps(rows: Vec<Row>, gap: f32) -> Vec<Row> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut segment: Vec<Circle> = Vec::new();
        for circle in row.circles {
            if let Some(prev) = segment.last() {
                if (circle.x - prev.x) as f32 > gap {
                    out.push(Row::new(std::mem::take(&mut segment)));
                }
            }
            segment.push(circle);
        }
        if !segment.is_empty() {
            out.push(Row::new(segment));
        }
    }
    out
}

/// Rows that look like a full A–D answer row.
///
/// Rows with exactly four circles are used as-is. Only when a page has none of
/// those are rows of four or five circles salvaged by keeping the four
/// rightmost. Everything else is dropped.
pub fn answer_rows(rows: &[Row]) -> Vec<Row> {
    let exact: Vec<Row> = rows
        .iter()
        .filter(|r| r.len() == OPTIONS_PER_ROW)
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    rows.iter()
        .filter(|r| (OPTIONS_PER_ROW..=MAX_SALVAGE_LEN).contains(&r.len()))
        .map(|r| {
            let skip = r.len() - OPTIONS_PER_ROW;
            Row::new(r.circles[skip..].to_vec())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn xs(row: &Row) -> Vec<i32> {
        row.circles.iter().map(|c| c.x).collect()
    }

    #[test]
    fn groups_by_anchor_tolerance() {
        let circles = vec![
            Circle::new(100, 52, 10),
            Circle::new(50, 50, 10),
            Circle::new(150, 64, 10),
            Circle::new(50, 66, 10),
            Circle::new(50, 120, 10),
        ];
        let rows = group_into_rows(&circles, 15.0);
        assert_eq!(rows.len(), 3);
        assert_eq!(xs(&rows[0]), vec![50, 100, 150]);
        // 66 is 16 px below the anchor at 50, so it opens a new row.
        assert_eq!(xs(&rows[1]), vec![50]);
        assert_eq!(xs(&rows[2]), vec![50]);
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(group_into_rows(&[], 15.0).is_empty());
    }

    #[test]
    fn splits_side_by_side_rows() {
        let circles: Vec<Circle> = [100, 140, 180, 220, 600, 640, 680, 720]
            .iter()
            .map(|&x| Circle::new(x, 300, 10))
            .collect();
        let rows = split_at_gaps(group_into_rows(&circles, 15.0), 150.0);
        assert_eq!(rows.len(), 2);
        assert_eq!(xs(&rows[0]), vec![100, 140, 180, 220]);
        assert_eq!(xs(&rows[1]), vec![600, 640, 680, 720]);
    }

    #[test]
    fn prefers_exact_rows_and_drops_others() {
        let four = Row::new((0..4).map(|i| Circle::new(100 + 40 * i, 10, 10)).collect());
        let five = Row::new((0..5).map(|i| Circle::new(60 + 40 * i, 60, 10)).collect());
        let three = Row::new((0..3).map(|i| Circle::new(100 + 40 * i, 110, 10)).collect());
        let rows = answer_rows(&[four.clone(), five, three]);
        assert_eq!(rows, vec![four]);
    }

    #[test]
    fn salvages_rightmost_four_when_no_exact_row() {
        let five = Row::new((0..5).map(|i| Circle::new(60 + 40 * i, 60, 10)).collect());
        let six = Row::new((0..6).map(|i| Circle::new(60 + 40 * i, 120, 10)).collect());
        let rows = answer_rows(&[five, six]);
        assert_eq!(rows.len(), 1);
        assert_eq!(xs(&rows[0]), vec![100, 140, 180, 220]);
    }
}
