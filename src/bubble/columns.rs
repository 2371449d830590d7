use crate::core::model::Row;

/// Layout the answer rows of a page were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    Single,
    Two,
}

/// Answer rows in reading order: the left column top to bottom, then the
/// right column top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRows {
    pub layout: ColumnLayout,
    pub rows: Vec<Row>,
}

/// Order candidate answer rows the way a person reads the printed sheet.
///
/// Rows are split at the midpoint of the horizontal extent of all their
/// circles. Two groups are treated as columns only when they do not overlap
/// horizontally; otherwise the page is a single column.
pub fn order_rows(rows: Vec<Row>) -> OrderedRows {
    let min_x = rows.iter().filter_map(Row::min_x).min();
    let max_x = rows.iter().filter_map(Row::max_x).max();
    let (Some(min_x), Some(max_x)) = (min_x, max_x) else {
        return OrderedRows {
            layout: ColumnLayout::Single,
            rows,
        };
    };
    let mid_x = (min_x + max_x) as f32 / 2.0;

    let (mut left, mut right): (Vec<Row>, Vec<Row>) =
        rows.iter().cloned().partition(|r| r.avg_x() < mid_x);

    let separated = match (
        left.iter().filter_map(Row::max_x).max(),
        right.iter().filter_map(Row::min_x).min(),
    ) {
        (Some(left_edge), Some(right_edge)) => left_edge < right_edge,
        _ => false,
    };

    if separated {
        sort_top_to_bottom(&mut left);
        sort_top_to_bottom(&mut right);
        left.extend(right);
        OrderedRows {
            layout: ColumnLayout::Two,
            rows: left,
        }
    } else {
        let mut rows = rows;
        sort_top_to_bottom(&mut rows);
        OrderedRows {
            layout: ColumnLayout::Single,
            rows,
        }
    }
}

fn sort_top_to_bottom(rows: &mut [Row]) {
    rows.sort_by(|a, b| a.avg_y().total_cmp(&b.avg_y()).then(a.avg_x().total_cmp(&b.avg_x())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Circle;
    use pretty_assertions::assert_eq;

    fn row_at(x0: i32, y: i32) -> Row {
        Row::new((0..4).map(|i| Circle::new(x0 + 40 * i, y, 10)).collect())
    }

    fn starts(ordered: &OrderedRows) -> Vec<(i32, i32)> {
        ordered
            .rows
            .iter()
            .map(|r| (r.circles[0].x, r.circles[0].y))
            .collect()
    }

    #[test]
    fn single_column_reads_top_to_bottom() {
        let ordered = order_rows(vec![row_at(100, 300), row_at(100, 100), row_at(100, 200)]);
        assert_eq!(ordered.layout, ColumnLayout::Single);
        assert_eq!(starts(&ordered), vec![(100, 100), (100, 200), (100, 300)]);
    }

    #[test]
    fn jittered_single_column_is_not_split() {
        let ordered = order_rows(vec![row_at(99, 100), row_at(101, 200), row_at(100, 300)]);
        assert_eq!(ordered.layout, ColumnLayout::Single);
        assert_eq!(ordered.rows.len(), 3);
    }

    #[test]
    fn two_columns_read_left_then_right() {
        // Right column sits higher on the page than the left one.
        let rows = vec![
            row_at(600, 80),
            row_at(100, 150),
            row_at(600, 140),
            row_at(100, 90),
        ];
        let ordered = order_rows(rows);
        assert_eq!(ordered.layout, ColumnLayout::Two);
        assert_eq!(
            starts(&ordered),
            vec![(100, 90), (100, 150), (600, 80), (600, 140)]
        );
    }

    #[test]
    fn no_rows_is_single_empty_column() {
        let ordered = order_rows(Vec::new());
        assert_eq!(ordered.layout, ColumnLayout::Single);
        assert!(ordered.rows.is_empty());
    }
}
