use std::ops::Range;

use common::{sample::Dataset, util::tab10_index};

/// Share of its slot a bar covers
pub const BAR_WIDTH: f64 = 0.8;
/// Headroom above the tallest bar for its annotation
const HEADROOM: f64 = 1.12;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// x slot, gaps between groups are empty slots
    pub slot: usize,
    /// Index into [`BarLayout::groups`]
    pub group: usize,
    pub label: String,
    pub duration: f64,
}

impl Bar {
    /// Horizontal extent, centred on the slot
    pub fn span(&self) -> Range<f64> {
        let centre = self.slot as f64;
        centre - BAR_WIDTH / 2.0..centre + BAR_WIDTH / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub workers: u32,
    /// Index into [`common::util::TAB10`]
    pub color: usize,
    pub slots: Range<usize>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BarLayout {
    pub bars: Vec<Bar>,
    pub groups: Vec<BarGroup>,
}

impl BarLayout {
    /// Number of x slots up to and including the last bar
    pub fn slots(&self) -> usize {
        self.groups.last().map(|g| g.slots.end).unwrap_or(0)
    }

    /// Tick label per slot, empty for gaps
    pub fn slot_labels(&self) -> Vec<String> {
        let mut labels = vec![String::new(); self.slots()];
        for bar in &self.bars {
            labels[bar.slot] = bar.label.clone();
        }
        labels
    }

    pub fn max_duration(&self) -> f64 {
        self.bars.iter().map(|b| b.duration).fold(0.0, f64::max)
    }

    /// Every slot is one unit wide around its integer centre
    pub fn x_range(&self) -> Range<f64> {
        -0.5..self.slots() as f64 - 0.5
    }

    /// Centres of the occupied slots, where the x tick labels go
    pub fn x_ticks(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.slot as f64).collect()
    }

    pub fn y_max(&self) -> f64 {
        match self.max_duration() {
            top if top > 0.0 => top * HEADROOM,
            _ => 1.0,
        }
    }
}

/// Round tick values from 0 up to `top`, stepping by 1, 2 or 5 times a power of ten
pub fn y_ticks(top: f64, target: usize) -> Vec<f64> {
    if top.is_nan() || top <= 0.0 || target == 0 {
        return vec![0.0];
    }
    let raw = top / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n <= 1.0 => magnitude,
        n if n <= 2.0 => 2.0 * magnitude,
        n if n <= 5.0 => 5.0 * magnitude,
        _ => 10.0 * magnitude,
    };
    (0..)
        .map(|i| f64::from(i) * step)
        .take_while(|y| *y <= top)
        .collect()
}

/// Lays bars out group after group, ascending by worker count, one empty slot between groups
pub fn layout(dataset: &Dataset) -> BarLayout {
    let groups = dataset.group_by_workers();
    let mut layout = BarLayout::default();
    let mut next = 0;
    for (i, group) in groups.iter().enumerate() {
        let start = next;
        for sample in &group.samples {
            layout.bars.push(Bar {
                slot: next,
                group: i,
                label: sample.configuration.label(),
                duration: sample.duration,
            });
            next += 1;
        }
        layout.groups.push(BarGroup {
            workers: group.workers,
            color: tab10_index(i, groups.len()),
            slots: start..next,
        });
        next += 1;
    }
    layout
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use common::sample::{Configuration, Sample};
    use pretty_assertions::assert_eq;

    use super::*;

    fn dataset(rows: &[(u32, u32, f64)]) -> Dataset {
        rows.iter()
            .map(|&(p, t, secs)| Sample::new(Configuration::hybrid(p, t).unwrap(), secs))
            .collect()
    }

    #[test]
    fn two_groups_one_gap() {
        let layout = layout(&dataset(&[
            (2, 4, 0.44),
            (1, 4, 0.81),
            (4, 2, 0.43),
            (2, 2, 0.79),
        ]));

        assert_eq!(layout.groups.len(), 2);
        let colors: HashSet<_> = layout.groups.iter().map(|g| g.color).collect();
        assert_eq!(colors.len(), 2);
        assert_eq!(layout.groups[0].slots, 0..2);
        assert_eq!(layout.groups[1].slots, 3..5);
        assert_eq!(layout.groups[1].slots.start - layout.groups[0].slots.end, 1);

        let occupied: HashSet<_> = layout.bars.iter().map(|b| b.slot).collect();
        assert!(!occupied.contains(&2));
        assert_eq!(layout.slots(), 5);
    }

    #[test]
    fn bars_follow_sorted_order() {
        let layout = layout(&dataset(&[
            (2, 4, 0.44),
            (1, 4, 0.81),
            (4, 2, 0.43),
            (2, 2, 0.79),
        ]));
        assert_eq!(
            layout.slot_labels(),
            vec!["1p×4t", "2p×2t", "", "2p×4t", "4p×2t"]
        );
        assert_eq!(
            layout.bars.iter().map(|b| b.group).collect::<Vec<_>>(),
            vec![0, 0, 1, 1]
        );
        assert_eq!(
            layout.groups.iter().map(|g| g.workers).collect::<Vec<_>>(),
            vec![4, 8]
        );
        assert_eq!(layout.max_duration(), 0.81);
    }

    #[test]
    fn colors_spread_over_palette() {
        let layout = layout(&dataset(&[(1, 1, 1.0), (1, 2, 1.0), (1, 4, 1.0), (1, 8, 1.0)]));
        assert_eq!(
            layout.groups.iter().map(|g| g.color).collect::<Vec<_>>(),
            vec![0, 3, 6, 9]
        );
        assert_eq!(layout.slots(), 7);
    }

    #[test]
    fn single_group_has_no_gap() {
        let layout = layout(&dataset(&[(1, 2, 1.0), (2, 1, 0.9)]));
        assert_eq!(layout.groups.len(), 1);
        assert_eq!(layout.slots(), 2);
        assert_eq!(layout.groups[0].color, 0);
    }

    #[test]
    fn single_bar_is_centred() {
        let layout = layout(&dataset(&[(2, 2, 0.5)]));
        let bar = &layout.bars[0];
        let x = layout.x_range();
        assert_eq!(x, -0.5..0.5);
        assert_eq!(bar.span().start - x.start, x.end - bar.span().end);
        assert_eq!(layout.x_ticks(), vec![0.0]);
    }

    #[test]
    fn bar_spans_leave_gaps() {
        let layout = layout(&dataset(&[(1, 2, 1.0), (2, 1, 0.9), (2, 2, 0.5)]));
        assert_eq!(layout.x_range(), -0.5..3.5);
        assert_eq!(layout.x_ticks(), vec![0.0, 1.0, 3.0]);
        for pair in layout.bars.windows(2) {
            assert!(pair[0].span().end < pair[1].span().start);
        }
        let first = layout.bars[0].span();
        assert!((first.end - first.start - BAR_WIDTH).abs() < 1e-12);
    }

    #[test]
    fn y_max_has_headroom() {
        let layout = layout(&dataset(&[(1, 1, 2.0), (1, 2, 1.0)]));
        assert!((layout.y_max() - 2.24).abs() < 1e-12);
        let zero = super::layout(&dataset(&[(1, 1, 0.0)]));
        assert_eq!(zero.y_max(), 1.0);
    }

    #[test]
    fn round_ticks() {
        let rounded = |ticks: Vec<f64>| {
            ticks
                .into_iter()
                .map(|y| (y * 1000.0).round() as i64)
                .collect::<Vec<_>>()
        };
        assert_eq!(rounded(y_ticks(1.0, 5)), vec![0, 200, 400, 600, 800, 1000]);
        assert_eq!(rounded(y_ticks(0.9072, 6)), vec![0, 200, 400, 600, 800]);
        assert_eq!(y_ticks(9.0, 4), vec![0.0, 5.0]);
        assert_eq!(y_ticks(0.0, 5), vec![0.0]);
    }

    #[test]
    fn empty() {
        let layout = layout(&Dataset::default());
        assert!(layout.bars.is_empty());
        assert_eq!(layout.slots(), 0);
        assert!(layout.slot_labels().is_empty());
    }
}
