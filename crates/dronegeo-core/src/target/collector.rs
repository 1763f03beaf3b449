//! Click collection for one photo.

use crate::projection::PixelClick;

/// Source of pixel clicks for the photo currently on screen.
///
/// The CLI feeds it from stdin, the browser from canvas events.
pub trait ClickCollector {
    /// Add a point.
    fn on_click(&mut self, x: f64, y: f64);

    /// Remove the point nearest to `(x, y)`. No-op when empty.
    fn on_remove(&mut self, x: f64, y: f64);

    /// Points in the order they were added.
    fn current_points(&self) -> Vec<PixelClick>;

    fn clear(&mut self);
}

/// Ordered list of clicked points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointList {
    points: Vec<PixelClick>,
}

impl PointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[PixelClick] {
        &self.points
    }

    /// Index of the point nearest to `target`; the first one wins ties.
    fn nearest(&self, target: &PixelClick) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_sq(target).total_cmp(&b.distance_sq(target)))
            .map(|(i, _)| i)
    }
}

impl ClickCollector for PointList {
    fn on_click(&mut self, x: f64, y: f64) {
        self.points.push(PixelClick::new(x, y));
    }

    fn on_remove(&mut self, x: f64, y: f64) {
        if let Some(index) = self.nearest(&PixelClick::new(x, y)) {
            self.points.remove(index);
        }
    }

    fn current_points(&self) -> Vec<PixelClick> {
        self.points.clone()
    }

    fn clear(&mut self) {
        self.points.clear();
    }
}

impl FromIterator<PixelClick> for PointList {
    fn from_iter<I: IntoIterator<Item = PixelClick>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clicks_keep_order() {
        let mut list = PointList::new();
        list.on_click(10.0, 20.0);
        list.on_click(30.0, 40.0);
        assert_eq!(
            list.current_points(),
            vec![PixelClick::new(10.0, 20.0), PixelClick::new(30.0, 40.0)]
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_nearest() {
        let mut list: PointList = [(0.0, 0.0), (100.0, 100.0), (200.0, 0.0)]
            .into_iter()
            .map(PixelClick::from)
            .collect();
        list.on_remove(110.0, 90.0);
        assert_eq!(
            list.as_slice(),
            &[PixelClick::new(0.0, 0.0), PixelClick::new(200.0, 0.0)]
        );
    }

    #[test]
    fn test_remove_tie_takes_first() {
        let mut list: PointList = [(0.0, 0.0), (10.0, 0.0)]
            .into_iter()
            .map(PixelClick::from)
            .collect();
        list.on_remove(5.0, 0.0);
        assert_eq!(list.as_slice(), &[PixelClick::new(10.0, 0.0)]);
    }

    #[test]
    fn test_remove_on_empty_is_noop() {
        let mut list = PointList::new();
        list.on_remove(1.0, 1.0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut list = PointList::new();
        list.on_click(1.0, 2.0);
        list.clear();
        assert!(list.current_points().is_empty());
    }
}
