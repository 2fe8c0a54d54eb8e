//! Zoom-adaptive sampling and viewport culling of wind fields.
//!
//! Two filters compose before any glyph is built: a stride picked from the
//! current zoom (coarse zoom, large stride) and a containment test against the
//! visible bounds. The per-frame glyph count then tracks the visible area
//! instead of the dataset size.

use overlay_common::{OverlayError, OverlayResult, ViewportWindow, WindField, WindSample};
use serde::{Deserialize, Serialize};

/// One row of the stride table: zooms up to and including `max_zoom` use `stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideStep {
    pub max_zoom: u8,
    pub stride: usize,
}

/// Zoom-to-stride lookup, monotonically non-increasing in zoom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideTable {
    steps: Vec<StrideStep>,
    /// Stride for zooms finer than every step.
    finest: usize,
}

impl Default for StrideTable {
    fn default() -> Self {
        let steps = [(3, 40), (4, 25), (5, 14), (6, 9), (7, 6), (8, 3), (9, 2)]
            .into_iter()
            .map(|(max_zoom, stride)| StrideStep { max_zoom, stride })
            .collect();
        Self { steps, finest: 1 }
    }
}

impl StrideTable {
    /// Rows of the table in ascending zoom order.
    pub fn steps(&self) -> &[StrideStep] {
        &self.steps
    }

    pub fn finest(&self) -> usize {
        self.finest
    }

    /// Build a table, checking ordering and monotonicity.
    pub fn new(mut steps: Vec<StrideStep>, finest: usize) -> OverlayResult<Self> {
        steps.sort_by_key(|s| s.max_zoom);

        if finest == 0 || steps.iter().any(|s| s.stride == 0) {
            return Err(OverlayError::InvalidConfig(
                "stride table entries must be at least 1".to_string(),
            ));
        }
        if steps.windows(2).any(|w| w[0].max_zoom == w[1].max_zoom) {
            return Err(OverlayError::InvalidConfig(
                "stride table has duplicate zoom entries".to_string(),
            ));
        }
        let mut strides = steps.iter().map(|s| s.stride).chain(std::iter::once(finest));
        let mut prev = strides.next().unwrap_or(finest);
        for stride in strides {
            if stride > prev {
                return Err(OverlayError::InvalidConfig(format!(
                    "stride table must not grow with zoom ({} after {})",
                    stride, prev
                )));
            }
            prev = stride;
        }

        Ok(Self { steps, finest })
    }

    /// Stride for a zoom level.
    pub fn stride_for(&self, zoom: u8) -> usize {
        self.steps
            .iter()
            .find(|s| zoom <= s.max_zoom)
            .map(|s| s.stride)
            .unwrap_or(self.finest)
    }
}

/// Picks which samples of a field get a glyph for a given viewport.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveSampler {
    table: StrideTable,
}

impl AdaptiveSampler {
    pub fn new(table: StrideTable) -> Self {
        Self { table }
    }

    pub fn stride_for(&self, viewport: &ViewportWindow) -> usize {
        self.table.stride_for(viewport.zoom)
    }

    /// Lazily yield every `stride`-th sample that lies inside the viewport.
    ///
    /// Nothing is retained between calls; each call starts from the first sample.
    pub fn select<'a>(
        &self,
        field: &'a WindField,
        viewport: &ViewportWindow,
    ) -> impl Iterator<Item = &'a WindSample> + 'a {
        let stride = self.stride_for(viewport);
        let bounds = viewport.bounds;

        field
            .samples
            .iter()
            .step_by(stride)
            .filter(move |s| bounds.contains_point(s.lat, s.lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_values() {
        let table = StrideTable::default();
        assert_eq!(table.stride_for(0), 40);
        assert_eq!(table.stride_for(3), 40);
        assert_eq!(table.stride_for(4), 25);
        assert_eq!(table.stride_for(7), 6);
        assert_eq!(table.stride_for(9), 2);
        assert_eq!(table.stride_for(10), 1);
        assert_eq!(table.stride_for(u8::MAX), 1);
    }

    #[test]
    fn test_table_rejects_growing_stride() {
        let steps = vec![
            StrideStep { max_zoom: 3, stride: 5 },
            StrideStep { max_zoom: 5, stride: 10 },
        ];
        assert!(StrideTable::new(steps, 1).is_err());
    }

    #[test]
    fn test_table_rejects_zero_stride() {
        let steps = vec![StrideStep { max_zoom: 3, stride: 0 }];
        assert!(StrideTable::new(steps, 1).is_err());
        assert!(StrideTable::new(vec![], 0).is_err());
    }

    #[test]
    fn test_table_sorts_steps() {
        let steps = vec![
            StrideStep { max_zoom: 6, stride: 4 },
            StrideStep { max_zoom: 2, stride: 8 },
        ];
        let table = StrideTable::new(steps, 1).unwrap();
        assert_eq!(table.stride_for(1), 8);
        assert_eq!(table.stride_for(5), 4);
        assert_eq!(table.stride_for(7), 1);
    }
}
