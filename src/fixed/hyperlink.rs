use crate::fixed::element::PathElement;
use crate::geometry::Rect;

/// A geometry-only hyperlink hit region found on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigableRegion {
    pub uri: String,
    pub bounds: Rect,
    pub used: bool,
}

/// Shadow hyperlinks of one page. Each region is claimed by at most one element.
#[derive(Debug, Clone, Default)]
pub struct ShadowHyperlinks {
    regions: Vec<NavigableRegion>,
}

impl ShadowHyperlinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry callback for the page walk.
    pub fn collect(&mut self, path: &PathElement, bounds: Rect) {
        if let Some(uri) = &path.navigate_uri {
            if !bounds.is_empty() {
                self.regions.push(NavigableRegion {
                    uri: uri.clone(),
                    bounds,
                    used: false,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Claim the first unused region covering `bounds` to at least `threshold`.
    pub fn claim(&mut self, bounds: &Rect, threshold: f64) -> Option<String> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| !r.used && r.bounds.overlap_ratio(bounds) >= threshold)?;
        region.used = true;
        Some(region.uri.clone())
    }

    pub fn unused(&self) -> impl Iterator<Item = &NavigableRegion> {
        self.regions.iter().filter(|r| !r.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::element::PathFill;

    fn link(uri: &str) -> PathElement {
        PathElement {
            name: None,
            bounds: Rect::default(),
            fill: PathFill::None,
            navigate_uri: Some(uri.to_string()),
        }
    }

    #[test]
    fn test_overlap_threshold() {
        let mut links = ShadowHyperlinks::new();
        links.collect(&link("https://a.example"), Rect::new(0.0, 0.0, 100.0, 10.0));

        assert_eq!(links.claim(&Rect::new(0.0, 0.0, 98.0, 10.0), 0.99), None);
        assert_eq!(
            links.claim(&Rect::new(0.0, 0.0, 99.0, 10.0), 0.99).as_deref(),
            Some("https://a.example")
        );
    }

    #[test]
    fn test_region_used_once() {
        let mut links = ShadowHyperlinks::new();
        let bounds = Rect::new(0.0, 0.0, 50.0, 10.0);
        links.collect(&link("https://a.example"), bounds);
        links.collect(&link("https://b.example"), Rect::new(0.0, 100.0, 5.0, 5.0));

        assert!(links.claim(&bounds, 0.99).is_some());
        assert!(links.claim(&bounds, 0.99).is_none());
        let unused: Vec<_> = links.unused().map(|r| r.uri.as_str()).collect();
        assert_eq!(unused, vec!["https://b.example"]);
    }
}
