// Render-target registry: one live rendered chart per chart id

use std::collections::BTreeMap;
use std::time::Duration;

use crate::compiler::compile;
use crate::config::ChartInstanceConfig;
use crate::data::TabularDataset;
use crate::error::RenderError;
use crate::graph::{self, RenderedImage};
use crate::ir::RenderSpec;
use crate::RenderOptions;

/// How long a render-error notice stays on screen
pub const NOTICE_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Materialises render specs into live surfaces
pub trait RenderBackend {
    type Surface;

    fn create(&mut self, chart_id: &str, spec: &RenderSpec) -> Result<Self::Surface, RenderError>;

    /// Release a surface. Called before a replacement is created.
    fn destroy(&mut self, chart_id: &str, surface: Self::Surface);
}

/// Backend drawing previews with plotters
#[derive(Debug, Clone, Default)]
pub struct PlottersBackend {
    pub options: RenderOptions,
}

impl PlottersBackend {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl RenderBackend for PlottersBackend {
    type Surface = RenderedImage;

    fn create(&mut self, chart_id: &str, spec: &RenderSpec) -> Result<RenderedImage, RenderError> {
        graph::render(spec, &self.options).map_err(|e| RenderError::Draw {
            chart_id: chart_id.to_string(),
            message: format!("{:#}", e),
        })
    }

    fn destroy(&mut self, chart_id: &str, surface: RenderedImage) {
        log::debug!("releasing preview of '{}' ({} bytes)", chart_id, surface.bytes.len());
    }
}

/// Non-blocking notice for a chart that failed to render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNotice {
    pub chart_id: String,
    pub message: String,
    pub dismiss_after: Duration,
}

impl RenderNotice {
    pub fn from_error(err: &RenderError) -> Self {
        Self {
            chart_id: err.chart_id().to_string(),
            message: err.to_string(),
            dismiss_after: NOTICE_DISMISS_AFTER,
        }
    }

    pub fn is_expired(&self, shown_for: Duration) -> bool {
        shown_for >= self.dismiss_after
    }
}

/// Live surfaces keyed by chart id
pub struct RenderRegistry<B: RenderBackend> {
    backend: B,
    live: BTreeMap<String, B::Surface>,
}

impl<B: RenderBackend> RenderRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: BTreeMap::new(),
        }
    }

    /// Destroy any surface for `chart_id`, then create one from `spec`.
    ///
    /// On failure the chart has no live surface.
    pub fn replace(&mut self, chart_id: &str, spec: &RenderSpec) -> Result<&B::Surface, RenderError> {
        if let Some(old) = self.live.remove(chart_id) {
            self.backend.destroy(chart_id, old);
        }
        let surface = self.backend.create(chart_id, spec)?;
        Ok(self.live.entry(chart_id.to_string()).or_insert(surface))
    }

    pub fn remove(&mut self, chart_id: &str) -> bool {
        match self.live.remove(chart_id) {
            Some(surface) => {
                self.backend.destroy(chart_id, surface);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for (chart_id, surface) in std::mem::take(&mut self.live) {
            self.backend.destroy(&chart_id, surface);
        }
    }

    pub fn get(&self, chart_id: &str) -> Option<&B::Surface> {
        self.live.get(chart_id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.live.keys().map(|k| k.as_str())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Recompile and re-render every chart against `dataset`.
    ///
    /// Surfaces of charts no longer listed are destroyed. A chart that fails
    /// to render yields a notice; the remaining charts still render.
    pub fn refresh(
        &mut self,
        charts: &[ChartInstanceConfig],
        dataset: &TabularDataset,
    ) -> Vec<RenderNotice> {
        let stale: Vec<String> = self
            .live
            .keys()
            .filter(|id| !charts.iter().any(|c| &c.id == *id))
            .cloned()
            .collect();
        for chart_id in stale {
            self.remove(&chart_id);
        }

        let mut notices = Vec::new();
        for chart in charts {
            let spec = compile(chart, dataset);
            if let Err(err) = self.replace(&chart.id, &spec) {
                log::warn!("{}", err);
                notices.push(RenderNotice::from_error(&err));
            }
        }
        notices
    }
}

impl<B: RenderBackend> Drop for RenderRegistry<B> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartKind;
    use crate::ir::RenderKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records create/destroy calls; fails for the listed chart ids
    #[derive(Default, Clone)]
    struct RecordingBackend {
        events: Rc<RefCell<Vec<String>>>,
        failing: Vec<String>,
    }

    impl RenderBackend for RecordingBackend {
        type Surface = RenderKind;

        fn create(&mut self, chart_id: &str, spec: &RenderSpec) -> Result<RenderKind, RenderError> {
            self.events.borrow_mut().push(format!("create:{}", chart_id));
            if self.failing.iter().any(|f| f == chart_id) {
                return Err(RenderError::Draw {
                    chart_id: chart_id.to_string(),
                    message: "invalid plugin option".into(),
                });
            }
            Ok(spec.kind)
        }

        fn destroy(&mut self, chart_id: &str, _surface: RenderKind) {
            self.events.borrow_mut().push(format!("destroy:{}", chart_id));
        }
    }

    fn chart(id: &str, kind: ChartKind) -> ChartInstanceConfig {
        ChartInstanceConfig {
            id: id.into(),
            chart_kind: kind,
            ..Default::default()
        }
    }

    fn spec(kind: ChartKind) -> RenderSpec {
        compile(&chart("c", kind), &TabularDataset::mock())
    }

    #[test]
    fn test_replace_destroys_before_create() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let mut registry = RenderRegistry::new(backend);

        registry.replace("a", &spec(ChartKind::Bar)).unwrap();
        registry.replace("a", &spec(ChartKind::Line)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a"), Some(&RenderKind::Line));
        assert_eq!(*events.borrow(), vec!["create:a", "destroy:a", "create:a"]);
    }

    #[test]
    fn test_failed_replace_leaves_no_surface() {
        let backend = RecordingBackend {
            failing: vec!["a".into()],
            ..Default::default()
        };
        let mut registry = RenderRegistry::new(backend);
        let err = registry.replace("a", &spec(ChartKind::Bar)).unwrap_err();
        assert_eq!(err.chart_id(), "a");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_refresh_isolates_failures() {
        let backend = RecordingBackend {
            failing: vec!["broken".into()],
            ..Default::default()
        };
        let mut registry = RenderRegistry::new(backend);
        let charts = vec![
            chart("first", ChartKind::Bar),
            chart("broken", ChartKind::Pie),
            chart("last", ChartKind::Area),
        ];

        let notices = registry.refresh(&charts, &TabularDataset::mock());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].chart_id, "broken");
        assert_eq!(notices[0].dismiss_after, Duration::from_secs(5));
        assert!(notices[0].message.contains("invalid plugin option"));
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["first", "last"]);
    }

    #[test]
    fn test_refresh_drops_stale_charts() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let mut registry = RenderRegistry::new(backend);
        registry.refresh(&[chart("a", ChartKind::Bar), chart("b", ChartKind::Bar)], &TabularDataset::mock());
        events.borrow_mut().clear();

        registry.refresh(&[chart("b", ChartKind::Line)], &TabularDataset::mock());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(*events.borrow(), vec!["destroy:a", "destroy:b", "create:b"]);
    }

    #[test]
    fn test_drop_destroys_all() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        {
            let mut registry = RenderRegistry::new(backend);
            registry.replace("a", &spec(ChartKind::Bar)).unwrap();
            assert!(registry.remove("a"));
            assert!(!registry.remove("a"));
            registry.replace("b", &spec(ChartKind::Bar)).unwrap();
        }
        assert_eq!(
            *events.borrow(),
            vec!["create:a", "destroy:a", "create:b", "destroy:b"]
        );
    }

    #[test]
    fn test_notice_expiry() {
        let notice = RenderNotice::from_error(&RenderError::Draw {
            chart_id: "x".into(),
            message: "boom".into(),
        });
        assert!(!notice.is_expired(Duration::from_secs(4)));
        assert!(notice.is_expired(Duration::from_secs(5)));
    }

    #[test]
    fn test_plotters_backend_renders_png() {
        let mut registry = RenderRegistry::new(PlottersBackend::default());
        let notices = registry.refresh(&[chart("p", ChartKind::Pie)], &TabularDataset::mock());
        assert!(notices.is_empty());
        let image = registry.get("p").unwrap();
        assert!(image.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_plotters_backend_reports_draw_errors() {
        let options = RenderOptions {
            width: 0,
            ..Default::default()
        };
        let mut registry = RenderRegistry::new(PlottersBackend::new(options));
        let notices = registry.refresh(&[chart("z", ChartKind::Bar)], &TabularDataset::mock());
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("non-zero"));
    }

    #[test]
    fn test_oversized_canvas_becomes_notice() {
        let options = RenderOptions {
            width: 40000,
            height: 40000,
            ..Default::default()
        };
        let mut registry = RenderRegistry::new(PlottersBackend::new(options));
        let charts = vec![chart("huge", ChartKind::Bar), chart("other", ChartKind::Line)];
        let notices = registry.refresh(&charts, &TabularDataset::mock());

        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].chart_id, "huge");
        assert!(notices[0].message.contains("40000x40000"));
        assert!(registry.is_empty());
    }
}
