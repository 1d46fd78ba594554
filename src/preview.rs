//! Preview: loads bound data and re-renders the component list read-only.
//!
//! DESIGN
//! ======
//! The preview keeps its own [`DataContext`], independent of the design
//! canvas. A load fetches every declared `api` source one after another and
//! stores each body under its code; a failing source stores `[]` and the
//! rest still load. When the host supplies external data (printing a real
//! record) the load step is skipped entirely and that value is the context.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::canvas::{self, CanvasView};
use crate::consts::EMPTY_PREVIEW_TEXT;
use crate::context::{DataContext, ResolvedData};
use crate::http::FetchError;
use crate::model::{BindingKind, Component, ReportConfig};
use crate::registry;

/// Plain HTTP GET of a data-source URL.
#[async_trait::async_trait]
pub trait DataFetcher: Send + Sync {
    /// Fetch `url` and return the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-success status, or
    /// an unparseable body.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// State of the refresh control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshControl {
    pub visible: bool,
    pub loading: bool,
}

/// Rendered preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView {
    pub canvas: CanvasView,
    pub refresh: RefreshControl,
}

/// Read-only renderer with its own data context.
#[derive(Debug, Clone)]
pub struct Preview {
    data: DataContext,
    external: Option<Value>,
    show_refresh: bool,
    loading: bool,
}

impl Default for Preview {
    fn default() -> Self {
        Self { data: DataContext::new(), external: None, show_refresh: true, loading: false }
    }
}

impl Preview {
    /// A live preview that loads data sources and shows the refresh control.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A preview rendering purely from `data`, with no refresh control.
    ///
    /// No fetch is ever issued by this preview.
    #[must_use]
    pub fn with_external_data(data: Value) -> Self {
        Self { data: DataContext::from_value(data.clone()), external: Some(data), show_refresh: false, loading: false }
    }

    /// Hide the refresh control.
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.show_refresh = false;
        self
    }

    #[must_use]
    pub fn data(&self) -> &DataContext {
        &self.data
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// (Re)load the data context for `config`.
    pub async fn load(&mut self, config: &ReportConfig, fetcher: &dyn DataFetcher) {
        if let Some(external) = &self.external {
            debug!("preview using external data; skipping fetch");
            self.data = DataContext::from_value(external.clone());
            return;
        }

        self.loading = true;
        let mut ctx = DataContext::new();
        for source in config.declared_sources() {
            let Some(code) = source.code else {
                continue;
            };
            let url = match (source.kind, source.url) {
                (BindingKind::Api, Some(url)) => url,
                (kind, _) => {
                    debug!(%code, kind = kind.as_str(), "data source not loadable by preview; skipped");
                    continue;
                }
            };
            match fetcher.get_json(&url).await {
                Ok(body) => ctx.insert(code, body),
                Err(e) => {
                    warn!(%code, error = %e, "data source fetch failed; using empty result");
                    ctx.insert(code, Value::Array(Vec::new()));
                }
            }
        }
        info!(sources = ctx.as_value().as_object().map_or(0, serde_json::Map::len), "preview data loaded");
        self.data = ctx;
        self.loading = false;
    }

    /// The refresh control: re-runs [`Preview::load`].
    pub async fn refresh(&mut self, config: &ReportConfig, fetcher: &dyn DataFetcher) {
        self.load(config, fetcher).await;
    }

    /// Data handed to `component`'s renderer.
    ///
    /// A table or chart bound by code gets the array under that code (`[]` if
    /// the stored value is not an array); everything else gets the whole
    /// context.
    #[must_use]
    pub fn resolve<'a>(&'a self, component: &Component) -> ResolvedData<'a> {
        let code = component
            .binding()
            .and_then(|b| b.code)
            .filter(|_| component.kind.is_data_bound());
        match code {
            Some(code) => ResolvedData::Rows(self.data.rows(&code)),
            None => ResolvedData::Context(&self.data),
        }
    }

    /// Render every component of `config` with its resolved data.
    #[must_use]
    pub fn render(&self, config: &ReportConfig) -> PreviewView {
        let canvas = if config.components.is_empty() {
            CanvasView::Empty { placeholder: EMPTY_PREVIEW_TEXT }
        } else {
            let nodes = config
                .components
                .iter()
                .map(|c| canvas::place(c, registry::render(c, &self.resolve(c)), false))
                .collect();
            CanvasView::Placed { nodes }
        };
        PreviewView { canvas, refresh: RefreshControl { visible: self.show_refresh, loading: self.loading } }
    }
}
