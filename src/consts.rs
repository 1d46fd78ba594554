//! Shared constants for the designer crate.

// ── Document ────────────────────────────────────────────────────

/// Format tag written into every new [`crate::model::ReportConfig`].
pub const CONFIG_VERSION: &str = "1.0";

/// Prefix for ids in the component id sequence.
pub const COMPONENT_ID_PREFIX: &str = "comp";

// ── Drag and drop ───────────────────────────────────────────────

/// Reserved drag-id prefix marking a palette item ("new component of type X").
pub const PALETTE_PREFIX: &str = "palette-";

/// Drop target id of the design canvas surface.
pub const CANVAS_DROP_ID: &str = "canvas";

// ── Default geometry (width, height) ────────────────────────────

/// Embedded system/core/business configuration panels.
pub const CONFIG_PANEL_SIZE: (f64, f64) = (800.0, 600.0);

/// Table components.
pub const TABLE_SIZE: (f64, f64) = (600.0, 300.0);

/// Chart components.
pub const CHART_SIZE: (f64, f64) = (400.0, 300.0);

/// Text components.
pub const TEXT_SIZE: (f64, f64) = (200.0, 50.0);

/// Image components.
pub const IMAGE_SIZE: (f64, f64) = (200.0, 200.0);

/// Groups and unrecognized types.
pub const FALLBACK_SIZE: (f64, f64) = (300.0, 200.0);

// ── Views ───────────────────────────────────────────────────────

/// Placeholder shown by the design canvas when there are no components.
pub const EMPTY_CANVAS_TEXT: &str = "Drag components from the palette onto the canvas";

/// Placeholder shown by the preview when there are no components.
pub const EMPTY_PREVIEW_TEXT: &str = "This report has no components";

// ── Network ─────────────────────────────────────────────────────

/// Default REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Default page size for the data-source catalog listing.
pub const DEFAULT_CATALOG_PAGE_SIZE: u32 = 100;

/// Default TCP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
