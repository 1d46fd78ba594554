//! Headless model of a drag-and-drop report designer.
//!
//! The crate owns everything about the designer except pixels: the persisted
//! report document, the type-tag renderer registry, canvas drop geometry, the
//! property panel form, preview data resolution and the shell that ties them
//! together. Hosts feed pointer and form events in and draw the
//! [`canvas::CanvasView`] / [`panel::PanelView`] trees that come out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | `ReportConfig`, `Component`, type tags and the id sequence |
//! | [`context`] | Preview data context and `{{path}}` interpolation |
//! | [`registry`] | Type tag to render function, producing `RenderNode`s |
//! | [`canvas`] | Drag sources, drop geometry, palette and placement |
//! | [`panel`] | Property panel form and field edits |
//! | [`preview`] | Data-source loading and read-only rendering |
//! | [`designer`] | Designer shell: drag, selection, tab and save |
//! | [`template`] | Print templates and literal-data printing |
//! | [`http`] | `reqwest` adapters for the backend collaborators |
//! | [`config`] | Environment configuration |
//! | [`consts`] | Shared constants (default sizes, reserved ids, ...) |
//! | [`error`] | The `ErrorCode` trait implemented by every error |

pub mod canvas;
pub mod config;
pub mod consts;
pub mod context;
pub mod designer;
pub mod error;
pub mod http;
pub mod model;
pub mod panel;
pub mod preview;
pub mod registry;
pub mod template;
