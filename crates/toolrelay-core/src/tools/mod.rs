//! Tool management module
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  ToolCatalog                 │
//! │  - tools/list once per run   │
//! │  - LLM function descriptors  │
//! │  - tools/call, text only     │
//! └──────────────────────────────┘
//!           │
//!           │ ToolHost (rmcp session or mock)
//!           ▼
//! ┌──────────────────────────────┐
//! │  MCP server                  │
//! └──────────────────────────────┘
//! ```

mod catalog;

pub use catalog::{ToolCatalog, CatalogError, CatalogResult};
