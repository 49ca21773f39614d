//! Prelude module - common imports for sheetbase users
//!
//! ```rust
//! use sheetbase::prelude::*;
//! ```

pub use crate::{
    // Core types
    Column,
    ColumnKind,
    // Components
    Creator,
    Database,
    Editor,
    // Error types
    Error,
    Loader,
    Outcome,
    Persister,
    Reader,
    Refusal,
    Result,
    Row,
    StorageConfig,
    Table,
    TableShape,
    Value,
};
