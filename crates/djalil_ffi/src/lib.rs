//! Flutter bridge surface over `djalil_core`.

pub mod api;
