//! Flutter-facing bridge over `focusdo_core`.

pub mod api;
