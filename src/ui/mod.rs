//! Rendering code: panels, widgets, and dialogs. All state lives in
//! [`crate::state::AppState`]; these functions only draw and dispatch.

pub mod panels;
pub mod results;
