//! Curve registry and parameter cache.

mod cache;
mod registry;

pub use self::{
    cache::{CurveCache, CurveSpec, Fields},
    registry::{CURVES, CurveId, CurveInfo, find_by_name, find_by_oid, lookup},
};
