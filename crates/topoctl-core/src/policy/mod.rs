// ── Policy rules ──
//
// Draft validation and the read-models derived from a policy set.

pub mod derived;
pub mod validate;

pub use derived::{DerivedState, project};
pub use validate::{
    DeviceField, DeviceReport, PolicyField, PolicyReport, ValidationReport, validate_device,
    validate_policy,
};
