//! Attach-point specifier validation
//!
//! Each probe kind has a fixed grammar for its colon-separated parts,
//! checked independently of the statement block. The validator also owns
//! the program-wide singleton rule for the lifecycle probes.

use super::diagnostics::SemanticError;
use crate::script::ast::{AttachPoint, ProbeKind};

/// Units accepted by profile (timer) probes.
const PROFILE_UNITS: &[&str] = &["hz", "s", "ms", "us"];

#[derive(Debug, Default)]
pub struct ProbeValidator {
    seen_begin: bool,
    seen_end: bool,
}

impl ProbeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&mut self, attach_point: &AttachPoint) -> Result<(), SemanticError> {
        let parts = &attach_point.parts;
        match attach_point.kind {
            ProbeKind::Kprobe | ProbeKind::Kretprobe => match parts.len() {
                1 => Ok(()),
                0 => Err(Self::malformed(attach_point, "requires a function name")),
                _ => Err(Self::malformed(
                    attach_point,
                    "must not specify a binary path",
                )),
            },
            ProbeKind::Uprobe | ProbeKind::Uretprobe => {
                if parts.len() == 2 {
                    Ok(())
                } else {
                    Err(Self::malformed(
                        attach_point,
                        "requires a binary path and a function name",
                    ))
                }
            }
            ProbeKind::Tracepoint => {
                if parts.len() == 2 {
                    Ok(())
                } else {
                    Err(Self::malformed(
                        attach_point,
                        "requires a category and an event name",
                    ))
                }
            }
            ProbeKind::Begin | ProbeKind::End => {
                if !parts.is_empty() {
                    return Err(Self::malformed(attach_point, "does not take a target"));
                }
                let seen = match attach_point.kind {
                    ProbeKind::Begin => &mut self.seen_begin,
                    _ => &mut self.seen_end,
                };
                if *seen {
                    Err(SemanticError::DuplicateLifecycleProbe(
                        attach_point.kind.name(),
                    ))
                } else {
                    *seen = true;
                    Ok(())
                }
            }
            ProbeKind::Profile => {
                if parts.len() != 2 {
                    return Err(Self::malformed(
                        attach_point,
                        "requires a unit and an interval",
                    ));
                }
                if !PROFILE_UNITS.contains(&parts[0].as_str()) {
                    return Err(Self::malformed_with(
                        attach_point,
                        format!("has unknown unit: {}", parts[0]),
                    ));
                }
                if parts[1].parse::<u64>().is_err() {
                    return Err(Self::malformed_with(
                        attach_point,
                        format!("interval must be an unsigned integer: {}", parts[1]),
                    ));
                }
                Ok(())
            }
        }
    }

    fn malformed(attach_point: &AttachPoint, reason: &str) -> SemanticError {
        Self::malformed_with(attach_point, reason.to_string())
    }

    fn malformed_with(attach_point: &AttachPoint, reason: String) -> SemanticError {
        SemanticError::InvalidProbeSpecifier(format!(
            "{} {}",
            attach_point.kind.name(),
            reason
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(kind: ProbeKind, parts: &[&str]) -> AttachPoint {
        let mut ap = AttachPoint::new(kind);
        for p in parts {
            ap = ap.part(*p);
        }
        ap
    }

    #[test]
    fn kernel_probes_take_a_bare_function_name() {
        let mut v = ProbeValidator::new();
        assert!(v.validate(&point(ProbeKind::Kprobe, &["f"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Kprobe, &[])).is_err());
        assert!(v.validate(&point(ProbeKind::Kprobe, &["path", "f"])).is_err());
        assert!(v.validate(&point(ProbeKind::Kretprobe, &["f"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Kretprobe, &["path", "f"])).is_err());
    }

    #[test]
    fn user_probes_require_a_path() {
        let mut v = ProbeValidator::new();
        assert!(v.validate(&point(ProbeKind::Uprobe, &["/bin/sh", "f"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Uprobe, &["f"])).is_err());
        assert!(v.validate(&point(ProbeKind::Uprobe, &[])).is_err());
        assert!(v.validate(&point(ProbeKind::Uretprobe, &["f"])).is_err());
    }

    #[test]
    fn tracepoints_require_category_and_event() {
        let mut v = ProbeValidator::new();
        assert!(v
            .validate(&point(ProbeKind::Tracepoint, &["sched", "sched_switch"]))
            .is_ok());
        assert!(v.validate(&point(ProbeKind::Tracepoint, &["f"])).is_err());
        assert!(v.validate(&point(ProbeKind::Tracepoint, &[])).is_err());
    }

    #[test]
    fn lifecycle_probes_are_singletons() {
        let mut v = ProbeValidator::new();
        assert!(v.validate(&point(ProbeKind::Begin, &[])).is_ok());
        assert!(matches!(
            v.validate(&point(ProbeKind::Begin, &[])),
            Err(SemanticError::DuplicateLifecycleProbe("BEGIN"))
        ));
        assert!(v.validate(&point(ProbeKind::End, &[])).is_ok());
        assert!(v.validate(&point(ProbeKind::End, &[])).is_err());
        assert!(v.validate(&point(ProbeKind::Begin, &["f"])).is_err());
    }

    #[test]
    fn profile_checks_unit_and_interval() {
        let mut v = ProbeValidator::new();
        assert!(v.validate(&point(ProbeKind::Profile, &["hz", "997"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Profile, &["s", "10"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Profile, &["ms", "100"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Profile, &["us", "100"])).is_ok());
        assert!(v.validate(&point(ProbeKind::Profile, &["ms", "nan"])).is_err());
        assert!(v.validate(&point(ProbeKind::Profile, &["unit", "100"])).is_err());
        assert!(v.validate(&point(ProbeKind::Profile, &["f"])).is_err());
        assert!(v.validate(&point(ProbeKind::Profile, &[])).is_err());
    }
}
