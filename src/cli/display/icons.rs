//! Status icons for CLI output

use crate::domain::stack::PlanStep;

/// Markers shown next to plan and output rows
pub struct StatusIcon;

impl StatusIcon {
    /// Validation passed
    pub const SUCCESS: &'static str = "✓";

    /// Hazard worth a second look (unprotected data, overridden credentials)
    pub const WARNING: &'static str = "⚠";

    /// Validation failed
    pub const ERROR: &'static str = "✗";

    /// Value is held as a secret
    pub const SECRET: &'static str = "🔒";

    /// Resource is protected from deletion
    pub const PROTECTED: &'static str = "🛡";

    /// Plain resource
    pub const PLAIN: &'static str = "+";

    /// Icon for a plan row. Protection wins over the secret marker.
    pub fn for_step(step: &PlanStep) -> &'static str {
        if step.protected {
            Self::PROTECTED
        } else if step.secret {
            Self::SECRET
        } else {
            Self::PLAIN
        }
    }

    pub fn for_secret(secret: bool) -> &'static str {
        if secret {
            Self::SECRET
        } else {
            Self::PLAIN
        }
    }
}
