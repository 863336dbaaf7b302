//! Stable identifiers for query error codes.
//!
//! Codes are short snake_case discriminators. They appear in CLI diagnostics and can be looked
//! up with `polquery explain <code>`.

// Configuration
pub const CODE_INVALID_KIND_MASK: &str = "invalid_kind_mask";
pub const CODE_BINARY_POLICY: &str = "binary_policy";

// Patterns
pub const CODE_PATTERN_SYNTAX: &str = "pattern_syntax";
pub const CODE_PATTERN_TOO_LARGE: &str = "pattern_too_large";

// Policy accessor
pub const CODE_ACCESSOR_FAILURE: &str = "accessor_failure";

// Tool-level
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
