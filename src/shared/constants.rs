// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage access groups and projects
pub const ROLE_ADMIN: &str = "admin";
