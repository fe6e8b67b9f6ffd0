//! Process exit codes
//!
//! Follows sysexits.h where a matching code exists.

/// General error
pub const ERROR: i32 = 1;

/// Global config or chart overlay keys failed validation
pub const VALIDATION_ERROR: i32 = 2;

/// A chart could not be fetched or rendered
pub const TEMPLATE_ERROR: i32 = 3;

/// A descriptor could not be read, parsed or resolved
pub const DESCRIPTOR_ERROR: i32 = 4;

/// Filesystem failure outside descriptor loading
pub const IO_ERROR: i32 = 5;

/// kubectl rejected the manifests
pub const APPLY_ERROR: i32 = 6;

/// A required external program could not be started (EX_UNAVAILABLE)
pub const UNAVAILABLE: i32 = 69;
