//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - scan completed, or issues found without --exit-error
pub const SUCCESS: i32 = 0;

/// General error - every collector failed, output could not be written
pub const ERROR: i32 = 1;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Deprecated or removed APIs found and --exit-error was given
pub const ISSUES_FOUND: i32 = 200;
