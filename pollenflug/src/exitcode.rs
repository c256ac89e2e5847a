//! Exit codes (BSD sysexits.h compatible)

/// Successful termination, also used after printing help
pub const OK: u8 = 0;

/// Command line usage error
pub const USAGE: u8 = 64;

/// Request failed or the server rejected it
pub const SOFTWARE: u8 = 70;

/// Invalid settings file
pub const CONFIG: u8 = 78;
