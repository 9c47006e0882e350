//! Process exit codes. Part of the public contract of the `cair` binary.

pub const SUCCESS: i32 = 0;
pub const COMMAND_FAILED: i32 = 1; // Command ran and failed (server error, refused overwrite)
pub const CONFIG_ERROR: i32 = 2; // Bad config, invalid or missing weights
pub const BIND_FAILED: i32 = 3; // Listening port unavailable
