//! Exit codes for polyglot
//!
//! Each failure category gets its own code so scripts can tell a broken input
//! apart from a missing compiler or an unwritable output.

/// Success - Polyglot written (or subcommand completed)
pub const SUCCESS: i32 = 0;

/// The first input on the command line failed its syntax check
pub const FIRST_INPUT_INVALID: i32 = 1;

/// The second input on the command line failed its syntax check
pub const SECOND_INPUT_INVALID: i32 = 2;

/// The inputs cannot be paired: unsupported extension, no C/C++ file (or two),
/// no fence for the guest, or a fence collision
pub const UNSUPPORTED_PAIRING: i32 = 3;

/// Reading an input or writing the output failed
pub const IO_ERROR: i32 = 4;

/// A syntax checker could not be run (not installed or timed out)
pub const TOOL_UNAVAILABLE: i32 = 5;

/// Configuration file or command line usage error
pub const CONFIG_ERROR: i32 = 6;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{CONFIG_ERROR, SUCCESS};

    /// Exit with success code (0)
    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    /// Exit with the given failure code
    pub fn with_code(code: i32) -> ! {
        std::process::exit(code);
    }

    /// Exit with configuration/usage error code (6)
    pub fn config_error() -> ! {
        std::process::exit(CONFIG_ERROR);
    }
}
