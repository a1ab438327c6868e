//! Fixed mapping from system fault codes to categories
//!
//! Codes follow the common bit-flag error level convention used by
//! embedded interpreters and host runtimes.

use crate::types::Category;

pub const ERROR: i64 = 1;
pub const WARNING: i64 = 2;
pub const PARSE: i64 = 4;
pub const NOTICE: i64 = 8;
pub const CORE_ERROR: i64 = 16;
pub const CORE_WARNING: i64 = 32;
pub const COMPILE_ERROR: i64 = 64;
pub const COMPILE_WARNING: i64 = 128;
pub const USER_ERROR: i64 = 256;
pub const USER_WARNING: i64 = 512;
pub const USER_NOTICE: i64 = 1024;
pub const RECOVERABLE_ERROR: i64 = 4096;
pub const DEPRECATED: i64 = 8192;
pub const USER_DEPRECATED: i64 = 16384;

/// How a fault code is treated when categorizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// The code always denotes an unrecoverable fault
    Fatal,
    /// The code denotes a fault the process survived
    Warning,
}

const FAULT_CODES: &[(i64, FaultClass)] = &[
    (ERROR, FaultClass::Fatal),
    (PARSE, FaultClass::Fatal),
    (CORE_ERROR, FaultClass::Fatal),
    (COMPILE_ERROR, FaultClass::Fatal),
    (USER_ERROR, FaultClass::Fatal),
    (WARNING, FaultClass::Warning),
    (NOTICE, FaultClass::Warning),
    (CORE_WARNING, FaultClass::Warning),
    (COMPILE_WARNING, FaultClass::Warning),
    (USER_WARNING, FaultClass::Warning),
    (USER_NOTICE, FaultClass::Warning),
    (RECOVERABLE_ERROR, FaultClass::Warning),
    (DEPRECATED, FaultClass::Warning),
    (USER_DEPRECATED, FaultClass::Warning),
];

/// Look up the class of a fault code
pub fn fault_class(code: i64) -> Option<FaultClass> {
    FAULT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, class)| *class)
}

/// Category recorded for a system fault with `code`
pub fn category_for_code(code: i64) -> Category {
    match fault_class(code) {
        Some(FaultClass::Fatal) => Category::Fatal,
        Some(FaultClass::Warning) => Category::System,
        None => Category::Unknown,
    }
}
