//! Constant values of the Jack virtual machine and its operating system.

/// Largest integer constant the VM can push.
pub const MAX_INT: u16 = 0x7FFF; // 32767

/// `pointer 0` holds the base address of the current object (`this`).
pub const POINTER_THIS: u16 = 0;

/// `pointer 1` holds the base address the `that` segment points into.
pub const POINTER_THAT: u16 = 1;

/// Scratch register used for discarded return values and
/// for parking the value of an indexed assignment.
pub const TEMP_SCRATCH: u16 = 0;

// ----------------------------------------------------------------------------
// Operating system routines the generated code calls into.

pub const MATH_MULTIPLY: &str = "Math.multiply";
pub const MATH_DIVIDE: &str = "Math.divide";
pub const MEMORY_ALLOC: &str = "Memory.alloc";
pub const STRING_NEW: &str = "String.new";
pub const STRING_APPEND_CHAR: &str = "String.appendChar";

// ----------------------------------------------------------------------------
// Control flow label prefixes, suffixed with a per subroutine counter.

pub const IF_TRUE: &str = "IF_TRUE";
pub const IF_FALSE: &str = "IF_FALSE";
pub const IF_END: &str = "IF_END";
pub const WHILE_EXP: &str = "WHILE_EXP";
pub const WHILE_END: &str = "WHILE_END";
