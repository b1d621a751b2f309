//! Open-mode flags for database sessions, combinable with bitwise OR.

pub mod open {
    pub const READONLY: i32 = 0x1;
    pub const READWRITE: i32 = 0x2;
    pub const CREATE: i32 = 0x4;
}
