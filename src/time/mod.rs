//! Time handling: clock sources and simulation support.

pub mod source;
