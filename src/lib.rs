pub mod decode;
pub mod error;
pub mod memory;
pub mod ports;
pub mod program;
pub mod vm;
