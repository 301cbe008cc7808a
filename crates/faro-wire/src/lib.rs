//! FARO Wire - relay frame grammar
//!
//! Frames are flat JSON text objects, one logical frame per transport
//! message. The grammar is newline-independent; the compact encoding
//! contains no raw newlines, so line-delimited transports can carry it.

pub mod frame;

pub use frame::*;
