// src/utils/mod.rs
mod string_encoding;
mod endian;
mod number_format;

pub(crate) use string_encoding::*;
pub(crate) use endian::*;
pub(crate) use number_format::*;
