pub mod constants;
pub mod geodesy;
pub mod error;
pub mod point;
pub mod track;
pub mod interpolate;
pub mod smoothing;
pub mod pairing;
pub mod separation;
pub mod input;
pub mod config;
pub mod output;

#[cfg(test)]
pub(crate) mod testing;
