pub mod core;
pub mod error;
pub mod session;
pub mod top;

#[cfg(test)]
pub(crate) mod testing;
