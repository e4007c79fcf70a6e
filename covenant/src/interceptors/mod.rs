//! Interceptors wrapping contracted method calls.

mod chain;
mod wrapper;

pub use chain::CheckChain;
pub use wrapper::ContractWrapper;
