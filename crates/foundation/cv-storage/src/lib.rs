//! Memoization substrate for lazy descriptor graphs
//!
//! Descriptor fields are computed on first read and then fixed for the rest
//! of the session. This crate supplies the building blocks:
//!
//! - [`LazyValue`]: a compute-once cell, safe under concurrent first access
//! - [`MemoizedFunction`]: one [`LazyValue`] per argument
//! - [`StorageManager`]: hands out cells and counts real computations per label
//!
//! Computations run outside of any lock, so computing one value may freely
//! read other cells. Reading a cell that the *same* thread is currently
//! computing is reported as [`StorageError::RecursionDetected`] instead of
//! deadlocking. Another thread reading that cell blocks until the value is
//! published.

pub mod error;
pub mod lazy;
pub mod manager;
pub mod memo;

pub use error::StorageError;
pub use lazy::LazyValue;
pub use manager::StorageManager;
pub use memo::MemoizedFunction;
