//! Component identity.

/// Unique id assigned to every registered simulation component (handler).
///
/// Ids are dense and assigned in registration order, which lets the kernel use them directly as
/// indices into the handler table instead of hashing names on every dispatch.
pub type Id = u32;
