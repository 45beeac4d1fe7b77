pub mod expire_holds;
pub mod purge_idempotency;

pub use expire_holds::expire_unpaid_holds;
pub use purge_idempotency::purge_idempotency_keys;
