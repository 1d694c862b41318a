/// Wall clock in unix seconds. Injected so seat expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}
