/// Anything that travels over the backend connection.
pub trait Message: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable message kind used in logs (e.g. "inventory.updates").
    fn kind(&self) -> &'static str;
}
