/// Config for a registration
/// ## Fields
/// - `cache_provides`:
///   If `true`, the instance provided by the factory will be cached on first resolution and reused
///   for the lifetime of the container.
///   If `false`, the factory is called on every request and nothing is cached.
///
///   This does **not** affect the dependencies of the instance.
///   They are cached or not according to their own registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn transient() -> Self {
        Self { cache_provides: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { cache_provides: true }
    }
}
