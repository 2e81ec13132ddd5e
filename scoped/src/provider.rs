//! The resource capability contract.

/// A resource with a setup hook and a teardown hook.
///
/// `enter` produces the value the work operates on. `exit` always runs
/// afterwards and receives that value (`None` when `enter` itself failed)
/// together with the failure raised by `enter` or the work, if any.
///
/// The boolean returned by `exit` decides what happens to that failure:
/// `true` suppresses it, `false` lets it propagate to the caller unchanged.
/// With no failure in flight the boolean has no effect. An `Err` returned by
/// `exit` is its own failure and propagates as-is, replacing any failure
/// that was in flight.
///
/// # Example
///
/// ```rust
/// use scoped::ResourceProvider;
///
/// struct Scratch {
///     cleaned: bool,
/// }
///
/// impl ResourceProvider for Scratch {
///     type Value = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn enter(&mut self) -> Result<Vec<u8>, std::io::Error> {
///         Ok(Vec::with_capacity(64))
///     }
///
///     fn exit(
///         &mut self,
///         _buffer: Option<Vec<u8>>,
///         _error: Option<&std::io::Error>,
///     ) -> Result<bool, std::io::Error> {
///         self.cleaned = true;
///         Ok(false)
///     }
/// }
/// ```
pub trait ResourceProvider {
    /// Value produced by `enter` and lent to the work.
    type Value;

    /// Failure type of `enter`, the work, and `exit`.
    type Error;

    /// Set the resource up.
    fn enter(&mut self) -> Result<Self::Value, Self::Error>;

    /// Tear the resource down and decide whether `error` is suppressed.
    fn exit(
        &mut self,
        value: Option<Self::Value>,
        error: Option<&Self::Error>,
    ) -> Result<bool, Self::Error>;
}

impl<P> ResourceProvider for &mut P
where
    P: ResourceProvider + ?Sized,
{
    type Value = P::Value;
    type Error = P::Error;

    fn enter(&mut self) -> Result<Self::Value, Self::Error> {
        (**self).enter()
    }

    fn exit(
        &mut self,
        value: Option<Self::Value>,
        error: Option<&Self::Error>,
    ) -> Result<bool, Self::Error> {
        (**self).exit(value, error)
    }
}
