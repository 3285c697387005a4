/// A type whose instances can be handed out and taken back by a [`RecyclePool`][crate::RecyclePool].
///
/// The pool constructs new instances with [`create()`][Self::create] and revives released
/// instances with [`setup()`][Self::setup]. Before an instance is stored for reuse the pool calls
/// [`teardown()`][Self::teardown] on it.
///
/// Both hooks must be idempotent. After `teardown()` the instance must hold no references to
/// state owned by its previous user and its fields must be back at their default values.
///
/// # Example
///
/// ```rust
/// use recycle_pool::Recycle;
///
/// #[derive(Debug, Default)]
/// struct Label {
///     text: String,
/// }
///
/// impl Recycle for Label {
///     type Args = &'static str;
///
///     fn create(args: Self::Args) -> Self {
///         Self {
///             text: args.to_string(),
///         }
///     }
///
///     fn setup(&mut self, args: Self::Args) {
///         // Reuses the existing string buffer.
///         self.text.push_str(args);
///     }
///
///     fn teardown(&mut self) {
///         self.text.clear();
///     }
/// }
/// ```
pub trait Recycle: 'static {
    /// Initialization arguments accepted by both construction and setup.
    type Args: 'static;

    /// Constructs a brand new instance from the initialization arguments.
    fn create(args: Self::Args) -> Self;

    /// Prepares a previously recycled instance for use by a new owner.
    fn setup(&mut self, args: Self::Args);

    /// Resets the instance to a default, reference-free state.
    fn teardown(&mut self);
}
