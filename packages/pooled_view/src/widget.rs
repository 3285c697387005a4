use recycle_pool::Recycle;

/// A pooled widget that displays one model.
///
/// The widget is made from its model: [`Recycle::create()`] and [`Recycle::setup()`] receive
/// the model as their arguments and [`Recycle::teardown()`] must let go of it.
///
/// # Example
///
/// ```rust
/// use pooled_view::DataWidget;
/// use recycle_pool::Recycle;
///
/// struct Label {
///     text: Option<String>,
/// }
///
/// impl Recycle for Label {
///     type Args = String;
///
///     fn create(text: String) -> Self {
///         Self { text: Some(text) }
///     }
///
///     fn setup(&mut self, text: String) {
///         self.text = Some(text);
///     }
///
///     fn teardown(&mut self) {
///         self.text = None;
///     }
/// }
///
/// impl DataWidget<String> for Label {
///     fn model(&self) -> Option<&String> {
///         self.text.as_ref()
///     }
/// }
/// ```
pub trait DataWidget<M: 'static>: Recycle<Args = M> {
    /// The model currently displayed, or `None` while the widget sits in a pool.
    fn model(&self) -> Option<&M>;
}
