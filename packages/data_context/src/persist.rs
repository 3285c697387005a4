use crate::RawRecord;

/// A model that a [`DataContext`][crate::DataContext] can track and persist.
///
/// The identifier is not part of the record. It is the key the record is stored under and is
/// handed back through [`set_id()`][Self::set_id] after [`from_record()`][Self::from_record].
///
/// # Example
///
/// ```rust
/// use data_context::{Persist, RawRecord};
///
/// struct Note {
///     id: Option<String>,
///     text: String,
/// }
///
/// impl Persist for Note {
///     fn id(&self) -> Option<&str> {
///         self.id.as_deref()
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = Some(id);
///     }
///
///     fn to_record(&self) -> RawRecord {
///         RawRecord::from([("text".to_string(), self.text.clone())])
///     }
///
///     fn from_record(record: &RawRecord) -> Result<Self, String> {
///         let text = record.get("text").ok_or("field 'text' is missing")?;
///
///         Ok(Self {
///             id: None,
///             text: text.clone(),
///         })
///     }
/// }
/// ```
pub trait Persist: Sized {
    /// The identifier of the model, if one was assigned.
    fn id(&self) -> Option<&str>;

    /// Assigns the identifier of the model.
    fn set_id(&mut self, id: String);

    /// Encodes the model's fields.
    fn to_record(&self) -> RawRecord;

    /// Decodes a model from its fields.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the record does not describe a valid model.
    fn from_record(record: &RawRecord) -> Result<Self, String>;
}
