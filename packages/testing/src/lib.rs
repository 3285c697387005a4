#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private fixtures for the tests of the collection, reconciler and view packages.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use observable::{Event, EventKind, Observable};
use pooled_view::DataWidget;
use recycle_pool::Recycle;

/// A model that is only ever compared by identity.
///
/// Two models with the same name are still different models, which is exactly what
/// reconciliation tests need to tell a retained item from a replacement.
#[derive(Debug)]
pub struct Model {
    name: String,
}

impl Model {
    /// Creates a new shared model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self { name: name.into() })
    }

    /// The name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Creates one model per name, in order.
#[must_use]
pub fn models(names: &[&str]) -> Vec<Rc<Model>> {
    names.iter().map(|name| Model::new(*name)).collect()
}

/// Names of `models`, in order. Makes assertions on model sequences readable.
#[must_use]
pub fn names(models: &[Rc<Model>]) -> Vec<String> {
    models.iter().map(|model| model.name().to_string()).collect()
}

/// A pooled widget that displays one [`Model`] and counts how often it was set up.
#[derive(Debug)]
pub struct Widget {
    model: Option<Rc<Model>>,
    setups: usize,
}

impl Widget {
    /// How many times this instance was given a model, including construction.
    #[must_use]
    pub fn setups(&self) -> usize {
        self.setups
    }
}

impl Recycle for Widget {
    type Args = Rc<Model>;

    fn create(model: Rc<Model>) -> Self {
        Self {
            model: Some(model),
            setups: 1,
        }
    }

    fn setup(&mut self, model: Rc<Model>) {
        self.model = Some(model);
        self.setups = self.setups.saturating_add(1);
    }

    fn teardown(&mut self) {
        self.model = None;
    }
}

impl DataWidget<Rc<Model>> for Widget {
    fn model(&self) -> Option<&Rc<Model>> {
        self.model.as_ref()
    }
}

/// Collects every event an [`Observable`] dispatches, of every kind, in dispatch order.
pub struct EventRecorder<E> {
    events: Rc<RefCell<Vec<E>>>,
}

impl<E> EventRecorder<E>
where
    E: Event + Clone + 'static,
{
    /// Subscribes to every event kind of `source`. The subscriptions last as long as the source.
    #[must_use]
    pub fn attach<O>(source: &O) -> Self
    where
        O: Observable<Event = E>,
    {
        let events = Rc::new(RefCell::new(Vec::new()));

        for kind in EventKind::ALL {
            let events = Rc::clone(&events);
            source.subscribe(
                kind,
                Rc::new(move |event: &E| events.borrow_mut().push(event.clone())),
            );
        }

        Self { events }
    }

    /// The events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    /// The kinds of the events recorded so far.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(Event::kind).collect()
    }

    /// Returns the recorded events and starts over with an empty record.
    #[must_use]
    pub fn take(&self) -> Vec<E> {
        self.events.take()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl<E: fmt::Debug> fmt::Debug for EventRecorder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecorder")
            .field("events", &self.events.borrow())
            .finish()
    }
}
