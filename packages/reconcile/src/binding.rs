use std::cell::{Cell, RefCell};
use std::rc::Rc;

use observable::{Observable, SubscriptionRegistry};
use tracing::debug;

use crate::{Edits, Result};

const SOURCE_SLOT: &str = "source";

/// One reconciliation pass: reads the source and edits the target.
pub(crate) type Pass<S, Tg> = Box<dyn Fn(&S, &Tg) -> Result<Edits>>;

/// Runs a pass whenever the source dispatches an event, until dropped.
///
/// The event handlers only hold weak references to the binding, so the binding is dropped
/// together with the reconciler that owns it and unbinds itself from the source at that point.
pub(crate) struct Binding<S, Tg>
where
    S: Observable,
{
    source: S,
    target: Tg,
    pass: Pass<S, Tg>,
    registry: RefCell<SubscriptionRegistry>,
    passes: Cell<usize>,
    total_edits: Cell<Edits>,
}

impl<S, Tg> Binding<S, Tg>
where
    S: Observable + 'static,
    Tg: 'static,
{
    /// Subscribes to every event kind of `source` and runs the first pass.
    pub(crate) fn attach(source: S, target: Tg, pass: Pass<S, Tg>) -> Result<Rc<Self>> {
        let binding = Rc::new(Self {
            source,
            target,
            pass,
            registry: RefCell::new(SubscriptionRegistry::new()),
            passes: Cell::new(0),
            total_edits: Cell::new(Edits::default()),
        });

        binding
            .registry
            .borrow_mut()
            .bind_all(SOURCE_SLOT, &binding.source, |_| {
                let weak = Rc::downgrade(&binding);

                Rc::new(move |_: &S::Event| {
                    if let Some(binding) = weak.upgrade() {
                        binding.run_for_event();
                    }
                })
            });

        debug!("reconciler attached");

        binding.run()?;
        Ok(binding)
    }
}

impl<S, Tg> Binding<S, Tg>
where
    S: Observable,
{
    pub(crate) fn run(&self) -> Result<Edits> {
        let edits = (self.pass)(&self.source, &self.target)?;

        self.passes.set(self.passes.get().saturating_add(1));

        let mut total = self.total_edits.get();
        total += edits;
        self.total_edits.set(total);

        Ok(edits)
    }

    fn run_for_event(&self) {
        if let Err(error) = self.run() {
            panic!("reconciliation triggered by a source event failed: {error}");
        }
    }

    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    pub(crate) fn target(&self) -> &Tg {
        &self.target
    }

    pub(crate) fn passes(&self) -> usize {
        self.passes.get()
    }

    pub(crate) fn total_edits(&self) -> Edits {
        self.total_edits.get()
    }
}

impl<S, Tg> Drop for Binding<S, Tg>
where
    S: Observable,
{
    fn drop(&mut self) {
        self.registry
            .get_mut()
            .unbind_all(SOURCE_SLOT, &self.source);

        debug!("reconciler detached");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use observable::{EventKind, ObservableList};

    use super::*;
    use crate::Error;

    #[test]
    fn failed_first_pass_unbinds() {
        let source = ObservableList::<u8>::new();

        let result = Binding::attach(
            source.clone(),
            (),
            Box::new(|_: &ObservableList<u8>, (): &()| {
                Err(Error::InvariantViolation { capability: "swap" })
            }),
        );

        assert!(matches!(result, Err(Error::InvariantViolation { .. })));
        assert_eq!(source.subscription_count(), 0);
    }

    #[test]
    fn every_event_kind_runs_a_pass() {
        let source = ObservableList::<u8>::new();

        let binding = Binding::attach(
            source.clone(),
            (),
            Box::new(|_: &ObservableList<u8>, (): &()| Ok(Edits::default())),
        )
        .unwrap();

        assert_eq!(source.subscription_count(), EventKind::COUNT);

        source.append(1);
        source.set(0, 2).unwrap();
        source.refresh();
        source.clear();

        assert_eq!(binding.passes(), 5);
    }

    #[test]
    #[should_panic(expected = "reconciliation triggered by a source event failed")]
    fn failed_event_pass_panics() {
        let source = ObservableList::<u8>::new();

        let _binding = Binding::attach(
            source.clone(),
            (),
            Box::new(|source: &ObservableList<u8>, (): &()| {
                if source.is_empty() {
                    Ok(Edits::default())
                } else {
                    Err(Error::InvariantViolation { capability: "swap" })
                }
            }),
        )
        .unwrap();

        source.append(1);
    }
}
