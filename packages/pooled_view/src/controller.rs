//! Routing of input commands through the currently active interactive targets.
//!
//! A [`Controller`] holds up to one target per [`Slot`]. A command is offered to the innermost
//! occupied slot first ([`Slot::Focus`]) and then outwards to [`Slot::Root`], until a target
//! accepts it or a target that declined it stops propagation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

/// A target that can receive commands from a [`Controller`].
#[cfg_attr(test, mockall::automock(type Command = String;))]
pub trait Interactive {
    /// The command type routed to this target.
    type Command;

    /// Handles `command`. Returns `true` if the command was accepted.
    fn handle(&mut self, command: &Self::Command) -> bool;

    /// Whether a declined command must not be offered to outer slots.
    fn stops_propagation(&self) -> bool {
        false
    }

    /// Called when the target is placed into a slot of a controller.
    fn on_active(&mut self) {}

    /// Called when the target is removed from or replaced in a slot of a controller.
    fn on_inactive(&mut self) {}
}

/// A shared, mutable handle to an interactive target.
pub type Target<C> = Rc<RefCell<dyn Interactive<Command = C>>>;

/// The slots of a [`Controller`], innermost first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the routing order is defined over exactly these slots"
)]
pub enum Slot {
    /// The focused element.
    Focus,

    /// The region containing the focused element.
    Region,

    /// The page containing the region.
    Page,

    /// The application as a whole.
    Root,
}

impl Slot {
    /// Every slot, in the order in which commands are offered.
    pub const ALL: [Self; 4] = [Self::Focus, Self::Region, Self::Page, Self::Root];

    const fn position(self) -> usize {
        self as usize
    }
}

/// Routes commands through up to four active targets, innermost first.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use pooled_view::{Controller, Interactive, Slot};
///
/// struct Quit {
///     requested: bool,
/// }
///
/// impl Interactive for Quit {
///     type Command = &'static str;
///
///     fn handle(&mut self, command: &&'static str) -> bool {
///         self.requested = *command == "quit";
///         self.requested
///     }
/// }
///
/// let quit = Rc::new(RefCell::new(Quit { requested: false }));
///
/// let mut controller = Controller::new();
/// controller.set(Slot::Root, quit.clone());
///
/// assert_eq!(controller.dispatch(&"quit"), Some(Slot::Root));
/// assert!(quit.borrow().requested);
/// ```
pub struct Controller<C> {
    slots: [Option<Target<C>>; 4],
}

impl<C> Controller<C> {
    /// Creates a controller with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }

    /// Places `target` into `slot` and activates it. The previous occupant is deactivated and
    /// returned.
    ///
    /// Placing the current occupant into its own slot again does nothing and returns `None`.
    pub fn set(&mut self, slot: Slot, target: Target<C>) -> Option<Target<C>> {
        if self
            .slot(slot)
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &target))
        {
            return None;
        }

        let previous = self.take(slot);

        target.borrow_mut().on_active();
        *self.slot_mut(slot) = Some(target);

        debug!(?slot, "controller slot assigned");
        previous
    }

    /// Empties `slot`, deactivating and returning its occupant.
    pub fn take(&mut self, slot: Slot) -> Option<Target<C>> {
        let previous = self.slot_mut(slot).take();

        if let Some(previous) = &previous {
            previous.borrow_mut().on_inactive();
        }

        previous
    }

    /// The occupant of `slot`.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&Target<C>> {
        self.slot(slot).as_ref()
    }

    /// Offers `command` to the occupied slots from innermost to outermost.
    ///
    /// Returns the slot whose target accepted the command, or `None` if no target accepted it
    /// before the command ran out of slots or was stopped.
    ///
    /// # Panics
    ///
    /// Each target is mutably borrowed while it handles the command. A handler that dispatches
    /// again through this controller panics if the nested dispatch reaches the target that is
    /// still handling the outer command, e.g. because it occupies an inner slot.
    pub fn dispatch(&self, command: &C) -> Option<Slot> {
        for slot in Slot::ALL {
            let Some(target) = self.slot(slot) else {
                continue;
            };

            let mut target = target.borrow_mut();

            if target.handle(command) {
                trace!(?slot, "command accepted");
                return Some(slot);
            }

            if target.stops_propagation() {
                trace!(?slot, "command stopped");
                return None;
            }
        }

        None
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "there is exactly one entry per Slot"
    )]
    fn slot(&self, slot: Slot) -> &Option<Target<C>> {
        &self.slots[slot.position()]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "there is exactly one entry per Slot"
    )]
    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Target<C>> {
        &mut self.slots[slot.position()]
    }
}

impl<C> Default for Controller<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Controller<C> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = Slot::ALL
            .iter()
            .filter(|slot| self.slot(**slot).is_some())
            .collect::<Vec<_>>();

        f.debug_struct("Controller")
            .field("occupied", &occupied)
            .finish()
    }
}
