// Call context - the authenticated envelope of one operation

use crate::event::Event;
use crate::identity::AccountId;
use crate::types::Timestamp;

/// Caller identity, supplied time and event sink for a single operation.
///
/// Components never read a clock and never emit events on their own; both
/// flow through the `Call` they were invoked with. A component calling into
/// another one re-enters it with [`Call::as_caller`], which keeps the same
/// `now` and the same event sink so the whole operation stays one unit.
pub struct Call<'a> {
    caller: AccountId,
    now: Timestamp,
    events: &'a mut Vec<Event>,
}

impl<'a> Call<'a> {
    pub fn new(caller: AccountId, now: Timestamp, events: &'a mut Vec<Event>) -> Self {
        Self { caller, now, events }
    }

    /// The identity this operation was authenticated as
    pub fn caller(&self) -> AccountId {
        self.caller
    }

    /// The time supplied with this operation
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Queue a domain event
    pub fn emit(&mut self, event: Event) {
        tracing::trace!(event = event.name(), "event emitted");
        self.events.push(event);
    }

    /// Continue the same operation on behalf of another identity
    pub fn as_caller(&mut self, caller: AccountId) -> Call<'_> {
        Call {
            caller,
            now: self.now,
            events: &mut *self.events,
        }
    }
}
