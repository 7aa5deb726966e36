//! Calendar event CRUD.

use std::sync::Arc;

use tracing::{debug, info};

use mission_core::{
    now_ms, CalendarEvent, CalendarPatch, CalendarQuery, CoreError, EventId, NewCalendarEvent,
};

use crate::service::WriteGuard;
use crate::store::Store;

/// Applies calendar operations as read-modify-write cycles over a [`Store`].
pub struct CalendarService {
    store: Arc<dyn Store<CalendarEvent>>,
    guard: WriteGuard,
}

impl CalendarService {
    /// Create a service whose mutations may overlap.
    pub fn new(store: Arc<dyn Store<CalendarEvent>>) -> Self {
        Self {
            store,
            guard: WriteGuard::disabled(),
        }
    }

    /// Run mutations one at a time.
    pub fn with_serialized_writes(mut self) -> Self {
        self.guard = WriteGuard::serialized();
        self
    }

    /// Events passing the query, in store order.
    pub async fn list(&self, query: &CalendarQuery) -> Result<Vec<CalendarEvent>, CoreError> {
        let mut events = self.store.load_all().await?;
        events.retain(|e| query.matches(e));
        Ok(events)
    }

    /// Create an event with a fresh id and append it.
    pub async fn create(&self, input: NewCalendarEvent) -> Result<CalendarEvent, CoreError> {
        let event = CalendarEvent::create(input, now_ms())?;

        let _guard = self.guard.enter().await;
        let mut events = self.store.load_all().await?;
        events.push(event.clone());
        self.store.replace_all(&events).await?;

        info!(event_id = %event.id, date = %event.date, "Calendar event created");
        Ok(event)
    }

    /// Merge a patch onto an existing event.
    pub async fn update(
        &self,
        id: &EventId,
        patch: CalendarPatch,
    ) -> Result<CalendarEvent, CoreError> {
        patch.validate()?;

        let _guard = self.guard.enter().await;
        let mut events = self.store.load_all().await?;
        let event = events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| CoreError::EventNotFound(id.to_string()))?;

        event.apply(patch, now_ms());
        let updated = event.clone();
        self.store.replace_all(&events).await?;

        debug!(event_id = %id, "Calendar event updated");
        Ok(updated)
    }

    /// Remove an event. Unknown ids succeed without touching the store.
    pub async fn delete(&self, id: &EventId) -> Result<(), CoreError> {
        let _guard = self.guard.enter().await;
        let mut events = self.store.load_all().await?;
        let before = events.len();
        events.retain(|e| &e.id != id);

        if events.len() != before {
            self.store.replace_all(&events).await?;
            info!(event_id = %id, "Calendar event deleted");
        }
        Ok(())
    }
}
