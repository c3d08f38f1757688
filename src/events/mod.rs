//! Lifecycle event hooks
//!
//! Hosts register callbacks against model lifecycle events; the save
//! workflow and any host code dispatch them in registration order. A
//! callback returning `Err` short-circuits the dispatch, which lets a
//! pre-persistence hook veto the operation.

use std::fmt;

use crate::core::Result;

/// Model lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    Retrieved,
    Creating,
    Created,
    Updating,
    Updated,
    Saving,
    Saved,
    Deleting,
    Deleted,
    Restoring,
    Restored,
}

impl fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieved => "retrieved",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Updating => "updating",
            Self::Updated => "updated",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::Restoring => "restoring",
            Self::Restored => "restored",
        };
        write!(f, "{}", name)
    }
}

type Hook<M> = Box<dyn Fn(&mut M) -> Result<()> + Send + Sync>;

/// Ordered registry of event callbacks for one model type.
pub struct EventHooks<M> {
    hooks: Vec<(ModelEvent, Hook<M>)>,
}

impl<M> EventHooks<M> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a callback for one event.
    pub fn on<F>(mut self, event: ModelEvent, hook: F) -> Self
    where
        F: Fn(&mut M) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.push((event, Box::new(hook)));
        self
    }

    /// Run the callbacks registered for `event` in registration order.
    /// Stops at the first `Err`.
    pub fn dispatch(&self, event: ModelEvent, model: &mut M) -> Result<()> {
        for (registered, hook) in &self.hooks {
            if *registered == event {
                hook(model)?;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<M> Default for EventHooks<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Doc {
        title: String,
    }

    #[test]
    fn test_dispatch_runs_in_registration_order() {
        let hooks = EventHooks::new()
            .on(ModelEvent::Saving, |doc: &mut Doc| {
                doc.title.push('a');
                Ok(())
            })
            .on(ModelEvent::Saving, |doc: &mut Doc| {
                doc.title.push('b');
                Ok(())
            })
            .on(ModelEvent::Saved, |doc: &mut Doc| {
                doc.title.push('!');
                Ok(())
            });

        let mut doc = Doc {
            title: String::new(),
        };
        hooks.dispatch(ModelEvent::Saving, &mut doc).unwrap();
        assert_eq!(doc.title, "ab");

        hooks.dispatch(ModelEvent::Saved, &mut doc).unwrap();
        assert_eq!(doc.title, "ab!");
    }

    #[test]
    fn test_failing_hook_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let hooks = EventHooks::new()
            .on(ModelEvent::Creating, |_: &mut Doc| {
                Err(ModelError::UnsupportedOperation("vetoed".into()))
            })
            .on(ModelEvent::Creating, move |_: &mut Doc| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let mut doc = Doc {
            title: String::new(),
        };
        assert!(hooks.dispatch(ModelEvent::Creating, &mut doc).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_event_is_noop() {
        let hooks: EventHooks<Doc> = EventHooks::new();
        let mut doc = Doc {
            title: "t".into(),
        };
        assert!(hooks.dispatch(ModelEvent::Deleted, &mut doc).is_ok());
    }
}
