use crate::date::Clock;
use crate::hint::DEFAULT_HINT_DURATION;
use crate::picker::Picker;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Something that can show a transient hint on request
pub trait HintTarget {
    fn show_hint(&mut self, content: &str, duration: Duration);
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RegistryError {
    #[error("no picker registered under id {0:?}")]
    NotFound(String),
    #[error("picker {0:?} is busy and cannot take a hint right now")]
    Busy(String),
}

/// Pickers keyed by their configured id, so a host can reach one without
/// holding on to it
#[derive(Clone, Default)]
pub struct Registry {
    instances: HashMap<String, Rc<RefCell<dyn HintTarget>>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = self.instances.keys().collect::<Vec<_>>();
        ids.sort();
        f.debug_struct("Registry").field("ids", &ids).finish()
    }
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Register `instance` under `id`, replacing any previous holder.  An
    /// empty id registers nothing.
    pub fn register<T: HintTarget + 'static>(&mut self, id: &str, instance: Rc<RefCell<T>>) {
        if id.is_empty() {
            return;
        }
        let instance: Rc<RefCell<dyn HintTarget>> = instance;
        self.instances.insert(id.to_owned(), instance);
    }

    /// Remove the instance under `id`.  Removing an unknown id is not an
    /// error.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.instances.remove(id).is_some()
    }

    /// Activate `picker` and register it under its configured id, if it
    /// has one
    pub fn attach<C: Clock + 'static>(&mut self, picker: &Rc<RefCell<Picker<C>>>) {
        let id = {
            let mut p = picker.borrow_mut();
            p.activate();
            p.config().id.clone()
        };
        if let Some(id) = id {
            tracing::trace!(id = %id, "registering picker");
            self.register(&id, Rc::clone(picker));
        }
    }

    /// Deactivate `picker` and drop its registry entry.  An entry under the
    /// same id that belongs to another picker is left alone.
    pub fn detach<C: Clock + 'static>(&mut self, picker: &Rc<RefCell<Picker<C>>>) -> bool {
        let id = {
            let mut p = picker.borrow_mut();
            p.deactivate();
            p.config().id.clone()
        };
        let Some(id) = id else {
            return false;
        };
        let owned = self
            .instances
            .get(&id)
            .is_some_and(|instance| ptr::addr_eq(Rc::as_ptr(instance), Rc::as_ptr(picker)));
        owned && self.unregister(&id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Rc<RefCell<dyn HintTarget>>> {
        self.instances.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Ask the instance under `id` to show a hint, for `duration` or the
    /// default 3 seconds
    pub fn hint(
        &self,
        id: &str,
        content: &str,
        duration: Option<Duration>,
    ) -> Result<(), RegistryError> {
        let Some(instance) = self.instances.get(id) else {
            tracing::warn!(id, "hint requested for unregistered picker");
            return Err(RegistryError::NotFound(id.to_owned()));
        };
        let Ok(mut target) = instance.try_borrow_mut() else {
            tracing::warn!(id, "hint requested while picker is borrowed");
            return Err(RegistryError::Busy(id.to_owned()));
        };
        target.show_hint(content, duration.unwrap_or(DEFAULT_HINT_DURATION));
        Ok(())
    }
}
