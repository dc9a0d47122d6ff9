use std::any::{type_name, Any, TypeId};
use std::fmt;

use atomic_refcell::{AtomicRef, AtomicRefCell, AtomicRefMut};
use indexmap::IndexMap;

use super::{System, SystemError, SystemLogic, SystemMut, SystemRef};
use crate::storage::IdHasher;

/// Storage for the systems of a registry, in registration order.
#[derive(Default)]
pub struct Systems {
    systems: IndexMap<TypeId, SystemBox, IdHasher>,
    /// Systems registered since the last update, which still need to be
    /// matched against every active entity.
    pending: Vec<TypeId>,
}

/// A registered logic value together with its system.
pub struct SystemSlot<S> {
    pub system: System,
    pub logic: S,
}

/// The untyped interface of a [`SystemSlot`].
trait ErasedSystem: Send + Sync + 'static {
    fn system(&self) -> &System;

    fn system_mut(&mut self) -> &mut System;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Storage for a single system.
#[repr(transparent)]
struct SystemBox {
    inner: AtomicRefCell<Box<dyn ErasedSystem>>,
}

impl Systems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the amount of systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn contains<S: SystemLogic>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// Registers a logic value, letting it declare its requirements.
    ///
    /// The new system starts out empty and is queued for matching.
    pub fn insert<S: SystemLogic>(&mut self, logic: S) -> Result<(), SystemError> {
        let key = TypeId::of::<S>();

        if self.systems.contains_key(&key) {
            return Err(SystemError::AlreadyRegistered(type_name::<S>()));
        }

        let mut system = System::new();

        logic.require(&mut system)?;

        self.systems.insert(key, SystemBox::new(SystemSlot { system, logic }));
        self.pending.push(key);

        Ok(())
    }

    /// Unregisters a logic value and returns it.
    pub fn remove<S: SystemLogic>(&mut self) -> Result<S, SystemError> {
        let key = TypeId::of::<S>();
        let boxed = self
            .systems
            .shift_remove(&key)
            .ok_or(SystemError::not_found::<S>())?;

        self.pending.retain(|pending| *pending != key);

        // SAFETY: the system at the key of `S` is always a `SystemSlot<S>`
        Ok(unsafe { boxed.into_inner::<S>() }.logic)
    }

    pub fn get<S: SystemLogic>(&self) -> Result<SystemRef<'_, S>, SystemError> {
        self.systems
            .get(&TypeId::of::<S>())
            .ok_or(SystemError::not_found::<S>())
            // SAFETY: the system at the key of `S` is always a `SystemSlot<S>`
            .and_then(|boxed| unsafe { boxed.get() })
    }

    pub fn get_mut<S: SystemLogic>(
        &self,
    ) -> Result<SystemMut<'_, S>, SystemError> {
        self.systems
            .get(&TypeId::of::<S>())
            .ok_or(SystemError::not_found::<S>())
            // SAFETY: the system at the key of `S` is always a `SystemSlot<S>`
            .and_then(|boxed| unsafe { boxed.get_mut() })
    }

    /// Iterate mutably over every system in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut System> {
        self.systems
            .values_mut()
            .map(|boxed| boxed.inner.get_mut().system_mut())
    }

    /// Takes the systems registered since the last call.
    ///
    /// Yields nothing for systems that were removed in the meantime.
    pub fn drain_pending(&mut self) -> impl Iterator<Item = &mut System> {
        let pending = std::mem::take(&mut self.pending);

        self.systems
            .iter_mut()
            .filter(move |(key, _)| pending.contains(key))
            .map(|(_, boxed)| boxed.inner.get_mut().system_mut())
    }
}

impl SystemBox {
    fn new<S: SystemLogic>(slot: SystemSlot<S>) -> Self {
        Self { inner: AtomicRefCell::new(Box::new(slot)) }
    }

    /// ## Safety
    ///
    /// The system must be a `SystemSlot<S>`.
    unsafe fn get<S: SystemLogic>(&self) -> Result<SystemRef<'_, S>, SystemError> {
        self.inner
            .try_borrow()
            .map(|guard| {
                SystemRef::new(AtomicRef::map(guard, |boxed| unsafe {
                    boxed.as_any().downcast_ref().unwrap_unchecked()
                }))
            })
            .map_err(|_| SystemError::AlreadyBorrowed(type_name::<S>()))
    }

    /// ## Safety
    ///
    /// The system must be a `SystemSlot<S>`.
    unsafe fn get_mut<S: SystemLogic>(
        &self,
    ) -> Result<SystemMut<'_, S>, SystemError> {
        self.inner
            .try_borrow_mut()
            .map(|guard| {
                SystemMut::new(AtomicRefMut::map(guard, |boxed| unsafe {
                    boxed.as_any_mut().downcast_mut().unwrap_unchecked()
                }))
            })
            .map_err(|_| SystemError::AlreadyBorrowed(type_name::<S>()))
    }

    /// Consume the box and downcast to a specific slot type.
    ///
    /// # Safety
    ///
    /// The inner type must be `SystemSlot<S>`.
    unsafe fn into_inner<S: SystemLogic>(self) -> SystemSlot<S> {
        unsafe { *self.inner.into_inner().into_any().downcast().unwrap_unchecked() }
    }
}

impl<S: SystemLogic> ErasedSystem for SystemSlot<S> {
    fn system(&self) -> &System {
        &self.system
    }

    fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    fn type_name(&self) -> &'static str {
        type_name::<S>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ---

impl fmt::Debug for Systems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.systems.values()).finish()
    }
}

impl fmt::Debug for SystemBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(slot) => f
                .debug_struct("System")
                .field("logic", &slot.type_name())
                .field("signature", &slot.system().signature())
                .field("len", &slot.system().len())
                .finish(),
            Err(_) => f.write_str("System(<borrowed>)"),
        }
    }
}
