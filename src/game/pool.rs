use std::marker::PhantomData;

// Fixed-capacity arena with free-slot reuse. Callers only ever see opaque
// handles; a handle goes stale the moment its slot is freed, and stale
// lookups return None instead of aliasing the slot's next occupant.
pub struct Handle<T> {
    index: u16,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u16>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> Pool<T> {
        assert!(capacity <= u16::MAX as usize, "pool capacity out of range");
        Pool {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Hands the value back when every slot is live.
    pub fn insert(&mut self, value: T) -> Result<Handle<T>, T> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Ok(Handle {
                index,
                generation: slot.generation,
                _marker: PhantomData,
            });
        }
        if self.slots.len() < self.capacity {
            let index = self.slots.len() as u16;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            return Ok(Handle {
                index,
                generation: 0,
                _marker: PhantomData,
            });
        }
        Err(value)
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(value)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }
}
