use microkernel_api::address::ActorId;
use microkernel_api::errors::WatchError;
use microkernel_api::types::{Fd, Interest};

/// One registered descriptor interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    pub fd: Fd,
    pub owner: ActorId,
    pub interest: Interest,
}

/// Fixed-capacity table of watched descriptors.
///
/// A descriptor may be watched by several actors; each (descriptor, owner)
/// pair occupies one slot, and re-watching updates the interest in place.
#[derive(Debug)]
pub struct WatchTable {
    entries: Vec<Option<Watch>>,
}

impl WatchTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn watch(&mut self, owner: ActorId, fd: Fd, interest: Interest) -> Result<(), WatchError> {
        if fd < 0 {
            return Err(WatchError::InvalidDescriptor(fd));
        }
        if interest.is_empty() {
            return Err(WatchError::EmptyInterest);
        }
        if let Some(existing) = self
            .entries
            .iter_mut()
            .flatten()
            .find(|w| w.fd == fd && w.owner == owner)
        {
            existing.interest = interest;
            return Ok(());
        }
        let capacity = self.capacity();
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.is_none())
            .ok_or(WatchError::TableFull { capacity })?;
        *slot = Some(Watch { fd, owner, interest });
        Ok(())
    }

    pub fn unwatch(&mut self, owner: ActorId, fd: Fd) -> Result<(), WatchError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| matches!(e, Some(w) if w.fd == fd && w.owner == owner))
            .ok_or(WatchError::NotWatched(fd))?;
        *slot = None;
        Ok(())
    }

    pub fn remove_owner(&mut self, owner: ActorId) -> usize {
        let mut removed = 0;
        for slot in self.entries.iter_mut() {
            if matches!(slot, Some(w) if w.owner == owner) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    pub fn get(&self, owner: ActorId, fd: Fd) -> Option<Interest> {
        self.iter()
            .find(|w| w.fd == fd && w.owner == owner)
            .map(|w| w.interest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watch> {
        self.entries.iter().flatten()
    }
}
