use crate::planning::event::Event;

/// Persistence collaborator for canonical Event records. The service never
/// touches a backing store directly, so tests can run against the in-memory
/// implementation while the daemon runs against SQLite.
pub trait EventStore {
    fn insert(&mut self, event: &Event) -> anyhow::Result<()>;
    fn update(&mut self, event: &Event) -> anyhow::Result<()>;
    fn delete(&mut self, id: &str) -> anyhow::Result<bool>;
    fn get(&self, id: &str) -> anyhow::Result<Option<Event>>;
    fn all(&self) -> anyhow::Result<Vec<Event>>;
}

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: Vec<Event>,
}

#[allow(dead_code)]
impl MemoryEventStore {
    pub fn new() -> Self {
        MemoryEventStore::default()
    }
}

impl EventStore for MemoryEventStore {
    fn insert(&mut self, event: &Event) -> anyhow::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn update(&mut self, event: &Event) -> anyhow::Result<()> {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(())
            }
            None => Err(anyhow::anyhow!("no event with id {}", event.id)),
        }
    }

    fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        Ok(self.events.len() < before)
    }

    fn get(&self, id: &str) -> anyhow::Result<Option<Event>> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    fn all(&self) -> anyhow::Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}
