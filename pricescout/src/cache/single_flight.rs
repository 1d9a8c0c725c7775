use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The task behind a flight panicked or was cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightAborted(pub String);

pub type FlightFuture<T> = Shared<BoxFuture<'static, Result<T, FlightAborted>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// This caller started the work.
    Leader,
    /// This caller joined work already in progress.
    Follower,
}

/// What [`SingleFlight::start_or_join`] did with the offered work.
pub enum Launch<T: Clone> {
    Started(FlightFuture<T>),
    Joined(FlightFuture<T>, BoxFuture<'static, T>),
}

struct Flight<T: Clone> {
    id: u64,
    future: FlightFuture<T>,
}

/// Deduplicates concurrent work per key.
///
/// The work runs on its own task, so it completes even if every caller
/// stops waiting. The key is released when that task ends, including on panic.
pub struct SingleFlight<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    flights: Arc<DashMap<K, Flight<T>>>,
    next_id: AtomicU64,
}

impl<K, T> SingleFlight<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Join the flight for `key`, or start one with `start` if none is running.
    /// `start` is only invoked for the leader.
    pub fn join_or_start<F>(&self, key: K, start: F) -> (FlightFuture<T>, Role)
    where
        F: FnOnce() -> BoxFuture<'static, T>,
    {
        match self.flights.entry(key.clone()) {
            Entry::Occupied(occupied) => (occupied.get().future.clone(), Role::Follower),
            Entry::Vacant(vacant) => {
                let (future, id) = self.launch(key, start());
                vacant.insert(Flight {
                    id,
                    future: future.clone(),
                });
                (future, Role::Leader)
            }
        }
    }

    /// Like [`join_or_start`](Self::join_or_start) with work that already
    /// exists; a follower gets its unused work back.
    pub fn start_or_join(&self, key: K, work: BoxFuture<'static, T>) -> Launch<T> {
        match self.flights.entry(key.clone()) {
            Entry::Occupied(occupied) => Launch::Joined(occupied.get().future.clone(), work),
            Entry::Vacant(vacant) => {
                let (future, id) = self.launch(key, work);
                vacant.insert(Flight {
                    id,
                    future: future.clone(),
                });
                Launch::Started(future)
            }
        }
    }

    /// Spawn `work`; the caller registers the returned flight under `key`
    /// while it still holds the map entry.
    fn launch(&self, key: K, work: BoxFuture<'static, T>) -> (FlightFuture<T>, u64) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let landing = Landing {
            flights: self.flights.clone(),
            key,
            id,
        };

        let handle = tokio::spawn(async move {
            let _landing = landing;
            work.await
        });

        let future = async move {
            handle
                .await
                .map_err(|join_err| FlightAborted(join_err.to_string()))
        }
        .boxed()
        .shared();

        (future, id)
    }

    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.flights.contains_key(key)
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the key when the flight task finishes or unwinds.
struct Landing<K, T>
where
    K: Hash + Eq,
    T: Clone,
{
    flights: Arc<DashMap<K, Flight<T>>>,
    key: K,
    id: u64,
}

impl<K, T> Drop for Landing<K, T>
where
    K: Hash + Eq,
    T: Clone,
{
    fn drop(&mut self) {
        let id = self.id;
        self.flights.remove_if(&self.key, |_, flight| flight.id == id);
    }
}
