use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::Mutex;

/// Proof of which request a response belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    client: String,
    generation: u64,
}

impl GenerationTicket {
    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the newest in-flight browse request per client
///
/// Generations come from one process-wide counter, so they are strictly
/// increasing across clients as well as within one. A client's entry lives
/// only until its newest request completes.
#[derive(Default)]
pub struct RequestGenerations {
    counter: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request for `client`, superseding any in flight
    pub async fn issue(&self, client: &str) -> GenerationTicket {
        let mut latest = self.latest.lock().await;
        // Drawn under the lock so a client's entry only ever moves forward
        let generation = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        latest.insert(client.to_string(), generation);

        GenerationTicket {
            client: client.to_string(),
            generation,
        }
    }

    /// Finishes a request; `false` when a newer one was issued for its client
    ///
    /// Completing the newest request forgets the client.
    pub async fn complete(&self, ticket: &GenerationTicket) -> bool {
        let mut latest = self.latest.lock().await;
        if latest.get(&ticket.client).copied() != Some(ticket.generation) {
            return false;
        }
        latest.remove(&ticket.client);
        true
    }

    /// Clients with a request in flight
    #[cfg(test)]
    pub(crate) async fn in_flight(&self) -> usize {
        self.latest.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newer_ticket_supersedes_older() {
        let generations = RequestGenerations::new();

        let first = generations.issue("client-a").await;
        let second = generations.issue("client-a").await;

        assert!(second.generation() > first.generation());
        assert!(generations.complete(&second).await);
        assert!(!generations.complete(&first).await);
    }

    #[tokio::test]
    async fn test_older_ticket_stays_superseded_after_newer_completes() {
        let generations = RequestGenerations::new();

        let first = generations.issue("client-a").await;
        let second = generations.issue("client-a").await;
        assert!(generations.complete(&second).await);

        let third = generations.issue("client-a").await;
        assert!(!generations.complete(&first).await);
        assert!(generations.complete(&third).await);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let generations = RequestGenerations::new();

        let a = generations.issue("client-a").await;
        let b = generations.issue("client-b").await;

        assert!(generations.complete(&a).await);
        assert!(generations.complete(&b).await);
    }

    #[tokio::test]
    async fn test_completed_clients_are_forgotten() {
        let generations = RequestGenerations::new();

        for n in 0..100 {
            let ticket = generations.issue(&format!("client-{}", n)).await;
            generations.complete(&ticket).await;
        }
        assert_eq!(generations.in_flight().await, 0);

        let stale = generations.issue("client-a").await;
        let _newest = generations.issue("client-a").await;
        assert!(!generations.complete(&stale).await);
        assert_eq!(generations.in_flight().await, 1);
    }
}
