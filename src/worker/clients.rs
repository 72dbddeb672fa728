// Allow dead code: registry methods for the full clients surface
#![allow(dead_code)]

use std::collections::HashMap;

use tracing::debug;
use url::Url;

/// A page under (or eligible for) this worker's control.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    pub url: Url,
    pub focused: bool,
    pub controlled: bool,
}

/// Registry of open clients.
///
/// Activation claims every client immediately instead of waiting for
/// navigation; notification clicks open (or re-focus) the app root here.
#[derive(Debug, Default)]
pub struct Clients {
    clients: HashMap<String, Client>,
    next_id: u64,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("client-{}", self.next_id)
    }

    /// Register an open page, initially uncontrolled.
    pub fn add(&mut self, url: Url) -> String {
        let id = self.allocate_id();
        self.clients.insert(
            id.clone(),
            Client {
                id: id.clone(),
                url,
                focused: false,
                controlled: false,
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Take control of every registered client.
    pub fn claim(&mut self) {
        for client in self.clients.values_mut() {
            client.controlled = true;
        }
        debug!(clients = self.clients.len(), "Claimed clients");
    }

    pub fn controlled_count(&self) -> usize {
        self.clients.values().filter(|c| c.controlled).count()
    }

    /// Open a window at `url`, focusing an existing client already there
    /// instead of adding a duplicate. Returns the client id.
    pub fn open_window(&mut self, url: &Url) -> String {
        for client in self.clients.values_mut() {
            client.focused = false;
        }

        if let Some(existing) = self.clients.values_mut().find(|c| &c.url == url) {
            existing.focused = true;
            return existing.id.clone();
        }

        let id = self.allocate_id();
        self.clients.insert(
            id.clone(),
            Client {
                id: id.clone(),
                url: url.clone(),
                focused: true,
                controlled: true,
            },
        );
        id
    }
}
