//! Runs package-lister queries off the interaction thread.
//!
//! Requests are stamped with a generation by the reactor. When several are
//! queued the worker only answers the newest one; the reactor in turn drops
//! any answer that is not for the generation it last issued.

use std::sync::Arc;
use std::thread;

use tracing::{debug, info, trace};

use crate::actor::{self, reactor};
use crate::catalog::{PackageLister, resolve};
use crate::common::log::trace_misc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Query { generation: u64 },
    Stop,
}

pub type Sender = actor::Sender<Request>;
pub type Receiver = actor::Receiver<Request>;

pub struct CatalogWorker {
    lister: Arc<dyn PackageLister>,
    reactor_tx: reactor::Sender,
}

impl CatalogWorker {
    pub fn new(lister: Arc<dyn PackageLister>, reactor_tx: reactor::Sender) -> Self {
        Self { lister, reactor_tx }
    }

    pub fn spawn(self) -> std::io::Result<Sender> {
        let (tx, rx) = actor::channel();
        thread::Builder::new()
            .name("catalog-worker".to_string())
            .spawn(move || self.run(rx))?;
        Ok(tx)
    }

    /// Takes the next request, skipping over any that were superseded while
    /// the previous query ran.
    fn next_request(requests: &mut Receiver) -> Option<(tracing::Span, Request)> {
        let (mut span, mut request) = requests.blocking_recv()?;
        while let Ok((next_span, next)) = requests.try_recv() {
            if let Request::Query { generation } = request {
                trace!(generation, "query superseded");
            }
            span = next_span;
            request = next;
            if request == Request::Stop {
                break;
            }
        }
        Some((span, request))
    }

    pub fn run(self, mut requests: Receiver) {
        while let Some((span, request)) = Self::next_request(&mut requests) {
            let _guard = span.enter();
            match request {
                Request::Query { generation } => self.query(generation),
                Request::Stop => break,
            }
        }
        info!("catalog worker stopped");
    }

    fn query(&self, generation: u64) {
        let raw = trace_misc("list_launchable_apps", || self.lister.list_launchable_apps());
        let total = raw.len();
        let entries = resolve(raw);
        debug!(generation, total, resolved = entries.len(), "catalog query finished");
        self.reactor_tx.send(reactor::Event::CatalogLoaded { generation, entries });
    }
}
