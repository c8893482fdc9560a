//! Reloads the config file when it changes on disk and hands the result to
//! the reactor.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::reactor;
use crate::common::config::Config;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct ConfigWatcher {
    file: PathBuf,
    reactor_tx: reactor::Sender,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, reactor_tx: reactor::Sender) -> Self { Self { file, reactor_tx } }

    pub fn spawn(self) -> std::io::Result<()> {
        thread::Builder::new().name("config-watcher".to_string()).spawn(move || {
            if let Err(e) = self.run() {
                warn!("config-watcher: error: {e:?}");
            }
        })?;
        Ok(())
    }

    fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default().with_poll_interval(POLL_INTERVAL).with_compare_contents(true),
        )?;
        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;
        info!("watching {:?}", self.file);

        while let Some(res) = rx.blocking_recv() {
            match res {
                Ok(event) if self.is_relevant(&event) => {
                    debug!("change detected: {:?}", event.kind);
                    if !self.reload() {
                        break;
                    }
                }
                Ok(event) => debug!("ignoring unrelated event: {:?}", event.kind),
                Err(e) => warn!("watch error: {e:?}"),
            }
        }
        info!("config watcher stopped");
        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    /// Re-reads the file and forwards it. A file that fails to parse is
    /// reported and otherwise ignored; a removed file means defaults.
    /// Returns false once the reactor is gone.
    fn reload(&self) -> bool {
        let config = match Config::read_or_default(&self.file) {
            Ok(config) => config,
            Err(e) => {
                warn!("keeping current config, {:?} failed to load: {e:#}", self.file);
                return !self.reactor_tx.is_closed();
            }
        };
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        info!("config reloaded");
        self.reactor_tx.try_send(reactor::Event::ConfigChanged(Box::new(config))).is_ok()
    }
}
