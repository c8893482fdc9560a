use tracing::{debug, info, warn};

use crate::actor::catalog;
use crate::actor::reactor::{Reactor, ViewEvent};
use crate::actor::reactor::events::drawer::DrawerEventHandler;
use crate::common::config::Config;
use crate::gesture::GestureConfig;
use crate::layout_engine::LayoutCommand;

pub struct SystemEventHandler;

impl SystemEventHandler {
    /// Uninstall: every icon of the package goes, and so does its badge.
    pub fn handle_package_removed(reactor: &mut Reactor, package: String) {
        let response = reactor.apply_layout(LayoutCommand::RemovePackage(package.clone()));
        debug!(package, removed = response.removed.len(), "package removed");
        reactor.badges.clear(&package);
        if reactor.drawer.remove_package(&package) {
            DrawerEventHandler::refresh(reactor);
        }
    }

    pub fn handle_config_changed(reactor: &mut Reactor, mut config: Config) {
        let fixes = config.auto_fix_values();
        if fixes > 0 {
            warn!(fixes, "config had invalid values, using defaults for them");
        }
        let old = std::mem::replace(&mut reactor.config, config).settings;
        let new = reactor.config.settings.clone();

        if new.gestures != old.gestures {
            reactor.recognizer.set_config(GestureConfig::from_settings(&new.gestures));
        }
        if new.home != old.home {
            let response = reactor.apply_layout(LayoutCommand::SetGrid(new.home));
            if !response.changed_pages.contains(&reactor.current_page) {
                reactor.emit(ViewEvent::RefreshPage(reactor.current_page));
            }
            info!(
                columns = new.home.columns,
                rows = new.home.rows,
                outside = response.out_of_bounds.len(),
                "home grid changed"
            );
        }
        if new.drawer != old.drawer {
            reactor.emit(ViewEvent::DrawerGridChanged(new.drawer));
        }
        if new.badges != old.badges {
            DrawerEventHandler::refresh(reactor);
        }
    }

    pub fn handle_shutdown(reactor: &mut Reactor) {
        if reactor.pending_save {
            reactor.persist();
        }
        reactor.badges.clear_all();
        if let Some(tx) = reactor.catalog_tx.take() {
            tx.send(catalog::Request::Stop);
        }
        info!("shutdown");
    }
}
