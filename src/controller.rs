//! Mediates between the presentation layer and the active exchange-rate source.

use crate::core::{Catalog, Conversion, ConfigValue, Source, SourceError};
use crate::providers::{SourceFactory, SourceKind};
use crate::store::{ConfigStore, Prompter};
use tracing::{debug, info, warn};

/// Callbacks through which results reach the presentation layer.
pub trait View {
    fn set_available_currencies(&mut self, index: usize, catalog: &Catalog);

    fn display_conversion(&mut self, conversion: &Conversion);

    fn set_status(&mut self, message: &str);
}

struct ActiveSource {
    kind: SourceKind,
    source: Box<dyn Source>,
}

pub struct Controller<V: View, P: Prompter> {
    factory: SourceFactory,
    store: ConfigStore<P>,
    view: V,
    active: Option<ActiveSource>,
}

async fn load_catalog(source: &mut dyn Source) -> Result<(usize, Catalog), SourceError> {
    source.config_changed().await?;
    source.available_currencies().await
}

impl<V: View, P: Prompter> Controller<V, P> {
    pub fn new(factory: SourceFactory, store: ConfigStore<P>, view: V) -> Self {
        Self {
            factory,
            store,
            view,
            active: None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &ConfigStore<P> {
        &self.store
    }

    pub fn active_source(&self) -> Option<SourceKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Switches to the first registered source.
    pub async fn reset(&mut self) {
        self.choose_source(SourceKind::first().name()).await;
    }

    /// Closes the current source and activates `name`. The view always
    /// receives a catalog, empty when the new source could not provide one.
    pub async fn choose_source(&mut self, name: &str) {
        self.close().await;

        let kind = match name.parse::<SourceKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(error = %e, "Cannot choose source");
                self.view.set_status("UnknownSource");
                self.view.set_available_currencies(0, &Catalog::new());
                return;
            }
        };
        info!("Choosing source {}", kind);

        let config = self.store.resolve(kind.name(), kind.options());
        let mut source = match self.factory.create(kind, config) {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "Failed to create source {}", kind);
                self.view.set_status(e.kind());
                self.view.set_available_currencies(0, &Catalog::new());
                return;
            }
        };

        let (index, catalog) = match load_catalog(source.as_mut()).await {
            Ok(available) => available,
            Err(e) => {
                warn!(error = %e, "Failed to load currencies from {}", kind);
                self.view.set_status(e.kind());
                (0, Catalog::new())
            }
        };
        debug!(index, currencies = catalog.len(), "Available currencies");
        self.view.set_available_currencies(index, &catalog);
        self.active = Some(ActiveSource { kind, source });
    }

    pub fn target_currency(&mut self, code: &str, active: bool) {
        if let Some(current) = self.active.as_mut() {
            if active {
                current.source.add_target_currency(code);
            } else {
                current.source.remove_target_currency(code);
            }
        }
    }

    pub fn source_currency(&mut self, code: &str) {
        if let Some(current) = self.active.as_mut() {
            current.source.source_currency(code);
        }
    }

    pub async fn convert(&mut self, amount: f64) {
        let Some(current) = self.active.as_mut() else {
            self.view.set_status("NoSource");
            return;
        };
        let conversion = current.source.convert(amount).await;
        debug!(label = %conversion.label, results = conversion.results.len(), "Converted {}", amount);
        self.view.display_conversion(&conversion);
    }

    /// Prompts again for one option of the active source, offering the
    /// current value, and lets the source reload.
    pub async fn reconfigure(&mut self, option: &str) {
        let Some(current) = self.active.as_mut() else {
            self.view.set_status("NoSource");
            return;
        };
        let Some(descriptor) = current.kind.option(option) else {
            warn!("Source {} has no option {}", current.kind, option);
            self.view.set_status("UnknownOption");
            return;
        };

        let default = current
            .source
            .config()
            .get(option)
            .and_then(ConfigValue::as_str)
            .unwrap_or(descriptor.default)
            .to_string();
        let Some(value) = self.store.configure(descriptor, &default) else {
            debug!("Reconfiguration of {} cancelled", option);
            return;
        };
        current.source.config_mut().insert(option.to_string(), value);

        match load_catalog(current.source.as_mut()).await {
            Ok((index, catalog)) => self.view.set_available_currencies(index, &catalog),
            Err(e) => {
                warn!(error = %e, "Failed to reload {}", current.kind);
                self.view.set_status(e.kind());
            }
        }
    }

    /// Persists the configuration of the active source and closes it.
    pub async fn close(&mut self) {
        if let Some(mut current) = self.active.take() {
            if let Err(e) = self.store.save(current.kind.name(), current.source.config()) {
                warn!(error = %e, "Failed to save configuration for {}", current.kind);
            }
            current.source.close().await;
            debug!("Closed source {}", current.kind);
        }
    }
}
