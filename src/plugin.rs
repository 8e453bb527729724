//! Plugin contract for declaring frozen data
//!
//! A dashboard is assembled from plugins. Plugins that need data frozen
//! into the portable store implement the [`FrozenDataRequirements`]
//! capability and return it from [`DashboardPlugin::frozen_data`]; plugins
//! without it are simply skipped during collection. A typed optional
//! capability, so no attribute probing or downcasting is involved.

use crate::error::IceboxResult;
use crate::store::{ArgMap, ProducerRegistry, RegistrationLedger};
use tracing::debug;

/// One producer plus the argument sets it must be frozen for
#[derive(Debug, Clone)]
pub struct FrozenCall {
    /// Module-qualified producer name
    pub function_identity: String,
    /// Every argument set the plugin will request at runtime
    pub argument_sets: Vec<ArgMap>,
}

impl FrozenCall {
    /// Create a frozen-call declaration
    pub fn new(function_identity: impl Into<String>, argument_sets: Vec<ArgMap>) -> Self {
        Self {
            function_identity: function_identity.into(),
            argument_sets,
        }
    }
}

/// Capability for plugins whose data must be frozen at build time
pub trait FrozenDataRequirements {
    /// Every call whose result the plugin reads in portable mode
    fn frozen_calls(&self) -> Vec<FrozenCall>;
}

/// A visualization plugin participating in the dashboard
///
/// Rendering, layout and callbacks live outside this crate; the only
/// concern here is whether the plugin declares frozen data.
pub trait DashboardPlugin {
    /// Plugin name, for logs and diagnostics
    fn name(&self) -> &str;

    /// The frozen-data capability, if the plugin needs any
    fn frozen_data(&self) -> Option<&dyn FrozenDataRequirements> {
        None
    }
}

/// Collect every plugin's frozen-call declarations into a ledger
///
/// Runs during single-threaded application startup, before the build step.
pub fn collect_registrations(
    plugins: &[Box<dyn DashboardPlugin>],
    ledger: &mut RegistrationLedger,
) -> IceboxResult<()> {
    for plugin in plugins {
        let Some(requirements) = plugin.frozen_data() else {
            debug!("Plugin '{}' declares no frozen data", plugin.name());
            continue;
        };

        let calls = requirements.frozen_calls();
        debug!(
            "Plugin '{}' declares {} frozen call(s)",
            plugin.name(),
            calls.len()
        );
        for call in calls {
            ledger.register(call.function_identity, call.argument_sets);
        }
    }
    Ok(())
}

/// A dashboard application as seen by the build and runtime steps
///
/// Embedding binaries construct an `App` with their plugins and producers
/// and hand it to the CLI dispatch; the bare `icebox` binary runs with an
/// empty one, which still supports building and inspecting stores.
#[derive(Default)]
pub struct App {
    plugins: Vec<Box<dyn DashboardPlugin>>,
    producers: ProducerRegistry,
}

impl App {
    /// Create an application with no plugins or producers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin instance
    pub fn with_plugin(mut self, plugin: impl DashboardPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Mutable access to the producer registry
    pub fn producers_mut(&mut self) -> &mut ProducerRegistry {
        &mut self.producers
    }

    /// The producer registry
    pub fn producers(&self) -> &ProducerRegistry {
        &self.producers
    }

    /// The active plugins
    pub fn plugins(&self) -> &[Box<dyn DashboardPlugin>] {
        &self.plugins
    }

    /// Collect frozen-data registrations from every active plugin
    pub fn collect_registrations(&self) -> IceboxResult<RegistrationLedger> {
        let mut ledger = RegistrationLedger::new();
        collect_registrations(&self.plugins, &mut ledger)?;
        Ok(ledger)
    }
}
