//! Export driver: runs the enabled passes independently

use crate::animation::{export_animation, AnimationSummary};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::host::Host;
use crate::puppet::{export_puppet, PuppetSummary};

/// Outcome of each pass; `None` when the pass was disabled
#[derive(Debug)]
pub struct ExportReport {
    pub puppet: Option<ExportResult<PuppetSummary>>,
    pub animation: Option<ExportResult<AnimationSummary>>,
}

impl ExportReport {
    /// True when no enabled pass failed
    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    /// `(pass name, error)` for every failed pass
    pub fn failures(&self) -> Vec<(&'static str, &ExportError)> {
        let puppet = self
            .puppet
            .as_ref()
            .and_then(|r| r.as_ref().err())
            .map(|e| ("puppet", e));
        let animation = self
            .animation
            .as_ref()
            .and_then(|r| r.as_ref().err())
            .map(|e| ("animation", e));
        puppet.into_iter().chain(animation).collect()
    }
}

/// Run the puppet pass and then the animation pass, as enabled.
///
/// A failing pass does not prevent the other from running.
pub fn run_export<H: Host>(host: &mut H, config: &ExportConfig) -> ExportReport {
    let puppet = config.puppet.enable.then(|| {
        tracing::info!("Exporting puppet -> {:?}", config.puppet.path);
        export_puppet(&*host, &config.puppet.path, &config.options)
    });
    if !config.puppet.enable {
        tracing::info!("Puppet export disabled");
    }

    let animation = config.animation.enable.then(|| {
        tracing::info!("Exporting animation -> {:?}", config.animation.path);
        export_animation(&mut *host, &config.animation.path)
    });
    if !config.animation.enable {
        tracing::info!("Animation export disabled");
    }

    let report = ExportReport { puppet, animation };
    for (pass, e) in report.failures() {
        tracing::error!("{} export failed: {}", pass, e);
    }
    report
}
