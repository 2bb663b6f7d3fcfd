//! Command flows driven through the controller.

use super::terminal::TerminalView;
use crate::controller::Controller;
use crate::store::Prompter;
use anyhow::{Result, bail};
use tracing::debug;

async fn select<P: Prompter>(controller: &mut Controller<TerminalView, P>, source: Option<&str>) {
    match source {
        Some(name) => controller.choose_source(name).await,
        None => controller.reset().await,
    }
}

fn check_status<P: Prompter>(controller: &Controller<TerminalView, P>) -> Result<()> {
    if let Some(status) = controller.view().status() {
        bail!("Source unavailable: {status}");
    }
    Ok(())
}

/// Shows the catalog of `source`, or of the first registered source.
pub async fn currencies<P: Prompter>(
    controller: &mut Controller<TerminalView, P>,
    source: Option<&str>,
) -> Result<()> {
    select(controller, source).await;
    let result = check_status(controller);
    controller.close().await;
    result
}

/// Converts `amount` from `from` (or the source's default) into every code in `to`.
pub async fn convert<P: Prompter>(
    controller: &mut Controller<TerminalView, P>,
    source: Option<&str>,
    from: Option<&str>,
    to: &[String],
    amount: f64,
) -> Result<()> {
    select(controller, source).await;
    if let Err(e) = check_status(controller) {
        controller.close().await;
        return Err(e);
    }

    if let Some(from) = from {
        controller.source_currency(&from.to_uppercase());
    }
    for code in to {
        controller.target_currency(&code.to_uppercase(), true);
    }
    controller.convert(amount).await;
    controller.close().await;

    match controller.view().last_conversion() {
        Some(conversion) if conversion.results.is_empty() && !to.is_empty() => {
            bail!("Conversion failed: {}", conversion.label)
        }
        Some(conversion) => {
            debug!(label = %conversion.label, "Conversion displayed");
            Ok(())
        }
        None => bail!("No conversion was produced"),
    }
}

/// Prompts again for `option` of `source` and stores the answer.
pub async fn configure<P: Prompter>(
    controller: &mut Controller<TerminalView, P>,
    source: &str,
    option: &str,
) -> Result<()> {
    controller.choose_source(source).await;
    if controller.active_source().is_none() {
        return check_status(controller);
    }
    // A load failure here is what reconfiguring is meant to fix.
    controller.view_mut().take_status();
    controller.reconfigure(option).await;
    let result = check_status(controller);
    controller.close().await;
    result
}
