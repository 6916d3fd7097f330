//! "Show 6 More" pagination
//!
//! The portal reveals children six at a time. The paginator keeps activating
//! the trigger until it is gone, which is the normal way for a level to end.

use crate::config::Config;
use crate::page::{ClickOutcome, Locator, PageProvider};
use crate::portal::layout;
use crate::traversal::AbandonReason;
use std::time::Duration;

/// Repeatedly activates a "reveal more" trigger on the current view
#[derive(Debug, Clone)]
pub struct Paginator {
    trigger: Locator,
    max_reveals: u32,
    wait: Duration,
}

impl Paginator {
    pub fn new(trigger: Locator, max_reveals: u32, wait: Duration) -> Self {
        Self {
            trigger,
            max_reveals,
            wait,
        }
    }

    /// Paginator for the portal's show-more trigger with configured limits
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            layout::show_more(),
            config.traversal.max_show_more,
            config.timeouts.show_more(),
        )
    }

    /// Reveals everything at the current node
    ///
    /// Stops successfully once the trigger is missing, cannot be clicked, or
    /// the page fails to settle after a click. Returns the number of reveals.
    ///
    /// # Errors
    ///
    /// `AbandonReason::PaginationLimit` if the trigger is still present after
    /// `max_reveals` activations. The trigger is never activated more than
    /// `max_reveals` times.
    pub async fn exhaust(&self, page: &mut dyn PageProvider) -> Result<u32, AbandonReason> {
        let mut reveals = 0u32;

        loop {
            if reveals >= self.max_reveals {
                return match page.wait_for(&self.trigger, self.wait).await {
                    Ok(true) => {
                        tracing::warn!(
                            "'Show 6 More' still present after {} reveals, giving up on this view",
                            reveals
                        );
                        Err(AbandonReason::PaginationLimit(self.max_reveals))
                    }
                    Ok(false) => Ok(reveals),
                    Err(e) => {
                        tracing::debug!("Stopping pagination: {}", e);
                        Ok(reveals)
                    }
                };
            }

            match page.find_and_click(&self.trigger, self.wait).await {
                Ok(ClickOutcome::Clicked) => {
                    reveals += 1;
                    tracing::info!("Clicked 'Show 6 More' ({})", reveals);

                    if let Err(e) = page.wait_until_loaded().await {
                        tracing::debug!("Page did not settle after reveal: {}", e);
                        break;
                    }
                }
                Ok(ClickOutcome::NotFound) | Ok(ClickOutcome::NotInteractable) => {
                    tracing::info!("No more 'Show 6 More' buttons found.");
                    break;
                }
                Err(e) => {
                    tracing::debug!("Stopping pagination: {}", e);
                    break;
                }
            }
        }

        Ok(reveals)
    }
}
