//! Session setup: login and navigation to the usage-history page
//!
//! Every failure here is fatal for the run. Nothing can be extracted without
//! an authenticated session sitting on the usage-history view.

use crate::config::{PortalConfig, TimeoutConfig};
use crate::page::{ClickOutcome, Locator, PageProvider};
use crate::portal::layout::{
    LOGIN_PASSWORD_SELECTOR, LOGIN_SUBMIT_SELECTOR, LOGIN_USERNAME_SELECTOR, MY_BILL_SELECTOR,
    USAGE_HISTORY_LINK_TEXT, YEARLY_CONTAINER,
};
use crate::traversal::Paginator;
use crate::DrillError;

/// Logs into the customer portal
///
/// Credentials are handed to the form as opaque strings.
pub async fn login(
    page: &mut dyn PageProvider,
    portal: &PortalConfig,
    timeouts: &TimeoutConfig,
) -> Result<(), DrillError> {
    let fail = |reason: String| DrillError::Login(reason);

    tracing::info!("Navigating to the login page...");
    page.navigate(&portal.login_url)
        .await
        .map_err(|e| fail(format!("could not open {}: {}", portal.login_url, e)))?;

    let username_field = Locator::css(LOGIN_USERNAME_SELECTOR);
    let present = page
        .wait_for(&username_field, timeouts.login())
        .await
        .map_err(|e| fail(e.to_string()))?;
    if !present {
        return Err(fail(format!(
            "login form did not appear within {:?}",
            timeouts.login()
        )));
    }

    tracing::info!("Entering credentials...");
    page.type_text(&username_field, &portal.username)
        .await
        .map_err(|e| fail(e.to_string()))?;
    page.type_text(&Locator::css(LOGIN_PASSWORD_SELECTOR), &portal.password)
        .await
        .map_err(|e| fail(e.to_string()))?;

    let outcome = page
        .find_and_click(&Locator::css(LOGIN_SUBMIT_SELECTOR), timeouts.element())
        .await
        .map_err(|e| fail(e.to_string()))?;
    if outcome != ClickOutcome::Clicked {
        return Err(fail(format!("sign-in button {:?}", outcome)));
    }

    page.wait_until_loaded()
        .await
        .map_err(|e| fail(e.to_string()))?;

    tracing::info!("Signed in");
    Ok(())
}

/// Walks from the landing page to the usage-history view
///
/// My Bill → reveal all bills → Usage History → wait for the yearly container.
pub async fn open_usage_history(
    page: &mut dyn PageProvider,
    timeouts: &TimeoutConfig,
    paginator: &Paginator,
) -> Result<(), DrillError> {
    let fail = |reason: String| DrillError::Navigation(reason);

    let my_bill = Locator::css(MY_BILL_SELECTOR);
    click_through(page, &my_bill, timeouts)
        .await
        .map_err(fail)?;

    if let Err(reason) = paginator.exhaust(page).await {
        tracing::warn!("Bill list not fully revealed: {}", reason);
    }

    let usage_history = Locator::link_text(USAGE_HISTORY_LINK_TEXT);
    click_through(page, &usage_history, timeouts)
        .await
        .map_err(fail)?;

    let yearly = Locator::css(format!("#{}", YEARLY_CONTAINER));
    let present = page
        .wait_for(&yearly, timeouts.element())
        .await
        .map_err(|e| fail(e.to_string()))?;
    if !present {
        return Err(fail(format!(
            "{} did not appear within {:?}",
            yearly,
            timeouts.element()
        )));
    }

    tracing::info!("Usage history loaded");
    Ok(())
}

/// Waits for a link, clicks it and waits for the next page to load
async fn click_through(
    page: &mut dyn PageProvider,
    locator: &Locator,
    timeouts: &TimeoutConfig,
) -> Result<(), String> {
    tracing::info!("Opening {}", locator);

    let present = page
        .wait_for(locator, timeouts.element())
        .await
        .map_err(|e| e.to_string())?;
    if !present {
        return Err(format!(
            "{} did not appear within {:?}",
            locator,
            timeouts.element()
        ));
    }

    match page
        .find_and_click(locator, timeouts.element())
        .await
        .map_err(|e| e.to_string())?
    {
        ClickOutcome::Clicked => {}
        outcome => return Err(format!("{} could not be clicked: {:?}", locator, outcome)),
    }

    page.wait_until_loaded().await.map_err(|e| e.to_string())
}
