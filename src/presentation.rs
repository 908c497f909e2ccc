//! Presentation collaborator
//!
//! The controller emits symbolic [`Notification`]s; the dispatcher wraps
//! each in a [`DisplayDirective`] with scroll parameters and hands it to a
//! [`Presenter`]. Banner text only exists on this side of the seam.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::controller::Notification;
use crate::error::{AmpswitchError, Result};
use crate::logging::{StructuredLogger, get_logger};

/// One scrolling banner request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayDirective {
    pub notification: Notification,
    pub repeat: u16,
    pub speed_ms: u16,
}

/// Receives directives in emission order
#[async_trait::async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, directive: DisplayDirective) -> Result<()>;
}

/// Banner text for a notification.
///
/// Leading blanks keep consecutive banners from running into each other
/// on the scrolling display.
pub const fn banner(notification: Notification) -> &'static str {
    match notification {
        Notification::SourceAc => "      GRID POWER",
        Notification::SourceDc => "      BATTERY POWER",
        Notification::LostAc => "      LOST AC",
        Notification::ManualEnter => "      MANUAL MODE",
        Notification::AutoEnter => "      AUTO MODE",
        Notification::Selling => "      SELLING POWER",
    }
}

/// Writes banners to the log instead of a display
pub struct BannerPresenter {
    logger: StructuredLogger,
}

impl BannerPresenter {
    pub fn new() -> Self {
        Self {
            logger: get_logger("display"),
        }
    }
}

impl Default for BannerPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Presenter for BannerPresenter {
    async fn present(&self, directive: DisplayDirective) -> Result<()> {
        self.logger.info(&format!(
            "{} (x{} @{}ms)",
            banner(directive.notification).trim_start(),
            directive.repeat,
            directive.speed_ms
        ));
        Ok(())
    }
}

/// Keeps every directive it receives; clones share the record
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    shown: Arc<Mutex<Vec<DisplayDirective>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directives(&self) -> Vec<DisplayDirective> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.directives().iter().map(|d| d.notification).collect()
    }

    /// Forget everything shown so far
    pub fn clear(&self) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.clear();
        }
    }
}

#[async_trait::async_trait]
impl Presenter for RecordingPresenter {
    async fn present(&self, directive: DisplayDirective) -> Result<()> {
        self.shown
            .lock()
            .map_err(|_| AmpswitchError::display("display record poisoned"))?
            .push(directive);
        Ok(())
    }
}
