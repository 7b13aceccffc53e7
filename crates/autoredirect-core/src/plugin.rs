use crate::event::ContentSaveEvent;
use async_trait::async_trait;

/// Error surfaced to the host's save pipeline by a plugin.
pub type PluginError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What the host should do with the save after notifying a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Proceed,
    /// Veto the save. Available to other plugins sharing the contract; the
    /// redirect maintainer never returns it.
    Abort,
}

/// A type that reacts to content lifecycle notifications.
///
/// Hosts register implementations with their event dispatcher and call
/// [`ContentPlugin::on_content_before_save`] inline, before persisting.
#[async_trait]
pub trait ContentPlugin: Send + Sync + 'static {
    /// Called before content is saved. An `Err` is left for the host to
    /// handle, usually by failing the save.
    async fn on_content_before_save(
        &self,
        event: &ContentSaveEvent,
    ) -> Result<SaveDecision, PluginError>;
}
