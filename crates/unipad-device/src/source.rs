use crate::channel::EventSender;
use crate::ir::EventBatch;
use crate::types::DeviceInfo;

/// A physical input source that turns its native events into IR.
///
/// Implementations take `&self` so a source can be shared with the thread
/// that delivers its callbacks.
pub trait InputSource {
    /// Native event payload delivered by the platform.
    type Raw: ?Sized;

    fn info(&self) -> &DeviceInfo;

    /// Translate one native event into zero or more IR events.
    fn translate(&self, raw: &Self::Raw, out: &mut EventBatch);

    /// Translate and forward one native event to the ingress channel.
    fn feed(&self, raw: &Self::Raw, tx: &EventSender) {
        let mut batch = EventBatch::new();
        self.translate(raw, &mut batch);
        tx.send_batch(batch);
    }

    /// Announce the device.
    fn attach(&self, tx: &EventSender) {
        tx.connected(self.info().clone());
    }

    /// Announce removal. No events from this source follow it.
    fn detach(&self, tx: &EventSender) {
        tx.disconnected(self.info().id);
    }
}
