//! # WebSocket Message Handlers
//!
//! The connection and the subscriber registry live outside the SDK. This
//! module only turns one raw "unconfirmed added" message into a
//! [`Transaction`] and fans it out to the callbacks the registry holds for
//! an address. A callback returning `true` is done and gets unsubscribed.
//!
//! Errors never stop the socket loop: they go to an error channel and the
//! handler keeps the subscription alive.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use crate::identity::Address;
use crate::transaction::{map_transaction, Transaction, TransactionError};

/// Callback for an unconfirmed transaction. Returns `true` once it wants no
/// further messages.
pub type UnconfirmedAddedFn = Arc<dyn Fn(&Transaction) -> bool + Send + Sync>;

/// Failure reported by an external subscriber registry.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

/// The registry of callbacks per address. Callbacks are identified by
/// pointer, so the same `Arc` must be passed back to remove one.
pub trait UnconfirmedAddedSubscribers: Send + Sync {
    fn get_handlers(&self, address: &Address) -> Vec<UnconfirmedAddedFn>;

    fn has_handlers(&self, address: &Address) -> bool;

    /// Returns whether anything was removed.
    fn remove_handlers(
        &self,
        address: &Address,
        handlers: &[UnconfirmedAddedFn],
    ) -> Result<bool, SubscriberError>;
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unconfirmed added message: {0}")]
    Mapping(#[from] TransactionError),

    #[error("removing handler for {address}: {source}")]
    RemoveHandler {
        address: String,
        #[source]
        source: SubscriberError,
    },
}

/// Dispatches "unconfirmed added" messages to subscribed callbacks.
pub struct UnconfirmedAddedHandler<S> {
    subscribers: Arc<S>,
    errors: UnboundedSender<HandlerError>,
}

impl<S: UnconfirmedAddedSubscribers> UnconfirmedAddedHandler<S> {
    pub fn new(subscribers: Arc<S>, errors: UnboundedSender<HandlerError>) -> Self {
        Self {
            subscribers,
            errors,
        }
    }

    fn report(&self, err: HandlerError) {
        warn!(error = %err, "unconfirmed added handler error");
        if self.errors.send(err).is_err() {
            debug!("error channel closed, dropping handler error");
        }
    }

    /// Handles one message for `address`.
    ///
    /// Returns whether the address should stay subscribed. An undecodable
    /// message or an address without callbacks keeps the subscription.
    pub fn handle(&self, address: &Address, payload: &[u8]) -> bool {
        let tx = match serde_json::from_slice(payload)
            .map_err(TransactionError::from)
            .and_then(map_transaction)
        {
            Ok(tx) => tx,
            Err(e) => {
                self.report(HandlerError::Mapping(e));
                return true;
            }
        };

        let handlers = self.subscribers.get_handlers(address);
        if handlers.is_empty() {
            return true;
        }
        trace!(%address, handlers = handlers.len(), entity_type = %tx.entity_type(), "dispatching unconfirmed transaction");

        for handler in handlers {
            if !handler(&tx) {
                continue;
            }
            if let Err(source) = self.subscribers.remove_handlers(address, &[handler]) {
                self.report(HandlerError::RemoveHandler {
                    address: address.to_string(),
                    source,
                });
            }
        }

        self.subscribers.has_handlers(address)
    }
}
