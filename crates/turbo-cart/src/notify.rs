//! User-facing outcome notifications.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::CartError;
use crate::ids::ProductId;

/// Message shown when a requested amount exceeds stock, whatever the operation.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// Receives outcome messages. Fire-and-forget: the cart never waits on it.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// The cart operation a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
            CartOperation::UpdateAmount => "update_amount",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            CartOperation::Add => "Product added to cart",
            CartOperation::Remove => "Product removed from cart",
            CartOperation::UpdateAmount => "Product quantity updated",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            CartOperation::Add => "Failed to add product",
            CartOperation::Remove => "Failed to remove product",
            CartOperation::UpdateAmount => "Failed to change product quantity",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an operation ended, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    OutOfStock,
    GenericFailure,
}

/// A human-readable outcome of one cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub operation: CartOperation,
    pub product_id: ProductId,
    pub message: String,
}

impl Notification {
    /// Successful `operation` on `product_id`.
    pub fn success(operation: CartOperation, product_id: ProductId) -> Self {
        Self {
            kind: NotificationKind::Success,
            operation,
            product_id,
            message: operation.success_message().to_string(),
        }
    }

    /// Failed `operation`; stock rejections get their own kind and message.
    pub fn failure(operation: CartOperation, product_id: ProductId, error: &CartError) -> Self {
        let (kind, message) = if error.is_out_of_stock() {
            (NotificationKind::OutOfStock, OUT_OF_STOCK_MESSAGE)
        } else {
            (NotificationKind::GenericFailure, operation.failure_message())
        };
        Self {
            kind,
            operation,
            product_id,
            message: message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                target: "turbo_cart::notify",
                operation = %notification.operation,
                product_id = %notification.product_id,
                "{}",
                notification.message
            ),
            NotificationKind::OutOfStock | NotificationKind::GenericFailure => tracing::warn!(
                target: "turbo_cart::notify",
                operation = %notification.operation,
                product_id = %notification.product_id,
                kind = ?notification.kind,
                "{}",
                notification.message
            ),
        }
    }
}

/// Buffers notifications until the UI drains them (toast queue).
#[derive(Debug, Default)]
pub struct QueueNotifier {
    queue: Mutex<VecDeque<Notification>>,
}

impl QueueNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, notification: Notification) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push_back(notification),
            Err(poisoned) => poisoned.into_inner().push_back(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_has_shared_message() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        let add = Notification::failure(CartOperation::Add, ProductId::new(1), &err);
        let update = Notification::failure(CartOperation::UpdateAmount, ProductId::new(1), &err);

        assert_eq!(add.kind, NotificationKind::OutOfStock);
        assert_eq!(add.message, OUT_OF_STOCK_MESSAGE);
        assert_eq!(update.message, OUT_OF_STOCK_MESSAGE);
    }

    #[test]
    fn test_generic_failure_message_depends_on_operation() {
        let err = CartError::InvalidAmount {
            product_id: ProductId::new(1),
            amount: 0,
        };
        let n = Notification::failure(CartOperation::UpdateAmount, ProductId::new(1), &err);

        assert_eq!(n.kind, NotificationKind::GenericFailure);
        assert_eq!(n.message, "Failed to change product quantity");
        assert!(!n.is_success());
    }

    #[test]
    fn test_queue_drains_in_order() {
        let queue = QueueNotifier::new();
        queue.notify(Notification::success(CartOperation::Add, ProductId::new(1)));
        queue.notify(Notification::success(CartOperation::Remove, ProductId::new(1)));

        assert_eq!(queue.len(), 2);
        let drained = queue.drain();
        assert_eq!(drained[0].operation, CartOperation::Add);
        assert_eq!(drained[1].message, "Product removed from cart");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_notification_serializes_for_ui() {
        let n = Notification::success(CartOperation::UpdateAmount, ProductId::new(4));
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["kind"], "success");
        assert_eq!(value["operation"], "update_amount");
        assert_eq!(value["product_id"], 4);
    }
}
