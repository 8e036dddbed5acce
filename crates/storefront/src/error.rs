//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front-ends. Failures caused by the
//! environment (storage, catalog service, corrupt state) are captured to
//! Sentry via [`AppError::report`]; user mistakes are not.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::screen::ScreenError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog service operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Screen action failed.
    #[error("Screen error: {0}")]
    Screen(#[from] ScreenError),
}

impl AppError {
    /// Whether the error was caused by the environment rather than the user.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Cart(err) | Self::Screen(ScreenError::Cart(err)) => !matches!(
                err,
                CartError::NotInCart(_) | CartError::QuantityOverflow(_)
            ),
            Self::Screen(ScreenError::UnknownProduct(_)) | Self::Config(_) => false,
            Self::Catalog(_) | Self::Storage(_) => true,
        }
    }

    /// Log the error and, for internal failures, capture it to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error. A no-op when Sentry is not initialized.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Pressed add to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use go_marketplace_core::ProductId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CartError::NotInCart(ProductId::new("p9")));
        assert_eq!(err.to_string(), "Cart error: Product p9 is not in the cart");

        let err = AppError::from(ConfigError::MissingEnvVar("MARKETPLACE_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Config error: Missing environment variable: MARKETPLACE_API_URL"
        );
    }

    #[test]
    fn test_user_errors_are_not_internal() {
        assert!(!AppError::from(CartError::NotInCart(ProductId::new("x"))).is_internal());
        assert!(
            !AppError::from(ScreenError::UnknownProduct(ProductId::new("x"))).is_internal()
        );
        assert!(
            !AppError::from(ScreenError::Cart(CartError::NotInCart(ProductId::new("x"))))
                .is_internal()
        );
    }

    #[test]
    fn test_environment_errors_are_internal() {
        assert!(AppError::from(StorageError::WriterClosed).is_internal());
        assert!(
            AppError::from(CatalogError::Status {
                status: 500,
                body: String::new(),
            })
            .is_internal()
        );
        assert!(AppError::from(CartError::Storage(StorageError::WriterClosed)).is_internal());
    }

    #[test]
    fn test_report_without_sentry_does_not_panic() {
        AppError::from(StorageError::WriterClosed).report();
        add_breadcrumb("test", "message", Some(&[("k", "v")]));
    }
}
