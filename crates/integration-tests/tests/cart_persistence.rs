//! Integration tests for cart state persisted to file storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use go_marketplace_core::{CartItem, Price, Product, ProductId};
use go_marketplace_integration_tests::{CatalogServer, config, temp_data_dir};
use go_marketplace_storefront::cart::{CartChange, CartError, DEFAULT_CART_KEY};
use go_marketplace_storefront::storage::{FileStorage, KeyValueStorage};
use go_marketplace_storefront::{AppError, Session};
use rust_decimal::Decimal;

fn widget() -> Product {
    Product {
        id: ProductId::new("p1"),
        title: "Widget".to_string(),
        image_url: "u".to_string(),
        price: Price::new(Decimal::new(999, 2)).unwrap(),
    }
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();

    let before = {
        let session = Session::start(config(&server.base_url, &dir)).await.unwrap();
        let screen = session.catalog_screen().await;
        screen.press_add(&ProductId::new("p1")).unwrap();
        screen.press_add(&ProductId::new("p2")).unwrap();
        screen.press_add(&ProductId::new("p2")).unwrap();
        session.cart().flush().await.unwrap();
        session.cart().products()
    };

    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();
    assert_eq!(session.cart().products(), before);
    assert_eq!(session.cart().total_quantity(), 3);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_widget_scenario_on_disk() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();
    let cart = session.cart();
    let id = ProductId::new("p1");

    assert_eq!(cart.add_to_cart(widget()).unwrap().change, CartChange::Added);
    cart.increment(&id).unwrap();
    assert_eq!(cart.quantity_of(&id), 2);
    cart.decrement(&id).unwrap();
    let last = cart.decrement(&id).unwrap();
    assert_eq!(last.change, CartChange::Removed);
    last.write.await.unwrap();

    let storage = FileStorage::new(&dir);
    let blob = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
    assert_eq!(blob, "[]");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_stored_blob_uses_wire_format() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();

    session.cart().add_to_cart(widget()).unwrap().write.await.unwrap();

    let raw = tokio::fs::read_to_string(FileStorage::new(&dir).path_for(DEFAULT_CART_KEY))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"id": "p1", "title": "Widget", "image_url": "u", "price": 9.99, "quantity": 1}
        ])
    );

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_unknown_id_does_not_touch_disk() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();

    let err = session.cart().increment(&ProductId::new("ghost")).unwrap_err();
    assert!(matches!(err, CartError::NotInCart(_)));
    session.cart().flush().await.unwrap();

    assert!(!dir.exists());
}

#[tokio::test]
async fn test_corrupt_cart_file_fails_startup() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    FileStorage::new(&dir)
        .set(DEFAULT_CART_KEY, "not json".to_string())
        .await
        .unwrap();

    let err = Session::start(config(&server.base_url, &dir)).await.unwrap_err();
    assert!(matches!(err, AppError::Cart(CartError::Decode(_))));
    assert!(err.is_internal());

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_empty_cart_file_starts_empty() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    FileStorage::new(&dir)
        .set(DEFAULT_CART_KEY, String::new())
        .await
        .unwrap();

    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();
    assert!(session.cart().is_empty());

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_preexisting_cart_is_loaded_in_order() {
    let server = CatalogServer::sample().await;
    let dir = temp_data_dir();
    let blob = r#"[
        {"id":"b","title":"B","image_url":"","price":1.5,"quantity":4},
        {"id":"a","title":"A","image_url":"","price":2,"quantity":1}
    ]"#;
    FileStorage::new(&dir)
        .set(DEFAULT_CART_KEY, blob.to_string())
        .await
        .unwrap();

    let session = Session::start(config(&server.base_url, &dir)).await.unwrap();
    let items: Vec<CartItem> = session.cart().products();

    assert_eq!(items[0].id.as_str(), "b");
    assert_eq!(items[1].id.as_str(), "a");
    assert_eq!(session.cart().subtotal().unwrap().amount(), Decimal::new(800, 2));

    // Shared storage handle sees the same blob the session loaded.
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(&dir));
    assert!(storage.get(DEFAULT_CART_KEY).await.unwrap().is_some());

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
