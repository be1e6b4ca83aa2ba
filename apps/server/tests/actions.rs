//! Resource actions through the router: products, sales and their debts,
//! tenant scoping, and employee invitations.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn product_create_list_and_low_stock_filter() {
    let app = TestApp::new().await;
    let token = app.register("shop@example.com", "Corner Shop").await;

    let rice = app.create_product(&token, "Rice 50kg", 65_000_00, 40).await;
    let salt = app.create_product(&token, "Salt", 300_00, 2).await;

    let (_, body) = app.get("/api/products", Some(&token)).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/products?low_stock=true", Some(&token)).await;
    let low: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(low, vec![salt.as_str()]);

    let (_, body) = app
        .put(&format!("/api/products/{rice}"), Some(&token), json!({ "price_cents": 70_000_00 }))
        .await;
    assert_eq!(body["data"]["price_cents"], json!(70_000_00));
    assert_eq!(body["data"]["name"], json!("Rice 50kg"));

    let (_, body) = app
        .post(&format!("/api/products/{salt}/stock"), Some(&token), json!({ "delta": 10 }))
        .await;
    assert_eq!(body["data"]["quantity"], json!(12));
}

#[tokio::test]
async fn product_validation_errors_come_back_per_field() {
    let app = TestApp::new().await;
    let token = app.register("v@example.com", "Shop").await;

    let (status, body) = app
        .post(
            "/api/products",
            Some(&token),
            json!({ "name": "", "price_cents": -1, "quantity": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Validation failed"));

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields.len(), 3);
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price_cents"));
    assert!(fields.contains(&"quantity"));
}

#[tokio::test]
async fn credit_sale_takes_stock_and_opens_a_debt() {
    let app = TestApp::new().await;
    let token = app.register("sales@example.com", "Mama Put").await;
    let bread = app.create_product(&token, "Bread", 1_200_00, 10).await;

    let (_, body) = app
        .post(
            "/api/sales",
            Some(&token),
            json!({
                "customer_name": "Chidi",
                "payment_method": "credit",
                "amount_paid_cents": 1_000_00,
                "items": [{ "product_id": bread, "quantity": 3 }],
            }),
        )
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    assert_eq!(body["data"]["sale"]["total_cents"], json!(3_600_00));
    assert_eq!(body["data"]["debt"]["amount_cents"], json!(3_600_00));
    assert_eq!(body["data"]["debt"]["amount_paid_cents"], json!(1_000_00));
    assert_eq!(body["data"]["debt"]["status"], json!("partial"));
    assert_eq!(body["data"]["debt"]["customer_name"], json!("Chidi"));

    let (_, product) = app.get(&format!("/api/products/{bread}"), Some(&token)).await;
    assert_eq!(product["data"]["quantity"], json!(7));

    let debt_id = body["data"]["debt"]["id"].as_str().unwrap().to_string();
    let (_, body) = app
        .post(
            &format!("/api/debts/{debt_id}/payments"),
            Some(&token),
            json!({ "amount_cents": 2_600_00 }),
        )
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    assert_eq!(body["data"]["status"], json!("paid"));

    let (_, body) = app
        .post(
            &format!("/api/debts/{debt_id}/payments"),
            Some(&token),
            json!({ "amount_cents": 1 }),
        )
        .await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn cash_sale_paid_in_full_has_no_debt() {
    let app = TestApp::new().await;
    let token = app.register("cash@example.com", "Kiosk").await;
    let water = app.create_product(&token, "Water", 200_00, 24).await;

    let (_, body) = app
        .post(
            "/api/sales",
            Some(&token),
            json!({ "items": [{ "product_id": water, "quantity": 6 }] }),
        )
        .await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["sale"]["amount_paid_cents"], json!(1_200_00));
    assert!(body["data"]["debt"].is_null());

    let (_, debts) = app.get("/api/debts", Some(&token)).await;
    assert!(debts["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn overselling_fails_without_touching_stock() {
    let app = TestApp::new().await;
    let token = app.register("stock@example.com", "Small Shop").await;
    let sugar = app.create_product(&token, "Sugar", 900_00, 2).await;

    let (status, body) = app
        .post(
            "/api/sales",
            Some(&token),
            json!({ "items": [{ "product_id": sugar, "quantity": 5 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient stock for Sugar"));

    let (_, product) = app.get(&format!("/api/products/{sugar}"), Some(&token)).await;
    assert_eq!(product["data"]["quantity"], json!(2));

    let (_, sales) = app.get("/api/sales", Some(&token)).await;
    assert!(sales["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_line_price_is_a_validation_error() {
    let app = TestApp::new().await;
    let token = app.register("big@example.com", "Big Shop").await;
    let gold = app.create_product(&token, "Gold", 900_00, 20).await;

    let (status, body) = app
        .post(
            "/api/sales",
            Some(&token),
            json!({
                "items": [{
                    "product_id": gold,
                    "quantity": 10,
                    "unit_price_cents": i64::MAX / 2
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["errors"][0]["field"], json!("items[0].unit_price_cents"));

    let (_, product) = app.get(&format!("/api/products/{gold}"), Some(&token)).await;
    assert_eq!(product["data"]["quantity"], json!(20));
}

#[tokio::test]
async fn deleting_a_sale_restores_stock() {
    let app = TestApp::new().await;
    let token = app.register("undo@example.com", "Undo Mart").await;
    let soap = app.create_product(&token, "Soap", 500_00, 10).await;

    let (_, body) = app
        .post(
            "/api/sales",
            Some(&token),
            json!({ "items": [{ "product_id": soap, "quantity": 4 }] }),
        )
        .await;
    let sale_id = body["data"]["sale"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.delete(&format!("/api/sales/{sale_id}"), Some(&token)).await;
    assert_eq!(body["success"], json!(true));

    let (_, product) = app.get(&format!("/api/products/{soap}"), Some(&token)).await;
    assert_eq!(product["data"]["quantity"], json!(10));
}

#[tokio::test]
async fn businesses_cannot_see_each_others_records() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com", "Alice Stores").await;
    let bob = app.register("bob@example.com", "Bob Stores").await;

    let product = app.create_product(&alice, "Yam", 2_000_00, 8).await;

    let (_, body) = app.get("/api/products", Some(&bob)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.get(&format!("/api/products/{product}"), Some(&bob)).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(format!("Product not found: {product}")));

    let (_, body) = app.delete(&format!("/api/products/{product}"), Some(&bob)).await;
    assert_eq!(body["success"], json!(false));

    let (_, body) = app
        .post(
            "/api/sales",
            Some(&bob),
            json!({ "items": [{ "product_id": product, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(body["success"], json!(false));

    let (_, body) = app.get(&format!("/api/products/{product}"), Some(&alice)).await;
    assert_eq!(body["data"]["quantity"], json!(8));

    let (_, body) = app
        .post(
            "/api/sales",
            Some(&alice),
            json!({ "items": [{ "product_id": product, "quantity": 1 }] }),
        )
        .await;
    let sale = body["data"]["sale"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .post(
            "/api/debts",
            Some(&bob),
            json!({ "customer_name": "Chidi", "amount_cents": 500_00, "sale_id": sale }),
        )
        .await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(format!("Sale not found: {sale}")));
}

#[tokio::test]
async fn supplier_delivery_and_production_round() {
    let app = TestApp::new().await;
    let token = app.register("ops@example.com", "Ops Bakery").await;
    let loaf = app.create_product(&token, "Loaf", 800_00, 0).await;

    let (_, body) = app
        .post("/api/suppliers", Some(&token), json!({ "name": "Flour Mills" }))
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    let supplier = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .post(
            "/api/deliveries",
            Some(&token),
            json!({ "supplier_id": supplier, "status": "in_transit" }),
        )
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    let delivery = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .put(
            &format!("/api/deliveries/{delivery}"),
            Some(&token),
            json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(body["data"]["status"], json!("delivered"));
    assert!(body["data"]["delivered_at"].is_string());

    let (_, body) = app
        .post(
            "/api/productions",
            Some(&token),
            json!({ "product_id": loaf, "quantity": 30 }),
        )
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    let production = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .put(
            &format!("/api/productions/{production}"),
            Some(&token),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(body["data"]["status"], json!("completed"));

    let (_, product) = app.get(&format!("/api/products/{loaf}"), Some(&token)).await;
    assert_eq!(product["data"]["quantity"], json!(30));
}

#[tokio::test]
async fn adding_an_employee_mails_an_invitation() {
    let app = TestApp::new().await;
    let token = app.register("boss@example.com", "Boss Ventures").await;

    let (_, body) = app
        .post(
            "/api/employees",
            Some(&token),
            json!({ "name": "Tunde", "email": "Tunde@Example.com", "role": "manager" }),
        )
        .await;
    assert_eq!(body["success"], json!(true), "{body}");
    assert_eq!(body["data"]["status"], json!("invited"));
    assert_eq!(body["data"]["email"], json!("tunde@example.com"));
    let id = body["data"]["id"].as_str().unwrap();

    let mail = app.mailer.last_to("tunde@example.com").expect("invitation sent");
    assert_eq!(mail.subject, "You have been added to Boss Ventures on BizTrack");
    assert!(mail.text.contains("https://app.biztrack.test/signup?email=tunde%40example.com"));
    assert!(mail.text.contains(&format!("invite={id}")));
}

#[tokio::test]
async fn employee_is_kept_when_the_invitation_cannot_be_sent() {
    let app = TestApp::new().await;
    let token = app.register("owner@example.com", "Shop").await;
    app.mailer.set_failing(true);

    let (_, body) = app
        .post(
            "/api/employees",
            Some(&token),
            json!({ "name": "Ada", "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(body["success"], json!(true));

    let (_, body) = app.get("/api/employees", Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
