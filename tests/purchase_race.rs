//! Concurrent delivery: racing purchases and duplicate webhooks converge on
//! a single purchase and a single buyer copy.

mod common;

use futures::future::join_all;
use http::{Method, StatusCode};
use serde_json::json;

use contact_exchange::application::handlers::purchase::PurchaseShareCommand;
use contact_exchange::application::handlers::sharing::ShareLocator;
use contact_exchange::domain::sharing::AccessToken;

use common::{succeeded_webhook, TestApp};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_create_one_copy() {
    let app = TestApp::new();
    let owner = app.seed_user("Owner");
    let buyer = app.seed_user("Buyer");
    let share = app.publish(owner, json!({"visibility": "open"})).await;
    let token = AccessToken::parse(share["access_token"].as_str().unwrap()).unwrap();

    let tasks = (0..16).map(|_| {
        let handler = app.state.purchase_share.clone();
        let token = token.clone();
        tokio::spawn(async move {
            handler
                .handle(PurchaseShareCommand {
                    locator: ShareLocator::Token(token),
                    buyer_id: buyer,
                    payment_id: None,
                })
                .await
        })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let created = results.iter().filter(|r| r.newly_created).count();
    assert_eq!(created, 1);
    let first = results[0].purchase.id;
    assert!(results.iter().all(|r| r.purchase.id == first));
    assert_eq!(app.contact_count(buyer), 1);

    let (_, mine) = app.send(Method::GET, "/shares/mine", Some(owner), None).await;
    assert_eq!(mine[0]["purchase_count"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_webhooks_settle_once() {
    let app = TestApp::new();
    let seller = app.seed_user("Seller");
    let buyer = app.seed_user("Buyer");
    app.grant_seller(seller).await;
    let share = app
        .publish(seller, json!({"visibility": "paid", "price": "250"}))
        .await;

    let (status, checkout) = app
        .send(
            Method::POST,
            &format!("/shares/{}/checkout", share["id"].as_str().unwrap()),
            Some(buyer),
            Some(json!({"provider": "yookassa"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let webhook = succeeded_webhook(checkout["payment_id"].as_str().unwrap());

    let deliveries = (0..8).map(|_| app.post_webhook("yookassa", webhook.clone()));
    for (status, _) in join_all(deliveries).await {
        assert_eq!(status, StatusCode::OK);
    }

    let (_, purchases) = app.send(Method::GET, "/purchases", Some(buyer), None).await;
    assert_eq!(purchases.as_array().unwrap().len(), 1);
    assert_eq!(app.contact_count(buyer), 1);
}
