//! Sign-up, sign-in and sign-out over HTTP.

use heating_oil_tracker_integration_tests::{PASSWORD, TestApp, body, location};

#[tokio::test]
async fn test_sign_up_then_sign_in_reaches_dashboard() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.sign_up(&client, "Dana", "dana@example.com").await;
    assert_eq!(response.status(), 200);
    assert!(body(response).await.contains("You can now sign in"));

    // Sign-up alone does not sign in
    let response = app.get(&client, "/dashboard").await;
    assert_eq!(response.status(), 302);

    let response = app.sign_in(&client, "dana@example.com", PASSWORD).await;
    assert_eq!(response.status(), 200);
    assert!(body(response).await.contains("Hi, Dana"));

    let response = app.get(&client, "/dashboard").await;
    assert_eq!(response.status(), 200);
    let html = body(response).await;
    assert!(html.contains("Welcome, Dana"));
    assert!(html.contains("dana@example.com"));
}

#[tokio::test]
async fn test_sign_up_rejects_invalid_email() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.sign_up(&client, "Eve", "not-an-email").await;
    assert_eq!(response.status(), 422);

    let html = body(response).await;
    assert!(html.contains("Oops! That email address appears to be invalid"));
    assert!(html.contains("value=\"not-an-email\""));
    assert!(html.contains("value=\"Eve\""));
}

#[tokio::test]
async fn test_sign_up_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.sign_up(&client, "Finn", "finn@example.com").await;
    assert_eq!(response.status(), 200);

    let response = app.sign_up(&client, "Finn Again", "FINN@example.com").await;
    assert_eq!(response.status(), 422);
    assert!(
        body(response)
            .await
            .contains("Oops! It appears you are already registered")
    );
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.sign_up(&client, "Gus", "gus@example.com").await;
    assert_eq!(response.status(), 200);

    let wrong_password = app.sign_in(&client, "gus@example.com", "nope").await;
    let unknown_user = app.sign_in(&client, "nobody@example.com", "nope").await;

    assert_eq!(wrong_password.status(), 422);
    assert_eq!(unknown_user.status(), 422);

    let wrong_password = body(wrong_password).await;
    let unknown_user = body(unknown_user).await;
    let message = "Oops! Email address or password is incorrect.";
    assert!(wrong_password.contains(message));
    assert!(unknown_user.contains(message));

    let response = app.get(&client, "/dashboard").await;
    assert_eq!(response.status(), 302);
}

#[tokio::test]
async fn test_dashboard_redirects_anonymous_visitor() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.get(&client, "/dashboard").await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.signed_in(&client, "Hana", "hana@example.com").await;

    let response = app.post_form(&client, "/auth/sign-out", &[]).await;
    assert_eq!(response.status(), 200);
    assert!(body(response).await.contains("You have been signed out."));

    let response = app.get(&client, "/dashboard").await;
    assert_eq!(response.status(), 302);
}

#[tokio::test]
async fn test_session_is_not_shared_between_clients() {
    let app = TestApp::spawn().await;
    let signed_in = TestApp::client();
    app.signed_in(&signed_in, "Ivy", "ivy@example.com").await;

    let response = app.get(&signed_in, "/dashboard").await;
    assert_eq!(response.status(), 200);

    let stranger = TestApp::client();
    let response = app.get(&stranger, "/dashboard").await;
    assert_eq!(response.status(), 302);
}

#[tokio::test]
async fn test_sign_in_rejects_invalid_email() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.sign_in(&client, "user@@example.com", PASSWORD).await;
    assert_eq!(response.status(), 422);

    let html = body(response).await;
    assert!(html.contains("Oops! That email address appears to be invalid"));
    assert!(html.contains("value=\"user@@example.com\""));
}
