//! Admin lead list access over HTTP.

use heating_oil_tracker_integration_tests::{ADMIN_EMAIL, TestApp, body, location};

#[tokio::test]
async fn test_admin_redirects_anonymous_visitor() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.get(&client, "/admin").await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_admin_redirects_non_admin_user() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.signed_in(&client, "Jo", "jo@example.com").await;

    let response = app.get(&client, "/admin").await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_admin_sees_leads_newest_first() {
    let app = TestApp::spawn().await;
    let visitor = TestApp::client();
    for email in ["first@example.com", "second@example.com"] {
        let response = app.join_waitlist(&visitor, email).await;
        assert_eq!(response.status(), 200);
    }

    let admin = TestApp::client();
    app.signed_in(&admin, "Boss", ADMIN_EMAIL).await;

    let response = app.get(&admin, "/admin").await;
    assert_eq!(response.status(), 200);

    let html = body(response).await;
    assert!(html.contains("2 leads"));
    let first = html.find("first@example.com").expect("first lead listed");
    let second = html.find("second@example.com").expect("second lead listed");
    assert!(second < first, "newest lead comes first");
}

#[tokio::test]
async fn test_admin_email_matches_case_insensitively() {
    let app = TestApp::spawn().await;
    let admin = TestApp::client();
    app.signed_in(&admin, "Boss", &ADMIN_EMAIL.to_uppercase())
        .await;

    let response = app.get(&admin, "/admin").await;
    assert_eq!(response.status(), 200);
    assert!(body(response).await.contains("No leads yet."));
}
