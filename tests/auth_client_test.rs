//! End-to-end auth flow: the client talks to a real instance of the mock
//! auth server over loopback, covering registration, the retried
//! post-registration login, bearer-protected reads and the profile patch.

use std::net::SocketAddr;

use folio_advisor::app::create_app;
use folio_advisor::external::auth_client::AuthClient;
use folio_advisor::models::auth::{InvestmentProfile, RegisterRequest};
use folio_advisor::services::auth_service::AuthService;
use folio_advisor::state::AppState;

async fn spawn_server() -> SocketAddr {
    let app = create_app(AppState::new(AuthService::new("test-secret")));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn register_body() -> RegisterRequest {
    RegisterRequest {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: "grace@example.test".into(),
        password: "Sup3rSecret".into(),
    }
}

#[tokio::test]
async fn register_login_me_profile_round_trip() {
    let addr = spawn_server().await;
    let mut client = AuthClient::new(format!("http://{}", addr));

    let registered = client.register(&register_body()).await.unwrap();
    assert!(registered.access_token.is_some());
    assert_eq!(
        registered.user.as_ref().unwrap().email,
        "grace@example.test"
    );

    let session = client
        .login_after_register("grace@example.test", "Sup3rSecret")
        .await
        .unwrap();
    assert!(!session.access_token.is_empty());
    assert_eq!(session.token_type, "Bearer");
    assert!(session.expires_at.is_some());

    let me = client.me().await.unwrap();
    assert_eq!(me.first_name, "Grace");

    let patched = client
        .update_investment_profile(&InvestmentProfile {
            goal: Some("income".into()),
            risk_tolerance: Some("low".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let profile = patched.investment_profile.unwrap();
    assert_eq!(profile.goal.as_deref(), Some("income"));
    assert_eq!(profile.risk_tolerance.as_deref(), Some("low"));

    client.logout();
    assert!(client.session().is_none());
    assert!(client.me().await.is_err());
}

#[tokio::test]
async fn login_with_unknown_account_is_unauthorized() {
    let addr = spawn_server().await;
    let mut client = AuthClient::new(format!("http://{}", addr));
    let result = client.login("nobody@example.test", "Sup3rSecret").await;
    assert!(result.is_err());
}
