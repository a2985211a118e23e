use super::*;
use crate::model::ClientConfig;
use crate::session::Credentials;

fn client_with(session: Session) -> ApiClient {
    ApiClient::new(&ClientConfig::new("http://api.local/"), session).expect("build client")
}

#[test]
fn stored_bearer_token_becomes_authorization_header() {
    let session = Session::in_memory();
    session
        .sign_in(&Credentials {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
        })
        .expect("sign in");
    let client = client_with(session);

    let req = client
        .request(Method::GET, "/ticket/@me")
        .build()
        .expect("build request");
    assert_eq!(req.url().as_str(), "http://api.local/ticket/@me");
    assert_eq!(
        req.headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer abc")
    );
}

#[test]
fn missing_credentials_send_unauthenticated_requests() {
    let client = client_with(Session::in_memory());
    let req = client
        .request(Method::GET, "/version")
        .build()
        .expect("build request");
    assert!(req.headers().get(reqwest::header::AUTHORIZATION).is_none());
}

#[test]
fn token_type_is_sent_verbatim() {
    let session = Session::in_memory();
    session
        .sign_in(&Credentials {
            access_token: "xyz".to_string(),
            token_type: "JWT".to_string(),
        })
        .expect("sign in");
    let client = client_with(session);
    let req = client
        .request(Method::DELETE, "/ticket")
        .build()
        .expect("build request");
    assert_eq!(
        req.headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
        Some("JWT xyz")
    );
}

#[test]
fn base_url_trailing_slash_is_dropped() {
    let client = client_with(Session::in_memory());
    assert_eq!(client.base_url(), "http://api.local");
    assert_eq!(client.url("/oauth"), "http://api.local/oauth");
}
