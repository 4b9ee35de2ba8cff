//! Login, follow-up request and logout across two HTTP exchanges.

use bytes::Bytes;
use http::header::{COOKIE, SET_COOKIE};
use http::Request;
use portcullis::context::HttpWebContext;
use portcullis::core::UserProfile;
use portcullis::{ConfigLoader, Security};
use serde_json::json;

const CONFIG: &str = r#"
    [authorization]
    role_attributes = ["groups"]
    permission_attributes = ["scope"]
    trim = "whitespace"
    default_roles = ["user"]
"#;

fn security(extra: &str) -> Security {
    let config = ConfigLoader::new()
        .with_string(&format!("{CONFIG}\n{extra}"), "toml")
        .unwrap()
        .load()
        .unwrap();
    Security::from_config(&config).unwrap()
}

fn request(cookie: Option<&str>) -> Request<Bytes> {
    let mut builder = Request::builder().uri("https://app.example.com/dashboard");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Bytes::new()).unwrap()
}

// Turns the Set-Cookie headers of a response into a Cookie request header.
fn echo(response: &http::Response<http_body_util::Full<Bytes>>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn run_flow(security: &Security) {
    let identity = UserProfile::new("alice")
        .with_client_name("oidc")
        .with_attribute("groups", json!("admin, editor"))
        .with_attribute("scope", json!("read,write"));

    let mut login = HttpWebContext::new(request(None), security.session_store()).unwrap();
    let sealed = security.login(&mut login, identity, false).unwrap();
    assert!(sealed.has_role("editor"));
    assert!(sealed.has_role("user"));
    let cookie = echo(&login.into_response().unwrap());
    assert!(!cookie.is_empty());

    let mut follow_up = HttpWebContext::new(request(Some(&cookie)), security.session_store()).unwrap();
    let profile = security.profiles(&mut follow_up).get(true).unwrap().unwrap();
    assert_eq!(profile.id(), "alice");
    assert_eq!(profile.client_name(), Some("oidc"));
    assert!(profile.has_permission("write"));

    let mut logout = HttpWebContext::new(request(Some(&cookie)), security.session_store()).unwrap();
    security.profiles(&mut logout).logout().unwrap();
    let cleared = echo(&logout.into_response().unwrap());

    let mut after = HttpWebContext::new(request(Some(&cleared)), security.session_store()).unwrap();
    assert!(!security.profiles(&mut after).is_authenticated().unwrap());
}

#[test]
fn test_memory_store_flow() {
    run_flow(&security(""));
}

#[test]
fn test_cookie_store_flow() {
    run_flow(&security("[session]\nstore = \"cookie\"\n"));
}

#[test]
fn test_unauthenticated_request() {
    let security = security("");
    let mut ctx = HttpWebContext::new(request(None), security.session_store()).unwrap();
    let manager = security.profiles(&mut ctx);

    assert!(manager.get(true).unwrap().is_none());
    assert!(!manager.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_from_request_body() {
    let security = security("");
    let request = Request::builder()
        .uri("https://app.example.com/login")
        .body(http_body_util::Full::new(Bytes::from_static(b"user=alice")))
        .unwrap();
    let mut ctx = HttpWebContext::from_request(request, security.session_store())
        .await
        .unwrap();

    let sealed = security
        .login(&mut ctx, UserProfile::new("alice"), false)
        .unwrap();
    assert_eq!(sealed.roles().iter().collect::<Vec<_>>(), ["user"]);
}
