use sessionkit::{ConfigBuilder, SessionBackend, SessionConfig, SessionError};

#[test]
fn test_from_env_reads_prefixed_and_plain_names() {
    unsafe {
        std::env::set_var("SESSIONKIT_PORT", "9123");
        std::env::set_var("SESSIONKIT_SESSION_BACKEND", "memory");
        std::env::set_var("SESSION_DEFAULT_SCOPE", "app");
        std::env::set_var("SESSIONKIT_SESSION_ID_LENGTH", "48");
        std::env::set_var("SESSIONKIT_SESSION_COOKIE_SAME_SITE", "Lax");
    }

    let config = ConfigBuilder::new().from_env().build().unwrap();

    unsafe {
        std::env::remove_var("SESSIONKIT_PORT");
        std::env::remove_var("SESSIONKIT_SESSION_BACKEND");
        std::env::remove_var("SESSION_DEFAULT_SCOPE");
        std::env::remove_var("SESSIONKIT_SESSION_ID_LENGTH");
        std::env::remove_var("SESSIONKIT_SESSION_COOKIE_SAME_SITE");
    }

    assert_eq!(config.server.port, 9123);
    assert_eq!(config.session.backend, SessionBackend::Memory);
    assert_eq!(config.session.default_scope, "app");
    assert_eq!(config.session.id_length, 48);
    assert!(config.session.cookie_same_site.is_some());
}

#[test]
fn test_defaults_match_cookie_protocol() {
    let config = SessionConfig::default();
    assert_eq!(config.default_scope, "web");
    assert_eq!(config.scope_param, "session_name");
    assert_eq!(config.cookie_path, "/");
    assert!(!config.cookie_secure);
    assert!(!config.cookie_http_only);
    assert!(config.cookie_same_site.is_none());
}

#[test]
fn test_id_length_out_of_range_rejected() {
    for length in [0, 8, 129] {
        let result = ConfigBuilder::new()
            .with_session(SessionConfig {
                id_length: length,
                ..Default::default()
            })
            .build();
        assert!(matches!(result, Err(SessionError::BadRequest(_))), "length {}", length);
    }
}

#[test]
fn test_relative_cookie_path_rejected() {
    let result = ConfigBuilder::new()
        .with_session(SessionConfig {
            cookie_path: "app".to_string(),
            ..Default::default()
        })
        .build();
    assert!(result.is_err());
}

#[test]
fn test_redis_backend_requires_url() {
    let result = ConfigBuilder::new()
        .with_session(SessionConfig {
            backend: SessionBackend::Redis,
            redis_url: None,
            ..Default::default()
        })
        .build();
    assert!(result.is_err());
}

#[test]
fn test_unencodable_cookie_path_and_domain_rejected() {
    let result = ConfigBuilder::new()
        .with_session(SessionConfig {
            cookie_path: "/café".to_string(),
            ..Default::default()
        })
        .build();
    assert!(matches!(result, Err(SessionError::BadRequest(_))));

    let result = ConfigBuilder::new()
        .with_session(SessionConfig {
            cookie_domain: Some("example.com; Secure".to_string()),
            ..Default::default()
        })
        .build();
    assert!(matches!(result, Err(SessionError::BadRequest(_))));
}
