//! Logging set up around the startup script.

use confbridge::config::ServerConfig;
use confbridge::observability::logging;
use confbridge::Bootstrap;

#[test]
fn test_subscriber_is_live_during_startup_and_files_attach_after() {
    let dir = tempfile::tempdir().unwrap();
    let access = dir.path().join("access.log");
    let error = dir.path().join("error.log");

    let settings = ServerConfig::default();
    let logging = logging::init_logging(&settings.runtime);
    assert!(logging.is_installed());
    assert!(tracing::dispatcher::has_been_set());

    let mut bootstrap = Bootstrap::new(settings);
    bootstrap
        .run_script(&format!(
            r#"
            AccessLog("{}");
            ErrorLog("{}");
            print(ServerInfo());
            "#,
            access.display(),
            error.display()
        ))
        .unwrap();
    let ready = bootstrap.finish().unwrap();
    logging.apply(&ready.runtime);

    tracing::info!(target: "access", "GET /admin 403");
    tracing::warn!("disk almost full");

    let access_log = std::fs::read_to_string(&access).unwrap();
    assert!(access_log.contains("GET /admin 403"));
    assert!(!access_log.contains("disk almost full"));
    assert!(std::fs::read_to_string(&error)
        .unwrap()
        .contains("disk almost full"));
}
