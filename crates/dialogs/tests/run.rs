//! Startup and shutdown through the facade.

use dialogs::prelude::*;

fn echo_dispatcher() -> Dispatcher {
    Dispatcher::new(|input: InputData| async move {
        let text = input.request.original_utterance.clone();
        OutputData::new(&input, Response::new(text, "", false))
    })
}

fn loopback_config() -> DialogsConfig {
    ConfigLoader::new()
        .with_string(
            r#"
            [server]
            http_addr = "127.0.0.1:0"
            shutdown_timeout_secs = 1

            [logging]
            enabled = false
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap()
}

#[tokio::test]
async fn test_run_stops_on_triggered_shutdown() {
    let shutdown = ShutdownSignal::new();
    shutdown.trigger();

    let result =
        dialogs::run_with_shutdown(&loopback_config(), echo_dispatcher(), shutdown).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_run_reports_bind_failure() {
    let mut config = loopback_config();
    config.server.http_addr = "256.0.0.1:80".to_string();

    let err = dialogs::run_with_shutdown(&config, echo_dispatcher(), ShutdownSignal::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("256.0.0.1:80"));
}

#[test]
fn test_build_server_blocking() {
    let server = dialogs::build_server(&loopback_config(), echo_dispatcher());
    assert_eq!(server.config().http_addr(), "127.0.0.1:0");

    let ping = br#"{"request": {"original_utterance": "ping"}}"#;
    let response = tokio_test::block_on(server.dispatcher().dispatch(ping.to_vec().into()));
    assert_eq!(response.status(), 200);
}
