//! Process exit codes for each error class, as errors leave `connect`.

use snek_client::{client::exit_code_for, SnekClient};
use snek_shared::{
    config::ClientConfig,
    error::{ConfigFault, ProtocolViolation, SessionError, TransportError},
};
use snek_tests::{spawn_scripted_server, AfterScript};

fn config_for(addr: std::net::SocketAddr) -> ClientConfig {
    ClientConfig {
        server_addr: addr.to_string(),
        frame_hz: 0.0,
        ..ClientConfig::default()
    }
}

async fn connect_err(messages: Vec<Vec<u8>>) -> anyhow::Result<anyhow::Error> {
    let (addr, server) = spawn_scripted_server(messages, AfterScript::Close).await?;
    let err = match SnekClient::connect(&config_for(addr)).await {
        Ok(_) => anyhow::bail!("connect unexpectedly succeeded"),
        Err(e) => e,
    };
    server.await??;
    Ok(err)
}

#[tokio::test]
async fn refused_connect_exits_74() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = SnekClient::connect(&config_for(addr)).await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::Transport(TransportError::WebSocket(_)))
        ),
        "got {err:#}"
    );
    assert_eq!(exit_code_for(&err), 74);
    Ok(())
}

#[tokio::test]
async fn truncated_metadata_exits_76() -> anyhow::Result<()> {
    // Width 2 needs 10 bytes.
    let err = connect_err(vec![vec![16, 0, 1, 0, 1, 0, 1, 0, 0]]).await?;
    assert!(
        matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::Protocol(ProtocolViolation::TruncatedMetadata { need: 10, got: 9 }))
        ),
        "got {err:#}"
    );
    assert_eq!(exit_code_for(&err), 76);
    Ok(())
}

#[tokio::test]
async fn unsupported_width_exits_78() -> anyhow::Result<()> {
    let err = connect_err(vec![vec![24; 13]]).await?;
    assert!(
        matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::Config(ConfigFault::UnsupportedWidth(3)))
        ),
        "got {err:#}"
    );
    assert_eq!(exit_code_for(&err), 78);
    Ok(())
}

#[test]
fn errors_outside_a_session_exit_1() {
    let err = anyhow::anyhow!("bad flag").context("parse args");
    assert_eq!(exit_code_for(&err), 1);
}
