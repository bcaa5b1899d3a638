use anyhow::Error;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct Booter {
    pub addr: SocketAddr,
    tcp_listener: TcpListener,
}

impl Booter {
    pub async fn new(port: u16) -> Result<Self, Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let tcp_listener = TcpListener::bind(addr).await?;
        let addr = tcp_listener.local_addr()?;

        Ok(Self { addr, tcp_listener })
    }

    pub async fn start(self, router: Router) -> Result<(), Error> {
        axum::serve(self.tcp_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::Booter;

    #[tokio::test]
    async fn test_binds_ephemeral_port() {
        let booter = Booter::new(0).await.unwrap();
        assert_ne!(booter.addr.port(), 0);
    }

    #[tokio::test]
    async fn test_port_in_use_is_an_error() {
        let first = Booter::new(0).await.unwrap();
        assert!(Booter::new(first.addr.port()).await.is_err());
    }
}
