//! Service assembly: binds a process's transport and exposes its control
//! surface over the wire.
//!
//! [`serve`] is the single entry point for bringing a process online: it
//! starts the listener with the process as the request handler, then marks
//! the process ready on the shared gate — in that order, so that a peer
//! observing the gate as ready can already reach the listener.

use {
    crate::process::Process,
    async_trait::async_trait,
    benor_net::{NetConfig, NodeApi, Request, Response, Result, TransportListener},
    log::info,
    std::{net::SocketAddr, sync::Arc},
};

#[async_trait]
impl NodeApi for Process {
    async fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::Probe => Response::Probe(self.probe()),
            Request::Deliver(vote) => Response::Deliver(self.deliver(&vote)),
            Request::Start => match self.run().await {
                Ok(outcome) => Response::Start(outcome),
                Err(e) => Response::Error(e.to_string()),
            },
            Request::Stop => {
                self.stop();
                Response::Stop
            }
            Request::GetState => Response::State(self.snapshot()),
        }
    }
}

/// Handle for a serving process.
pub struct ServiceHandle {
    /// The address the process's listener is bound to.
    pub local_addr: SocketAddr,
}

/// Bind the process's listener, start serving, and report ready.
pub async fn serve(process: Arc<Process>, net_config: NetConfig) -> Result<ServiceHandle> {
    let handle = TransportListener::new(net_config)
        .start(Arc::clone(&process))
        .await?;
    process.readiness().mark_ready(process.id());
    info!("process {} serving on {}", process.id(), handle.local_addr);
    Ok(ServiceHandle {
        local_addr: handle.local_addr,
    })
}
