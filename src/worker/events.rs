use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::models::{FetchRequest, FetchedResponse};

use super::OfflineWorker;

/// Platform events dispatched to the worker, one variant per event kind.
///
/// Fetch carries a responder: `None` through the channel means the request
/// was not intercepted and the caller should go to the network itself.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch {
        request: FetchRequest,
        responder: oneshot::Sender<Option<FetchedResponse>>,
    },
    Push {
        data: Option<Vec<u8>>,
    },
    NotificationClick {
        action: Option<String>,
    },
    Sync {
        tag: String,
    },
}

/// Create the event channel for a worker.
pub fn channel() -> (
    mpsc::UnboundedSender<WorkerEvent>,
    mpsc::UnboundedReceiver<WorkerEvent>,
) {
    mpsc::unbounded_channel()
}

/// Drive the worker from an event stream until the channel closes.
///
/// Lifecycle events are handled inline, preserving the platform's ordering
/// guarantee (install completes before activate, activate before fetches
/// for newly controlled pages). Fetch events spawn independent tasks so
/// multiple requests can be in flight at once.
pub async fn run_event_loop(worker: OfflineWorker, mut events: mpsc::UnboundedReceiver<WorkerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            WorkerEvent::Install => {
                if let Err(e) = worker.handle_install().await {
                    error!(error = %e, "Install failed");
                }
            }
            WorkerEvent::Activate => {
                if let Err(e) = worker.handle_activate().await {
                    error!(error = %e, "Activation failed");
                }
            }
            WorkerEvent::Fetch { request, responder } => {
                let worker = worker.clone();
                tokio::spawn(async move {
                    let response = worker.handle_fetch(&request).await;
                    if responder.send(response).is_err() {
                        debug!(url = %request.url, "Fetch caller went away");
                    }
                });
            }
            WorkerEvent::Push { data } => {
                worker.handle_push(data.as_deref()).await;
            }
            WorkerEvent::NotificationClick { action } => {
                worker.handle_notification_click(action.as_deref()).await;
            }
            WorkerEvent::Sync { tag } => {
                worker.handle_sync(&tag).await;
            }
        }
    }
    debug!("Event channel closed, worker loop exiting");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;
    use url::Url;

    use crate::config::WorkerConfig;
    use crate::net::client::testing::MockNetwork;
    use crate::notify::testing::RecordingNotifier;
    use crate::worker::WorkerState;

    use super::*;

    #[tokio::test]
    async fn test_event_loop_runs_lifecycle_and_fetch() {
        let config = WorkerConfig::default();
        let network = Arc::new(MockNetwork::new());
        for path in &config.precache_manifest {
            let url = config.base_url.join(path).unwrap();
            network.respond_ok(url.as_str(), b"shell");
        }

        let worker = OfflineWorker::new(
            config.clone(),
            network,
            Arc::new(RecordingNotifier::default()),
        );

        let (tx, rx) = channel();
        let loop_task = tokio::spawn(run_event_loop(worker.clone(), rx));

        tx.send(WorkerEvent::Install).unwrap();
        tx.send(WorkerEvent::Activate).unwrap();

        let (responder, response) = oneshot::channel();
        tx.send(WorkerEvent::Fetch {
            request: crate::models::FetchRequest::get(
                Url::parse("https://kaamkaro.app/index.html").unwrap(),
            ),
            responder,
        })
        .unwrap();

        let response = response.await.unwrap().unwrap();
        assert!(response.from_cache);
        assert_eq!(response.body, b"shell");

        drop(tx);
        loop_task.await.unwrap();
        assert_eq!(worker.state().await, WorkerState::Activated);
    }
}
