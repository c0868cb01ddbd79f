use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use dashboard_core::{PageKind, RequestSeq};
use dashboard_logging::{dash_debug, dash_info, dash_warn};

use crate::detail::load_conversation_messages;
use crate::fetch::{DataFetcher, FetchSettings, ReqwestDataFetcher};
use crate::poll::{PollHandle, PollLoop};
use crate::{DataError, EngineEvent};

enum EngineCommand {
    StartPolling { page: PageKind, interval: Duration },
    StopPolling(PageKind),
    FetchNow(PageKind),
    LoadMessages { conversation_id: String },
    Shutdown,
}

/// Handle to the IO thread. Commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Result<Self, DataError> {
        let fetcher = ReqwestDataFetcher::new(settings)?;
        Ok(Self::with_fetcher(Arc::new(fetcher)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn DataFetcher>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let next_seq = Arc::new(AtomicU64::new(0));
            let mut polls: HashMap<PageKind, PollHandle> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { page, interval } => {
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        let next_seq = next_seq.clone();
                        let handle = PollLoop::new(page.as_str(), interval).spawn(
                            runtime.handle(),
                            move || {
                                let fetcher = fetcher.clone();
                                let event_tx = event_tx.clone();
                                let seq = next_seq.fetch_add(1, Ordering::SeqCst) + 1;
                                async move {
                                    fetch_page(fetcher.as_ref(), page, seq, &event_tx).await
                                }
                            },
                        );
                        dash_info!("Polling {} every {:?}", page, interval);
                        if let Some(previous) = polls.insert(page, handle) {
                            previous.stop();
                        }
                    }
                    EngineCommand::StopPolling(page) => {
                        if let Some(handle) = polls.remove(&page) {
                            handle.stop();
                            dash_info!("Stopped polling {}", page);
                        }
                    }
                    EngineCommand::FetchNow(page) => {
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        let seq = next_seq.fetch_add(1, Ordering::SeqCst) + 1;
                        runtime.spawn(async move {
                            if let Err(err) = fetch_page(fetcher.as_ref(), page, seq, &event_tx).await
                            {
                                dash_warn!("Manual refresh of {} failed: {}", page, err);
                            }
                        });
                    }
                    EngineCommand::LoadMessages { conversation_id } => {
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let messages =
                                load_conversation_messages(fetcher.as_ref(), &conversation_id)
                                    .await;
                            let _ = event_tx.send(EngineEvent::MessagesLoaded {
                                conversation_id,
                                messages,
                            });
                        });
                    }
                    EngineCommand::Shutdown => break,
                }
            }

            for (_, handle) in polls.drain() {
                handle.stop();
            }
            dash_debug!("Engine thread exiting");
        });

        Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        }
    }

    /// Starts the page's poll loop, replacing any loop already running for it.
    pub fn start_polling(&self, page: PageKind, interval: Duration) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartPolling { page, interval });
    }

    pub fn stop_polling(&self, page: PageKind) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling(page));
    }

    pub fn fetch_now(&self, page: PageKind) {
        let _ = self.cmd_tx.send(EngineCommand::FetchNow(page));
    }

    pub fn load_messages(&self, conversation_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::LoadMessages {
            conversation_id: conversation_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stops every poll loop and joins the IO thread.
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// One fetch cycle for a page. Outcomes are reported as events; the error is
/// also returned so the caller can log it.
async fn fetch_page(
    fetcher: &dyn DataFetcher,
    page: PageKind,
    seq: RequestSeq,
    event_tx: &mpsc::Sender<EngineEvent>,
) -> Result<(), DataError> {
    let _ = event_tx.send(EngineEvent::FetchStarted { page, seq });

    let outcome = match page {
        PageKind::Conversations => {
            let (conversations, states) = tokio::join!(
                fetcher.get_conversations(),
                fetcher.get_conversation_states()
            );
            conversations.and_then(|conversations| {
                states.map(|states| EngineEvent::ConversationsFetched {
                    seq,
                    conversations,
                    states,
                    fetched_at: Utc::now(),
                })
            })
        }
        PageKind::Plugins => {
            fetcher
                .get_plugin_data()
                .await
                .map(|catalog| EngineEvent::PluginsFetched {
                    seq,
                    catalog,
                    fetched_at: Utc::now(),
                })
        }
    };

    match outcome {
        Ok(event) => {
            let _ = event_tx.send(event);
            Ok(())
        }
        Err(error) => {
            let _ = event_tx.send(EngineEvent::FetchFailed {
                page,
                seq,
                error: error.clone(),
            });
            Err(error)
        }
    }
}
