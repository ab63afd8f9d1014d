//! The request controller: the send state machine.
//!
//! `RequestController` orchestrates sending a user turn to the completion
//! endpoint. It owns the single-authoritative-request invariant: the current
//! cancellation token is a controller field, replaced (never mutated in
//! place) on every send, with the previous token cancelled before the new
//! one is created. A superseded request's eventual resolution never mutates
//! the conversation log.
//!
//! The race between the provider call and the token resolves into a tagged
//! outcome consumed by one exhaustive match; cancellation is never signalled
//! by unwinding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chatlet_types::turn::Turn;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::completion::CompletionProvider;
use crate::conversation::ConversationStore;

/// Content a failed send leaves in the assistant bubble.
pub const FAILURE_REPLY: &str = "⚠️ Error: failed to get a reply.";

/// Content shown when the endpoint answers 2xx with nothing usable;
/// the bubble is never left blank.
pub const EMPTY_REPLY: &str = "…";

/// Terminal outcome of a `send`, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply (or the empty-reply ellipsis) replaced the placeholder.
    Replied,
    /// The send was superseded; the log was not touched by this request.
    Cancelled,
    /// The endpoint failed; the failure turn and a surfaced error were set.
    Failed,
    /// Nothing was sent: blank input, or the submit path found the
    /// controller busy.
    Ignored,
}

/// Result of racing the provider call against the cancellation token.
enum RequestOutcome {
    Ok(String),
    Cancelled,
    Failed(String),
}

/// Orchestrates the conversation send lifecycle.
pub struct RequestController<P: CompletionProvider> {
    provider: Arc<P>,
    store: Arc<Mutex<ConversationStore>>,
    /// The authoritative token for the in-flight send. Replaced wholesale
    /// on every new send; the previous occupant is cancelled first.
    current: Mutex<CancellationToken>,
    /// Drives UI affordances: disabled submit, typing indicator.
    busy: AtomicBool,
    /// Error surfaced to the user after a failed send.
    last_error: Mutex<Option<String>>,
}

impl<P: CompletionProvider> RequestController<P> {
    pub fn new(provider: Arc<P>, store: Arc<Mutex<ConversationStore>>) -> Self {
        Self {
            provider,
            store,
            current: Mutex::new(CancellationToken::new()),
            busy: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// The normal submit path: refuses while a send is in flight.
    ///
    /// Programmatic callers that want to supersede the in-flight request
    /// call [`send`](Self::send) directly.
    pub async fn submit(&self, text: &str) -> SendOutcome {
        if self.is_busy() {
            debug!("submit ignored while a send is in flight");
            return SendOutcome::Ignored;
        }
        self.send(text).await
    }

    /// Send a user turn to the completion endpoint.
    ///
    /// Blank input is a silent no-op. Any previously issued, still-pending
    /// request is superseded: its token is cancelled and its eventual
    /// resolution is discarded. The user turn and an empty assistant
    /// placeholder are appended optimistically; the placeholder is replaced
    /// by the reply, the empty-reply ellipsis, or the failure turn. The
    /// busy flag is cleared on every terminal path.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("send ignored: blank input");
            return SendOutcome::Ignored;
        }

        // Supersede the previous request and build the outbound history
        // under one store lock, so a concurrent late resolution cannot
        // interleave between the cancel and the appends.
        let (token, history) = {
            let mut store = self.store.lock().await;

            let token = {
                let mut current = self.current.lock().await;
                current.cancel();
                let fresh = CancellationToken::new();
                *current = fresh.clone();
                fresh
            };

            *self.last_error.lock().await = None;

            store.append(Turn::user(text));
            // The request body is the log up to and including the new user
            // turn; the placeholder is a UI-only artifact, never sent.
            let history = store.snapshot();
            store.append(Turn::placeholder());

            (token, history)
        };

        self.busy.store(true, Ordering::SeqCst);

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => RequestOutcome::Cancelled,
            result = self.provider.complete(&history) => match result {
                Ok(content) => RequestOutcome::Ok(content),
                Err(err) => RequestOutcome::Failed(err.to_string()),
            },
        };

        let outcome = match outcome {
            RequestOutcome::Cancelled => {
                debug!("send superseded, discarding");
                SendOutcome::Cancelled
            }
            RequestOutcome::Ok(content) => {
                let mut store = self.store.lock().await;
                if token.is_cancelled() {
                    // Superseded between resolution and application.
                    debug!("send superseded after resolution, discarding");
                    SendOutcome::Cancelled
                } else {
                    if content.is_empty() {
                        store.replace_last(EMPTY_REPLY);
                    } else {
                        store.replace_last(content);
                    }
                    info!(turns = store.len(), "reply applied");
                    SendOutcome::Replied
                }
            }
            RequestOutcome::Failed(reason) => {
                let mut store = self.store.lock().await;
                if token.is_cancelled() {
                    debug!("failed send already superseded, discarding");
                    SendOutcome::Cancelled
                } else {
                    warn!(%reason, "completion request failed");
                    *self.last_error.lock().await = Some(reason);
                    store.replace_last(FAILURE_REPLY);
                    SendOutcome::Failed
                }
            }
        };

        // Terminal on every path: never leave the controller busy.
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    /// Reset the conversation to a single fresh welcome turn.
    ///
    /// Cancels any in-flight send so a late reply cannot land on the fresh
    /// log, clears the surfaced error, and lets the store signal the
    /// persistence gateway to clear durable state.
    pub async fn reset(&self) {
        let mut store = self.store.lock().await;
        self.current.lock().await.cancel();
        *self.last_error.lock().await = None;
        store.reset();
        info!("conversation reset");
    }

    /// Whether a send is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// The error surfaced by the most recent failed send, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    /// Handle to the conversation store.
    pub fn store(&self) -> Arc<Mutex<ConversationStore>> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use chatlet_types::error::CompletionError;
    use chatlet_types::turn::Role;
    use tokio::sync::{mpsc, oneshot};

    const WELCOME: &str = "Hi! Ask me anything.";

    fn new_store() -> Arc<Mutex<ConversationStore>> {
        Arc::new(Mutex::new(ConversationStore::restore(None, WELCOME)))
    }

    /// Provider that answers every call immediately from a script.
    struct ImmediateProvider {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        histories: Mutex<Vec<Vec<Turn>>>,
    }

    impl ImmediateProvider {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                histories: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionProvider for ImmediateProvider {
        async fn complete(&self, history: &[Turn]) -> Result<String, CompletionError> {
            self.histories.lock().await.push(history.to_vec());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or(Ok("fallback".to_string()))
        }
    }

    /// Provider whose calls resolve only when the test says so. Signals
    /// each call's arrival on a channel for deterministic sequencing.
    struct GatedProvider {
        gates: Mutex<VecDeque<oneshot::Receiver<Result<String, CompletionError>>>>,
        entered: mpsc::UnboundedSender<()>,
    }

    impl GatedProvider {
        fn new(
            calls: usize,
        ) -> (
            Arc<Self>,
            Vec<oneshot::Sender<Result<String, CompletionError>>>,
            mpsc::UnboundedReceiver<()>,
        ) {
            let mut senders = Vec::new();
            let mut receivers = VecDeque::new();
            for _ in 0..calls {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push_back(rx);
            }
            let (entered_tx, entered_rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    gates: Mutex::new(receivers),
                    entered: entered_tx,
                }),
                senders,
                entered_rx,
            )
        }
    }

    impl CompletionProvider for GatedProvider {
        async fn complete(&self, _history: &[Turn]) -> Result<String, CompletionError> {
            let gate = self
                .gates
                .lock()
                .await
                .pop_front()
                .expect("unexpected completion call");
            let _ = self.entered.send(());
            gate.await
                .unwrap_or_else(|_| Err(CompletionError::Transport("gate dropped".to_string())))
        }
    }

    #[tokio::test]
    async fn sequential_sends_alternate_with_no_trailing_placeholder() {
        let provider = Arc::new(ImmediateProvider::new(vec![
            Ok("first reply".to_string()),
            Ok("second reply".to_string()),
        ]));
        let controller = RequestController::new(provider, new_store());

        assert_eq!(controller.send("one").await, SendOutcome::Replied);
        assert_eq!(controller.send("two").await, SendOutcome::Replied);

        let store = controller.store();
        let store = store.lock().await;
        let roles: Vec<Role> = store.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
        assert!(!store.turns().last().unwrap().is_empty());
        assert_eq!(store.turns()[2].content, "first reply");
        assert_eq!(store.turns()[4].content, "second reply");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn blank_input_is_a_silent_noop() {
        let provider = Arc::new(ImmediateProvider::new(vec![]));
        let controller = RequestController::new(provider.clone(), new_store());

        assert_eq!(controller.send("   \t  ").await, SendOutcome::Ignored);
        assert_eq!(controller.send("").await, SendOutcome::Ignored);

        assert_eq!(controller.store().lock().await.len(), 1);
        assert!(provider.histories.lock().await.is_empty());
        assert!(controller.last_error().await.is_none());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_sending() {
        let provider = Arc::new(ImmediateProvider::new(vec![Ok("hi".to_string())]));
        let controller = RequestController::new(provider, new_store());

        controller.send("  hello  ").await;

        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.turns()[1].content, "hello");
    }

    #[tokio::test]
    async fn outbound_history_excludes_the_placeholder() {
        let provider = Arc::new(ImmediateProvider::new(vec![Ok("pong".to_string())]));
        let controller = RequestController::new(provider.clone(), new_store());

        controller.send("ping").await;

        let histories = provider.histories.lock().await;
        assert_eq!(histories.len(), 1);
        let history = &histories[0];
        // Welcome + the new user turn; no empty assistant turn.
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::assistant(WELCOME));
        assert_eq!(history[1], Turn::user("ping"));
        assert!(history.iter().all(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn empty_reply_becomes_ellipsis() {
        let provider = Arc::new(ImmediateProvider::new(vec![Ok(String::new())]));
        let controller = RequestController::new(provider, new_store());

        assert_eq!(controller.send("hello").await, SendOutcome::Replied);

        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.turns().last().unwrap().content, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn failure_surfaces_error_and_failure_turn() {
        let provider = Arc::new(ImmediateProvider::new(vec![Err(CompletionError::http(
            500,
            "Internal error",
        ))]));
        let controller = RequestController::new(provider, new_store());

        assert_eq!(controller.send("hello").await, SendOutcome::Failed);

        let error = controller.last_error().await.unwrap();
        assert!(error.contains("500"));
        assert!(error.contains("Internal error"));

        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.turns().last().unwrap().content, FAILURE_REPLY);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn next_send_clears_the_surfaced_error() {
        let provider = Arc::new(ImmediateProvider::new(vec![
            Err(CompletionError::Transport("down".to_string())),
            Ok("recovered".to_string()),
        ]));
        let controller = RequestController::new(provider, new_store());

        controller.send("first").await;
        assert!(controller.last_error().await.is_some());

        controller.send("second").await;
        assert!(controller.last_error().await.is_none());
    }

    #[tokio::test]
    async fn overlapping_send_freezes_the_superseded_placeholder() {
        let (provider, mut gates, mut entered) = GatedProvider::new(2);
        let controller = Arc::new(RequestController::new(provider, new_store()));

        let a = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("A").await })
        };
        entered.recv().await.unwrap();

        // Supersede A while it is pending.
        let b = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("B").await })
        };
        entered.recv().await.unwrap();

        // B resolves and becomes the authoritative outcome.
        let gate_a = gates.remove(0);
        let gate_b = gates.remove(0);
        gate_b.send(Ok("reply B".to_string())).unwrap();
        assert_eq!(b.await.unwrap(), SendOutcome::Replied);

        // A resolves later; it must not mutate the log. (Its future was
        // already discarded at cancellation, so the gate may be closed.)
        let _ = gate_a.send(Ok("reply A".to_string()));
        assert_eq!(a.await.unwrap(), SendOutcome::Cancelled);

        let store = controller.store();
        let store = store.lock().await;
        let contents: Vec<&str> = store.turns().iter().map(|t| t.content.as_str()).collect();
        // A's placeholder stays frozen forever as empty content.
        assert_eq!(contents, vec![WELCOME, "A", "", "B", "reply B"]);
        assert!(controller.last_error().await.is_none());
    }

    #[tokio::test]
    async fn superseded_failure_stays_silent() {
        let (provider, mut gates, mut entered) = GatedProvider::new(2);
        let controller = Arc::new(RequestController::new(provider, new_store()));

        let a = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("A").await })
        };
        entered.recv().await.unwrap();

        let b = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("B").await })
        };
        entered.recv().await.unwrap();

        let gate_a = gates.remove(0);
        let gate_b = gates.remove(0);
        gate_b.send(Ok("reply B".to_string())).unwrap();
        b.await.unwrap();

        // A fails after being superseded: no surfaced error, no mutation.
        let _ = gate_a.send(Err(CompletionError::Transport("late failure".to_string())));
        assert_eq!(a.await.unwrap(), SendOutcome::Cancelled);

        assert!(controller.last_error().await.is_none());
        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.turns()[2].content, "");
        assert_eq!(store.turns().last().unwrap().content, "reply B");
    }

    #[tokio::test]
    async fn submit_refuses_while_busy() {
        let (provider, mut gates, mut entered) = GatedProvider::new(1);
        let controller = Arc::new(RequestController::new(provider, new_store()));

        let a = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("A").await })
        };
        entered.recv().await.unwrap();
        assert!(controller.is_busy());

        // The normal submit path never supersedes.
        assert_eq!(controller.submit("B").await, SendOutcome::Ignored);

        gates.remove(0).send(Ok("reply A".to_string())).unwrap();
        assert_eq!(a.await.unwrap(), SendOutcome::Replied);
        assert!(!controller.is_busy());

        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.len(), 3); // welcome + one exchange
    }

    #[tokio::test]
    async fn reset_discards_in_flight_reply() {
        let (provider, mut gates, mut entered) = GatedProvider::new(1);
        let controller = Arc::new(RequestController::new(provider, new_store()));

        let a = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("A").await })
        };
        entered.recv().await.unwrap();

        controller.reset().await;

        let _ = gates.remove(0).send(Ok("late reply".to_string()));
        assert_eq!(a.await.unwrap(), SendOutcome::Cancelled);

        let store = controller.store();
        let store = store.lock().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.turns()[0], Turn::assistant(WELCOME));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn reset_clears_surfaced_error() {
        let provider = Arc::new(ImmediateProvider::new(vec![Err(
            CompletionError::Transport("down".to_string()),
        )]));
        let controller = RequestController::new(provider, new_store());

        controller.send("hello").await;
        assert!(controller.last_error().await.is_some());

        controller.reset().await;
        assert!(controller.last_error().await.is_none());
    }
}
