//! Serializing state container
//!
//! # Architecture
//!
//! `dispatch` may be called from any thread. Actions go onto an unbounded
//! queue drained by a single worker task, so the middleware chain and the
//! reducer never run concurrently with themselves. Each action runs through
//! the middlewares in registration order; the last `next` reduces the
//! current state and commits the result.
//!
//! Committed states are published on a `tokio::sync::broadcast` channel.
//! A subscriber first receives the state that was current when it
//! subscribed, then every later state in order. Slow subscribers never
//! block the worker: they skip ahead when they fall behind the buffer.
//!
//! Dispatching from inside a middleware enqueues the action behind
//! everything already queued; nothing is processed out of band.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::stream::{self, Stream};
use tokio::sync::{broadcast, mpsc, Notify};

use super::action::Action;

/// Folds an action into a state value.
pub trait Reducer<S>: Send + Sync + 'static {
    fn reduce(&self, state: S, action: &Action) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(S, &Action) -> S + Send + Sync + 'static,
{
    fn reduce(&self, state: S, action: &Action) -> S {
        self(state, action)
    }
}

/// Action interceptor.
///
/// A middleware may perform side effects, dispatch further actions through
/// `store`, and must hand the action to `next` unless it deliberately
/// swallows it. An action that never reaches `next` never reaches the
/// reducer.
pub trait Middleware<S>: Send + Sync + 'static {
    fn handle(&self, store: &Store<S>, action: Action, next: Next<'_, S>);
}

/// The remainder of the middleware chain, ending in the reducer.
pub struct Next<'a, S> {
    store: &'a Store<S>,
    remaining: &'a [Arc<dyn Middleware<S>>],
    terminal: &'a mut dyn FnMut(Action),
}

impl<'a, S: 'static> Next<'a, S> {
    pub fn run(self, action: Action) {
        match self.remaining.split_first() {
            Some((middleware, rest)) => middleware.handle(
                self.store,
                action,
                Next {
                    store: self.store,
                    remaining: rest,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(action),
        }
    }
}

struct Published<S> {
    state: Arc<S>,
    sender: Option<broadcast::Sender<Arc<S>>>,
}

struct Inner<S> {
    queue: mpsc::UnboundedSender<Action>,
    published: Mutex<Published<S>>,
    /// Queued actions plus running effects
    pending: AtomicUsize,
    idle: Notify,
    shutdown: Arc<Notify>,
    disposed: AtomicBool,
}

/// Handle to a store. Cheap to clone; all clones share one state.
pub struct Store<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Store<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create a store and start its worker on the current tokio runtime.
    ///
    /// `buffer` is the number of states buffered per subscriber.
    pub fn new(
        initial: S,
        reducer: impl Reducer<S>,
        middlewares: Vec<Arc<dyn Middleware<S>>>,
        buffer: usize,
    ) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        let (sender, _) = broadcast::channel(buffer.max(1));

        let store = Self {
            inner: Arc::new(Inner {
                queue,
                published: Mutex::new(Published {
                    state: Arc::new(initial),
                    sender: Some(sender),
                }),
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
                shutdown: Arc::new(Notify::new()),
                disposed: AtomicBool::new(false),
            }),
        };

        tokio::spawn(run_worker(
            Arc::downgrade(&store.inner),
            Arc::clone(&store.inner.shutdown),
            receiver,
            Box::new(reducer),
            middlewares,
        ));

        store
    }

    /// Queue an action. Never blocks; ignored once the store is disposed.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        if self.is_disposed() {
            tracing::debug!(action = action.name(), "Ignoring action for disposed store");
            return;
        }

        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.inner.queue.send(action) {
            tracing::debug!(action = e.0.name(), "Store worker has stopped");
            self.finish_pending();
        }
    }

    /// Latest committed state.
    pub fn current_state(&self) -> Arc<S> {
        Arc::clone(&self.published().state)
    }

    /// Subscribe to state changes, starting with the current state.
    pub fn subscribe(&self) -> StateSubscription<S> {
        let published = self.published();
        StateSubscription {
            replay: Some(Arc::clone(&published.state)),
            receiver: published.sender.as_ref().map(broadcast::Sender::subscribe),
        }
    }

    /// [`subscribe`](Self::subscribe) as a `Stream`.
    pub fn state_stream(&self) -> impl Stream<Item = Arc<S>> + Send + 'static {
        self.subscribe().into_stream()
    }

    /// Run a side effect off the dispatch queue.
    ///
    /// The effect counts as pending work for [`settle`](Self::settle).
    /// Actions it dispatches after the store is disposed are ignored.
    pub fn spawn_effect<F>(&self, effect: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        let store = self.clone();
        tokio::spawn(async move {
            effect.await;
            store.finish_pending();
        });
    }

    /// Wait until the queue is empty and no spawned effect is running.
    pub async fn settle(&self) {
        loop {
            let idle = self.inner.idle.notified();
            if self.inner.pending.load(Ordering::SeqCst) == 0 || self.is_disposed() {
                return;
            }
            idle.await;
        }
    }

    /// Wait for the first published state matching `predicate`.
    ///
    /// Returns `None` if the store is disposed first.
    pub async fn wait_for<F>(&self, predicate: F) -> Option<Arc<S>>
    where
        F: Fn(&S) -> bool,
    {
        let mut subscription = self.subscribe();
        while let Some(state) = subscription.next().await {
            if predicate(&state) {
                return Some(state);
            }
        }
        None
    }

    /// Stop processing, close every subscription and ignore later dispatches.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.shutdown.notify_one();
        self.published().sender = None;
        self.inner.idle.notify_waiters();
        tracing::debug!("Store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    fn process(
        &self,
        action: Action,
        reducer: &dyn Reducer<S>,
        middlewares: &[Arc<dyn Middleware<S>>],
    ) {
        let span = tracing::debug_span!("dispatch", action = action.name());
        let _enter = span.enter();
        tracing::debug!("Processing action");

        let mut terminal = |action: Action| {
            let current = self.current_state();
            let next = reducer.reduce(S::clone(&current), &action);
            self.commit(next);
        };

        Next {
            store: self,
            remaining: middlewares,
            terminal: &mut terminal,
        }
        .run(action);
    }

    fn commit(&self, state: S) {
        let mut published = self.published();
        published.state = Arc::new(state);
        if let Some(sender) = &published.sender {
            // No subscribers is fine
            let _ = sender.send(Arc::clone(&published.state));
        }
    }

    fn finish_pending(&self) {
        if self.inner.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }

    fn published(&self) -> MutexGuard<'_, Published<S>> {
        self.inner
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

}

/// Holds the store weakly between actions: once every handle is dropped
/// the queue sender goes with it and `recv` ends the loop.
async fn run_worker<S>(
    inner: Weak<Inner<S>>,
    shutdown: Arc<Notify>,
    mut receiver: mpsc::UnboundedReceiver<Action>,
    reducer: Box<dyn Reducer<S>>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
) where
    S: Clone + Send + Sync + 'static,
{
    loop {
        let action = tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            next = receiver.recv() => match next {
                Some(action) => action,
                None => break,
            },
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let store = Store { inner };
        if store.is_disposed() {
            break;
        }
        store.process(action, reducer.as_ref(), &middlewares);
        store.finish_pending();
    }

    tracing::debug!("Store worker stopped");
}

/// Replay-latest subscription to a store's states.
pub struct StateSubscription<S> {
    replay: Option<Arc<S>>,
    receiver: Option<broadcast::Receiver<Arc<S>>>,
}

impl<S> StateSubscription<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Next state, or `None` once the store is disposed.
    pub async fn next(&mut self) -> Option<Arc<S>> {
        if let Some(state) = self.replay.take() {
            return Some(state);
        }

        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(state) => return Some(state),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("State subscriber lagged, skipped {} states", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Arc<S>> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|state| (state, subscription))
        })
    }
}
