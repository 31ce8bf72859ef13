//! Store ordering guarantees under concurrent dispatch

use std::sync::{Arc, Mutex};
use std::time::Duration;

use libcallkit::redux::action::{Action, ChatAction};
use libcallkit::redux::reducer::reduce;
use libcallkit::redux::state::AppState;
use libcallkit::redux::store::{Middleware, Next, Store};
use tokio::time::timeout;

fn request(content: String) -> Action {
    ChatAction::SendMessageRequested { content }.into()
}

fn record(mut log: Vec<String>, action: &Action) -> Vec<String> {
    if let Action::Chat(ChatAction::SendMessageRequested { content }) = action {
        log.push(content.clone());
    }
    log
}

#[tokio::test]
async fn test_per_producer_order_is_preserved() {
    let store = Store::new(Vec::<String>::new(), record, Vec::new(), 256);

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    store.dispatch(request(format!("{}:{}", producer, i)));
                    if i % 10 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    timeout(Duration::from_secs(2), store.settle()).await.unwrap();

    let log = store.current_state();
    assert_eq!(log.len(), 200);
    for producer in 0..4 {
        let prefix = format!("{}:", producer);
        let seen: Vec<u32> = log
            .iter()
            .filter_map(|entry| entry.strip_prefix(&prefix))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }
}

/// Records the order in which actions reach it
struct Tap(Arc<Mutex<Vec<String>>>);

impl Middleware<AppState> for Tap {
    fn handle(&self, _store: &Store<AppState>, action: Action, next: Next<'_, AppState>) {
        self.0.lock().unwrap().push(action.name().to_string());
        next.run(action);
    }
}

#[tokio::test]
async fn test_middlewares_run_in_registration_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    /// Tags the action name before handing on
    struct Tag(&'static str, Arc<Mutex<Vec<String>>>);

    impl Middleware<AppState> for Tag {
        fn handle(&self, _store: &Store<AppState>, action: Action, next: Next<'_, AppState>) {
            self.1.lock().unwrap().push(self.0.to_string());
            next.run(action);
        }
    }

    let store = Store::new(
        AppState::default(),
        reduce,
        vec![
            Arc::new(Tag("first", seen.clone())),
            Arc::new(Tag("second", seen.clone())),
            Arc::new(Tap(seen.clone())),
        ],
        16,
    );

    store.dispatch(request("hello".to_string()));
    store.settle().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["first", "second", "chat.send_message_requested"]
    );
}

#[tokio::test]
async fn test_subscribers_see_every_state_in_order() {
    let store = Store::new(Vec::<String>::new(), record, Vec::new(), 256);
    let mut first = store.subscribe();
    let mut second = store.subscribe();

    for i in 0..10 {
        store.dispatch(request(i.to_string()));
    }

    for subscription in [&mut first, &mut second] {
        let mut lengths = Vec::new();
        while lengths.len() < 11 {
            let state = timeout(Duration::from_secs(2), subscription.next())
                .await
                .unwrap()
                .unwrap();
            lengths.push(state.len());
        }
        assert_eq!(lengths, (0..=10).collect::<Vec<_>>());
    }
}
