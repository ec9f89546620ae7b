use std::sync::{Arc, Mutex};

#[allow(unused)]
pub fn init_tracing() { let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init(); }

/// Records values pushed from inside slots. `check` drains everything recorded so far.
#[allow(unused)]
pub fn call_watcher<T: Send + 'static>() -> (Arc<dyn Fn(T) + Send + Sync>, Box<dyn Fn() -> Vec<T> + Send + Sync>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let watcher = {
        let calls = calls.clone();
        Arc::new(move |value: T| {
            calls.lock().unwrap().push(value);
        })
    };

    let check = Box::new(move || {
        let calls: Vec<T> = calls.lock().unwrap().drain(..).collect();
        calls
    });

    (watcher, check)
}
