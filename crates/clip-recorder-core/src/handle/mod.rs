mod listener_guard;
mod task;

pub use {
    listener_guard::ListenerGuard,
    task::{TaskHandle, spawn_delayed, spawn_ticker},
};
